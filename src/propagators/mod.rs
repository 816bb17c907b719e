/*
    Nyx FDM, flight dynamics state propagation
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use snafu::prelude::*;
use std::fmt;

mod method;
pub use method::*;
mod multistep;
pub use multistep::*;
mod quaternion;
pub use quaternion::*;
mod options;
pub use options::*;

/// Result of a single integration call, before the caller decides to commit it.
///
/// `complete` is false while a multi-step method is still bootstrapping: the value is usable
/// (lower order accurate) but the pending increment must not be committed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tentative<T> {
    pub value: T,
    pub complete: bool,
}

impl<T> Tentative<T> {
    pub(crate) fn complete(value: T) -> Self {
        Self {
            value,
            complete: true,
        }
    }

    pub(crate) fn incomplete(value: T) -> Self {
        Self {
            value,
            complete: false,
        }
    }
}

impl<T: fmt::Debug> fmt::Display for Tentative<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:?} ({})",
            self.value,
            if self.complete {
                "complete"
            } else {
                "bootstrapping"
            }
        )
    }
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum IntegrationError {
    #[snafu(display("unknown integration method tag {tag}"))]
    UnknownMethod { tag: i32 },
    #[snafu(display("unknown integration method `{name}`"))]
    UnknownMethodName { name: String },
    #[snafu(display("{method} only integrates the attitude quaternion, it cannot be used for the {quantity}"))]
    NotApplicable {
        method: IntegrationMethod,
        quantity: IntegratedQuantity,
    },
}
