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

use crate::io::ConfigError;
use crate::propagators::IntegrationError;

/// Top level error of this crate: propagation itself never fails, only its configuration can.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FdmError {
    #[snafu(display("integrator configuration error: {source}"))]
    Integration { source: IntegrationError },
    #[snafu(display("configuration error: {source}"))]
    Config { source: ConfigError },
}

impl From<IntegrationError> for FdmError {
    fn from(source: IntegrationError) -> Self {
        Self::Integration { source }
    }
}

impl From<ConfigError> for FdmError {
    fn from(source: ConfigError) -> Self {
        Self::Config { source }
    }
}
