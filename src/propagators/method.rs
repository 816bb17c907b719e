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

use enum_iterator::Sequence;
use serde_derive::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use snafu::OptionExt;

use super::{IntegrationError, UnknownMethodNameSnafu, UnknownMethodSnafu};

/// Time marching scheme of an integrated quantity.
///
/// The discriminants are the integer tags exposed to the operator, they must not change.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Sequence, Serialize, Deserialize)]
pub enum IntegrationMethod {
    /// Freeze the quantity: zero increment on every step.
    None = 0,
    /// Explicit rectangular Euler.
    #[default]
    RectEuler = 1,
    /// Same as `RectEuler` for this explicit one step scheme.
    Trapezoidal = 2,
    AdamsBashforth2 = 3,
    AdamsBashforth3 = 4,
    AdamsBashforth4 = 5,
    /// First order method of S. Buss, exact for a constant angular velocity. Attitude only.
    Buss1 = 6,
    /// Augmented second order method of S. Buss. Attitude only.
    Buss2 = 7,
    /// Local linearization of Barker et al., one pass second order. Attitude only.
    LocalLinearization = 8,
    AdamsBashforth5 = 9,
}

impl IntegrationMethod {
    /// Integer tag of this method.
    pub fn tag(self) -> i32 {
        self as i32
    }

    /// Returns whether this is one of the closed form quaternion methods, which need no derivative history.
    pub fn is_one_pass(self) -> bool {
        matches!(self, Self::Buss1 | Self::Buss2 | Self::LocalLinearization)
    }

    /// Returns whether this method needs samples it does not have right after a reseed.
    pub fn needs_bootstrap(self) -> bool {
        self == Self::AdamsBashforth2
    }
}

impl TryFrom<i32> for IntegrationMethod {
    type Error = IntegrationError;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        enum_iterator::all::<Self>()
            .find(|method| method.tag() == tag)
            .context(UnknownMethodSnafu { tag })
    }
}

impl FromStr for IntegrationMethod {
    type Err = IntegrationError;

    /// Parses either the integer tag or the (case insensitive) method name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(tag) = s.parse::<i32>() {
            return Self::try_from(tag);
        }
        enum_iterator::all::<Self>()
            .find(|method| format!("{method:?}").eq_ignore_ascii_case(s))
            .context(UnknownMethodNameSnafu { name: s })
    }
}

impl fmt::Display for IntegrationMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::RectEuler => "rectangular Euler",
            Self::Trapezoidal => "trapezoidal",
            Self::AdamsBashforth2 => "Adams-Bashforth 2",
            Self::AdamsBashforth3 => "Adams-Bashforth 3",
            Self::AdamsBashforth4 => "Adams-Bashforth 4",
            Self::AdamsBashforth5 => "Adams-Bashforth 5",
            Self::Buss1 => "Buss 1st order",
            Self::Buss2 => "Buss augmented 2nd order",
            Self::LocalLinearization => "local linearization",
        };
        write!(f, "{name}")
    }
}

/// The four quantities integrated on every time step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Sequence, Serialize, Deserialize)]
pub enum IntegratedQuantity {
    /// Body angular rates with respect to the inertial frame
    RotationalRate,
    /// Inertial velocity
    TranslationalRate,
    /// Attitude quaternion with respect to the inertial frame
    RotationalPosition,
    /// Inertial position
    TranslationalPosition,
}

impl fmt::Display for IntegratedQuantity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::RotationalRate => write!(f, "rotational rate"),
            Self::TranslationalRate => write!(f, "translational rate"),
            Self::RotationalPosition => write!(f, "rotational position"),
            Self::TranslationalPosition => write!(f, "translational position"),
        }
    }
}

#[test]
fn test_method_tags() {
    use enum_iterator::all;

    assert_eq!(all::<IntegrationMethod>().count(), 10);
    for method in all::<IntegrationMethod>() {
        assert_eq!(IntegrationMethod::try_from(method.tag()).unwrap(), method);
    }
    assert_eq!(
        IntegrationMethod::try_from(9).unwrap(),
        IntegrationMethod::AdamsBashforth5
    );
    assert_eq!(
        IntegrationMethod::try_from(10),
        Err(IntegrationError::UnknownMethod { tag: 10 })
    );
    assert!(IntegrationMethod::try_from(-1).is_err());
    assert_eq!(
        "buss2".parse::<IntegrationMethod>().unwrap(),
        IntegrationMethod::Buss2
    );
    assert_eq!(
        "3".parse::<IntegrationMethod>().unwrap(),
        IntegrationMethod::AdamsBashforth2
    );
    assert!("RK4".parse::<IntegrationMethod>().is_err());
}

#[test]
fn test_method_properties() {
    assert_eq!(IntegrationMethod::default(), IntegrationMethod::RectEuler);
    assert!(IntegrationMethod::LocalLinearization.is_one_pass());
    assert!(!IntegrationMethod::AdamsBashforth3.is_one_pass());
    assert!(IntegrationMethod::AdamsBashforth2.needs_bootstrap());
    assert!(!IntegrationMethod::AdamsBashforth4.needs_bootstrap());
}
