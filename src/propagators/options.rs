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

use crate::io::ConfigRepr;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use snafu::ensure;
use typed_builder::TypedBuilder;

use super::{IntegratedQuantity, IntegrationError, IntegrationMethod, NotApplicableSnafu};

/// IntegratorOpts stores the integration method of each of the four integrated quantities.
///
/// The defaults are a rectangular Euler for the angular rates and the attitude, an Adams-Bashforth 2
/// for the inertial velocity and an Adams-Bashforth 3 for the inertial position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
#[serde(default)]
pub struct IntegratorOpts {
    #[builder(default = IntegrationMethod::RectEuler)]
    pub rotational_rate: IntegrationMethod,
    #[builder(default = IntegrationMethod::AdamsBashforth2)]
    pub translational_rate: IntegrationMethod,
    #[builder(default = IntegrationMethod::RectEuler)]
    pub rotational_position: IntegrationMethod,
    #[builder(default = IntegrationMethod::AdamsBashforth3)]
    pub translational_position: IntegrationMethod,
}

impl IntegratorOpts {
    /// Uses the same method for all quantities. A one pass method only applies to the attitude, so the
    /// other quantities then use a rectangular Euler.
    pub fn uniform(method: IntegrationMethod) -> Self {
        let vector_method = if method.is_one_pass() {
            IntegrationMethod::RectEuler
        } else {
            method
        };
        Self {
            rotational_rate: vector_method,
            translational_rate: vector_method,
            rotational_position: method,
            translational_position: vector_method,
        }
    }

    pub fn method(&self, quantity: IntegratedQuantity) -> IntegrationMethod {
        match quantity {
            IntegratedQuantity::RotationalRate => self.rotational_rate,
            IntegratedQuantity::TranslationalRate => self.translational_rate,
            IntegratedQuantity::RotationalPosition => self.rotational_position,
            IntegratedQuantity::TranslationalPosition => self.translational_position,
        }
    }

    pub fn set_method(&mut self, quantity: IntegratedQuantity, method: IntegrationMethod) {
        match quantity {
            IntegratedQuantity::RotationalRate => self.rotational_rate = method,
            IntegratedQuantity::TranslationalRate => self.translational_rate = method,
            IntegratedQuantity::RotationalPosition => self.rotational_position = method,
            IntegratedQuantity::TranslationalPosition => self.translational_position = method,
        }
    }

    /// Checks that the one pass methods are only selected for the attitude.
    pub fn validate(&self) -> Result<(), IntegrationError> {
        for quantity in enum_iterator::all::<IntegratedQuantity>() {
            let method = self.method(quantity);
            ensure!(
                quantity == IntegratedQuantity::RotationalPosition || !method.is_one_pass(),
                NotApplicableSnafu { method, quantity }
            );
        }
        Ok(())
    }
}

impl Default for IntegratorOpts {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ConfigRepr for IntegratorOpts {}

impl fmt::Display for IntegratorOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rotational rate: {}, translational rate: {}, rotational position: {}, translational position: {}",
            self.rotational_rate,
            self.translational_rate,
            self.rotational_position,
            self.translational_position
        )
    }
}

#[test]
fn test_options() {
    let opts = IntegratorOpts::default();
    assert_eq!(opts.rotational_rate, IntegrationMethod::RectEuler);
    assert_eq!(opts.translational_rate, IntegrationMethod::AdamsBashforth2);
    assert_eq!(opts.rotational_position, IntegrationMethod::RectEuler);
    assert_eq!(
        opts.translational_position,
        IntegrationMethod::AdamsBashforth3
    );
    assert!(opts.validate().is_ok());

    let opts = IntegratorOpts::uniform(IntegrationMethod::Buss2);
    assert_eq!(opts.rotational_position, IntegrationMethod::Buss2);
    assert_eq!(
        opts.method(IntegratedQuantity::TranslationalRate),
        IntegrationMethod::RectEuler
    );
    assert!(opts.validate().is_ok());

    let mut opts = IntegratorOpts::builder()
        .translational_rate(IntegrationMethod::AdamsBashforth4)
        .build();
    assert_eq!(opts.translational_rate, IntegrationMethod::AdamsBashforth4);
    assert_eq!(
        opts.translational_position,
        IntegrationMethod::AdamsBashforth3
    );
    opts.set_method(
        IntegratedQuantity::RotationalRate,
        IntegrationMethod::LocalLinearization,
    );
    assert_eq!(
        opts.validate(),
        Err(IntegrationError::NotApplicable {
            method: IntegrationMethod::LocalLinearization,
            quantity: IntegratedQuantity::RotationalRate
        })
    );
}

#[test]
fn test_options_yaml() {
    let opts = IntegratorOpts::loads(
        "
translational_rate: AdamsBashforth3
rotational_position: Buss1
",
    )
    .unwrap();
    assert_eq!(opts.rotational_rate, IntegrationMethod::RectEuler);
    assert_eq!(opts.translational_rate, IntegrationMethod::AdamsBashforth3);
    assert_eq!(opts.rotational_position, IntegrationMethod::Buss1);
    assert_eq!(
        opts.translational_position,
        IntegrationMethod::AdamsBashforth3
    );
    assert!(IntegratorOpts::loads("translational_rate: RK89").is_err());
}
