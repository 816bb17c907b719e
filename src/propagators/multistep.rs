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

use crate::linalg::{Quaternion, Vector3};
use std::collections::VecDeque;
use std::fmt;
use std::ops::{Add, Mul, Sub};

use snafu::ensure;

use super::{
    IntegratedQuantity, IntegrationError, IntegrationMethod, NotApplicableSnafu, Tentative,
};

/// Number of past derivatives kept, enough for an Adams-Bashforth 5.
pub const HISTORY_LEN: usize = 5;

/// The minimal set of operations a quantity needs to be integrated by a linear multi-step method.
pub trait VectorSpace:
    Copy + fmt::Debug + Add<Output = Self> + Sub<Output = Self> + Mul<f64, Output = Self>
{
    /// Additive identity
    fn zero() -> Self;
}

impl VectorSpace for Vector3<f64> {
    fn zero() -> Self {
        Vector3::zeros()
    }
}

impl VectorSpace for Quaternion<f64> {
    fn zero() -> Self {
        Quaternion::new(0.0, 0.0, 0.0, 0.0)
    }
}

/// A fixed step integrator of the Adams-Bashforth family.
///
/// Calling `integrate` pushes the provided derivative in the history and returns a tentative value,
/// the pending increment only becomes part of the integrated value upon `commit`.
#[derive(Clone, Debug)]
pub struct MultiStepIntegrator<T: VectorSpace> {
    quantity: IntegratedQuantity,
    method: IntegrationMethod,
    step_size: f64,
    value: T,
    increment: T,
    /// Past derivatives, most recent first. Always `HISTORY_LEN` long.
    history: VecDeque<T>,
    /// Counts the steps taken since the last reseed, only meaningful while bootstrapping.
    step: u8,
}

impl<T: VectorSpace> MultiStepIntegrator<T> {
    /// Initializes an integrator of the provided quantity, with a null value and history.
    pub fn new(
        quantity: IntegratedQuantity,
        method: IntegrationMethod,
    ) -> Result<Self, IntegrationError> {
        let mut me = Self::unchecked(quantity);
        me.set_method(method)?;
        Ok(me)
    }

    pub(crate) fn unchecked(quantity: IntegratedQuantity) -> Self {
        Self {
            quantity,
            method: IntegrationMethod::default(),
            step_size: 0.0,
            value: T::zero(),
            increment: T::zero(),
            history: VecDeque::from(vec![T::zero(); HISTORY_LEN]),
            step: 0,
        }
    }

    /// Selects the integration method. The closed form methods only apply to the attitude quaternion
    /// and are rejected here.
    pub fn set_method(&mut self, method: IntegrationMethod) -> Result<(), IntegrationError> {
        ensure!(
            !method.is_one_pass(),
            NotApplicableSnafu {
                method,
                quantity: self.quantity
            }
        );
        self.set_method_unchecked(method);
        Ok(())
    }

    pub(crate) fn set_method_unchecked(&mut self, method: IntegrationMethod) {
        if method != self.method {
            debug!(
                "{} integrator switched from {} to {}",
                self.quantity, self.method, method
            );
            self.method = method;
            self.step = 0;
        }
    }

    pub fn method(&self) -> IntegrationMethod {
        self.method
    }

    pub fn quantity(&self) -> IntegratedQuantity {
        self.quantity
    }

    /// Sets the time step in seconds. A step lower or equal to zero holds the value.
    pub fn set_step_size(&mut self, step_size: f64) {
        self.step_size = step_size;
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Sets the integrated value and discards any pending increment.
    pub fn set_initial_condition(&mut self, value: T) {
        self.value = value;
        self.increment = T::zero();
    }

    /// Fills the whole history with the provided derivative and restarts the bootstrap.
    pub fn set_initial_derivative(&mut self, derivative: T) {
        self.history.clear();
        self.history.resize(HISTORY_LEN, derivative);
        self.step = 0;
    }

    /// The committed value
    pub fn value(&self) -> T {
        self.value
    }

    /// The increment computed by the latest call to `integrate` and not yet committed
    pub fn increment(&self) -> T {
        self.increment
    }

    /// The past derivatives, most recent first
    pub fn history(&self) -> impl Iterator<Item = &T> {
        self.history.iter()
    }

    /// Returns whether the next call to `integrate` will return an incomplete step.
    pub fn is_bootstrapping(&self) -> bool {
        self.method.needs_bootstrap() && self.step == 0
    }

    /// Computes the increment from the provided derivative and returns the tentative value.
    pub fn integrate(&mut self, derivative: T) -> Tentative<T> {
        if self.step_size <= 0.0 {
            self.increment = T::zero();
            return Tentative::complete(self.value);
        }

        self.record(derivative);

        let dt = self.step_size;
        let f0 = self.history[0];
        let f1 = self.history[1];
        let f2 = self.history[2];
        let f3 = self.history[3];
        let f4 = self.history[4];
        let mut complete = true;

        self.increment = match self.method {
            IntegrationMethod::RectEuler | IntegrationMethod::Trapezoidal => f0 * dt,
            IntegrationMethod::AdamsBashforth2 => match self.step {
                0 => {
                    // Euler predictor, the same interval is integrated again on the next step
                    self.step = 1;
                    complete = false;
                    f0 * dt
                }
                1 => {
                    self.step = 2;
                    // Drop the sample evaluated on the predicted state
                    self.history.pop_front();
                    let oldest = self.history[self.history.len() - 1];
                    self.history.push_back(oldest);
                    (f0 + f1) * (0.5 * dt)
                }
                _ => (f0 * 1.5 - f1 * 0.5) * dt,
            },
            IntegrationMethod::AdamsBashforth3 => {
                (f0 * 23.0 - f1 * 16.0 + f2 * 5.0) * (dt / 12.0)
            }
            IntegrationMethod::AdamsBashforth4 => {
                (f0 * 55.0 - f1 * 59.0 + f2 * 37.0 - f3 * 9.0) * (dt / 24.0)
            }
            IntegrationMethod::AdamsBashforth5 => {
                (f0 * 1901.0 - f1 * 2774.0 + f2 * 2616.0 - f3 * 1274.0 + f4 * 251.0)
                    * (dt / 720.0)
            }
            IntegrationMethod::None
            | IntegrationMethod::Buss1
            | IntegrationMethod::Buss2
            | IntegrationMethod::LocalLinearization => T::zero(),
        };

        let value = self.value + self.increment;
        if complete {
            Tentative::complete(value)
        } else {
            trace!("{} integrator bootstrapping with {}", self.quantity, self.method);
            Tentative::incomplete(value)
        }
    }

    /// Stores a derivative in the history without integrating it.
    pub(crate) fn record(&mut self, derivative: T) {
        self.history.push_front(derivative);
        self.history.truncate(HISTORY_LEN);
    }

    /// Adds the pending increment to the integrated value.
    pub fn commit(&mut self) {
        self.value = self.value + self.increment;
        self.increment = T::zero();
    }
}
