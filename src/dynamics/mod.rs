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

use crate::fdm::VehicleState;
use crate::linalg::Vector3;
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// The planet environment: rotation, reference ellipsoid, gravitational parameter and terrain.
pub mod planet;
pub use self::planet::*;

/// Gravity and other inertial accelerations.
pub mod gravity;
pub use self::gravity::*;

/// The time derivatives supplied to the propagator on each step by the force and moment models.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivativeInputs {
    /// Angular acceleration of the body relative to the inertial frame, in body axes (rad/s^2)
    #[serde(default)]
    pub pqri_dot: Vector3<f64>,
    /// Translational acceleration relative to the inertial frame, in inertial axes (ft/s^2)
    #[serde(default)]
    pub uvwi_dot: Vector3<f64>,
}

impl DerivativeInputs {
    pub fn new(pqri_dot: Vector3<f64>, uvwi_dot: Vector3<f64>) -> Self {
        Self { pqri_dot, uvwi_dot }
    }

    /// Inputs with only a translational acceleration
    pub fn from_acceleration(uvwi_dot: Vector3<f64>) -> Self {
        Self {
            pqri_dot: Vector3::zeros(),
            uvwi_dot,
        }
    }
}

impl Add for DerivativeInputs {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            pqri_dot: self.pqri_dot + rhs.pqri_dot,
            uvwi_dot: self.uvwi_dot + rhs.uvwi_dot,
        }
    }
}

impl AddAssign for DerivativeInputs {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl fmt::Display for DerivativeInputs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "pqri_dot = [{:.6e}, {:.6e}, {:.6e}] rad/s^2\tuvwi_dot = [{:.6e}, {:.6e}, {:.6e}] ft/s^2",
            self.pqri_dot.x,
            self.pqri_dot.y,
            self.pqri_dot.z,
            self.uvwi_dot.x,
            self.uvwi_dot.y,
            self.uvwi_dot.z
        )
    }
}

/// A trait for models which compute the derivative inputs of the propagator from the current vehicle state.
pub trait Dynamics {
    fn eom(&self, state: &VehicleState, planet: &Planet) -> DerivativeInputs;
}

/// Constant inputs, e.g. for tests or a vehicle held in a steady state
impl Dynamics for DerivativeInputs {
    fn eom(&self, _state: &VehicleState, _planet: &Planet) -> DerivativeInputs {
        *self
    }
}

/// A trait for immutable models that return an inertial acceleration in ft/s^2.
pub trait AccelModel: fmt::Display {
    fn eom(&self, state: &VehicleState, planet: &Planet) -> Vector3<f64>;
}
