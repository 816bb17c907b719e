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

/*! # nyx-fdm

Flight dynamics state propagation of a rigid body in the rotating frame of an oblate planet.

Given the body angular and translational accelerations at each time step, [`fdm::Propagate`] integrates the
angular rates, the inertial velocity, the attitude quaternion and the inertial position with selectable
multi-step and quaternion integration methods, and keeps every frame transform between the inertial,
planet fixed, local and body frames consistent after each step.
*/

/// Provides the integration methods, the multi-step integrator and the quaternion integrator.
pub mod propagators;

/// Provides the derivative inputs, the planet model with its ground callback, and simple dynamics.
pub mod dynamics;

/// Provides the Earth Position Angle, the planet fixed location and the rotation helpers.
pub mod cosmic;

/// The vehicle state, the frame transforms, the initial conditions and the propagator itself.
pub mod fdm;

/// Utility functions shared by different modules, and which may be useful to engineers.
pub mod utils;

mod errors;
/// Propagation never fails: only the configuration of a propagator may return an error.
pub use self::errors::FdmError;

/// YAML loading and saving of the configuration structures.
pub mod io;

#[macro_use]
extern crate log;
extern crate nalgebra as na;

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
    pub use na::geometry::{Quaternion, Rotation3, UnitQuaternion};
}

/// Re-export some useful things
pub use self::fdm::{InitialCondition, Propagate, VehicleState};
