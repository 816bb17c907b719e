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

use crate::cosmic::{Location, EARTH_SEMI_MAJOR_FT, EARTH_SEMI_MINOR_FT};
use crate::linalg::{Quaternion, UnitQuaternion, Vector3};
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// The full kinematic state of the vehicle.
///
/// Distances in ft, velocities in ft/s, angular rates in rad/s. The attitude quaternions are the orientation
/// of the body frame with respect to the inertial and the local frames respectively, i.e. their rotation
/// matrices transform body coordinates into inertial and local coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Position in the planet fixed frame
    pub location: Location,
    /// Position in the inertial frame
    pub inertial_position: Vector3<f64>,
    pub attitude_eci: UnitQuaternion<f64>,
    pub attitude_local: UnitQuaternion<f64>,
    /// Velocity relative to the planet fixed frame, in body axes
    pub uvw: Vector3<f64>,
    /// Velocity relative to the inertial frame, in inertial axes
    pub inertial_velocity: Vector3<f64>,
    /// Angular rates relative to the planet fixed frame, in body axes
    pub pqr: Vector3<f64>,
    /// Angular rates relative to the inertial frame, in body axes
    pub pqri: Vector3<f64>,
    /// Time derivative of `attitude_eci` on the current inertial body rates
    pub qtrndot: Quaternion<f64>,
}

impl VehicleState {
    /// A vehicle at rest at the provided location, aligned with the inertial frame.
    pub fn at(location: Location) -> Self {
        Self {
            location,
            inertial_position: *location.ecef(),
            attitude_eci: UnitQuaternion::identity(),
            attitude_local: UnitQuaternion::identity(),
            uvw: Vector3::zeros(),
            inertial_velocity: Vector3::zeros(),
            pqr: Vector3::zeros(),
            pqri: Vector3::zeros(),
            qtrndot: Quaternion::new(0.0, 0.0, 0.0, 0.0),
        }
    }
}

impl Default for VehicleState {
    /// At sea level on the equator and the prime meridian of the WGS84 ellipsoid
    fn default() -> Self {
        Self::at(Location::new(
            Vector3::new(EARTH_SEMI_MAJOR_FT, 0.0, 0.0),
            EARTH_SEMI_MAJOR_FT,
            EARTH_SEMI_MINOR_FT,
        ))
    }
}

impl fmt::Display for VehicleState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{:e}] r_i = [{:.3}, {:.3}, {:.3}] ft\tv_i = [{:.3}, {:.3}, {:.3}] ft/s\tpqri = [{:.6}, {:.6}, {:.6}] rad/s",
            self.location,
            self.inertial_position.x,
            self.inertial_position.y,
            self.inertial_position.z,
            self.inertial_velocity.x,
            self.inertial_velocity.y,
            self.inertial_velocity.z,
            self.pqri.x,
            self.pqri.y,
            self.pqri.z,
        )
    }
}
