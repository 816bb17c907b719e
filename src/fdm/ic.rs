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

use crate::cosmic::rotations::{AngleUnit, Euler3Axis};
use crate::cosmic::Location;
use crate::dynamics::Planet;
use crate::io::ConfigRepr;
use crate::linalg::{Matrix3, UnitQuaternion, Vector3};
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use typed_builder::TypedBuilder;

/// Initial velocity of the vehicle relative to the planet fixed frame.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialVelocity {
    /// u, v, w in ft/s, in body axes
    Body(Vector3<f64>),
    /// North, East, Down in ft/s, in local axes
    Local(Vector3<f64>),
}

impl Default for InitialVelocity {
    fn default() -> Self {
        Self::Body(Vector3::zeros())
    }
}

/// Initial conditions of a run.
///
/// The position is geodetic, the orientation is given by the 3-2-1 Euler angles of the body with respect to the
/// local frame and the angular rates are relative to the planet fixed frame, in body axes (rad/s).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct InitialCondition {
    /// Geodetic latitude
    #[builder(default)]
    #[serde(default)]
    pub latitude: f64,
    #[builder(default)]
    #[serde(default)]
    pub longitude: f64,
    /// Height above the reference ellipsoid in ft
    #[builder(default)]
    #[serde(default)]
    pub altitude: f64,
    /// Roll (φ)
    #[builder(default)]
    #[serde(default)]
    pub phi: f64,
    /// Pitch (θ)
    #[builder(default)]
    #[serde(default)]
    pub theta: f64,
    /// Heading (ψ)
    #[builder(default)]
    #[serde(default)]
    pub psi: f64,
    /// Unit of the latitude, longitude and Euler angles
    #[builder(default)]
    #[serde(default)]
    pub angles: AngleUnit,
    #[builder(default)]
    #[serde(default)]
    pub velocity: InitialVelocity,
    #[builder(default)]
    #[serde(default)]
    pub pqr: Vector3<f64>,
    /// Initial Earth Position Angle in radians
    #[builder(default)]
    #[serde(default)]
    pub earth_position_angle: f64,
}

impl InitialCondition {
    /// Location of the vehicle on the planet's ellipsoid.
    pub fn position(&self, planet: &Planet) -> Location {
        planet.location_geodetic(
            self.angles.to_radians(self.latitude),
            self.angles.to_radians(self.longitude),
            self.altitude,
        )
    }

    /// Orientation of the body with respect to the local frame.
    pub fn orientation(&self) -> UnitQuaternion<f64> {
        Euler3Axis::yaw_pitch_roll(
            self.angles.to_radians(self.phi),
            self.angles.to_radians(self.theta),
            self.angles.to_radians(self.psi),
        )
        .orientation()
    }

    /// Body velocity in ft/s given the local to body transform.
    pub fn uvw(&self, tl2b: &Matrix3<f64>) -> Vector3<f64> {
        match self.velocity {
            InitialVelocity::Body(uvw) => uvw,
            InitialVelocity::Local(ned) => tl2b * ned,
        }
    }

    /// Angular rates relative to the planet fixed frame, in body axes (rad/s)
    pub fn pqr(&self) -> Vector3<f64> {
        self.pqr
    }

    pub fn earth_position_angle(&self) -> f64 {
        self.earth_position_angle
    }
}

impl Default for InitialCondition {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ConfigRepr for InitialCondition {}

impl fmt::Display for InitialCondition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "lat = {}, lon = {}, alt = {} ft, (phi, theta, psi) = ({}, {}, {}) in {:?}, {:?}",
            self.latitude,
            self.longitude,
            self.altitude,
            self.phi,
            self.theta,
            self.psi,
            self.angles,
            self.velocity
        )
    }
}
