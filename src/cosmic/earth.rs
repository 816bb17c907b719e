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

use crate::linalg::{Matrix3, Vector3};
use std::fmt;

/// Tracks the Earth Position Angle (EPA), i.e. the rotation of the planet fixed frame with respect to the inertial frame.
///
/// The inertial to planet fixed matrix and its transpose are recomputed on every change of the angle.
/// The angle is not wrapped.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EarthPosition {
    /// Angle in radians
    angle: f64,
    /// Planet rotation rate in rad/s, about the Z axis
    rotation_rate: f64,
    ti2ec: Matrix3<f64>,
    tec2i: Matrix3<f64>,
}

impl EarthPosition {
    /// Initializes a zero angle tracker for a planet rotating at `rotation_rate` rad/s.
    pub fn new(rotation_rate: f64) -> Self {
        let mut me = Self {
            angle: 0.0,
            rotation_rate,
            ti2ec: Matrix3::identity(),
            tec2i: Matrix3::identity(),
        };
        me.set_angle(0.0);
        me
    }

    /// Initializes the tracker with the Earth rotation rate.
    pub fn earth() -> Self {
        Self::new(super::EARTH_ROTATION_RATE)
    }

    /// Sets the angle in radians.
    pub fn set_angle(&mut self, angle: f64) {
        self.angle = angle;
        let (sin_epa, cos_epa) = angle.sin_cos();
        self.ti2ec = Matrix3::new(
            cos_epa, sin_epa, 0.0, -sin_epa, cos_epa, 0.0, 0.0, 0.0, 1.0,
        );
        self.tec2i = self.ti2ec.transpose();
    }

    /// Advances the angle by the rotation of the planet over `dt` seconds.
    pub fn increment_angle(&mut self, dt: f64) {
        self.set_angle(self.angle + self.rotation_rate * dt);
    }

    /// Angle in radians
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn angle_deg(&self) -> f64 {
        self.angle.to_degrees()
    }

    pub fn rotation_rate(&self) -> f64 {
        self.rotation_rate
    }

    /// Angular velocity of the planet in rad/s, expressed in the inertial frame.
    pub fn rotation_axis(&self) -> Vector3<f64> {
        Vector3::new(0.0, 0.0, self.rotation_rate)
    }

    /// Inertial to planet fixed
    pub fn ti2ec(&self) -> &Matrix3<f64> {
        &self.ti2ec
    }

    /// Planet fixed to inertial
    pub fn tec2i(&self) -> &Matrix3<f64> {
        &self.tec2i
    }
}

impl Default for EarthPosition {
    fn default() -> Self {
        Self::earth()
    }
}

impl fmt::Display for EarthPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "EPA = {:.6} deg (rate {:e} rad/s)",
            self.angle_deg(),
            self.rotation_rate
        )
    }
}

#[test]
fn test_epa_matrices() {
    use approx::abs_diff_eq;

    let mut epa = EarthPosition::earth();
    assert_eq!(epa.ti2ec(), &Matrix3::identity());

    epa.set_angle(std::f64::consts::FRAC_PI_2);
    // The X axis of the fixed frame points along the inertial Y axis
    let x_ec = epa.tec2i() * Vector3::x();
    assert!(abs_diff_eq!(x_ec, Vector3::y(), epsilon = 1e-15));
    assert!(abs_diff_eq!(
        epa.ti2ec() * epa.tec2i(),
        Matrix3::identity(),
        epsilon = 1e-15
    ));

    // No wrapping after several revolutions
    epa.set_angle(0.0);
    let day = 2.0 * std::f64::consts::PI / epa.rotation_rate();
    for _ in 0..3 {
        epa.increment_angle(day);
    }
    assert!(abs_diff_eq!(epa.angle(), 6.0 * std::f64::consts::PI, epsilon = 1e-12));
    assert!(abs_diff_eq!(epa.ti2ec(), &Matrix3::identity(), epsilon = 1e-12));
}
