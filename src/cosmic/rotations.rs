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

use crate::linalg::{Matrix3, Rotation3, UnitQuaternion, Vector3};
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::str::FromStr;

/// Rotation of the frame about its first axis by `angle` radians (passive rotation).
pub fn r1(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c)
}

/// Rotation of the frame about its second axis by `angle` radians (passive rotation).
pub fn r2(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c)
}

/// Rotation of the frame about its third axis by `angle` radians (passive rotation).
pub fn r3(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Defines an Euler rotation, angle must be in radians
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EulerRotation {
    R1(f64),
    R2(f64),
    R3(f64),
}

impl EulerRotation {
    /// Get the DCM from this Euler rotation
    pub fn dcm(&self) -> Matrix3<f64> {
        match *self {
            Self::R1(angle) => r1(angle),
            Self::R2(angle) => r2(angle),
            Self::R3(angle) => r3(angle),
        }
    }
}

/// A fixed three-axis Euler rotation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Euler3Axis {
    /// The first rotation (e.g. R3)
    pub first: EulerRotation,
    /// The second rotation (e.g. R2)
    pub second: EulerRotation,
    /// The third and final rotation (e.g. R1, to complete a 3-2-1 rotation)
    pub third: EulerRotation,
}

impl Euler3Axis {
    /// The aerospace 3-2-1 sequence from the local frame to the body frame: yaw (ψ), then pitch (θ), then roll (φ).
    pub fn yaw_pitch_roll(phi: f64, theta: f64, psi: f64) -> Self {
        Self {
            first: EulerRotation::R3(psi),
            second: EulerRotation::R2(theta),
            third: EulerRotation::R1(phi),
        }
    }

    /// Matrix transforming the coordinates from the reference frame to the rotated frame.
    pub fn dcm(&self) -> Matrix3<f64> {
        self.third.dcm() * self.second.dcm() * self.first.dcm()
    }

    /// Orientation of the rotated frame with respect to the reference frame.
    pub fn orientation(&self) -> UnitQuaternion<f64> {
        dcm_to_orientation(&self.dcm().transpose())
    }
}

/// Converts a matrix transforming coordinates from frame A to frame B into the orientation of A with respect
/// to B, i.e. the quaternion whose rotation matrix is that same matrix.
pub fn dcm_to_orientation(a2b: &Matrix3<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(*a2b))
}

/// Returns the 3-2-1 Euler angles (φ, θ, ψ) in radians of an orientation relative to the local frame.
pub fn euler_angles(q: &UnitQuaternion<f64>) -> Vector3<f64> {
    let (phi, theta, psi) = q.euler_angles();
    Vector3::new(phi, theta, psi)
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(display("unknown angle unit `{unit}`"))]
pub struct AngleUnitError {
    unit: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

impl AngleUnit {
    /// Converts the angle in this unit to radians.
    pub fn to_radians(self, angle: f64) -> f64 {
        match self {
            Self::Degrees => angle.to_radians(),
            Self::Radians => angle,
        }
    }
}

impl FromStr for AngleUnit {
    type Err = AngleUnitError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.to_lowercase().starts_with("deg") {
            Ok(AngleUnit::Degrees)
        } else if s.to_lowercase().starts_with("rad") {
            Ok(AngleUnit::Radians)
        } else {
            Err(AngleUnitError {
                unit: s.to_string(),
            })
        }
    }
}

#[test]
fn test_angle_unit_deser() {
    use std::str::FromStr;
    assert_eq!(AngleUnit::from_str("DeGrEes").unwrap(), AngleUnit::Degrees);
    assert_eq!(AngleUnit::from_str("RaDiaNs").unwrap(), AngleUnit::Radians);
    assert!(AngleUnit::from_str("Gradian").is_err());
}

#[test]
fn test_euler_321() {
    use approx::abs_diff_eq;

    let (phi, theta, psi) = (0.1, -0.4, 2.5);
    let euler = Euler3Axis::yaw_pitch_roll(phi, theta, psi);
    let q = UnitQuaternion::from_euler_angles(phi, theta, psi);
    // The DCM maps the local frame to the body frame, nalgebra's orientation maps body vectors into the local frame
    assert!(abs_diff_eq!(
        euler.dcm(),
        q.to_rotation_matrix().matrix().transpose(),
        epsilon = 1e-14
    ));
    assert!((euler.orientation().inverse() * q).imag().norm() < 1e-14);
    assert!(abs_diff_eq!(
        euler_angles(&dcm_to_orientation(&euler.dcm().transpose())),
        Vector3::new(phi, theta, psi),
        epsilon = 1e-12
    ));
}
