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

use crate::cosmic::rotations::dcm_to_orientation;
use crate::cosmic::{EarthPosition, Location};
use crate::linalg::{Matrix3, UnitQuaternion};
use crate::utils::orthonormality_error;

/// The rotation matrices between the inertial (i), planet fixed (ec), local (l) and body (b) frames.
///
/// Each matrix transforms coordinates from the first frame into the second, e.g. `tb2l() * uvw` is the
/// body velocity in local axes. The matrices are only ever derived from the Earth Position Angle, the planet
/// fixed location and the attitude: there are no setters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transforms {
    ti2ec: Matrix3<f64>,
    tec2i: Matrix3<f64>,
    tec2l: Matrix3<f64>,
    tl2ec: Matrix3<f64>,
    ti2l: Matrix3<f64>,
    tl2i: Matrix3<f64>,
    ti2b: Matrix3<f64>,
    tb2i: Matrix3<f64>,
    tl2b: Matrix3<f64>,
    tb2l: Matrix3<f64>,
    tec2b: Matrix3<f64>,
    tb2ec: Matrix3<f64>,
    qec2b: UnitQuaternion<f64>,
}

impl Default for Transforms {
    fn default() -> Self {
        Self {
            ti2ec: Matrix3::identity(),
            tec2i: Matrix3::identity(),
            tec2l: Matrix3::identity(),
            tl2ec: Matrix3::identity(),
            ti2l: Matrix3::identity(),
            tl2i: Matrix3::identity(),
            ti2b: Matrix3::identity(),
            tb2i: Matrix3::identity(),
            tl2b: Matrix3::identity(),
            tb2l: Matrix3::identity(),
            tec2b: Matrix3::identity(),
            tb2ec: Matrix3::identity(),
            qec2b: UnitQuaternion::identity(),
        }
    }
}

impl Transforms {
    /// Copies the inertial to planet fixed pair from the Earth position tracker.
    pub(crate) fn update_earth(&mut self, earth: &EarthPosition) {
        self.ti2ec = *earth.ti2ec();
        self.tec2i = *earth.tec2i();
    }

    /// Derives the local frame matrices. Must follow `update_earth`.
    pub(crate) fn update_location(&mut self, location: &Location) {
        self.tl2ec = location.tl2ec();
        self.tec2l = self.tl2ec.transpose();
        self.ti2l = self.tec2l * self.ti2ec;
        self.tl2i = self.ti2l.transpose();
    }

    /// Derives the body frame matrices from the attitude with respect to the inertial frame.
    /// Must follow `update_location`.
    pub(crate) fn update_body(&mut self, attitude_eci: &UnitQuaternion<f64>) {
        self.tb2i = attitude_eci.to_rotation_matrix().into_inner();
        self.ti2b = self.tb2i.transpose();
        self.tl2b = self.ti2b * self.tl2i;
        self.tb2l = self.tl2b.transpose();
        self.tec2b = self.ti2b * self.tec2i;
        self.tb2ec = self.tec2b.transpose();
        self.qec2b = dcm_to_orientation(&self.tec2b);
    }

    pub fn ti2ec(&self) -> &Matrix3<f64> {
        &self.ti2ec
    }

    pub fn tec2i(&self) -> &Matrix3<f64> {
        &self.tec2i
    }

    pub fn tec2l(&self) -> &Matrix3<f64> {
        &self.tec2l
    }

    pub fn tl2ec(&self) -> &Matrix3<f64> {
        &self.tl2ec
    }

    pub fn ti2l(&self) -> &Matrix3<f64> {
        &self.ti2l
    }

    pub fn tl2i(&self) -> &Matrix3<f64> {
        &self.tl2i
    }

    pub fn ti2b(&self) -> &Matrix3<f64> {
        &self.ti2b
    }

    pub fn tb2i(&self) -> &Matrix3<f64> {
        &self.tb2i
    }

    pub fn tl2b(&self) -> &Matrix3<f64> {
        &self.tl2b
    }

    pub fn tb2l(&self) -> &Matrix3<f64> {
        &self.tb2l
    }

    pub fn tec2b(&self) -> &Matrix3<f64> {
        &self.tec2b
    }

    pub fn tb2ec(&self) -> &Matrix3<f64> {
        &self.tb2ec
    }

    /// Quaternion whose rotation matrix is `tec2b`
    pub fn qec2b(&self) -> &UnitQuaternion<f64> {
        &self.qec2b
    }

    /// Largest deviation from the identity of the product of each matrix pair, of the chained
    /// inertial to body transform through the planet fixed and local frames, and of the orthonormality of
    /// the body transforms.
    pub fn consistency_error(&self) -> f64 {
        let eye = Matrix3::identity();
        let orthonormality = orthonormality_error(&self.ti2b).max(orthonormality_error(&self.tec2b));
        [
            self.ti2ec * self.tec2i,
            self.tec2l * self.tl2ec,
            self.ti2l * self.tl2i,
            self.ti2b * self.tb2i,
            self.tl2b * self.tb2l,
            self.tec2b * self.tb2ec,
            self.tl2b * self.tec2l * self.ti2ec * self.tb2i,
        ]
        .iter()
        .map(|product| (product - eye).abs().max())
        .fold(orthonormality, f64::max)
    }
}

#[test]
fn test_transform_chain() {
    use crate::cosmic::{EARTH_SEMI_MAJOR_FT, EARTH_SEMI_MINOR_FT};

    let mut epa = EarthPosition::earth();
    epa.set_angle(1.2);
    let loc = Location::from_geodetic(
        0.7,
        -1.9,
        12_000.0,
        EARTH_SEMI_MAJOR_FT,
        EARTH_SEMI_MINOR_FT,
    );
    let mut transforms = Transforms::default();
    transforms.update_earth(&epa);
    transforms.update_location(&loc);
    transforms.update_body(&UnitQuaternion::from_euler_angles(0.3, -0.2, 2.0));
    assert!(transforms.consistency_error() < 1e-14);
    let qec2b_dcm = transforms.qec2b().to_rotation_matrix().into_inner();
    assert!((qec2b_dcm - transforms.tec2b()).abs().max() < 1e-14);
}
