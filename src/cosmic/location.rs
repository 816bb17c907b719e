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
use serde_derive::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::fmt;

/// A position in the planet fixed frame, on or above a reference ellipsoid.
///
/// All distances are in feet and all angles in radians unless the function name says otherwise.
/// The local frame is the North-East-Down frame at the position, oriented with the geodetic latitude.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Planet fixed Cartesian coordinates
    position: Vector3<f64>,
    semi_major: f64,
    semi_minor: f64,
}

impl Location {
    pub fn new(position: Vector3<f64>, semi_major: f64, semi_minor: f64) -> Self {
        Self {
            position,
            semi_major,
            semi_minor,
        }
    }

    /// Creates a location from its geocentric latitude, longitude and radius.
    pub fn from_geocentric(
        latitude: f64,
        longitude: f64,
        radius: f64,
        semi_major: f64,
        semi_minor: f64,
    ) -> Self {
        let (sin_lat, cos_lat) = latitude.sin_cos();
        let (sin_long, cos_long) = longitude.sin_cos();
        Self::new(
            Vector3::new(
                radius * cos_lat * cos_long,
                radius * cos_lat * sin_long,
                radius * sin_lat,
            ),
            semi_major,
            semi_minor,
        )
    }

    /// Creates a location from its geodetic latitude (φ), longitude (λ) and height with respect to the ellipsoid.
    ///
    /// Reference: G. Xu and Y. Xu, "GPS", DOI 10.1007/978-3-662-50367-6_2, 2016
    pub fn from_geodetic(
        latitude: f64,
        longitude: f64,
        height: f64,
        semi_major: f64,
        semi_minor: f64,
    ) -> Self {
        let mut me = Self::new(Vector3::zeros(), semi_major, semi_minor);
        me.set_position_geodetic(latitude, longitude, height);
        me
    }

    /// Moves this location to the provided geodetic coordinates, keeping the ellipsoid.
    pub fn set_position_geodetic(&mut self, latitude: f64, longitude: f64, height: f64) {
        let e2 = self.e2();
        let (sin_long, cos_long) = longitude.sin_cos();
        let (sin_lat, cos_lat) = latitude.sin_cos();
        let c_body = self.semi_major / (1.0 - e2 * sin_lat.powi(2)).sqrt();
        let s_body = c_body * (1.0 - e2);
        self.position = Vector3::new(
            (c_body + height) * cos_lat * cos_long,
            (c_body + height) * cos_lat * sin_long,
            (s_body + height) * sin_lat,
        );
    }

    /// Planet fixed Cartesian coordinates in ft
    pub fn ecef(&self) -> &Vector3<f64> {
        &self.position
    }

    pub fn semi_major(&self) -> f64 {
        self.semi_major
    }

    pub fn semi_minor(&self) -> f64 {
        self.semi_minor
    }

    /// Flattening of the reference ellipsoid
    pub fn flattening(&self) -> f64 {
        if self.semi_major > 0.0 {
            1.0 - self.semi_minor / self.semi_major
        } else {
            0.0
        }
    }

    /// Square of the first eccentricity of the reference ellipsoid
    pub fn e2(&self) -> f64 {
        let f = self.flattening();
        f * (2.0 - f)
    }

    /// Distance to the planet center in ft
    pub fn radius(&self) -> f64 {
        self.position.norm()
    }

    /// Moves the location along its radial direction. A location at the center is moved along the X axis.
    pub fn set_radius(&mut self, radius: f64) {
        let current = self.radius();
        if current > 0.0 {
            self.position *= radius / current;
        } else {
            self.position = Vector3::new(radius, 0.0, 0.0);
        }
    }

    /// Longitude in radians, between -π and π
    pub fn longitude(&self) -> f64 {
        self.position.y.atan2(self.position.x)
    }

    pub fn longitude_deg(&self) -> f64 {
        self.longitude().to_degrees()
    }

    /// Sets the longitude, keeping the geocentric latitude and radius.
    pub fn set_longitude(&mut self, longitude: f64) {
        *self = Self::from_geocentric(
            self.latitude(),
            longitude,
            self.radius(),
            self.semi_major,
            self.semi_minor,
        );
    }

    /// Geocentric latitude in radians, between -π/2 and π/2
    pub fn latitude(&self) -> f64 {
        let r_delta = self.position.x.hypot(self.position.y);
        self.position.z.atan2(r_delta)
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude().to_degrees()
    }

    /// Sets the geocentric latitude, keeping the longitude and radius.
    pub fn set_latitude(&mut self, latitude: f64) {
        *self = Self::from_geocentric(
            latitude,
            self.longitude(),
            self.radius(),
            self.semi_major,
            self.semi_minor,
        );
    }

    /// Returns the geodetic latitude (φ) in radians.
    ///
    /// Reference: Vallado, 4th Ed., Algorithm 12 page 172.
    pub fn geodetic_latitude(&self) -> f64 {
        if self.radius() == 0.0 {
            return 0.0;
        }
        let eps = 1e-12;
        let max_attempts = 20;
        let mut attempt_no = 0;
        let e2 = self.e2();
        let r_delta = self.position.x.hypot(self.position.y);
        let mut latitude = self.latitude();
        loop {
            attempt_no += 1;
            let c_earth = self.semi_major / (1.0 - e2 * latitude.sin().powi(2)).sqrt();
            let new_latitude = (self.position.z + c_earth * e2 * latitude.sin()).atan2(r_delta);
            if (latitude - new_latitude).abs() < eps {
                return new_latitude;
            } else if attempt_no >= max_attempts {
                warn!(
                    "geodetic latitude failed to converge -- error = {}",
                    (latitude - new_latitude).abs()
                );
                return new_latitude;
            }
            latitude = new_latitude;
        }
    }

    pub fn geodetic_latitude_deg(&self) -> f64 {
        self.geodetic_latitude().to_degrees()
    }

    /// Returns the height above the reference ellipsoid, along its normal, in ft.
    ///
    /// Reference: Vallado, 4th Ed., Algorithm 12 page 172.
    pub fn geodetic_altitude(&self) -> f64 {
        let e2 = self.e2();
        let latitude = self.geodetic_latitude();
        let (sin_lat, cos_lat) = latitude.sin_cos();
        let c_earth = self.semi_major / (1.0 - e2 * sin_lat.powi(2)).sqrt();
        if cos_lat.abs() < 0.1 {
            // Near the poles
            self.position.z / sin_lat - c_earth * (1.0 - e2)
        } else {
            let r_delta = self.position.x.hypot(self.position.y);
            r_delta / cos_lat - c_earth
        }
    }

    /// Radius of the reference ellipsoid below this location, along the radial direction.
    pub fn sea_level_radius(&self) -> f64 {
        let (sin_lat, cos_lat) = self.latitude().sin_cos();
        let a = self.semi_major;
        let b = self.semi_minor;
        a * b / ((b * cos_lat).powi(2) + (a * sin_lat).powi(2)).sqrt()
    }

    /// Planet fixed to local (North-East-Down) frame
    pub fn tec2l(&self) -> Matrix3<f64> {
        let (sin_lat, cos_lat) = self.geodetic_latitude().sin_cos();
        let (sin_long, cos_long) = self.longitude().sin_cos();
        Matrix3::new(
            -sin_lat * cos_long,
            -sin_lat * sin_long,
            cos_lat,
            -sin_long,
            cos_long,
            0.0,
            -cos_lat * cos_long,
            -cos_lat * sin_long,
            -sin_lat,
        )
    }

    /// Local (North-East-Down) to planet fixed frame
    pub fn tl2ec(&self) -> Matrix3<f64> {
        self.tec2l().transpose()
    }

    /// Unit vector pointing up along the ellipsoid normal, in the planet fixed frame
    pub fn up(&self) -> Vector3<f64> {
        -self.tl2ec().column(2).into_owned()
    }

    /// Great circle distance in ft to another location, on a sphere of the mean of both radii.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let (lat1, lat2) = (self.latitude(), other.latitude());
        let dlat = lat2 - lat1;
        let dlong = other.longitude() - self.longitude();
        let a = (0.5 * dlat).sin().powi(2)
            + lat1.cos() * lat2.cos() * (0.5 * dlong).sin().powi(2);
        let central_angle = 2.0 * a.sqrt().min(1.0).asin();
        0.5 * (self.radius() + other.radius()) * central_angle
    }

    /// Returns whether this location is at one of the poles, where the longitude is undefined.
    pub fn is_polar(&self) -> bool {
        (self.latitude().abs() - FRAC_PI_2).abs() < f64::EPSILON
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:.3}, {:.3}, {:.3}",
            self.position.x, self.position.y, self.position.z
        )
    }
}

impl fmt::LowerExp for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "geodetic lat = {:e} deg, lon = {:e} deg, alt = {:e} ft",
            self.geodetic_latitude_deg(),
            self.longitude_deg(),
            self.geodetic_altitude()
        )
    }
}
