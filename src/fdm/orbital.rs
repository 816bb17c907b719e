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

use crate::linalg::Vector3;
use serde_derive::Serialize;
use std::f64::consts::PI;
use std::fmt;

/// Below this, the inclination (deg) and the eccentricity are considered null.
const ORBIT_EPSILON: f64 = 1e-8;

/// Osculating orbital elements of the vehicle, in the inertial frame.
///
/// Angles in degrees, distances in ft, period in seconds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct OrbitalParameters {
    /// Magnitude of the specific angular momentum (ft^2/s)
    pub angular_momentum: f64,
    pub inclination: f64,
    /// Right ascension of the ascending node
    pub right_ascension: f64,
    pub eccentricity: f64,
    /// Argument of periapsis
    pub periapsis_argument: f64,
    pub true_anomaly: f64,
    pub apoapsis_radius: f64,
    pub periapsis_radius: f64,
    /// Zero for non elliptical orbits
    pub period: f64,
}

impl OrbitalParameters {
    /// Computes the orbital elements from the inertial position and velocity around a body of parameter `gm`.
    ///
    /// The node and the periapsis are placed on the X axis when undefined, i.e. for an equatorial or a circular orbit.
    pub fn from_inertial(position: &Vector3<f64>, velocity: &Vector3<f64>, gm: f64) -> Self {
        let hvec = position.cross(velocity);
        let h = hvec.norm();
        let inclination = if h > 0.0 {
            (hvec.z / h).clamp(-1.0, 1.0).acos().to_degrees()
        } else {
            0.0
        };

        let mut periapsis_argument = 0.0;
        let (right_ascension, node) = if inclination.abs() > ORBIT_EPSILON {
            let n = Vector3::z().cross(&hvec);
            (n.y.atan2(n.x).to_degrees(), n.normalize())
        } else {
            (0.0, Vector3::x())
        };

        let r_hat = if position.norm() > 0.0 {
            position.normalize()
        } else {
            Vector3::x()
        };
        let vr = r_hat.dot(velocity);
        let mut evec = velocity.cross(&hvec) / gm - r_hat;
        let eccentricity = evec.norm();
        if eccentricity > ORBIT_EPSILON {
            evec /= eccentricity;
            if inclination.abs() > ORBIT_EPSILON {
                periapsis_argument = node.dot(&evec).clamp(-1.0, 1.0).acos().to_degrees();
                if evec.z < 0.0 {
                    periapsis_argument = 360.0 - periapsis_argument;
                }
            }
        } else {
            evec = Vector3::x();
        }

        let mut true_anomaly = evec.dot(&r_hat).clamp(-1.0, 1.0).acos().to_degrees();
        if vr < 0.0 {
            true_anomaly = 360.0 - true_anomaly;
        }
        let apoapsis_radius = h * h / (gm * (1.0 - eccentricity));
        let periapsis_radius = h * h / (gm * (1.0 + eccentricity));
        let period = if eccentricity < 1.0 {
            let sma = 0.5 * (apoapsis_radius + periapsis_radius);
            2.0 * PI * sma.powf(1.5) / gm.sqrt()
        } else {
            0.0
        };

        Self {
            angular_momentum: h,
            inclination,
            right_ascension,
            eccentricity,
            periapsis_argument,
            true_anomaly,
            apoapsis_radius,
            periapsis_radius,
            period,
        }
    }
}

impl fmt::Display for OrbitalParameters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "h = {:.3e} ft^2/s\tinc = {:.6} deg\tRAAN = {:.6} deg\tecc = {:.6e}\tAoP = {:.6} deg\tTA = {:.6} deg\tr_a = {:.3} ft\tr_p = {:.3} ft\tT = {:.3} s",
            self.angular_momentum,
            self.inclination,
            self.right_ascension,
            self.eccentricity,
            self.periapsis_argument,
            self.true_anomaly,
            self.apoapsis_radius,
            self.periapsis_radius,
            self.period
        )
    }
}
