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

use super::{AccelModel, DerivativeInputs, Dynamics, Planet};
use crate::fdm::VehicleState;
use crate::linalg::Vector3;
use std::fmt;
use std::sync::Arc;

/// `FlightDynamics` provides the translational derivative inputs of a vehicle in free flight: the point mass
/// gravity of the planet plus any number of acceleration models. No angular acceleration is produced.
#[derive(Clone, Default)]
pub struct FlightDynamics {
    pub accel_models: Vec<Arc<dyn AccelModel + Sync>>,
}

impl FlightDynamics {
    /// Initializes flight dynamics subject only to the planet's point mass gravity.
    pub fn two_body() -> Self {
        Self::new(vec![])
    }

    /// Initialize flight dynamics with a list of acceleration models
    pub fn new(accel_models: Vec<Arc<dyn AccelModel + Sync>>) -> Self {
        Self { accel_models }
    }

    /// Add a model to the currently defined dynamics
    pub fn add_model(&mut self, accel_model: Arc<dyn AccelModel + Sync>) {
        self.accel_models.push(accel_model);
    }
}

impl Dynamics for FlightDynamics {
    fn eom(&self, state: &VehicleState, planet: &Planet) -> DerivativeInputs {
        let mut acceleration = point_mass_gravity(&state.inertial_position, planet.gm());
        for model in &self.accel_models {
            acceleration += model.eom(state, planet);
        }
        DerivativeInputs::from_acceleration(acceleration)
    }
}

impl fmt::Display for FlightDynamics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<String> = self.accel_models.iter().map(|m| format!("{m}")).collect();
        write!(f, "two body dynamics with [{}]", names.join("; "))
    }
}

/// Gravitational acceleration of a point mass of parameter `gm` at `position`.
///
/// Returns zero at the center of the body.
pub fn point_mass_gravity(position: &Vector3<f64>, gm: f64) -> Vector3<f64> {
    let rmag = position.norm();
    if rmag > 0.0 {
        position * (-gm / rmag.powi(3))
    } else {
        Vector3::zeros()
    }
}

/// A constant acceleration in the inertial frame, e.g. a simplified thrust.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConstantAccel(pub Vector3<f64>);

impl AccelModel for ConstantAccel {
    fn eom(&self, _state: &VehicleState, _planet: &Planet) -> Vector3<f64> {
        self.0
    }
}

impl fmt::Display for ConstantAccel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "constant acceleration [{}, {}, {}] ft/s^2",
            self.0.x, self.0.y, self.0.z
        )
    }
}

#[test]
fn test_point_mass() {
    use approx::relative_eq;
    let gm = crate::cosmic::EARTH_GM_FT3_S2;
    let r = crate::cosmic::EARTH_SEMI_MAJOR_FT;
    let accel = point_mass_gravity(&Vector3::new(0.0, r, 0.0), gm);
    // About one g at the equator
    assert!(relative_eq!(accel.y, -32.15, max_relative = 1e-3));
    assert_eq!(point_mass_gravity(&Vector3::zeros(), gm), Vector3::zeros());
}
