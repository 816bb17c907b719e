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

use crate::linalg::{Quaternion, UnitQuaternion, Vector3};

use super::{
    IntegratedQuantity, IntegrationError, IntegrationMethod, MultiStepIntegrator, Tentative,
};

/// Below this squared angular rate (rad²/s²), the local linearization uses a fixed rate magnitude.
const LOCAL_LINEARIZATION_MIN_RATE_SQ: f64 = 1e-6;

/// Exponential of the pure quaternion (0, `v`).
///
/// Returns `(cos |v|, sin |v| · v / |v|)`, which reduces to the identity quaternion as `|v|` goes to zero.
pub fn qexp(v: &Vector3<f64>) -> Quaternion<f64> {
    let angle = v.norm();
    // sin(a)/a -> 1 as a -> 0
    let sinc = if angle > f64::EPSILON {
        angle.sin() / angle
    } else {
        1.0
    };
    Quaternion::from_parts(angle.cos(), v * sinc)
}

/// Time derivative of the body to inertial quaternion `q` given the body rates relative to the inertial frame.
pub fn quaternion_rate(q: &UnitQuaternion<f64>, omega: &Vector3<f64>) -> Quaternion<f64> {
    q.quaternion() * Quaternion::from_imag(*omega) * 0.5
}

/// Integrates the attitude quaternion from the body rates relative to the inertial frame.
///
/// Besides the multi-step methods, this integrator supports the one-pass closed forms `Buss1`,
/// `Buss2` and `LocalLinearization`. Every returned and committed quaternion is normalized.
#[derive(Clone, Debug)]
pub struct QuaternionIntegrator {
    multistep: MultiStepIntegrator<Quaternion<f64>>,
    /// Pending rotation of the one-pass methods
    dq: Quaternion<f64>,
}

impl QuaternionIntegrator {
    pub fn new(method: IntegrationMethod) -> Self {
        let mut multistep = MultiStepIntegrator::unchecked(IntegratedQuantity::RotationalPosition);
        multistep.set_method_unchecked(method);
        multistep.set_initial_condition(*UnitQuaternion::identity().quaternion());
        Self {
            multistep,
            dq: Quaternion::identity(),
        }
    }

    /// Selects the integration method, any method applies to the attitude.
    pub fn set_method(&mut self, method: IntegrationMethod) -> Result<(), IntegrationError> {
        self.multistep.set_method_unchecked(method);
        Ok(())
    }

    pub fn method(&self) -> IntegrationMethod {
        self.multistep.method()
    }

    pub fn set_step_size(&mut self, step_size: f64) {
        self.multistep.set_step_size(step_size);
    }

    pub fn step_size(&self) -> f64 {
        self.multistep.step_size()
    }

    pub fn set_initial_condition(&mut self, q: UnitQuaternion<f64>) {
        self.multistep.set_initial_condition(*q.quaternion());
        self.dq = Quaternion::identity();
    }

    /// Seeds the derivative history with the quaternion rate `qdot`.
    pub fn set_initial_derivative(&mut self, qdot: Quaternion<f64>) {
        self.multistep.set_initial_derivative(qdot);
    }

    /// The committed attitude
    pub fn value(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::new_normalize(self.multistep.value())
    }

    pub fn is_bootstrapping(&self) -> bool {
        self.multistep.is_bootstrapping()
    }

    /// Computes the attitude at the end of the step from the body rates `omega` (rad/s) relative to the
    /// inertial frame and their time derivative `omega_dot` (rad/s²).
    pub fn integrate(
        &mut self,
        omega: &Vector3<f64>,
        omega_dot: &Vector3<f64>,
    ) -> Tentative<UnitQuaternion<f64>> {
        let q0 = self.value();
        let qdot = quaternion_rate(&q0, omega);
        let method = self.multistep.method();

        if !method.is_one_pass() {
            let tentative = self.multistep.integrate(qdot);
            return Tentative {
                value: UnitQuaternion::new_normalize(tentative.value),
                complete: tentative.complete,
            };
        }

        // Keep the history current in case a multi-step method is selected later on
        self.multistep.record(qdot);

        let dt = self.multistep.step_size();
        self.dq = if dt <= 0.0 {
            Quaternion::identity()
        } else {
            match method {
                IntegrationMethod::Buss1 => qexp(&(omega * (0.5 * dt))),
                IntegrationMethod::Buss2 => {
                    let half_wdot = omega_dot * (0.5 * dt);
                    let augmented = omega + half_wdot + half_wdot.cross(omega) * (dt / 6.0);
                    qexp(&(augmented * (0.5 * dt)))
                }
                _ => local_linearization(omega, omega_dot, dt),
            }
        };

        Tentative::complete(UnitQuaternion::new_normalize(q0.quaternion() * self.dq))
    }

    /// Applies the pending rotation to the attitude and normalizes it.
    pub fn commit(&mut self) {
        if self.multistep.method().is_one_pass() {
            let q = self.multistep.value() * self.dq;
            self.multistep.set_initial_condition(q.normalize());
            self.dq = Quaternion::identity();
        } else {
            self.multistep.commit();
            let q = self.multistep.value().normalize();
            self.multistep.set_initial_condition(q);
        }
    }
}

/// Rotation over `dt` of the local linearization method, for a linearly varying angular rate.
fn local_linearization(
    omega: &Vector3<f64>,
    omega_dot: &Vector3<f64>,
    dt: f64,
) -> Quaternion<f64> {
    let wi = omega * 0.5;
    let wdoti = omega_dot * 0.5;
    let omega_sq = omega.norm_squared();
    let omega_k = if omega_sq > LOCAL_LINEARIZATION_MIN_RATE_SQ {
        omega_sq.sqrt()
    } else {
        1e-6
    };
    let rho = 0.5 * dt * omega_k;
    let c1 = rho.cos();
    let c2 = 2.0 * rho.sin() / omega_k;
    let c3 = 4.0 * (1.0 - c1) / (omega_k * omega_k);
    let c4 = 4.0 * (dt - c2) / (omega_k * omega_k);

    Quaternion::from_parts(
        c1 - c4 * wi.dot(&wdoti),
        wi * c2 + wdoti * c3 + wi.cross(&wdoti) * c4,
    )
}
