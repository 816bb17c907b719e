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

use crate::cosmic::EarthPosition;
use crate::dynamics::DerivativeInputs;
use crate::linalg::{UnitQuaternion, Vector3};
use crate::propagators::{
    IntegratedQuantity, IntegrationError, IntegrationMethod, IntegratorOpts,
    MultiStepIntegrator, QuaternionIntegrator, Tentative,
};

use super::VehicleState;

/// The four integrators of the equations of motion.
#[derive(Clone, Debug)]
pub struct Integrators {
    rotational_rate: MultiStepIntegrator<Vector3<f64>>,
    translational_rate: MultiStepIntegrator<Vector3<f64>>,
    rotational_position: QuaternionIntegrator,
    translational_position: MultiStepIntegrator<Vector3<f64>>,
}

impl Integrators {
    pub fn new(opts: &IntegratorOpts) -> Result<Self, IntegrationError> {
        opts.validate()?;
        Ok(Self {
            rotational_rate: MultiStepIntegrator::new(
                IntegratedQuantity::RotationalRate,
                opts.rotational_rate,
            )?,
            translational_rate: MultiStepIntegrator::new(
                IntegratedQuantity::TranslationalRate,
                opts.translational_rate,
            )?,
            rotational_position: QuaternionIntegrator::new(opts.rotational_position),
            translational_position: MultiStepIntegrator::new(
                IntegratedQuantity::TranslationalPosition,
                opts.translational_position,
            )?,
        })
    }

    pub fn set_method(
        &mut self,
        quantity: IntegratedQuantity,
        method: IntegrationMethod,
    ) -> Result<(), IntegrationError> {
        match quantity {
            IntegratedQuantity::RotationalRate => self.rotational_rate.set_method(method),
            IntegratedQuantity::TranslationalRate => self.translational_rate.set_method(method),
            IntegratedQuantity::RotationalPosition => self.rotational_position.set_method(method),
            IntegratedQuantity::TranslationalPosition => {
                self.translational_position.set_method(method)
            }
        }
    }

    pub fn method(&self, quantity: IntegratedQuantity) -> IntegrationMethod {
        match quantity {
            IntegratedQuantity::RotationalRate => self.rotational_rate.method(),
            IntegratedQuantity::TranslationalRate => self.translational_rate.method(),
            IntegratedQuantity::RotationalPosition => self.rotational_position.method(),
            IntegratedQuantity::TranslationalPosition => self.translational_position.method(),
        }
    }

    /// The methods currently in use
    pub fn opts(&self) -> IntegratorOpts {
        IntegratorOpts {
            rotational_rate: self.rotational_rate.method(),
            translational_rate: self.translational_rate.method(),
            rotational_position: self.rotational_position.method(),
            translational_position: self.translational_position.method(),
        }
    }

    /// Returns whether any integrator will report an incomplete step on the next call.
    pub fn is_bootstrapping(&self) -> bool {
        self.rotational_rate.is_bootstrapping()
            || self.translational_rate.is_bootstrapping()
            || self.rotational_position.is_bootstrapping()
            || self.translational_position.is_bootstrapping()
    }

    /// Sets the current values from the state and fills the derivative histories with the current derivatives.
    pub fn reseed(&mut self, state: &VehicleState, inputs: &DerivativeInputs) {
        debug!("reseeding integrators: {state}");
        self.rotational_rate.set_initial_condition(state.pqri);
        self.rotational_rate.set_initial_derivative(inputs.pqri_dot);
        self.translational_rate
            .set_initial_condition(state.inertial_velocity);
        self.translational_rate
            .set_initial_derivative(inputs.uvwi_dot);
        self.rotational_position
            .set_initial_condition(state.attitude_eci);
        self.rotational_position
            .set_initial_derivative(state.qtrndot);
        self.translational_position
            .set_initial_condition(state.inertial_position);
        self.translational_position
            .set_initial_derivative(state.inertial_velocity);
    }

    /// Sets the current value of an integrator without touching its history, e.g. after the vehicle was moved.
    pub(crate) fn sync_rotational_rate(&mut self, pqri: Vector3<f64>) {
        self.rotational_rate.set_initial_condition(pqri);
    }

    pub(crate) fn sync_translational_rate(&mut self, inertial_velocity: Vector3<f64>) {
        self.translational_rate
            .set_initial_condition(inertial_velocity);
    }

    pub(crate) fn sync_rotational_position(&mut self, attitude_eci: UnitQuaternion<f64>) {
        self.rotational_position.set_initial_condition(attitude_eci);
    }

    pub(crate) fn sync_translational_position(&mut self, inertial_position: Vector3<f64>) {
        self.translational_position
            .set_initial_condition(inertial_position);
    }

    /// Integrates all quantities over `dt` from the derivatives of the state at the start of the step.
    pub fn stage(
        &mut self,
        dt: f64,
        state: &VehicleState,
        inputs: &DerivativeInputs,
    ) -> StagedStep {
        self.rotational_rate.set_step_size(dt);
        self.translational_rate.set_step_size(dt);
        self.rotational_position.set_step_size(dt);
        self.translational_position.set_step_size(dt);

        StagedStep {
            pqri: self.rotational_rate.integrate(inputs.pqri_dot),
            inertial_velocity: self.translational_rate.integrate(inputs.uvwi_dot),
            attitude_eci: self
                .rotational_position
                .integrate(&state.pqri, &inputs.pqri_dot),
            inertial_position: self
                .translational_position
                .integrate(state.inertial_velocity),
            dt,
        }
    }

    fn commit(&mut self) {
        self.rotational_rate.commit();
        self.translational_rate.commit();
        self.rotational_position.commit();
        self.translational_position.commit();
    }
}

/// The tentative results of one step of the four integrators.
///
/// The step is committed as a whole: either every integrator commits its increment and the Earth Position
/// Angle advances by the step, or none of this happens because an integrator is still bootstrapping.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StagedStep {
    pub pqri: Tentative<Vector3<f64>>,
    pub inertial_velocity: Tentative<Vector3<f64>>,
    pub attitude_eci: Tentative<UnitQuaternion<f64>>,
    pub inertial_position: Tentative<Vector3<f64>>,
    dt: f64,
}

impl StagedStep {
    pub fn is_complete(&self) -> bool {
        self.pqri.complete
            && self.inertial_velocity.complete
            && self.attitude_eci.complete
            && self.inertial_position.complete
    }

    /// Copies the tentative values into the state.
    pub fn apply(&self, state: &mut VehicleState) {
        state.pqri = self.pqri.value;
        state.inertial_velocity = self.inertial_velocity.value;
        state.attitude_eci = self.attitude_eci.value;
        state.inertial_position = self.inertial_position.value;
    }

    /// Commits the integrators and advances the Earth Position Angle if the step is complete.
    /// Returns whether the step was committed. The angle never moves backwards on a non-positive step.
    pub fn commit(self, integrators: &mut Integrators, earth: &mut EarthPosition) -> bool {
        if self.is_complete() {
            integrators.commit();
            if self.dt > 0.0 {
                earth.increment_angle(self.dt);
            }
            true
        } else {
            trace!("integrators bootstrapping, step of {} s not committed", self.dt);
            false
        }
    }
}
