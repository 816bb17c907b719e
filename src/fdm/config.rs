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

use crate::dynamics::{DerivativeInputs, Planet, PlanetConfig};
use crate::errors::{ConfigSnafu, FdmError, IntegrationSnafu};
use crate::io::{ConfigError, ConfigRepr, InvalidConfigSnafu};
use crate::propagators::IntegratorOpts;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;
use std::path::Path;

use super::{InitialCondition, Propagate};

/// A complete propagation setup: the planet, the integration methods, the initial conditions and the time step.
///
/// ```yaml
/// step_size: 0.01
/// integrators:
///   translational_position: AdamsBashforth3
/// initial_condition:
///   latitude: 45.0
///   altitude: 10000.0
///   velocity:
///     body: [500.0, 0.0, 0.0]
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Time step of each call to `run`, in seconds
    pub step_size: f64,
    pub integrators: IntegratorOpts,
    pub initial_condition: InitialCondition,
    pub planet: PlanetConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            step_size: 1.0 / 120.0,
            integrators: IntegratorOpts::default(),
            initial_condition: InitialCondition::default(),
            planet: PlanetConfig::default(),
        }
    }
}

impl ConfigRepr for RunConfig {}

impl RunConfig {
    /// Loads and validates a run configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FdmError> {
        let cfg = Self::load(path).context(ConfigSnafu)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parses and validates a run configuration from a YAML string.
    pub fn from_yaml(data: &str) -> Result<Self, FdmError> {
        let cfg = Self::loads(data).context(ConfigSnafu)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), FdmError> {
        self.check_ranges().context(ConfigSnafu)?;
        self.integrators.validate().context(IntegrationSnafu)
    }

    fn check_ranges(&self) -> Result<(), ConfigError> {
        ensure!(
            self.step_size.is_finite() && self.step_size > 0.0,
            InvalidConfigSnafu {
                msg: format!("step size must be positive, got {}", self.step_size)
            }
        );
        ensure!(
            self.planet.semi_minor > 0.0 && self.planet.semi_minor <= self.planet.semi_major,
            InvalidConfigSnafu {
                msg: format!(
                    "invalid ellipsoid: semi major {} ft, semi minor {} ft",
                    self.planet.semi_major, self.planet.semi_minor
                )
            }
        );
        Ok(())
    }

    /// Builds the planet and a propagator initialized at the initial conditions.
    pub fn build(&self, inputs: &DerivativeInputs) -> Result<(Propagate, Planet), FdmError> {
        let mut planet = Planet::from(self.planet);
        let mut prop = Propagate::new(self.integrators, &planet).context(IntegrationSnafu)?;
        prop.set_initial_state(&self.initial_condition, inputs, &mut planet);
        info!("propagator initialized with {}", self.integrators);
        Ok((prop, planet))
    }
}

impl fmt::Display for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "step of {} s with {} from {}",
            self.step_size, self.integrators, self.initial_condition
        )
    }
}
