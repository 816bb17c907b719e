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

mod state;
pub use self::state::VehicleState;

mod transforms;
pub use self::transforms::Transforms;

mod ic;
pub use self::ic::{InitialCondition, InitialVelocity};

mod integrators;
pub use self::integrators::{Integrators, StagedStep};

mod orbital;
pub use self::orbital::OrbitalParameters;

mod propagate;
pub use self::propagate::Propagate;

mod config;
pub use self::config::RunConfig;
