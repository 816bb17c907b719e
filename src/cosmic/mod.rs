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

/// Tracking of the rotation of the planet with respect to the inertial frame.
mod earth;
pub use self::earth::*;

/// Planet fixed positions on a reference ellipsoid and their local frame.
mod location;
pub use self::location::*;

/// Elementary rotations, Euler angle sequences and orientation conversions.
pub mod rotations;

/// Earth rotation rate in rad/s
pub const EARTH_ROTATION_RATE: f64 = 7.292115e-5;
/// WGS84 semi-major axis in ft
pub const EARTH_SEMI_MAJOR_FT: f64 = 20_925_646.325_46;
/// WGS84 semi-minor axis in ft
pub const EARTH_SEMI_MINOR_FT: f64 = 20_855_486.595_1;
/// Earth gravitational parameter in ft^3/s^2
pub const EARTH_GM_FT3_S2: f64 = 1.407_644_3e16;

pub const FT_TO_KM: f64 = 0.000_304_8;
pub const KM_TO_FT: f64 = 3_280.839_9;
pub const FT_TO_M: f64 = 0.304_8;
pub const M_TO_FT: f64 = 1.0 / FT_TO_M;
