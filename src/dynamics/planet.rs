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

use crate::cosmic::{
    EarthPosition, Location, EARTH_GM_FT3_S2, EARTH_ROTATION_RATE, EARTH_SEMI_MAJOR_FT,
    EARTH_SEMI_MINOR_FT,
};
use crate::io::ConfigRepr;
use crate::linalg::Vector3;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// The terrain point below a location, as returned by a [GroundCallback].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact {
    /// Point on the terrain
    pub location: Location,
    /// Outward unit normal of the terrain, in the planet fixed frame
    pub normal: Vector3<f64>,
    /// Velocity of the terrain relative to the planet fixed frame (ft/s)
    pub velocity: Vector3<f64>,
    /// Angular velocity of the terrain relative to the planet fixed frame (rad/s)
    pub angular_velocity: Vector3<f64>,
}

/// Provides the terrain below any location.
pub trait GroundCallback: fmt::Debug {
    fn contact(&self, location: &Location) -> Contact;

    /// Sets the elevation of the terrain above the ellipsoid in ft, if supported.
    fn set_terrain_elevation(&mut self, elevation: f64);

    /// Height of the location above the terrain, along the terrain normal, in ft.
    fn agl_level(&self, location: &Location) -> f64 {
        let contact = self.contact(location);
        (location.ecef() - contact.location.ecef()).dot(&contact.normal)
    }
}

/// A terrain at a constant height above the reference ellipsoid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EllipsoidGround {
    /// Terrain elevation in ft
    pub elevation: f64,
}

impl GroundCallback for EllipsoidGround {
    fn contact(&self, location: &Location) -> Contact {
        let contact = Location::from_geodetic(
            location.geodetic_latitude(),
            location.longitude(),
            self.elevation,
            location.semi_major(),
            location.semi_minor(),
        );
        Contact {
            location: contact,
            normal: contact.up(),
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
        }
    }

    fn set_terrain_elevation(&mut self, elevation: f64) {
        self.elevation = elevation;
    }
}

/// Serializable description of a planet, with a constant elevation terrain.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanetConfig {
    /// rad/s
    pub rotation_rate: f64,
    /// ft
    pub semi_major: f64,
    /// ft
    pub semi_minor: f64,
    /// ft^3/s^2
    pub gm: f64,
    /// Initial Earth Position Angle in radians
    #[serde(default)]
    pub angle: f64,
    /// ft
    #[serde(default)]
    pub terrain_elevation: f64,
}

impl ConfigRepr for PlanetConfig {}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            rotation_rate: EARTH_ROTATION_RATE,
            semi_major: EARTH_SEMI_MAJOR_FT,
            semi_minor: EARTH_SEMI_MINOR_FT,
            gm: EARTH_GM_FT3_S2,
            angle: 0.0,
            terrain_elevation: 0.0,
        }
    }
}

/// The planet environment shared by the propagator and the force models.
///
/// The planet owns the [EarthPosition]; the propagator borrows the planet for each step and only ever
/// changes the angle through `set_angle` and `increment_angle`. The caller keeps the planet alive for the
/// whole simulation.
#[derive(Debug)]
pub struct Planet {
    earth_position: EarthPosition,
    semi_major: f64,
    semi_minor: f64,
    gm: f64,
    ground: Box<dyn GroundCallback>,
}

impl Planet {
    pub fn new(
        rotation_rate: f64,
        semi_major: f64,
        semi_minor: f64,
        gm: f64,
        ground: Box<dyn GroundCallback>,
    ) -> Self {
        Self {
            earth_position: EarthPosition::new(rotation_rate),
            semi_major,
            semi_minor,
            gm,
            ground,
        }
    }

    /// WGS84 Earth with a terrain at sea level
    pub fn earth() -> Self {
        Self::from(PlanetConfig::default())
    }

    pub fn earth_position(&self) -> &EarthPosition {
        &self.earth_position
    }

    pub fn earth_position_mut(&mut self) -> &mut EarthPosition {
        &mut self.earth_position
    }

    /// Angular velocity of the planet in rad/s, in the inertial frame
    pub fn omega(&self) -> Vector3<f64> {
        self.earth_position.rotation_axis()
    }

    pub fn gm(&self) -> f64 {
        self.gm
    }

    pub fn semi_major(&self) -> f64 {
        self.semi_major
    }

    pub fn semi_minor(&self) -> f64 {
        self.semi_minor
    }

    /// Builds a location on this planet's ellipsoid from planet fixed coordinates in ft.
    pub fn location(&self, ecef: Vector3<f64>) -> Location {
        Location::new(ecef, self.semi_major, self.semi_minor)
    }

    /// Builds a location from its geodetic coordinates on this planet's ellipsoid.
    pub fn location_geodetic(&self, latitude: f64, longitude: f64, height: f64) -> Location {
        Location::from_geodetic(
            latitude,
            longitude,
            height,
            self.semi_major,
            self.semi_minor,
        )
    }

    pub fn contact(&self, location: &Location) -> Contact {
        self.ground.contact(location)
    }

    /// Height of the location above the terrain in ft
    pub fn altitude_agl(&self, location: &Location) -> f64 {
        self.ground.agl_level(location)
    }

    /// Moves the location vertically so that it is `agl` ft above the terrain.
    pub fn set_altitude_agl(&self, location: &mut Location, agl: f64) {
        let contact = self.ground.contact(location);
        let elevation = contact.location.geodetic_altitude();
        location.set_position_geodetic(
            location.geodetic_latitude(),
            location.longitude(),
            elevation + agl,
        );
    }

    /// Elevation of the terrain below the location above the ellipsoid, in ft
    pub fn terrain_elevation(&self, location: &Location) -> f64 {
        self.ground.contact(location).location.geodetic_altitude()
    }

    pub fn set_terrain_elevation(&mut self, elevation: f64) {
        self.ground.set_terrain_elevation(elevation);
    }
}

impl From<PlanetConfig> for Planet {
    fn from(cfg: PlanetConfig) -> Self {
        let mut me = Self::new(
            cfg.rotation_rate,
            cfg.semi_major,
            cfg.semi_minor,
            cfg.gm,
            Box::new(EllipsoidGround {
                elevation: cfg.terrain_elevation,
            }),
        );
        me.earth_position.set_angle(cfg.angle);
        me
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "planet a = {} ft, b = {} ft, GM = {:e} ft^3/s^2, {}",
            self.semi_major, self.semi_minor, self.gm, self.earth_position
        )
    }
}
