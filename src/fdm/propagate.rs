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

use crate::cosmic::rotations::{dcm_to_orientation, euler_angles};
use crate::cosmic::{Location, FT_TO_KM, FT_TO_M, KM_TO_FT, M_TO_FT};
use crate::dynamics::{DerivativeInputs, Dynamics, Planet};
use crate::linalg::{Quaternion, UnitQuaternion, Vector3};
use crate::utils::tilde_matrix;
use crate::propagators::{
    quaternion_rate, IntegratedQuantity, IntegrationError, IntegrationMethod, IntegratorOpts,
};
use std::convert::TryFrom;
use std::fmt;

use super::{InitialCondition, Integrators, OrbitalParameters, Transforms, VehicleState};

/// Propagates the state of a rigid body in the rotating frame of a planet.
///
/// On each call to `run`, the angular rates, the inertial velocity, the attitude and the inertial position are
/// integrated from the derivative inputs, then every frame transform is rebuilt in a fixed order so that the
/// state exposed by the getters is always consistent:
/// 1. the inertial to planet fixed pair, from the Earth Position Angle;
/// 2. the planet fixed location, from the inertial position;
/// 3. the local frame transforms, from the location;
/// 4. the body frame transforms, from the attitude;
/// 5. the body velocity and rates relative to the planet, the attitude derivative, the local attitude and the
///    local velocity.
///
/// The planet is borrowed for the duration of each call, the propagator never stores it.
#[derive(Clone, Debug)]
pub struct Propagate {
    state: VehicleState,
    transforms: Transforms,
    integrators: Integrators,
    /// Velocity relative to the planet in the local (North-East-Down) frame
    vel: Vector3<f64>,
    /// Derivative inputs of the latest step, used to reseed the histories
    inputs: DerivativeInputs,
    epa: f64,
    terrain_velocity: Vector3<f64>,
    terrain_angular_velocity: Vector3<f64>,
    sim_time: f64,
    suspended: bool,
}

impl Propagate {
    /// Initializes a propagator with the provided integration methods, for a vehicle at rest at sea level on the
    /// equator and the prime meridian of the planet.
    pub fn new(opts: IntegratorOpts, planet: &Planet) -> Result<Self, IntegrationError> {
        let mut me = Self {
            state: VehicleState::at(planet.location_geodetic(0.0, 0.0, 0.0)),
            transforms: Transforms::default(),
            integrators: Integrators::new(&opts)?,
            vel: Vector3::zeros(),
            inputs: DerivativeInputs::default(),
            epa: 0.0,
            terrain_velocity: Vector3::zeros(),
            terrain_angular_velocity: Vector3::zeros(),
            sim_time: 0.0,
            suspended: false,
        };
        me.update_vehicle_state(planet);
        me.state.pqri = me.transforms.ti2b() * planet.omega();
        me.state.qtrndot = quaternion_rate(&me.state.attitude_eci, &me.state.pqri);
        me.integrators.reseed(&me.state, &me.inputs);
        Ok(me)
    }

    /// Advances the state by `dt` seconds given the derivative inputs. Returns whether the step was committed,
    /// which is not the case while a multi-step method is bootstrapping or when the integration is suspended.
    /// A step that is not strictly positive holds the state, the simulation time and the Earth Position Angle.
    ///
    /// The Earth Position Angle of the planet is advanced by `dt` only when the step is committed.
    pub fn run(&mut self, dt: f64, inputs: &DerivativeInputs, planet: &mut Planet) -> bool {
        self.inputs = *inputs;
        let committed = if self.suspended {
            false
        } else if dt <= 0.0 || !dt.is_finite() {
            debug!("step of {dt} s ignored, state held");
            false
        } else {
            self.sim_time += dt;
            let staged = self.integrators.stage(dt, &self.state, inputs);
            staged.apply(&mut self.state);
            staged.commit(&mut self.integrators, planet.earth_position_mut())
        };

        self.update_frames(planet);
        committed
    }

    /// Computes the derivative inputs from the provided dynamics and runs one step.
    pub fn step<D: Dynamics + ?Sized>(
        &mut self,
        dt: f64,
        dynamics: &D,
        planet: &mut Planet,
    ) -> bool {
        let inputs = dynamics.eom(&self.state, planet);
        self.run(dt, &inputs, planet)
    }

    /// Rebuilds the transforms and the derived state after the integrated quantities changed.
    fn update_frames(&mut self, planet: &Planet) {
        let omega = planet.omega();
        self.epa = planet.earth_position().angle();
        self.transforms.update_earth(planet.earth_position());
        self.state.location = planet.location(self.transforms.ti2ec() * self.state.inertial_position);
        self.transforms.update_location(&self.state.location);
        self.transforms.update_body(&self.state.attitude_eci);

        self.state.uvw = self.transforms.ti2b()
            * (self.state.inertial_velocity - self.transport_velocity(planet));
        self.recompute_terrain_velocity(planet);
        self.state.pqr = self.state.pqri - self.transforms.ti2b() * omega;
        self.state.qtrndot = quaternion_rate(&self.state.attitude_eci, &self.state.pqri);
        self.state.attitude_local = dcm_to_orientation(self.transforms.tb2l());
        self.vel = self.transforms.tb2l() * self.state.uvw;
    }

    /// Rebuilds the inertial position and the transforms after the location changed, keeping the inertial
    /// attitude and the body velocity relative to the planet.
    fn update_vehicle_state(&mut self, planet: &Planet) {
        self.epa = planet.earth_position().angle();
        self.transforms.update_earth(planet.earth_position());
        self.recompute_terrain_velocity(planet);
        self.state.inertial_position = self.transforms.tec2i() * self.state.location.ecef();
        self.transforms.update_location(&self.state.location);
        self.transforms.update_body(&self.state.attitude_eci);
        self.state.inertial_velocity =
            self.transforms.tb2i() * self.state.uvw + self.transport_velocity(planet);
        self.vel = self.transforms.tb2l() * self.state.uvw;
        self.state.attitude_local = dcm_to_orientation(self.transforms.tb2l());

        self.integrators
            .sync_translational_position(self.state.inertial_position);
        self.integrators
            .sync_translational_rate(self.state.inertial_velocity);
    }

    /// Velocity of the planet fixed frame at the vehicle position, in inertial axes
    fn transport_velocity(&self, planet: &Planet) -> Vector3<f64> {
        tilde_matrix(&planet.omega()) * self.state.inertial_position
    }

    fn recompute_terrain_velocity(&mut self, planet: &Planet) {
        let contact = planet.contact(&self.state.location);
        self.terrain_velocity = contact.velocity;
        self.terrain_angular_velocity = contact.angular_velocity;
    }

    /// Initializes the whole state and the Earth Position Angle from the initial conditions, and reseeds the
    /// integrators with the provided derivative inputs.
    pub fn set_initial_state(
        &mut self,
        ic: &InitialCondition,
        inputs: &DerivativeInputs,
        planet: &mut Planet,
    ) {
        planet
            .earth_position_mut()
            .set_angle(ic.earth_position_angle());
        let omega = planet.omega();
        self.epa = planet.earth_position().angle();
        self.transforms.update_earth(planet.earth_position());

        self.state.location = ic.position(planet);
        self.state.inertial_position = self.transforms.tec2i() * self.state.location.ecef();
        self.transforms.update_location(&self.state.location);

        self.state.attitude_local = ic.orientation();
        self.state.attitude_eci =
            dcm_to_orientation(self.transforms.tl2i()) * self.state.attitude_local;
        self.transforms.update_body(&self.state.attitude_eci);

        self.state.uvw = ic.uvw(self.transforms.tl2b());
        self.vel = self.transforms.tb2l() * self.state.uvw;
        self.recompute_terrain_velocity(planet);

        self.state.pqr = ic.pqr();
        self.state.pqri = self.state.pqr + self.transforms.ti2b() * omega;
        self.state.inertial_velocity =
            self.transforms.tb2i() * self.state.uvw + self.transport_velocity(planet);
        self.state.qtrndot = quaternion_rate(&self.state.attitude_eci, &self.state.pqri);

        self.inputs = *inputs;
        self.integrators.reseed(&self.state, inputs);
        debug!("initial state set from {ic}");
    }

    /// Sets the location, attitude, body velocity and body rates from a full vehicle state, and reseeds the
    /// integrators. The inertial position and velocity are derived from these.
    pub fn set_v_state(
        &mut self,
        vstate: &VehicleState,
        inputs: &DerivativeInputs,
        planet: &Planet,
    ) {
        let omega = planet.omega();
        self.epa = planet.earth_position().angle();
        self.transforms.update_earth(planet.earth_position());

        self.state.location = vstate.location;
        self.state.inertial_position = self.transforms.tec2i() * self.state.location.ecef();
        self.transforms.update_location(&self.state.location);

        self.state.attitude_eci = UnitQuaternion::new_normalize(vstate.attitude_eci.into_inner());
        self.transforms.update_body(&self.state.attitude_eci);
        self.state.attitude_local = dcm_to_orientation(self.transforms.tb2l());
        self.recompute_terrain_velocity(planet);

        self.state.uvw = vstate.uvw;
        self.vel = self.transforms.tb2l() * self.state.uvw;
        self.state.pqr = vstate.pqr;
        self.state.pqri = self.state.pqr + self.transforms.ti2b() * omega;
        self.state.inertial_velocity =
            self.transforms.tb2i() * self.state.uvw + self.transport_velocity(planet);
        self.state.qtrndot = quaternion_rate(&self.state.attitude_eci, &self.state.pqri);

        self.inputs = *inputs;
        self.integrators.reseed(&self.state, inputs);
    }

    /// Holds the vehicle on the ground: zeroes the body velocity and rates relative to the planet and reseeds the
    /// derivative histories.
    pub fn set_hold_down(&mut self, hold: bool, planet: &Planet) {
        if hold {
            let omega = planet.omega();
            self.state.uvw = Vector3::zeros();
            self.state.inertial_velocity = self.transport_velocity(planet);
            self.state.pqr = Vector3::zeros();
            self.state.pqri = self.transforms.ti2b() * omega;
            self.state.qtrndot = quaternion_rate(&self.state.attitude_eci, &self.state.pqri);
            self.vel = Vector3::zeros();
            self.integrators.reseed(&self.state, &self.inputs);
            debug!("vehicle held down at {:e}", self.state.location);
        }
    }

    /// Moves the vehicle to the provided location.
    pub fn set_location(&mut self, location: Location, planet: &Planet) {
        self.state.location = location;
        self.update_vehicle_state(planet);
    }

    /// Sets the altitude above sea level in ft, along the radial direction.
    pub fn set_altitude_asl(&mut self, altitude: f64, planet: &Planet) {
        let sea_level_radius = self.state.location.sea_level_radius();
        self.state.location.set_radius(sea_level_radius + altitude);
        self.update_vehicle_state(planet);
    }

    pub fn set_altitude_asl_m(&mut self, altitude: f64, planet: &Planet) {
        self.set_altitude_asl(altitude * M_TO_FT, planet);
    }

    /// Sets the height above the terrain in ft.
    pub fn set_distance_agl(&mut self, agl: f64, planet: &Planet) {
        planet.set_altitude_agl(&mut self.state.location, agl);
        self.update_vehicle_state(planet);
    }

    pub fn set_distance_agl_km(&mut self, agl: f64, planet: &Planet) {
        self.set_distance_agl(agl * KM_TO_FT, planet);
    }

    /// Sets the geocentric latitude in radians.
    pub fn set_latitude(&mut self, latitude: f64, planet: &Planet) {
        self.state.location.set_latitude(latitude);
        self.update_vehicle_state(planet);
    }

    pub fn set_latitude_deg(&mut self, latitude: f64, planet: &Planet) {
        self.set_latitude(latitude.to_radians(), planet);
    }

    /// Sets the longitude in radians.
    pub fn set_longitude(&mut self, longitude: f64, planet: &Planet) {
        self.state.location.set_longitude(longitude);
        self.update_vehicle_state(planet);
    }

    pub fn set_longitude_deg(&mut self, longitude: f64, planet: &Planet) {
        self.set_longitude(longitude.to_radians(), planet);
    }

    /// Sets the attitude with respect to the inertial frame, keeping the inertial velocity and the inertial body
    /// rates.
    pub fn set_inertial_orientation(&mut self, attitude: UnitQuaternion<f64>, planet: &Planet) {
        let omega = planet.omega();
        self.state.attitude_eci = UnitQuaternion::new_normalize(attitude.into_inner());
        self.transforms.update_body(&self.state.attitude_eci);
        self.state.attitude_local = dcm_to_orientation(self.transforms.tb2l());
        self.state.qtrndot = quaternion_rate(&self.state.attitude_eci, &self.state.pqri);
        self.state.uvw = self.transforms.ti2b()
            * (self.state.inertial_velocity - self.transport_velocity(planet));
        self.state.pqr = self.state.pqri - self.transforms.ti2b() * omega;
        self.vel = self.transforms.tb2l() * self.state.uvw;
        self.integrators
            .sync_rotational_position(self.state.attitude_eci);
    }

    /// Sets the velocity relative to the inertial frame, in inertial axes (ft/s).
    pub fn set_inertial_velocity(&mut self, velocity: Vector3<f64>, planet: &Planet) {
        self.state.inertial_velocity = velocity;
        self.state.uvw = self.transforms.ti2b()
            * (velocity - self.transport_velocity(planet));
        self.vel = self.transforms.tb2l() * self.state.uvw;
        self.integrators.sync_translational_rate(velocity);
    }

    /// Sets the angular rates relative to the inertial frame, in inertial axes (rad/s).
    pub fn set_inertial_rates(&mut self, rates: Vector3<f64>, planet: &Planet) {
        self.state.pqri = self.transforms.ti2b() * rates;
        self.state.pqr = self.state.pqri - self.transforms.ti2b() * planet.omega();
        self.state.qtrndot = quaternion_rate(&self.state.attitude_eci, &self.state.pqri);
        self.integrators.sync_rotational_rate(self.state.pqri);
    }

    /// Selects the integration method of a quantity from its integer tag.
    pub fn set_integrator(
        &mut self,
        quantity: IntegratedQuantity,
        tag: i32,
    ) -> Result<(), IntegrationError> {
        self.set_integration_method(quantity, IntegrationMethod::try_from(tag)?)
    }

    pub fn set_integration_method(
        &mut self,
        quantity: IntegratedQuantity,
        method: IntegrationMethod,
    ) -> Result<(), IntegrationError> {
        let previous = self.integrators.method(quantity);
        self.integrators.set_method(quantity, method)?;
        if method != previous && method.needs_bootstrap() && self.sim_time > 0.0 {
            warn!("{quantity} switched to {method} mid-run: the next step will not be committed");
        }
        Ok(())
    }

    pub fn integration_method(&self, quantity: IntegratedQuantity) -> IntegrationMethod {
        self.integrators.method(quantity)
    }

    pub fn integrator_opts(&self) -> IntegratorOpts {
        self.integrators.opts()
    }

    /// Stops integrating: subsequent calls to `run` only refresh the transforms.
    pub fn suspend_integration(&mut self) {
        self.suspended = true;
    }

    pub fn resume_integration(&mut self) {
        self.suspended = false;
    }

    pub fn is_integration_suspended(&self) -> bool {
        self.suspended
    }

    /// Sum of the time steps integrated so far, in seconds
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn vstate(&self) -> &VehicleState {
        &self.state
    }

    pub fn transforms(&self) -> &Transforms {
        &self.transforms
    }

    /// Derivative inputs of the latest step
    pub fn inputs(&self) -> &DerivativeInputs {
        &self.inputs
    }

    pub fn location(&self) -> &Location {
        &self.state.location
    }

    pub fn inertial_position(&self) -> &Vector3<f64> {
        &self.state.inertial_position
    }

    /// Distance to the planet center in ft
    pub fn radius(&self) -> f64 {
        self.state.location.radius()
    }

    /// Geocentric latitude in radians
    pub fn latitude(&self) -> f64 {
        self.state.location.latitude()
    }

    pub fn latitude_deg(&self) -> f64 {
        self.state.location.latitude_deg()
    }

    pub fn longitude(&self) -> f64 {
        self.state.location.longitude()
    }

    pub fn longitude_deg(&self) -> f64 {
        self.state.location.longitude_deg()
    }

    pub fn geodetic_latitude(&self) -> f64 {
        self.state.location.geodetic_latitude()
    }

    pub fn geodetic_latitude_deg(&self) -> f64 {
        self.state.location.geodetic_latitude_deg()
    }

    /// Height above the reference ellipsoid in ft
    pub fn geodetic_altitude(&self) -> f64 {
        self.state.location.geodetic_altitude()
    }

    pub fn geodetic_altitude_km(&self) -> f64 {
        self.geodetic_altitude() * FT_TO_KM
    }

    /// Altitude above sea level in ft, along the radial direction
    pub fn altitude_asl(&self) -> f64 {
        self.state.location.radius() - self.state.location.sea_level_radius()
    }

    pub fn altitude_asl_m(&self) -> f64 {
        self.altitude_asl() * FT_TO_M
    }

    /// Height above the terrain in ft
    pub fn distance_agl(&self, planet: &Planet) -> f64 {
        planet.altitude_agl(&self.state.location)
    }

    pub fn distance_agl_km(&self, planet: &Planet) -> f64 {
        self.distance_agl(planet) * FT_TO_KM
    }

    /// Elevation of the terrain below the vehicle above the ellipsoid, in ft
    pub fn terrain_elevation(&self, planet: &Planet) -> f64 {
        planet.terrain_elevation(&self.state.location)
    }

    /// Distance from the planet center to the terrain below the vehicle, in ft
    pub fn local_terrain_radius(&self, planet: &Planet) -> f64 {
        planet.contact(&self.state.location).location.radius()
    }

    /// Velocity of the terrain below the vehicle relative to the planet, in ft/s
    pub fn terrain_velocity(&self) -> &Vector3<f64> {
        &self.terrain_velocity
    }

    pub fn terrain_angular_velocity(&self) -> &Vector3<f64> {
        &self.terrain_angular_velocity
    }

    /// Earth Position Angle in radians, as of the latest update of the transforms
    pub fn earth_position_angle(&self) -> f64 {
        self.epa
    }

    pub fn earth_position_angle_deg(&self) -> f64 {
        self.epa.to_degrees()
    }

    /// Orientation of the body with respect to the inertial frame
    pub fn attitude_eci(&self) -> &UnitQuaternion<f64> {
        &self.state.attitude_eci
    }

    /// Orientation of the body with respect to the local frame
    pub fn attitude_local(&self) -> &UnitQuaternion<f64> {
        &self.state.attitude_local
    }

    /// Quaternion whose rotation matrix is the planet fixed to body transform
    pub fn qec2b(&self) -> &UnitQuaternion<f64> {
        self.transforms.qec2b()
    }

    /// Time derivative of the inertial attitude
    pub fn qtrndot(&self) -> &Quaternion<f64> {
        &self.state.qtrndot
    }

    /// Roll, pitch and heading (φ, θ, ψ) with respect to the local frame, in radians
    pub fn euler(&self) -> Vector3<f64> {
        euler_angles(&self.state.attitude_local)
    }

    pub fn euler_deg(&self) -> Vector3<f64> {
        self.euler().map(f64::to_degrees)
    }

    pub fn cos_euler(&self) -> Vector3<f64> {
        self.euler().map(f64::cos)
    }

    pub fn sin_euler(&self) -> Vector3<f64> {
        self.euler().map(f64::sin)
    }

    /// Velocity relative to the planet in body axes, ft/s
    pub fn uvw(&self) -> &Vector3<f64> {
        &self.state.uvw
    }

    /// Angular rates relative to the planet in body axes, rad/s
    pub fn pqr(&self) -> &Vector3<f64> {
        &self.state.pqr
    }

    /// Angular rates relative to the inertial frame in body axes, rad/s
    pub fn pqri(&self) -> &Vector3<f64> {
        &self.state.pqri
    }

    /// Velocity relative to the inertial frame in inertial axes, ft/s
    pub fn inertial_velocity(&self) -> &Vector3<f64> {
        &self.state.inertial_velocity
    }

    pub fn inertial_velocity_magnitude(&self) -> f64 {
        self.state.inertial_velocity.norm()
    }

    /// Velocity relative to the planet in the local (North-East-Down) frame, ft/s
    pub fn vel(&self) -> &Vector3<f64> {
        &self.vel
    }

    pub fn vel_magnitude(&self) -> f64 {
        self.vel.norm()
    }

    /// Vertical speed, positive up, ft/s
    pub fn hdot(&self) -> f64 {
        -self.vel.z
    }

    /// Velocity relative to the planet in planet fixed axes, ft/s
    pub fn ecef_velocity(&self) -> Vector3<f64> {
        self.transforms.tb2ec() * self.state.uvw
    }

    /// Osculating orbital elements of the vehicle around the planet.
    pub fn orbital_parameters(&self, planet: &Planet) -> OrbitalParameters {
        OrbitalParameters::from_inertial(
            &self.state.inertial_position,
            &self.state.inertial_velocity,
            planet.gm(),
        )
    }

    /// Logs the state report at the info level.
    pub fn dump_state(&self) {
        info!("{self}");
    }
}

fn fmt_vec(v: &Vector3<f64>) -> String {
    format!("{:.6}, {:.6}, {:.6}", v.x, v.y, v.z)
}

impl fmt::Display for Propagate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let euler_eci = euler_angles(&self.state.attitude_eci).map(f64::to_degrees);
        writeln!(f)?;
        writeln!(
            f,
            "------------------------------------------------------------------"
        )?;
        writeln!(f, "State Report at sim time: {:.6} seconds", self.sim_time)?;
        writeln!(f, "  Position")?;
        writeln!(
            f,
            "    ECI:   {} (x,y,z, in ft)",
            fmt_vec(&self.state.inertial_position)
        )?;
        writeln!(
            f,
            "    ECEF:  {} (x,y,z, in ft)",
            fmt_vec(self.state.location.ecef())
        )?;
        writeln!(
            f,
            "    Local: {:.6}, {:.6}, {:.6} (geodetic lat, lon, alt ASL in deg and ft)",
            self.geodetic_latitude_deg(),
            self.longitude_deg(),
            self.altitude_asl()
        )?;
        writeln!(f)?;
        writeln!(f, "  Orientation")?;
        writeln!(f, "    ECI:   {} (phi, theta, psi in deg)", fmt_vec(&euler_eci))?;
        writeln!(
            f,
            "    Local: {} (phi, theta, psi in deg)",
            fmt_vec(&self.euler_deg())
        )?;
        writeln!(f)?;
        writeln!(f, "  Velocity")?;
        writeln!(
            f,
            "    ECI:   {} (x,y,z in ft/s)",
            fmt_vec(&self.state.inertial_velocity)
        )?;
        writeln!(
            f,
            "    ECEF:  {} (x,y,z in ft/s)",
            fmt_vec(&self.ecef_velocity())
        )?;
        writeln!(f, "    Local: {} (n,e,d in ft/sec)", fmt_vec(&self.vel))?;
        writeln!(f, "    Body:  {} (u,v,w in ft/sec)", fmt_vec(&self.state.uvw))?;
        writeln!(f)?;
        writeln!(
            f,
            "  Body Rates (relative to given frame, expressed in body frame)"
        )?;
        writeln!(
            f,
            "    ECI:   {} (p,q,r in deg/s)",
            fmt_vec(&self.state.pqri.map(f64::to_degrees))
        )?;
        write!(
            f,
            "    ECEF:  {} (p,q,r in deg/s)",
            fmt_vec(&self.state.pqr.map(f64::to_degrees))
        )
    }
}
