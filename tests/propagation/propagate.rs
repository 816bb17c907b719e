extern crate nyx_fdm as nyx;

use approx::{abs_diff_eq, relative_eq};
use nyx::cosmic::EARTH_ROTATION_RATE;
use nyx::dynamics::{point_mass_gravity, DerivativeInputs, FlightDynamics, Planet};
use nyx::fdm::{InitialCondition, InitialVelocity, Propagate, VehicleState};
use nyx::linalg::{Matrix3, UnitQuaternion, Vector3};
use nyx::propagators::*;
use rstest::*;

use super::G0_FT_S2;
use crate::test_planet;

#[fixture]
fn planet() -> Planet {
    test_planet()
}

#[fixture]
fn ic() -> InitialCondition {
    InitialCondition::builder()
        .latitude(30.0)
        .longitude(-95.0)
        .altitude(5_000.0)
        .phi(2.0)
        .theta(5.0)
        .psi(45.0)
        .velocity(InitialVelocity::Body(Vector3::new(400.0, 3.0, 10.0)))
        .pqr(Vector3::new(0.01, 0.02, -0.01))
        .build()
}

fn maneuvering(tick: usize) -> DerivativeInputs {
    let t = tick as f64 * 0.01;
    DerivativeInputs::new(
        Vector3::new(0.05 * t.sin(), -0.02, 0.01 * t.cos()),
        Vector3::new(1.0, 0.5 * t.cos(), -G0_FT_S2),
    )
}

fn assert_consistent(prop: &Propagate) {
    let tf = prop.transforms();
    let eye = Matrix3::identity();
    assert!(abs_diff_eq!(tf.ti2ec() * tf.tec2i(), eye, epsilon = 1e-14));
    assert!(abs_diff_eq!(tf.tb2l() * tf.tl2b(), eye, epsilon = 1e-14));
    assert!(
        tf.consistency_error() < 1e-12,
        "inconsistent transforms: {:e}",
        tf.consistency_error()
    );
}

#[rstest]
fn transform_consistency(mut planet: Planet, ic: InitialCondition) {
    let mut prop = Propagate::new(IntegratorOpts::default(), &planet).unwrap();
    prop.set_initial_state(&ic, &maneuvering(0), &mut planet);
    assert_consistent(&prop);
    for tick in 0..500 {
        prop.run(0.01, &maneuvering(tick), &mut planet);
        assert_consistent(&prop);
        assert!((prop.attitude_eci().quaternion().norm() - 1.0).abs() < 1e-9);
        // The body velocity and the local velocity are the same vector
        assert!(abs_diff_eq!(
            prop.transforms().tl2b() * prop.vel(),
            *prop.uvw(),
            epsilon = 1e-9
        ));
    }
    assert!(relative_eq!(prop.sim_time(), 5.0, max_relative = 1e-12));
    prop.dump_state();
}

#[rstest]
fn incomplete_step_gating(mut planet: Planet, ic: InitialCondition) {
    let dt = 0.01;
    let mut prop = Propagate::new(IntegratorOpts::default(), &planet).unwrap();
    assert_eq!(
        prop.integration_method(IntegratedQuantity::TranslationalRate),
        IntegrationMethod::AdamsBashforth2
    );
    prop.set_initial_state(&ic, &maneuvering(0), &mut planet);
    let epa0 = planet.earth_position().angle();
    let r0 = *prop.inertial_position();

    // The bootstrap step updates the state without committing it
    assert!(!prop.run(dt, &maneuvering(0), &mut planet));
    assert_eq!(planet.earth_position().angle(), epa0);
    assert_eq!(prop.earth_position_angle(), epa0);
    assert!((prop.inertial_position() - r0).norm() > 1.0);

    let n = 50;
    for tick in 1..n {
        assert!(prop.run(dt, &maneuvering(tick), &mut planet));
    }
    let expected = epa0 + (n - 1) as f64 * dt * EARTH_ROTATION_RATE;
    assert!(abs_diff_eq!(
        planet.earth_position().angle(),
        expected,
        epsilon = 1e-15
    ));
    assert_eq!(prop.earth_position_angle(), planet.earth_position().angle());
}

#[rstest]
fn gating_restarts_on_method_change(mut planet: Planet, ic: InitialCondition) {
    let opts = IntegratorOpts::uniform(IntegrationMethod::AdamsBashforth3);
    let mut prop = Propagate::new(opts, &planet).unwrap();
    prop.set_initial_state(&ic, &DerivativeInputs::default(), &mut planet);
    for _ in 0..10 {
        assert!(prop.run(0.01, &DerivativeInputs::default(), &mut planet));
    }
    prop.set_integration_method(
        IntegratedQuantity::TranslationalPosition,
        IntegrationMethod::AdamsBashforth2,
    )
    .unwrap();
    let epa = planet.earth_position().angle();
    assert!(!prop.run(0.01, &DerivativeInputs::default(), &mut planet));
    assert_eq!(planet.earth_position().angle(), epa);
    assert!(prop.run(0.01, &DerivativeInputs::default(), &mut planet));
    assert!(planet.earth_position().angle() > epa);
}

#[rstest]
fn constant_acceleration_ab3(mut planet: Planet) {
    let opts = IntegratorOpts::uniform(IntegrationMethod::AdamsBashforth3);
    assert_eq!(
        opts.translational_rate,
        IntegrationMethod::AdamsBashforth3
    );
    let mut prop = Propagate::new(opts, &planet).unwrap();
    let inputs = DerivativeInputs::from_acceleration(Vector3::new(0.0, 0.0, -G0_FT_S2));
    prop.set_initial_state(&InitialCondition::default(), &inputs, &mut planet);
    prop.set_inertial_velocity(Vector3::zeros(), &planet);
    assert_eq!(prop.inertial_velocity_magnitude(), 0.0);

    for _ in 0..100 {
        assert!(prop.run(0.01, &inputs, &mut planet));
    }
    assert!(
        abs_diff_eq!(
            *prop.inertial_velocity(),
            Vector3::new(0.0, 0.0, -G0_FT_S2),
            epsilon = 1e-6
        ),
        "{}",
        prop.inertial_velocity()
    );
}

#[rstest]
fn set_v_state_round_trip(mut planet: Planet) {
    planet.earth_position_mut().set_angle(0.8);
    let mut prop = Propagate::new(IntegratorOpts::default(), &planet).unwrap();

    let vstate = VehicleState {
        location: planet.location_geodetic(0.6, -1.2, 30_000.0),
        attitude_eci: UnitQuaternion::from_euler_angles(0.3, 0.2, -2.0),
        uvw: Vector3::new(600.0, 5.0, -20.0),
        pqr: Vector3::new(0.01, -0.02, 0.03),
        ..Default::default()
    };
    prop.set_v_state(&vstate, &maneuvering(0), &planet);

    assert!(abs_diff_eq!(
        *prop.location().ecef(),
        *vstate.location.ecef(),
        epsilon = 1e-9
    ));
    assert!(abs_diff_eq!(
        prop.attitude_eci().quaternion().coords,
        vstate.attitude_eci.quaternion().coords,
        epsilon = 1e-15
    ));
    assert!(abs_diff_eq!(*prop.uvw(), vstate.uvw, epsilon = 1e-12));
    assert!(abs_diff_eq!(*prop.pqr(), vstate.pqr, epsilon = 1e-15));
    assert_eq!(prop.earth_position_angle(), 0.8);
    assert_consistent(&prop);

    // The derived inertial quantities map back to the relative ones
    let omega = planet.omega();
    let tf = prop.transforms();
    let uvw = tf.ti2b() * (prop.inertial_velocity() - omega.cross(prop.inertial_position()));
    assert!(abs_diff_eq!(uvw, vstate.uvw, epsilon = 1e-9));
    assert!(abs_diff_eq!(
        *prop.inertial_position(),
        tf.tec2i() * vstate.location.ecef(),
        epsilon = 1e-9
    ));
    // Local attitude from the local frame transform
    let tb2l = prop.attitude_local().to_rotation_matrix().into_inner();
    assert!(abs_diff_eq!(tb2l, *tf.tb2l(), epsilon = 1e-14));
    assert!(abs_diff_eq!(prop.ecef_velocity(), tf.tl2ec() * prop.vel(), epsilon = 1e-9));
}

#[rstest]
fn initial_conditions(mut planet: Planet, ic: InitialCondition) {
    let mut prop = Propagate::new(IntegratorOpts::default(), &planet).unwrap();
    prop.set_initial_state(&ic, &DerivativeInputs::default(), &mut planet);

    assert!(abs_diff_eq!(prop.geodetic_latitude_deg(), 30.0, epsilon = 1e-9));
    assert!(abs_diff_eq!(prop.longitude_deg(), -95.0, epsilon = 1e-9));
    assert!(abs_diff_eq!(prop.geodetic_altitude(), 5_000.0, epsilon = 1e-6));
    assert!(abs_diff_eq!(prop.distance_agl(&planet), 5_000.0, epsilon = 1e-6));
    assert!(abs_diff_eq!(prop.terrain_elevation(&planet), 0.0, epsilon = 1e-6));
    assert!(prop.local_terrain_radius(&planet) < prop.radius());

    let euler = prop.euler_deg();
    assert!(abs_diff_eq!(euler, Vector3::new(2.0, 5.0, 45.0), epsilon = 1e-9));
    assert!(abs_diff_eq!(
        prop.cos_euler(),
        prop.euler().map(f64::cos),
        epsilon = 1e-15
    ));
    assert!(abs_diff_eq!(*prop.uvw(), Vector3::new(400.0, 3.0, 10.0), epsilon = 1e-12));
    assert!(abs_diff_eq!(*prop.pqr(), Vector3::new(0.01, 0.02, -0.01), epsilon = 1e-15));
    assert!(abs_diff_eq!(prop.hdot(), -prop.vel().z, epsilon = 1e-15));
    assert!(abs_diff_eq!(prop.vel_magnitude(), prop.uvw().norm(), epsilon = 1e-9));
    assert_consistent(&prop);

    // Velocity given in the local frame
    let ic_ned = InitialCondition {
        velocity: InitialVelocity::Local(Vector3::new(100.0, -50.0, 5.0)),
        ..ic
    };
    prop.set_initial_state(&ic_ned, &DerivativeInputs::default(), &mut planet);
    assert!(abs_diff_eq!(*prop.vel(), Vector3::new(100.0, -50.0, 5.0), epsilon = 1e-9));
    assert!(abs_diff_eq!(prop.hdot(), -5.0, epsilon = 1e-9));
}

#[rstest]
fn hold_down(mut planet: Planet, ic: InitialCondition) {
    let mut prop = Propagate::new(IntegratorOpts::default(), &planet).unwrap();
    prop.set_initial_state(&ic, &DerivativeInputs::default(), &mut planet);
    prop.set_hold_down(true, &planet);

    assert_eq!(*prop.uvw(), Vector3::zeros());
    assert_eq!(*prop.vel(), Vector3::zeros());
    assert!(prop.pqr().norm() < 1e-15);
    // Only the rotation of the planet remains
    let r = prop.inertial_position();
    let expected = EARTH_ROTATION_RATE * r.x.hypot(r.y);
    assert!(relative_eq!(
        prop.inertial_velocity_magnitude(),
        expected,
        max_relative = 1e-12
    ));
    assert!(relative_eq!(
        prop.pqri().norm(),
        EARTH_ROTATION_RATE,
        max_relative = 1e-12
    ));

    prop.run(0.01, &DerivativeInputs::default(), &mut planet);
    assert!(prop.uvw().norm() < 1e-2);
    assert!(prop.pqr().norm() < 1e-12);

    // Releasing does nothing
    let before = *prop.vstate();
    prop.set_hold_down(false, &planet);
    assert_eq!(*prop.vstate(), before);
}

#[rstest]
fn suspended_integration(mut planet: Planet, ic: InitialCondition) {
    let mut prop = Propagate::new(IntegratorOpts::default(), &planet).unwrap();
    prop.set_initial_state(&ic, &DerivativeInputs::default(), &mut planet);
    prop.suspend_integration();
    assert!(prop.is_integration_suspended());
    let before = *prop.vstate();
    let epa = planet.earth_position().angle();
    for tick in 0..10 {
        assert!(!prop.run(0.1, &maneuvering(tick), &mut planet));
    }
    assert_eq!(prop.inertial_position(), &before.inertial_position);
    assert_eq!(prop.inertial_velocity(), &before.inertial_velocity);
    assert_eq!(planet.earth_position().angle(), epa);
    assert_eq!(prop.sim_time(), 0.0);

    prop.resume_integration();
    prop.run(0.1, &maneuvering(0), &mut planet);
    assert_ne!(prop.inertial_position(), &before.inertial_position);
}

#[rstest]
fn non_positive_step_holds_state(mut planet: Planet, ic: InitialCondition) {
    let opts = IntegratorOpts::uniform(IntegrationMethod::Buss1);
    let mut prop = Propagate::new(opts, &planet).unwrap();
    prop.set_initial_state(&ic, &maneuvering(0), &mut planet);
    assert!(prop.run(0.01, &maneuvering(0), &mut planet));
    let before = *prop.vstate();
    let epa = planet.earth_position().angle();
    let sim_time = prop.sim_time();
    for dt in [-0.01, 0.0, -1.0] {
        assert!(!prop.run(dt, &maneuvering(1), &mut planet));
        assert_eq!(*prop.vstate(), before);
        assert_eq!(planet.earth_position().angle(), epa);
        assert_eq!(prop.sim_time(), sim_time);
    }
    assert!(prop.run(0.01, &maneuvering(1), &mut planet));
    assert!(planet.earth_position().angle() > epa);
}

#[rstest]
#[case(IntegratorOpts::default())]
#[case(IntegratorOpts::uniform(IntegrationMethod::AdamsBashforth5))]
fn reproducible_runs(#[case] opts: IntegratorOpts, ic: InitialCondition) {
    let dynamics = FlightDynamics::two_body();
    let mut runs = Vec::new();
    for _ in 0..2 {
        let mut planet = test_planet();
        let mut prop = Propagate::new(opts, &planet).unwrap();
        prop.set_initial_state(&ic, &maneuvering(0), &mut planet);
        for tick in 0..1000 {
            let dt = if tick % 3 == 0 { 0.01 } else { 0.005 };
            if tick % 2 == 0 {
                prop.run(dt, &maneuvering(tick), &mut planet);
            } else {
                prop.step(dt, &dynamics, &mut planet);
            }
        }
        runs.push((*prop.vstate(), planet.earth_position().angle(), prop.sim_time()));
    }
    assert_eq!(runs[0], runs[1]);
    assert!(runs[0].1 > 0.0);
}

#[rstest]
fn integrator_selection(planet: Planet) {
    let mut prop = Propagate::new(IntegratorOpts::default(), &planet).unwrap();
    prop.set_integrator(IntegratedQuantity::TranslationalRate, 4)
        .unwrap();
    assert_eq!(
        prop.integration_method(IntegratedQuantity::TranslationalRate),
        IntegrationMethod::AdamsBashforth3
    );
    prop.set_integrator(IntegratedQuantity::RotationalPosition, 8)
        .unwrap();
    assert_eq!(
        prop.integrator_opts().rotational_position,
        IntegrationMethod::LocalLinearization
    );
    assert_eq!(
        prop.set_integrator(IntegratedQuantity::RotationalRate, 6),
        Err(IntegrationError::NotApplicable {
            method: IntegrationMethod::Buss1,
            quantity: IntegratedQuantity::RotationalRate
        })
    );
    assert_eq!(
        prop.set_integrator(IntegratedQuantity::TranslationalPosition, 42),
        Err(IntegrationError::UnknownMethod { tag: 42 })
    );
    assert_eq!(
        prop.integration_method(IntegratedQuantity::RotationalRate),
        IntegrationMethod::RectEuler
    );

    let invalid = IntegratorOpts {
        translational_position: IntegrationMethod::Buss2,
        ..Default::default()
    };
    assert!(Propagate::new(invalid, &planet).is_err());
}

#[rstest]
fn repositioning(mut planet: Planet, ic: InitialCondition) {
    let mut prop = Propagate::new(IntegratorOpts::default(), &planet).unwrap();
    prop.set_initial_state(&ic, &DerivativeInputs::default(), &mut planet);
    let uvw = *prop.uvw();

    prop.set_altitude_asl(10_000.0, &planet);
    assert!(abs_diff_eq!(prop.altitude_asl(), 10_000.0, epsilon = 1e-6));
    assert!(abs_diff_eq!(prop.altitude_asl_m(), 3_048.0, epsilon = 1e-6));
    assert_consistent(&prop);

    prop.set_latitude_deg(-42.0, &planet);
    assert!(abs_diff_eq!(prop.latitude_deg(), -42.0, epsilon = 1e-10));
    prop.set_longitude_deg(120.0, &planet);
    assert!(abs_diff_eq!(prop.longitude_deg(), 120.0, epsilon = 1e-10));
    assert!(abs_diff_eq!(prop.latitude_deg(), -42.0, epsilon = 1e-10));
    assert_consistent(&prop);

    prop.set_distance_agl_km(2.0, &planet);
    assert!(abs_diff_eq!(prop.distance_agl_km(&planet), 2.0, epsilon = 1e-6));
    assert!(abs_diff_eq!(prop.geodetic_altitude_km(), 2.0, epsilon = 1e-6));
    assert!(abs_diff_eq!(prop.longitude_deg(), 120.0, epsilon = 1e-10));

    // Moving the vehicle keeps its velocity relative to the planet
    assert!(abs_diff_eq!(*prop.uvw(), uvw, epsilon = 1e-12));
    let r = *prop.inertial_position();
    assert!(abs_diff_eq!(
        *prop.inertial_position(),
        prop.transforms().tec2i() * prop.location().ecef(),
        epsilon = 1e-9
    ));

    let location = planet.location_geodetic(0.1, 0.2, 100.0);
    prop.set_location(location, &planet);
    assert_eq!(prop.location(), &location);
    assert_ne!(*prop.inertial_position(), r);

    // Next step starts from the new location
    prop.run(0.01, &DerivativeInputs::default(), &mut planet);
    assert!(prop.location().distance_to(&location) < 10.0);
}

#[rstest]
fn inertial_setters(mut planet: Planet, ic: InitialCondition) {
    let opts = IntegratorOpts::uniform(IntegrationMethod::Buss1);
    assert_eq!(opts.translational_rate, IntegrationMethod::RectEuler);
    let mut prop = Propagate::new(opts, &planet).unwrap();
    prop.set_initial_state(&ic, &DerivativeInputs::default(), &mut planet);

    let attitude = UnitQuaternion::from_euler_angles(0.0, 0.0, 1.0);
    prop.set_inertial_orientation(attitude, &planet);
    assert!(abs_diff_eq!(
        prop.attitude_eci().quaternion().coords,
        attitude.quaternion().coords,
        epsilon = 1e-15
    ));
    assert_consistent(&prop);

    let velocity = Vector3::new(100.0, 200.0, -300.0);
    prop.set_inertial_velocity(velocity, &planet);
    assert_eq!(*prop.inertial_velocity(), velocity);
    let expected_uvw = prop.transforms().ti2b()
        * (velocity - planet.omega().cross(prop.inertial_position()));
    assert!(abs_diff_eq!(*prop.uvw(), expected_uvw, epsilon = 1e-9));

    let rates = Vector3::new(0.0, 0.0, 0.5);
    prop.set_inertial_rates(rates, &planet);
    assert!(abs_diff_eq!(
        prop.transforms().tb2i() * prop.pqri(),
        rates,
        epsilon = 1e-14
    ));

    // Rotating about the inertial Z axis at the set rate
    for _ in 0..100 {
        assert!(prop.run(0.01, &DerivativeInputs::default(), &mut planet));
    }
    let (_, _, yaw) = prop.attitude_eci().euler_angles();
    assert!(abs_diff_eq!(yaw, 1.5, epsilon = 1e-9));
}

#[rstest]
fn circular_orbit(mut planet: Planet) {
    let altitude = 1.2e6;
    let radius = planet.semi_major() + altitude;
    let v_circ = (planet.gm() / radius).sqrt();
    // Equator, prime meridian: east is the inertial Y axis
    let east = v_circ - EARTH_ROTATION_RATE * radius;
    let ic = InitialCondition::builder()
        .altitude(altitude)
        .velocity(InitialVelocity::Local(Vector3::new(0.0, east, 0.0)))
        .build();
    let gravity = DerivativeInputs::from_acceleration(point_mass_gravity(
        &Vector3::new(radius, 0.0, 0.0),
        planet.gm(),
    ));

    let dynamics = FlightDynamics::two_body();
    let mut prop = Propagate::new(
        IntegratorOpts::uniform(IntegrationMethod::AdamsBashforth4),
        &planet,
    )
    .unwrap();
    prop.set_initial_state(&ic, &gravity, &mut planet);
    assert!(abs_diff_eq!(
        *prop.inertial_velocity(),
        Vector3::new(0.0, v_circ, 0.0),
        epsilon = 1e-9
    ));

    let orbit = prop.orbital_parameters(&planet);
    assert!(orbit.eccentricity < 1e-12, "{orbit}");
    assert!(abs_diff_eq!(orbit.inclination, 0.0, epsilon = 1e-9));
    assert!(relative_eq!(
        orbit.period,
        2.0 * std::f64::consts::PI * (radius.powi(3) / planet.gm()).sqrt(),
        max_relative = 1e-12
    ));

    for _ in 0..3_000 {
        assert!(prop.step(0.1, &dynamics, &mut planet));
    }
    let orbit = prop.orbital_parameters(&planet);
    assert!(orbit.eccentricity < 1e-5, "{orbit}");
    assert!(relative_eq!(prop.radius(), radius, max_relative = 1e-6));
    assert!(relative_eq!(
        prop.inertial_velocity_magnitude(),
        v_circ,
        max_relative = 1e-6
    ));
    assert_consistent(&prop);
}

#[rstest]
fn state_report(mut planet: Planet, ic: InitialCondition) {
    let mut prop = Propagate::new(IntegratorOpts::default(), &planet).unwrap();
    prop.set_initial_state(&ic, &DerivativeInputs::default(), &mut planet);
    let report = format!("{prop}");
    assert!(report.contains("State Report at sim time: 0.000000 seconds"));
    assert!(report.contains("(u,v,w in ft/sec)"));
    assert!(report.contains("Body Rates"));
}
