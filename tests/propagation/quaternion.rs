extern crate nyx_fdm as nyx;

use approx::abs_diff_eq;
use nyx::linalg::{UnitQuaternion, Vector3};
use nyx::propagators::*;
use rstest::*;

use crate::init_logger;

/// Distance between two attitudes, insensitive to the sign of the quaternions
fn attitude_error(a: &UnitQuaternion<f64>, b: &UnitQuaternion<f64>) -> f64 {
    let (a, b) = (a.quaternion().coords, b.quaternion().coords);
    (a - b).norm().min((a + b).norm())
}

/// Angular rate varying over time, and its derivative
fn tumbling(t: f64) -> (Vector3<f64>, Vector3<f64>) {
    let omega = Vector3::new(0.4 * (2.0 * t).sin(), -0.3, 1.2 * (0.5 * t).cos());
    let omega_dot = Vector3::new(0.8 * (2.0 * t).cos(), 0.0, -0.6 * (0.5 * t).sin());
    (omega, omega_dot)
}

#[test]
fn unit_norm_for_every_method() {
    init_logger();
    let dt = 0.05;
    for method in enum_iterator::all::<IntegrationMethod>() {
        let mut integ = QuaternionIntegrator::new(method);
        integ.set_step_size(dt);
        integ.set_initial_condition(UnitQuaternion::from_euler_angles(0.2, -0.7, 2.9));
        let (omega, _) = tumbling(0.0);
        integ.set_initial_derivative(quaternion_rate(&integ.value(), &omega));

        let mut t = 0.0;
        for _ in 0..400 {
            let (omega, omega_dot) = tumbling(t);
            let step = integ.integrate(&omega, &omega_dot);
            assert!(
                (step.value.quaternion().norm() - 1.0).abs() < 1e-9,
                "{method}: |q| = {}",
                step.value.quaternion().norm()
            );
            if step.complete {
                integ.commit();
                t += dt;
            }
            assert!((integ.value().quaternion().norm() - 1.0).abs() < 1e-9);
        }
    }
}

#[rstest]
#[case(0.01, 500)]
#[case(0.1, 73)]
#[case(1.0, 10)]
fn buss1_constant_rate(#[case] dt: f64, #[case] steps: usize) {
    init_logger();
    let omega = Vector3::new(0.1, -0.2, 0.3);
    let q0 = UnitQuaternion::from_euler_angles(-1.0, 0.5, 0.25);
    let mut integ = QuaternionIntegrator::new(IntegrationMethod::Buss1);
    integ.set_step_size(dt);
    integ.set_initial_condition(q0);
    for _ in 0..steps {
        let step = integ.integrate(&omega, &Vector3::zeros());
        assert!(step.complete);
        integ.commit();
    }
    let expected = UnitQuaternion::new_normalize(
        q0.quaternion() * qexp(&(omega * (0.5 * steps as f64 * dt))),
    );
    let error = attitude_error(&integ.value(), &expected);
    assert!(error < 1e-12, "error of {error:e}");
}

#[rstest]
#[case(IntegrationMethod::RectEuler, 1e-3)]
#[case(IntegrationMethod::AdamsBashforth3, 1e-4)]
#[case(IntegrationMethod::AdamsBashforth4, 1e-4)]
#[case(IntegrationMethod::Buss2, 1e-12)]
#[case(IntegrationMethod::LocalLinearization, 1e-12)]
fn constant_rate_agrees_with_closed_form(#[case] method: IntegrationMethod, #[case] tol: f64) {
    init_logger();
    let dt = 0.01;
    let omega = Vector3::new(0.1, -0.2, 0.3);
    let q0 = UnitQuaternion::identity();
    let mut integ = QuaternionIntegrator::new(method);
    integ.set_step_size(dt);
    integ.set_initial_condition(q0);
    integ.set_initial_derivative(quaternion_rate(&q0, &omega));
    for _ in 0..200 {
        let step = integ.integrate(&omega, &Vector3::zeros());
        assert!(step.complete);
        integ.commit();
    }
    let expected = UnitQuaternion::new_normalize(q0.quaternion() * qexp(&(omega * (0.5 * 2.0))));
    let error = attitude_error(&integ.value(), &expected);
    assert!(error < tol, "{method}: error of {error:e}");
}

/// Attitude after `duration` seconds of a rate varying linearly from `omega0` at `omega_dot`
fn spin_up(
    method: IntegrationMethod,
    dt: f64,
    duration: f64,
    omega0: &Vector3<f64>,
    omega_dot: &Vector3<f64>,
) -> UnitQuaternion<f64> {
    let mut integ = QuaternionIntegrator::new(method);
    integ.set_step_size(dt);
    integ.set_initial_condition(UnitQuaternion::from_euler_angles(0.3, -0.2, 1.1));
    let steps = (duration / dt).round() as usize;
    for k in 0..steps {
        let omega = omega0 + omega_dot * (k as f64 * dt);
        let step = integ.integrate(&omega, omega_dot);
        assert!(step.complete);
        integ.commit();
    }
    integ.value()
}

#[rstest]
#[case(IntegrationMethod::Buss1, 1.8, 2.2)]
#[case(IntegrationMethod::Buss2, 3.6, 4.4)]
#[case(IntegrationMethod::LocalLinearization, 3.8, 10.0)]
fn accelerating_rate_convergence(
    #[case] method: IntegrationMethod,
    #[case] min_ratio: f64,
    #[case] max_ratio: f64,
) {
    init_logger();
    let duration = 1.0;
    let omega0 = Vector3::new(0.5, -0.3, 1.0);
    let omega_dot = Vector3::new(0.8, 0.4, -0.6);
    let reference = spin_up(IntegrationMethod::Buss2, 1e-4, duration, &omega0, &omega_dot);

    let coarse = attitude_error(
        &spin_up(method, 0.02, duration, &omega0, &omega_dot),
        &reference,
    );
    let fine = attitude_error(
        &spin_up(method, 0.01, duration, &omega0, &omega_dot),
        &reference,
    );
    assert!(fine > 0.0 && coarse > fine, "{method}: {coarse:e} then {fine:e}");
    let ratio = coarse / fine;
    assert!(
        ratio > min_ratio && ratio < max_ratio,
        "{method}: error ratio of {ratio} ({coarse:e} then {fine:e})"
    );
}

#[test]
fn frozen_attitude() {
    init_logger();
    let q0 = UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3);
    let mut integ = QuaternionIntegrator::new(IntegrationMethod::None);
    integ.set_step_size(0.5);
    integ.set_initial_condition(q0);
    for _ in 0..20 {
        let step = integ.integrate(&Vector3::new(1.0, 2.0, 3.0), &Vector3::new(0.1, 0.0, 0.0));
        assert!(abs_diff_eq!(step.value, q0, epsilon = 1e-15));
        integ.commit();
    }
    assert!(abs_diff_eq!(integ.value(), q0, epsilon = 1e-15));
}
