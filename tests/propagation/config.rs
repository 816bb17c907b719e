extern crate nyx_fdm as nyx;

use approx::abs_diff_eq;
use nyx::dynamics::{DerivativeInputs, PlanetConfig};
use nyx::fdm::{InitialVelocity, RunConfig};
use nyx::io::{ConfigError, ConfigRepr};
use nyx::linalg::Vector3;
use nyx::propagators::*;
use nyx::FdmError;
use std::path::PathBuf;

use crate::init_logger;

fn run_file() -> PathBuf {
    let manifest_dir =
        PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or(".".to_string()));
    manifest_dir.join("data").join("run.yaml")
}

#[test]
fn load_run_config() {
    init_logger();
    let cfg = RunConfig::from_file(run_file()).unwrap();
    assert_eq!(cfg.step_size, 0.01);
    assert_eq!(
        cfg.integrators,
        IntegratorOpts::builder()
            .rotational_rate(IntegrationMethod::AdamsBashforth2)
            .translational_rate(IntegrationMethod::AdamsBashforth3)
            .rotational_position(IntegrationMethod::Buss2)
            .translational_position(IntegrationMethod::AdamsBashforth4)
            .build()
    );
    assert_eq!(
        cfg.initial_condition.velocity,
        InitialVelocity::Body(Vector3::new(750.0, 0.0, 20.0))
    );
    assert_eq!(cfg.planet.terrain_elevation, 15.0);
    assert_eq!(cfg.planet.angle, 0.0);
    println!("{cfg}");

    let (mut prop, mut planet) = cfg.build(&DerivativeInputs::default()).unwrap();
    assert!(abs_diff_eq!(prop.geodetic_latitude_deg(), 37.6, epsilon = 1e-9));
    assert!(abs_diff_eq!(prop.distance_agl(&planet), 12_000.0 - 15.0, epsilon = 1e-6));
    assert!(abs_diff_eq!(prop.euler_deg().z, -80.0, epsilon = 1e-9));
    // The rotational rate bootstraps with AB2
    assert!(!prop.run(cfg.step_size, &DerivativeInputs::default(), &mut planet));
    assert!(prop.run(cfg.step_size, &DerivativeInputs::default(), &mut planet));
}

#[test]
fn partial_configs() {
    init_logger();
    let cfg = RunConfig::from_yaml("step_size: 0.5").unwrap();
    assert_eq!(cfg.integrators, IntegratorOpts::default());
    assert_eq!(cfg.planet, PlanetConfig::default());

    let opts = IntegratorOpts::loads("rotational_position: LocalLinearization").unwrap();
    assert_eq!(opts.rotational_position, IntegrationMethod::LocalLinearization);
    assert_eq!(opts.translational_rate, IntegrationMethod::AdamsBashforth2);

    let dumped = cfg.dumps().unwrap();
    assert_eq!(RunConfig::loads(&dumped).unwrap(), cfg);
}

#[test]
fn invalid_configs() {
    init_logger();
    match RunConfig::from_yaml("step_size: -0.1") {
        Err(FdmError::Config {
            source: ConfigError::InvalidConfig { msg },
        }) => assert!(msg.contains("step size")),
        other => panic!("expected an invalid step size, got {other:?}"),
    }

    match RunConfig::from_yaml("integrators:\n  rotational_rate: Buss1") {
        Err(FdmError::Integration {
            source: IntegrationError::NotApplicable { method, quantity },
        }) => {
            assert_eq!(method, IntegrationMethod::Buss1);
            assert_eq!(quantity, IntegratedQuantity::RotationalRate);
        }
        other => panic!("expected a non applicable method, got {other:?}"),
    }

    assert!(matches!(
        RunConfig::from_yaml("integrators:\n  rotational_rate: RungeKutta4"),
        Err(FdmError::Config {
            source: ConfigError::ParseError { .. }
        })
    ));

    assert!(matches!(
        RunConfig::from_file("data/does_not_exist.yaml"),
        Err(FdmError::Config {
            source: ConfigError::ReadError { .. }
        })
    ));

    let flat = "planet:\n  rotation_rate: 0.0\n  semi_major: 1000.0\n  semi_minor: 2000.0\n  gm: 1.0";
    assert!(RunConfig::from_yaml(flat).is_err());
}
