use lasesim::core::{Atom, EnergyLevel, LaserConfig, Rates, Simulation};
use lasesim::error::Error;

fn param_of(err: Error) -> &'static str {
    match err {
        Error::Config { param, .. } => param,
        other => panic!("expected a configuration error, got {other}"),
    }
}

/// Configuration errors fail fast and name the offending option.
#[test]
fn invalid_options_are_rejected_before_any_tick() {
    let cases: Vec<(LaserConfig, &str)> = vec![
        (
            LaserConfig {
                dt: -0.01,
                ..LaserConfig::default()
            },
            "dt",
        ),
        (
            LaserConfig {
                num_atoms: 0,
                ..LaserConfig::default()
            },
            "num_atoms",
        ),
        (
            LaserConfig {
                half_height: 0.0,
                ..LaserConfig::default()
            },
            "half_height",
        ),
        (
            LaserConfig {
                rates: Rates {
                    y_abs: 100.0,
                    ..Rates::default()
                },
                ..LaserConfig::default()
            },
            "y_abs",
        ),
        (
            LaserConfig {
                rates: Rates {
                    y_10: -1.0,
                    ..Rates::default()
                },
                ..LaserConfig::default()
            },
            "y_10",
        ),
        (
            LaserConfig {
                capture_radius: f64::NAN,
                ..LaserConfig::default()
            },
            "capture_radius",
        ),
    ];
    for (cfg, expected) in cases {
        let err = Simulation::new(cfg).unwrap_err();
        let msg = err.to_string();
        assert_eq!(param_of(err), expected, "{msg}");
    }
}

/// Probabilities are never clamped: a rate that makes rate*dt ≥ 1 is an error,
/// and the same rate becomes valid with a smaller timestep.
#[test]
fn rate_validity_depends_on_timestep() {
    let rates = Rates {
        b_10: 200.0,
        ..Rates::default()
    };
    let coarse = LaserConfig {
        rates,
        dt: 0.01,
        ..LaserConfig::default()
    };
    let fine = LaserConfig {
        rates,
        dt: 0.001,
        ..LaserConfig::default()
    };
    let err = Simulation::new(coarse).unwrap_err();
    assert!(err.to_string().contains("200"));
    assert!(Simulation::new(fine).is_ok());
}

/// Explicit layouts still validate dynamics.
#[test]
fn explicit_layout_validates_dynamics() -> lasesim::Result<()> {
    let atoms = vec![Atom::new(0.0, 0.0, EnergyLevel::E1)?];
    let cfg = LaserConfig {
        speed: -3.0,
        ..LaserConfig::default()
    };
    let err = Simulation::with_atoms(cfg, atoms).unwrap_err();
    assert_eq!(param_of(err), "speed");
    Ok(())
}
