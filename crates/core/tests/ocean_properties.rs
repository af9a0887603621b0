//! Ocean Simulation Property Suite
//!
//! End-to-end checks of the statistical wave model through the public API:
//! spectrum edge cases, determinism, looping, degenerate parameters and the
//! transform identities.
//!
//! Run tests with: cargo test --test `ocean_properties`

use ocean_sim_core::spectrum::{conjugate_index, initialize, spectral_energy};
use ocean_sim_core::{
    BackendPreference, ComputeBackend, CpuBackend, EvolvedSpectra, OceanParameters,
    OceanSimError, OceanSimulator, SimulatorOptions, SimulatorState, SpectralTransform,
    SpectrumConstants, Vec2,
};
use rustfft::num_complex::Complex32;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn cpu_options(seed: u64) -> SimulatorOptions {
    SimulatorOptions {
        seed: Some(seed),
        backend: BackendPreference::Cpu,
        ..SimulatorOptions::default()
    }
}

fn test_params() -> OceanParameters {
    OceanParameters {
        grid_dimension: 64,
        patch_length: 400.0,
        ..OceanParameters::default()
    }
}

fn parameter_sets() -> Vec<OceanParameters> {
    vec![
        test_params(),
        OceanParameters {
            grid_dimension: 32,
            ..OceanParameters::calm()
        },
        OceanParameters {
            grid_dimension: 64,
            ..OceanParameters::storm()
        },
        OceanParameters {
            grid_dimension: 4,
            patch_length: 10.0,
            wind_direction: Vec2::new(-1.0, 1.0),
            wind_dependency: 1.0,
            ..OceanParameters::default()
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════════
// Spectrum edge cases
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_mean_level_is_exactly_zero_in_every_spectrum() {
    let zero = Complex32::new(0.0, 0.0);

    for params in parameter_sets() {
        let n = params.grid_dimension;
        let spectrum = initialize(&params, &SpectrumConstants::default(), Some(9)).unwrap();
        assert_eq!(spectrum.h0.get(n / 2, n / 2), zero);

        let mut backend = CpuBackend::new(n).unwrap();
        backend.upload_spectrum(&spectrum).unwrap();
        for t in [0.0, 0.75, 31.0] {
            backend.evolve(t).unwrap();
            let evolved: &EvolvedSpectra = backend.evolved();
            assert_eq!(evolved.height.get(n / 2, n / 2), zero);
            assert_eq!(evolved.choppy_x.get(n / 2, n / 2), zero);
            assert_eq!(evolved.choppy_y.get(n / 2, n / 2), zero);
        }
    }
}

#[test]
fn test_energy_conserved_when_no_pair_is_doubly_populated() {
    for base in parameter_sets() {
        let params = OceanParameters {
            wind_dependency: 0.0,
            ..base
        };
        let n = params.grid_dimension;
        let spectrum = initialize(&params, &SpectrumConstants::default(), Some(21)).unwrap();

        let mut expected = 0.0_f64;
        for y in 0..n {
            for x in 0..n {
                let own = spectrum.h0.get(x, y).norm_sqr();
                let partner = spectrum.h0.data[conjugate_index(x, y, n)].norm_sqr();
                expected += f64::from(own) + f64::from(partner);
            }
        }
        if expected == 0.0 {
            continue;
        }

        let mut backend = CpuBackend::new(n).unwrap();
        backend.upload_spectrum(&spectrum).unwrap();
        for t in [0.0, 2.0, 19.5] {
            backend.evolve(t).unwrap();
            let energy = spectral_energy(&backend.evolved().height);
            assert!(
                ((energy - expected) / expected).abs() < 1e-4,
                "n={n} t={t}: {energy} vs {expected}"
            );
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Determinism and looping
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_same_seed_reproduces_the_ocean() {
    let mut a = OceanSimulator::with_options(test_params(), cpu_options(1234)).unwrap();
    let mut b = OceanSimulator::with_options(test_params(), cpu_options(1234)).unwrap();

    assert_eq!(a.initial_spectrum().h0, b.initial_spectrum().h0);

    a.update(5.0).unwrap();
    b.update(5.0).unwrap();
    assert_eq!(a.displacement_field(), b.displacement_field());
    assert_eq!(a.gradient_field(), b.gradient_field());

    let c = OceanSimulator::with_options(test_params(), cpu_options(1235)).unwrap();
    assert_ne!(a.initial_spectrum().h0, c.initial_spectrum().h0);
}

#[test]
fn test_surface_depends_only_on_time() {
    let mut sim = OceanSimulator::with_options(test_params(), cpu_options(3)).unwrap();

    sim.update(2.0).unwrap();
    let first = sim.surface();

    sim.update(7.0).unwrap();
    sim.update(-1.0).unwrap();
    sim.update(2.0).unwrap();

    assert_eq!(first.displacement, sim.surface().displacement);
    assert_ne!(first.frame_index, sim.surface().frame_index);
}

#[test]
fn test_loop_period_repeats_exactly() {
    let period = 12.0;
    let options = SimulatorOptions {
        spectrum: SpectrumConstants {
            loop_period: Some(period),
            ..SpectrumConstants::default()
        },
        ..cpu_options(5)
    };
    let mut sim = OceanSimulator::with_options(test_params(), options).unwrap();

    for t in [0.5_f32, 3.0, 8.25] {
        sim.update(t).unwrap();
        let first = sim.surface();
        sim.update(t + period).unwrap();
        let second = sim.surface();

        assert_eq!(first.displacement, second.displacement);
        assert_eq!(first.gradient, second.gradient);
    }
}

#[test]
fn test_loop_is_seamless_at_the_wrap() {
    let period = 10.0;
    let options = SimulatorOptions {
        spectrum: SpectrumConstants {
            loop_period: Some(period),
            ..SpectrumConstants::default()
        },
        ..cpu_options(8)
    };
    let mut sim = OceanSimulator::with_options(test_params(), options).unwrap();

    // Quantized frequencies make t = 0 and t → period describe the same phase
    sim.update(0.0).unwrap();
    let start = sim.surface();
    sim.update(period - 1.0e-3).unwrap();
    let end = sim.surface();

    let scale = start.statistics().max_height.abs().max(1e-6);
    for (a, b) in start
        .displacement
        .as_slice()
        .iter()
        .zip(end.displacement.as_slice())
    {
        assert!((a.z - b.z).abs() < 0.05 * scale);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Degenerate parameters
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_invalid_dimensions_are_configuration_errors() {
    for n in [0, 1, 2, 5, 96, 1000] {
        let params = OceanParameters {
            grid_dimension: n,
            ..test_params()
        };
        match OceanSimulator::with_options(params, cpu_options(0)) {
            Err(OceanSimError::Configuration { parameter, .. }) => {
                assert_eq!(parameter, "grid_dimension");
            }
            Err(other) => panic!("dimension {n}: unexpected error {other}"),
            Ok(_) => panic!("dimension {n} should be rejected"),
        }
    }
}

#[test]
fn test_zero_wind_gives_flat_surface() {
    let params = OceanParameters {
        wind_speed: 0.0,
        ..test_params()
    };
    let mut sim = OceanSimulator::with_options(params, cpu_options(0)).unwrap();
    sim.update(4.0).unwrap();

    assert!(sim
        .displacement_field()
        .as_slice()
        .iter()
        .all(|d| d.x == 0.0 && d.y == 0.0 && d.z == 0.0));
    assert!(sim
        .gradient_field()
        .as_slice()
        .iter()
        .all(|g| g.slope == Vec2::zeros() && g.foam == 0.0));
}

#[test]
fn test_zero_choppy_scale_is_purely_vertical() {
    let params = OceanParameters {
        choppy_scale: 0.0,
        ..test_params()
    };
    let mut sim = OceanSimulator::with_options(params, cpu_options(0)).unwrap();
    sim.update(2.5).unwrap();

    let displacement = sim.displacement_field();
    assert!(displacement
        .as_slice()
        .iter()
        .all(|d| d.x == 0.0 && d.y == 0.0));

    let stats = sim.surface().statistics();
    assert!(stats.max_height > stats.min_height);
    assert_eq!(stats.mean_foam, 0.0);
}

#[test]
fn test_surface_is_finite_for_presets() {
    for params in parameter_sets() {
        let mut sim = OceanSimulator::with_options(params, cpu_options(77)).unwrap();
        sim.update(1000.0).unwrap();

        for d in sim.displacement_field().as_slice() {
            assert!(d.iter().all(|v| v.is_finite()));
        }
        for g in sim.gradient_field().as_slice() {
            assert!(g.slope.iter().all(|v| v.is_finite()));
            assert!((0.0..=1.0).contains(&g.foam));
        }
    }
}

#[test]
fn test_storm_is_rougher_than_calm() {
    let calm = OceanParameters {
        grid_dimension: 64,
        patch_length: 500.0,
        ..OceanParameters::calm()
    };
    let storm = OceanParameters {
        grid_dimension: 64,
        patch_length: 500.0,
        ..OceanParameters::storm()
    };

    let mut calm_sim = OceanSimulator::with_options(calm, cpu_options(4)).unwrap();
    let mut storm_sim = OceanSimulator::with_options(storm, cpu_options(4)).unwrap();
    calm_sim.update(3.0).unwrap();
    storm_sim.update(3.0).unwrap();

    assert!(
        storm_sim.surface().statistics().rms_height > calm_sim.surface().statistics().rms_height
    );
}

#[test]
fn test_reinitialize_resets_to_flat() {
    let mut sim = OceanSimulator::with_options(test_params(), cpu_options(2)).unwrap();
    sim.update(1.0).unwrap();
    assert_eq!(sim.state(), SimulatorState::Updated { frame: 1 });

    let calmer = OceanParameters {
        wind_speed: 5.0,
        ..test_params()
    };
    sim.reinitialize(calmer).unwrap();

    assert_eq!(sim.state(), SimulatorState::Initialized);
    assert_eq!(sim.parameters().wind_speed, 5.0);
    assert_eq!(sim.surface().statistics().rms_height, 0.0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// Transform identities
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_transform_round_trip_on_ocean_spectrum() {
    let params = test_params();
    let n = params.grid_dimension;
    let spectrum = initialize(&params, &SpectrumConstants::default(), Some(6)).unwrap();
    let mut transform = SpectralTransform::new(n).unwrap();

    let mut grid = spectrum.h0.clone();
    transform.inverse_in_place(&mut grid);
    transform.forward_in_place(&mut grid);

    let peak = spectrum
        .h0
        .as_slice()
        .iter()
        .map(|c| c.norm())
        .fold(0.0_f32, f32::max);
    for (a, b) in spectrum.h0.as_slice().iter().zip(grid.as_slice()) {
        assert!((a - b).norm() <= 1e-4 * peak);
    }
}
