//! GPU Consistency Suite
//!
//! Compares the GPU backend against the CPU backend through the full
//! simulator. If no GPU is available the tests pass (graceful degradation).
//!
//! Run tests with: cargo test --test `gpu_consistency`

use ocean_sim_core::{
    BackendPreference, OceanParameters, OceanSimError, OceanSimulator, SimulatorOptions,
};

/// Displacement tolerance relative to the largest CPU displacement.
/// GPU `sin`/`cos` and the Stockham twiddles differ from rustfft by a few ULP
/// per stage; over 2·log2(N) stages that stays well below 0.1%.
const RELATIVE_TOLERANCE: f32 = 1.0e-3;

fn simulator(backend: BackendPreference) -> Result<OceanSimulator, OceanSimError> {
    let params = OceanParameters {
        grid_dimension: 128,
        patch_length: 800.0,
        ..OceanParameters::default()
    };
    let options = SimulatorOptions {
        seed: Some(99),
        backend,
        ..SimulatorOptions::default()
    };
    OceanSimulator::with_options(params, options)
}

#[test]
fn test_gpu_cpu_surface_comparison() {
    let Ok(mut gpu) = simulator(BackendPreference::Gpu) else {
        return;
    };
    let mut cpu = simulator(BackendPreference::Cpu).unwrap();
    assert!(gpu.is_gpu_accelerated());

    for t in [0.0, 1.25, 6.0] {
        gpu.update(t).unwrap();
        cpu.update(t).unwrap();

        let scale = cpu
            .displacement_field()
            .as_slice()
            .iter()
            .fold(0.0_f32, |m, d| m.max(d.amax()));
        assert!(scale > 0.0);

        for (g, c) in gpu
            .displacement_field()
            .as_slice()
            .iter()
            .zip(cpu.displacement_field().as_slice())
        {
            assert!(
                (g - c).amax() <= RELATIVE_TOLERANCE * scale,
                "t={t}: GPU {g:?} vs CPU {c:?}"
            );
        }

        let gpu_foam = gpu.surface().statistics().mean_foam;
        let cpu_foam = cpu.surface().statistics().mean_foam;
        assert!((gpu_foam - cpu_foam).abs() < 1.0e-3);
    }
}

#[test]
fn test_gpu_requirement_reports_allocation_error() {
    match simulator(BackendPreference::Gpu) {
        Ok(sim) => assert!(sim.is_gpu_accelerated()),
        Err(e) => assert!(matches!(e, OceanSimError::ResourceAllocation(_)), "{e}"),
    }
}
