//! Initial spectrum generation
//!
//! Draws one complex Gaussian per frequency cell and shapes it by the
//! Phillips spectrum:
//!
//! ```text
//! H0(k) = (ξr + i·ξi) · √(P(k)/2),   ξ ~ N(0, 1)
//! ω(k)  = √(g·|k|)
//! ```
//!
//! Two draws are taken for every cell in row-major order, including cells that
//! end up zeroed, so the draw sequence depends only on the seed and dimension.

use super::{wave_vector, InitialSpectrum, PhillipsSpectrum};
use crate::core_types::{ComplexGrid, OceanParameters, RealGrid, SpectrumConstants};
use crate::error::OceanSimError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rustfft::num_complex::Complex32;
use std::f32::consts::TAU;
use tracing::debug;

/// Build `H0` and `ω` for the given parameters
///
/// # Arguments
///
/// * `params` - Wave model parameters
/// * `constants` - Spectrum constants (gravity, Phillips constant, loop period)
/// * `seed` - RNG seed; `None` seeds from OS entropy
///
/// # Errors
///
/// Returns `OceanSimError::Configuration` for invalid parameters and
/// `OceanSimError::ResourceAllocation` if the grids cannot be allocated.
pub fn initialize(
    params: &OceanParameters,
    constants: &SpectrumConstants,
    seed: Option<u64>,
) -> Result<InitialSpectrum, OceanSimError> {
    params.validate()?;
    constants.validate()?;

    let n = params.grid_dimension;
    let mut h0 = ComplexGrid::try_filled(n, Complex32::new(0.0, 0.0))?;
    let mut omega = RealGrid::try_filled(n, 0.0)?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let phillips = PhillipsSpectrum::new(params, constants);
    let omega_step = loop_frequency(constants, params.time_scale);
    let center = n / 2;

    for y in 0..n {
        for x in 0..n {
            let xi_r: f32 = rng.sample(StandardNormal);
            let xi_i: f32 = rng.sample(StandardNormal);

            let k = wave_vector(x, y, n, params.patch_length);
            let idx = y * n + x;

            omega.data[idx] = dispersion(k.norm(), constants.gravity, omega_step);

            // Nyquist row/column and the mean level stay at zero
            if x == 0 || y == 0 || (x == center && y == center) {
                continue;
            }

            let amplitude = (phillips.evaluate(k) * 0.5).sqrt();
            h0.data[idx] = Complex32::new(xi_r, xi_i) * amplitude;
        }
    }

    debug!(
        "Initialized {}x{} spectrum: L={:.2}m, seed={:?}, loop step={:?}",
        n,
        n,
        phillips.largest_wave(),
        seed,
        omega_step
    );

    Ok(InitialSpectrum {
        h0,
        omega,
        patch_length: params.patch_length,
    })
}

/// Base angular frequency `ω0 = 2π / (T · |time_scale|)` when looping is enabled
fn loop_frequency(constants: &SpectrumConstants, time_scale: f32) -> Option<f32> {
    let period = constants.loop_period?;
    let scaled_period = period * time_scale.abs();
    (scaled_period > 0.0).then_some(TAU / scaled_period)
}

/// Deep-water dispersion `ω = √(g|k|)`, quantized down to a multiple of
/// `omega_step` when given
fn dispersion(k_len: f32, gravity: f32, omega_step: Option<f32>) -> f32 {
    let omega = (gravity * k_len).sqrt();
    match omega_step {
        Some(step) => (omega / step).floor() * step,
        None => omega,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Vec2;

    fn small_params() -> OceanParameters {
        OceanParameters {
            grid_dimension: 32,
            patch_length: 200.0,
            wind_dependency: 0.5,
            ..OceanParameters::default()
        }
    }

    #[test]
    fn test_mean_level_and_nyquist_are_zero() {
        let params = small_params();
        let spectrum = initialize(&params, &SpectrumConstants::default(), Some(7)).unwrap();
        let n = params.grid_dimension;
        let zero = Complex32::new(0.0, 0.0);

        assert_eq!(spectrum.h0.get(n / 2, n / 2), zero);
        for i in 0..n {
            assert_eq!(spectrum.h0.get(0, i), zero);
            assert_eq!(spectrum.h0.get(i, 0), zero);
        }
        assert!(spectrum.h0.as_slice().iter().any(|c| c.norm() > 0.0));
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let params = small_params();
        let constants = SpectrumConstants::default();
        let a = initialize(&params, &constants, Some(42)).unwrap();
        let b = initialize(&params, &constants, Some(42)).unwrap();
        let c = initialize(&params, &constants, Some(43)).unwrap();

        assert_eq!(a, b);
        assert_ne!(a.h0, c.h0);
    }

    #[test]
    fn test_zero_wind_gives_zero_spectrum() {
        let params = OceanParameters {
            wind_speed: 0.0,
            ..small_params()
        };
        let spectrum = initialize(&params, &SpectrumConstants::default(), Some(1)).unwrap();
        assert!(spectrum.h0.as_slice().iter().all(|c| c.norm() == 0.0));
    }

    #[test]
    fn test_omega_follows_dispersion() {
        let params = small_params();
        let constants = SpectrumConstants::default();
        let spectrum = initialize(&params, &constants, Some(0)).unwrap();

        let k = wave_vector(20, 9, 32, params.patch_length);
        let expected = (constants.gravity * k.norm()).sqrt();
        assert!((spectrum.omega.get(20, 9) - expected).abs() < 1e-5);
        assert_eq!(spectrum.omega.get(16, 16), 0.0);
    }

    #[test]
    fn test_loop_period_quantizes_omega() {
        let params = small_params();
        let constants = SpectrumConstants {
            loop_period: Some(20.0),
            ..SpectrumConstants::default()
        };
        let spectrum = initialize(&params, &constants, Some(0)).unwrap();
        let step = TAU / (20.0 * params.time_scale);

        for &omega in spectrum.omega.as_slice() {
            let multiple = omega / step;
            assert!((multiple - multiple.round()).abs() < 1e-3);
        }
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let params = OceanParameters {
            wind_direction: Vec2::zeros(),
            ..small_params()
        };
        let err = initialize(&params, &SpectrumConstants::default(), Some(0)).unwrap_err();
        assert!(err.is_configuration());
    }
}
