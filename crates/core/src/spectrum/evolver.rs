//! Spectrum time evolution
//!
//! ```text
//! Ĥ(k, t)  = H0(k)·e^{iωt} + conj(H0(−k))·e^{−iωt}
//! D̂x(k, t) = −i·(kx/|k|)·Ĥ(k, t)
//! D̂y(k, t) = −i·(ky/|k|)·Ĥ(k, t)
//! ```
//!
//! The conjugate-symmetric pairing makes the spatial fields real. The
//! evolution is pure: identical inputs always give identical spectra.

use super::{conjugate_index, wave_vector, EvolvedSpectra, InitialSpectrum, MIN_WAVE_NUMBER};
use rayon::prelude::*;
use rustfft::num_complex::Complex32;

/// Evolve the initial spectrum to time `time` (already scaled by `time_scale`)
///
/// Rows are processed in parallel. All three output grids must have the same
/// dimension as `initial`.
///
/// # Arguments
///
/// * `initial` - `H0` and `ω` tables
/// * `time` - Effective simulation time in seconds
/// * `out` - Destination for `Ĥ`, `D̂x` and `D̂y`
pub fn evolve(initial: &InitialSpectrum, time: f32, out: &mut EvolvedSpectra) {
    let n = initial.dimension();
    let patch_length = initial.patch_length;
    let h0 = initial.h0.as_slice();
    let omega = initial.omega.as_slice();

    out.height
        .as_mut_slice()
        .par_chunks_mut(n)
        .zip(out.choppy_x.as_mut_slice().par_chunks_mut(n))
        .zip(out.choppy_y.as_mut_slice().par_chunks_mut(n))
        .enumerate()
        .for_each(|(y, ((height_row, dx_row), dy_row))| {
            for x in 0..n {
                let idx = y * n + x;
                let (sin, cos) = (omega[idx] * time).sin_cos();

                let h0_k = h0[idx];
                let h0_minus_k = h0[conjugate_index(x, y, n)].conj();
                let height =
                    h0_k * Complex32::new(cos, sin) + h0_minus_k * Complex32::new(cos, -sin);

                let k = wave_vector(x, y, n, patch_length);
                let k_len = k.norm();
                let (dx, dy) = if k_len < MIN_WAVE_NUMBER {
                    (Complex32::new(0.0, 0.0), Complex32::new(0.0, 0.0))
                } else {
                    (
                        Complex32::new(0.0, -k.x / k_len) * height,
                        Complex32::new(0.0, -k.y / k_len) * height,
                    )
                };

                height_row[x] = height;
                dx_row[x] = dx;
                dy_row[x] = dy;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{OceanParameters, SpectrumConstants};
    use crate::spectrum::{initialize, spectral_energy};

    fn spectrum(wind_dependency: f32) -> InitialSpectrum {
        let params = OceanParameters {
            grid_dimension: 32,
            patch_length: 300.0,
            wind_dependency,
            ..OceanParameters::default()
        };
        initialize(&params, &SpectrumConstants::default(), Some(3)).unwrap()
    }

    #[test]
    fn test_mean_level_stays_zero() {
        let initial = spectrum(0.5);
        let mut out = EvolvedSpectra::try_new(32).unwrap();
        let zero = Complex32::new(0.0, 0.0);

        for t in [0.0, 1.7, 123.0] {
            evolve(&initial, t, &mut out);
            assert_eq!(out.height.get(16, 16), zero);
            assert_eq!(out.choppy_x.get(16, 16), zero);
            assert_eq!(out.choppy_y.get(16, 16), zero);
        }
    }

    #[test]
    fn test_evolved_spectrum_is_conjugate_symmetric() {
        let initial = spectrum(0.5);
        let mut out = EvolvedSpectra::try_new(32).unwrap();
        evolve(&initial, 2.5, &mut out);

        for (x, y) in [(3, 5), (17, 30), (31, 1)] {
            let a = out.height.get(x, y);
            let b = out.height.data[conjugate_index(x, y, 32)].conj();
            assert!((a - b).norm() <= 1e-6 * a.norm().max(1e-12));
        }
    }

    #[test]
    fn test_energy_is_conserved_without_upwind_waves() {
        let initial = spectrum(0.0);
        let n = initial.dimension();
        let mut expected = 0.0_f64;
        for y in 0..n {
            for x in 0..n {
                let a = initial.h0.data[y * n + x].norm_sqr();
                let b = initial.h0.data[conjugate_index(x, y, n)].norm_sqr();
                expected += f64::from(a) + f64::from(b);
            }
        }
        assert!(expected > 0.0);

        let mut out = EvolvedSpectra::try_new(n).unwrap();
        for t in [0.0, 0.3, 4.0, 57.5] {
            evolve(&initial, t, &mut out);
            let energy = spectral_energy(&out.height);
            assert!(
                ((energy - expected) / expected).abs() < 1e-4,
                "energy drifted at t={t}: {energy} vs {expected}"
            );
        }
    }

    #[test]
    fn test_choppy_spectra_follow_wave_direction() {
        let initial = spectrum(0.5);
        let mut out = EvolvedSpectra::try_new(32).unwrap();
        evolve(&initial, 1.0, &mut out);

        // Cell (20, 16) has k along +x only
        assert_eq!(out.choppy_y.get(20, 16), Complex32::new(0.0, 0.0));
        let h = out.height.get(20, 16);
        let dx = out.choppy_x.get(20, 16);
        assert!((dx - Complex32::new(h.im, -h.re)).norm() < 1e-6);
    }
}
