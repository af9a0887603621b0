//! Statistical wave spectrum: generation and time evolution
//!
//! The spectrum lives on a centered layout: frequency cell `(x, y)` holds the
//! wave vector `k = 2π/L · (x − N/2, y − N/2)`, so `k = 0` sits at the grid
//! center and the `−k` partner of `(x, y)` is `((N − x) mod N, (N − y) mod N)`.
//! Row 0 and column 0 are the Nyquist frequencies; they have no distinct
//! partner and are kept at zero.

mod evolver;
mod initializer;
mod phillips;

pub use evolver::evolve;
pub use initializer::initialize;
pub use phillips::PhillipsSpectrum;

use crate::core_types::{ComplexGrid, RealGrid, Vec2};
use crate::error::OceanSimError;
use rustfft::num_complex::Complex32;
use std::f32::consts::TAU;

/// Wave vectors shorter than this are treated as `k = 0`
pub(crate) const MIN_WAVE_NUMBER: f32 = 1.0e-6;

/// Initial spectrum `H0(k)` and angular frequency table `ω(k)`
///
/// Written once at initialization, read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialSpectrum {
    /// Complex Gaussian amplitudes shaped by the Phillips spectrum
    pub h0: ComplexGrid,
    /// Angular frequency per cell (rad/s)
    pub omega: RealGrid,
    /// World-space patch length the wave vectors were derived from
    pub patch_length: f32,
}

impl InitialSpectrum {
    /// Cells per side
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.h0.dimension
    }
}

/// Height and choppy spectra for one instant
#[derive(Debug, Clone, PartialEq)]
pub struct EvolvedSpectra {
    /// Height spectrum `Ĥ(k, t)`
    pub height: ComplexGrid,
    /// Horizontal x displacement spectrum `D̂x(k, t)`
    pub choppy_x: ComplexGrid,
    /// Horizontal y displacement spectrum `D̂y(k, t)`
    pub choppy_y: ComplexGrid,
}

impl EvolvedSpectra {
    /// Allocate zeroed spectra
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::ResourceAllocation` if any grid cannot be allocated.
    pub fn try_new(dimension: usize) -> Result<Self, OceanSimError> {
        let zero = Complex32::new(0.0, 0.0);
        Ok(Self {
            height: ComplexGrid::try_filled(dimension, zero)?,
            choppy_x: ComplexGrid::try_filled(dimension, zero)?,
            choppy_y: ComplexGrid::try_filled(dimension, zero)?,
        })
    }
}

/// Wave vector of frequency cell `(x, y)` on an `n × n` grid of a patch
/// `patch_length` meters wide
#[inline]
#[must_use]
pub fn wave_vector(x: usize, y: usize, n: usize, patch_length: f32) -> Vec2 {
    let half = (n / 2) as f32;
    let scale = TAU / patch_length;
    Vec2::new((x as f32 - half) * scale, (y as f32 - half) * scale)
}

/// Row-major index of the `−k` partner of cell `(x, y)`
#[inline]
#[must_use]
pub fn conjugate_index(x: usize, y: usize, n: usize) -> usize {
    ((n - y) % n) * n + (n - x) % n
}

/// Total spectral energy `Σ|c|²`, accumulated in f64
#[must_use]
pub fn spectral_energy(grid: &ComplexGrid) -> f64 {
    grid.as_slice()
        .iter()
        .map(|c| f64::from(c.norm_sqr()))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wave_vector_is_centered() {
        let k = wave_vector(8, 8, 16, 100.0);
        assert_eq!(k, Vec2::zeros());

        let k = wave_vector(9, 6, 16, 100.0);
        assert!((k.x - TAU / 100.0).abs() < 1e-7);
        assert!((k.y + 2.0 * TAU / 100.0).abs() < 1e-7);
    }

    #[test]
    fn test_conjugate_partner_negates_wave_vector() {
        let n = 16;
        for (x, y) in [(1, 1), (3, 12), (8, 8), (15, 9)] {
            let partner = conjugate_index(x, y, n);
            let (px, py) = (partner % n, partner / n);
            let k = wave_vector(x, y, n, 50.0);
            let k_partner = wave_vector(px, py, n, 50.0);
            assert!((k + k_partner).norm() < 1e-6);
        }
    }

    #[test]
    fn test_nyquist_cells_are_self_partnered() {
        assert_eq!(conjugate_index(0, 0, 8), 0);
        assert_eq!(conjugate_index(0, 3, 8), 5 * 8);
        assert_eq!(conjugate_index(3, 0, 8), 5);
    }

    #[test]
    fn test_spectral_energy() {
        let mut grid = ComplexGrid::zeros(4);
        grid.set(1, 1, Complex32::new(3.0, 4.0));
        grid.set(2, 3, Complex32::new(0.0, -1.0));
        assert_eq!(spectral_energy(&grid), 26.0);
    }
}
