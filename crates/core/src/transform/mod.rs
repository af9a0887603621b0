//! Fixed-size 2D spectral transform
//!
//! Separable power-of-two FFT over square grids: one parallel batch of row
//! FFTs, a barrier, then one parallel batch of column FFTs. Columns are
//! handled as rows of the transposed grid so both batches stream contiguous
//! memory.
//!
//! The inverse is the unnormalized synthesis sum
//! `f(m) = Σ_j F(j)·e^{+2πi·j·m/N}` and the forward carries the `1/N²`
//! factor, so either composition is the identity.
//!
//! The transform is linear and knows nothing about what the grids represent.
//! Spectra stored in the centered layout (zero frequency at `N/2`) come out
//! multiplied by `(−1)^(x+y)`; [`recenter_spatial`] removes that sign.

use crate::core_types::{ComplexGrid, RealGrid};
use crate::error::OceanSimError;
use crate::spectrum::EvolvedSpectra;
use rayon::prelude::*;
use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Smallest supported grid dimension
pub const MIN_GRID_DIMENSION: usize = 4;

/// Largest supported grid dimension
pub const MAX_GRID_DIMENSION: usize = 4096;

/// Check that `dimension` is a power of two within the supported range
///
/// # Errors
///
/// Returns `OceanSimError::Configuration` otherwise.
pub fn validate_dimension(dimension: usize) -> Result<(), OceanSimError> {
    if dimension.is_power_of_two()
        && (MIN_GRID_DIMENSION..=MAX_GRID_DIMENSION).contains(&dimension)
    {
        Ok(())
    } else {
        Err(OceanSimError::configuration(
            "grid_dimension",
            format!(
                "must be a power of two in {MIN_GRID_DIMENSION}..={MAX_GRID_DIMENSION}, got {dimension}"
            ),
        ))
    }
}

/// Spatial-domain height and choppy fields for one instant
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialFields {
    /// Vertical displacement before amplitude scaling
    pub height: RealGrid,
    /// Horizontal x displacement before choppy scaling
    pub choppy_x: RealGrid,
    /// Horizontal y displacement before choppy scaling
    pub choppy_y: RealGrid,
}

impl SpatialFields {
    /// Allocate zeroed fields
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::ResourceAllocation` if any grid cannot be allocated.
    pub fn try_new(dimension: usize) -> Result<Self, OceanSimError> {
        Ok(Self {
            height: RealGrid::try_filled(dimension, 0.0)?,
            choppy_x: RealGrid::try_filled(dimension, 0.0)?,
            choppy_y: RealGrid::try_filled(dimension, 0.0)?,
        })
    }
}

/// 2D FFT planned once for a fixed `N × N` size
pub struct SpectralTransform {
    dimension: usize,
    inverse: Arc<dyn Fft<f32>>,
    forward: Arc<dyn Fft<f32>>,
    // Transposed copy used for the column batch
    workspace: Vec<Complex32>,
}

impl SpectralTransform {
    /// Plan transforms for `dimension × dimension` grids
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::Configuration` for a non-power-of-two or
    /// unsupported dimension, `OceanSimError::ResourceAllocation` if the
    /// workspace cannot be allocated.
    pub fn new(dimension: usize) -> Result<Self, OceanSimError> {
        validate_dimension(dimension)?;

        let mut planner = FftPlanner::<f32>::new();
        let inverse = planner.plan_fft_inverse(dimension);
        let forward = planner.plan_fft_forward(dimension);

        let workspace = ComplexGrid::try_filled(dimension, Complex32::new(0.0, 0.0))?.data;

        Ok(Self {
            dimension,
            inverse,
            forward,
            workspace,
        })
    }

    /// Grid dimension the transform was planned for
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Unnormalized inverse transform, in place
    ///
    /// # Panics
    ///
    /// Panics if `grid` does not match the planned dimension.
    pub fn inverse_in_place(&mut self, grid: &mut ComplexGrid) {
        let fft = Arc::clone(&self.inverse);
        self.separable(grid, fft.as_ref());
    }

    /// Forward transform scaled by `1/N²`, in place
    ///
    /// # Panics
    ///
    /// Panics if `grid` does not match the planned dimension.
    pub fn forward_in_place(&mut self, grid: &mut ComplexGrid) {
        let fft = Arc::clone(&self.forward);
        self.separable(grid, fft.as_ref());

        let scale = 1.0 / (self.dimension * self.dimension) as f32;
        grid.as_mut_slice()
            .par_iter_mut()
            .for_each(|value| *value *= scale);
    }

    /// Inverse-transform a spectrum into a new spatial grid (real part)
    ///
    /// No recentering sign is applied.
    pub fn inverse_transform_2d(&mut self, spectrum: &ComplexGrid) -> RealGrid {
        let mut work = spectrum.clone();
        self.inverse_in_place(&mut work);
        RealGrid {
            data: work.data.iter().map(|c| c.re).collect(),
            dimension: work.dimension,
        }
    }

    /// Forward-transform a real spatial grid into a new spectrum
    pub fn forward_transform_2d(&mut self, field: &RealGrid) -> ComplexGrid {
        let mut work = ComplexGrid {
            data: field.data.iter().map(|&v| Complex32::new(v, 0.0)).collect(),
            dimension: field.dimension,
        };
        self.forward_in_place(&mut work);
        work
    }

    /// Bring all three evolved spectra to the spatial domain
    ///
    /// Each spectrum is inverse-transformed in place, one after the other, and
    /// its recentered real part written to the matching spatial field.
    pub fn transform_spectra(&mut self, spectra: &mut EvolvedSpectra, out: &mut SpatialFields) {
        self.inverse_in_place(&mut spectra.height);
        extract_recentered(&spectra.height, &mut out.height);

        self.inverse_in_place(&mut spectra.choppy_x);
        extract_recentered(&spectra.choppy_x, &mut out.choppy_x);

        self.inverse_in_place(&mut spectra.choppy_y);
        extract_recentered(&spectra.choppy_y, &mut out.choppy_y);
    }

    fn separable(&mut self, grid: &mut ComplexGrid, fft: &dyn Fft<f32>) {
        let n = self.dimension;
        assert_eq!(grid.dimension, n, "Grid dimension does not match transform");

        let data = grid.as_mut_slice();
        fft_rows(data, n, fft);
        transpose(data, &mut self.workspace, n);
        fft_rows(&mut self.workspace, n, fft);
        transpose(&self.workspace, data, n);
    }
}

/// One parallel batch of length-`n` FFTs over consecutive rows
fn fft_rows(data: &mut [Complex32], n: usize, fft: &dyn Fft<f32>) {
    let scratch_len = fft.get_inplace_scratch_len();
    data.par_chunks_mut(n).for_each_init(
        || vec![Complex32::new(0.0, 0.0); scratch_len],
        |scratch, row| fft.process_with_scratch(row, scratch),
    );
}

fn transpose(src: &[Complex32], dst: &mut [Complex32], n: usize) {
    dst.par_chunks_mut(n).enumerate().for_each(|(row, out)| {
        for (col, value) in out.iter_mut().enumerate() {
            *value = src[col * n + row];
        }
    });
}

/// Sign `(−1)^(x+y)` that maps a centered-layout inverse back to true values
#[inline]
#[must_use]
pub fn recenter_sign(x: usize, y: usize) -> f32 {
    if (x + y) % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

/// Multiply every cell by `(−1)^(x+y)`
pub fn recenter_spatial(grid: &mut RealGrid) {
    let n = grid.dimension;
    grid.as_mut_slice()
        .par_chunks_mut(n)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, value) in row.iter_mut().enumerate() {
                *value *= recenter_sign(x, y);
            }
        });
}

/// Write the recentered real part of an inverse-transformed spectrum into `out`
pub fn extract_recentered(spatial: &ComplexGrid, out: &mut RealGrid) {
    let n = spatial.dimension;
    let src = spatial.as_slice();
    out.as_mut_slice()
        .par_chunks_mut(n)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, value) in row.iter_mut().enumerate() {
                *value = src[y * n + x].re * recenter_sign(x, y);
            }
        });
}
