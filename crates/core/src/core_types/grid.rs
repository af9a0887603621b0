//! Square grid storage shared by every stage of the ocean pipeline
//!
//! All per-cell arrays (initial spectrum, angular frequency, evolved spectra,
//! spatial fields and the published surface) use the same row-major layout,
//! `index = y * dimension + x`, so a cell index means the same thing in every
//! stage.

use super::vec::{Vec2, Vec3};
use crate::error::OceanSimError;
use rustfft::num_complex::Complex32;

/// Square row-major grid of `dimension × dimension` cells
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    /// Cell values in row-major order (y * dimension + x)
    pub data: Vec<T>,
    /// Cells per side
    pub dimension: usize,
}

/// Frequency-domain grid (complex amplitude per cell)
pub type ComplexGrid = Grid<Complex32>;

/// Spatial-domain scalar grid
pub type RealGrid = Grid<f32>;

/// Per-cell surface displacement `(horizontal x, horizontal y, vertical)`
pub type DisplacementField = Grid<Vec3>;

/// Per-cell surface slope and foam indicator
pub type GradientField = Grid<GradientSample>;

impl<T: Copy> Grid<T> {
    /// Create a grid with every cell set to `value`
    ///
    /// # Panics
    ///
    /// Panics if the allocation fails. Use [`Grid::try_filled`] where the
    /// failure must be reported instead.
    #[must_use]
    pub fn filled(dimension: usize, value: T) -> Self {
        Self {
            data: vec![value; dimension * dimension],
            dimension,
        }
    }

    /// Create a grid with every cell set to `value`, reporting allocation failure
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::ResourceAllocation` if the cell count overflows
    /// or the allocator cannot provide the buffer.
    pub fn try_filled(dimension: usize, value: T) -> Result<Self, OceanSimError> {
        let cells = dimension.checked_mul(dimension).ok_or_else(|| {
            OceanSimError::ResourceAllocation(format!(
                "{dimension}x{dimension} grid overflows the address space"
            ))
        })?;

        let mut data = Vec::new();
        data.try_reserve_exact(cells).map_err(|e| {
            OceanSimError::ResourceAllocation(format!(
                "cannot allocate {dimension}x{dimension} grid: {e}"
            ))
        })?;
        data.resize(cells, value);

        Ok(Self { data, dimension })
    }

    /// Number of cells (`dimension²`)
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.data.len()
    }

    /// Row-major index of cell `(x, y)`
    #[inline]
    #[must_use]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.dimension + x
    }

    /// Get value at grid position
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> T {
        assert!(
            x < self.dimension && y < self.dimension,
            "Coordinates out of bounds"
        );
        self.data[y * self.dimension + x]
    }

    /// Set value at grid position
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        assert!(
            x < self.dimension && y < self.dimension,
            "Coordinates out of bounds"
        );
        self.data[y * self.dimension + x] = value;
    }

    /// Get value at a signed position, wrapping around the periodic patch
    #[inline]
    #[must_use]
    pub fn get_wrapped(&self, x: isize, y: isize) -> T {
        let n = self.dimension as isize;
        let wx = x.rem_euclid(n) as usize;
        let wy = y.rem_euclid(n) as usize;
        self.data[wy * self.dimension + wx]
    }

    /// Get reference to cell data
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get mutable reference to cell data
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Fill entire grid with a value
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl ComplexGrid {
    /// Complex grid of zeros
    #[must_use]
    pub fn zeros(dimension: usize) -> Self {
        Self::filled(dimension, Complex32::new(0.0, 0.0))
    }
}

impl RealGrid {
    /// Real grid of zeros
    #[must_use]
    pub fn zeros(dimension: usize) -> Self {
        Self::filled(dimension, 0.0)
    }
}

impl DisplacementField {
    /// Flat surface: no displacement anywhere
    #[must_use]
    pub fn flat(dimension: usize) -> Self {
        Self::filled(dimension, Vec3::zeros())
    }
}

impl GradientField {
    /// Flat surface: zero slope, no foam
    #[must_use]
    pub fn flat(dimension: usize) -> Self {
        Self::filled(dimension, GradientSample::flat())
    }
}

/// Surface slope and foam indicator for one cell
///
/// `slope` is `(∂z/∂x, ∂z/∂y)` in world units. `foam` is in `[0, 1]` and grows
/// as neighbouring water parcels are compressed or folded by the choppy
/// displacement.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientSample {
    /// Height gradient `(∂z/∂x, ∂z/∂y)`
    pub slope: Vec2,
    /// Folding indicator, 0 = undisturbed, 1 = fully folded
    pub foam: f32,
}

impl GradientSample {
    /// Zero slope, no foam
    #[must_use]
    pub fn flat() -> Self {
        Self {
            slope: Vec2::zeros(),
            foam: 0.0,
        }
    }

    /// Unit surface normal derived from the slope (z up)
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        Vec3::new(-self.slope.x, -self.slope.y, 1.0).normalize()
    }
}
