//! FFT Ocean Simulation Core Library
//!
//! Computes a tiling, time-varying ocean surface for real-time rendering using
//! the statistical wave model popularized by Tessendorf:
//!
//! - Phillips spectrum and complex Gaussian initial amplitudes
//! - Deep-water dispersion for time evolution
//! - Choppy (horizontal) displacement spectra
//! - Separable 2D inverse FFT to the spatial domain
//! - Finite-difference slopes and Jacobian-based foam
//!
//! ## Backends
//!
//! The per-frame pipeline runs on a CPU backend (Rayon + rustfft) or, with the
//! default `gpu` feature, on wgpu compute shaders. See [`backend`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use ocean_sim_core::{OceanParameters, OceanSimulator};
//!
//! let mut ocean = OceanSimulator::new(OceanParameters::default())?;
//! ocean.update(1.5)?;
//! let height = ocean.displacement_field().get(10, 20).z;
//! # Ok::<(), ocean_sim_core::OceanSimError>(())
//! ```

pub mod backend;
pub mod compose;
pub mod core_types;
pub mod error;
pub mod simulation;
pub mod spectrum;
pub mod transform;

// Re-export core types
pub use core_types::{
    BackendPreference, ComplexGrid, DisplacementField, GradientField, GradientSample, Grid,
    OceanParameters, QualityPreset, RealGrid, SimulatorOptions, SpectrumConstants, Vec2, Vec3,
};
pub use error::OceanSimError;

// Re-export pipeline types
pub use backend::{create_backend, ComputeBackend, CpuBackend, GpuInitResult};
pub use compose::ComposeSettings;
pub use simulation::{
    OceanSimulator, SimulatorState, SurfaceFrame, SurfaceReader, SurfaceStatistics,
};
pub use spectrum::{EvolvedSpectra, InitialSpectrum};
pub use transform::{SpatialFields, SpectralTransform};

#[cfg(feature = "gpu")]
pub use backend::{GpuBackend, GpuContext};
