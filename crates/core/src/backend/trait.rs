//! Compute backend trait definition
//!
//! This module defines the `ComputeBackend` trait, the grid-buffer and compute
//! capability the simulator drives once per frame. Both CPU and GPU
//! implementations implement this trait.

use crate::compose::ComposeSettings;
use crate::core_types::{DisplacementField, GradientField};
use crate::error::OceanSimError;
use crate::spectrum::InitialSpectrum;

/// Backend-agnostic interface for the per-frame ocean pipeline
///
/// A backend owns every persistent buffer for one grid dimension. A frame is
/// `evolve → transform → compose → read_surface`; each step consumes the
/// output of the previous one.
pub trait ComputeBackend: Send + Sync {
    /// Upload a freshly generated initial spectrum
    ///
    /// Replaces any previous spectrum. Later frames evolve from this one.
    ///
    /// # Arguments
    ///
    /// * `spectrum` - `H0` and `ω` tables, same dimension as the backend
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::Configuration` if the dimension does not match.
    fn upload_spectrum(&mut self, spectrum: &InitialSpectrum) -> Result<(), OceanSimError>;

    /// Evolve the uploaded spectrum to `time`
    ///
    /// # Arguments
    ///
    /// * `time` - Effective time in seconds, already scaled by `time_scale`
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::Backend` if the device fails.
    fn evolve(&mut self, time: f32) -> Result<(), OceanSimError>;

    /// Inverse-transform the three evolved spectra to the spatial domain
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::Backend` if the device fails.
    fn transform(&mut self) -> Result<(), OceanSimError>;

    /// Compose displacement, gradient and foam from the spatial fields
    ///
    /// # Arguments
    ///
    /// * `settings` - Choppy scale, wave amplitude and cell length
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::Backend` if the device fails.
    fn compose(&mut self, settings: &ComposeSettings) -> Result<(), OceanSimError>;

    /// Copy the composed surface into caller-owned fields
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::Backend` if the readback fails.
    fn read_surface(
        &mut self,
        displacement: &mut DisplacementField,
        gradient: &mut GradientField,
    ) -> Result<(), OceanSimError>;

    /// Grid cells per side
    fn dimension(&self) -> usize;

    /// Check if this is the GPU backend
    ///
    /// # Returns
    ///
    /// `true` if GPU-accelerated, `false` if CPU-only
    fn is_gpu_accelerated(&self) -> bool;

    /// Human-readable backend description for logging
    fn name(&self) -> &str;
}
