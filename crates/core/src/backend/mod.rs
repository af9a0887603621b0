//! Compute backends for the ocean pipeline
//!
//! The core abstraction is the `ComputeBackend` trait, implemented by a CPU
//! backend and a wgpu GPU backend.
//!
//! # Feature Flags
//!
//! - `gpu` (default): Enables GPU acceleration via wgpu. Disable with `--no-default-features`
//!   for environments without GPU access.
//!
//! # Backend Selection
//!
//! With `BackendPreference::Auto` the best available backend is chosen:
//! 1. Try GPU (if `gpu` feature enabled, hardware available and large enough)
//! 2. Fall back to CPU (always available)
//!
//! `BackendPreference::Gpu` turns every GPU failure into an error instead.
//!
//! # Example
//!
//! ```rust,ignore
//! use ocean_sim_core::backend::create_backend;
//! use ocean_sim_core::BackendPreference;
//!
//! let backend = create_backend(256, BackendPreference::Auto)?;
//! println!("running on {}", backend.name());
//! ```

mod context;
mod cpu;
#[allow(clippy::module_name_repetitions)]
mod r#trait;

#[cfg(feature = "gpu")]
mod gpu;

pub use context::GpuInitResult;
pub use cpu::CpuBackend;
pub use r#trait::ComputeBackend;

#[cfg(feature = "gpu")]
pub use context::GpuContext;
#[cfg(feature = "gpu")]
pub use gpu::GpuBackend;

use crate::core_types::BackendPreference;
use crate::error::OceanSimError;
use crate::transform::validate_dimension;
use tracing::info;

#[cfg(feature = "gpu")]
use tracing::warn;

/// Create a compute backend for `dimension × dimension` grids
///
/// # Arguments
///
/// * `dimension` - Grid cells per side
/// * `preference` - Which backend to use
///
/// # Returns
///
/// A boxed `ComputeBackend` trait object
///
/// # Errors
///
/// Returns `OceanSimError::Configuration` for an unsupported dimension and
/// `OceanSimError::ResourceAllocation` if the requested backend cannot provide
/// its buffers (including a missing GPU when `Gpu` is required).
pub fn create_backend(
    dimension: usize,
    preference: BackendPreference,
) -> Result<Box<dyn ComputeBackend>, OceanSimError> {
    validate_dimension(dimension)?;

    if preference == BackendPreference::Cpu {
        info!("Using CPU backend ({}x{} grid)", dimension, dimension);
        return Ok(Box::new(CpuBackend::new(dimension)?));
    }

    #[cfg(feature = "gpu")]
    {
        let required = preference == BackendPreference::Gpu;

        match GpuContext::new() {
            GpuInitResult::Success(gpu_context) => match gpu_context.check_capacity(dimension) {
                Ok(()) => {
                    info!(
                        "Using GPU backend: {} ({}x{} grid)",
                        gpu_context.adapter_name(),
                        dimension,
                        dimension
                    );
                    match GpuBackend::new(gpu_context, dimension) {
                        Ok(backend) => return Ok(Box::new(backend)),
                        Err(e) if required || e.is_configuration() => return Err(e),
                        Err(e) => warn!("GPU backend setup failed: {}. Falling back to CPU.", e),
                    }
                }
                Err(reason) if required => {
                    return Err(OceanSimError::ResourceAllocation(format!(
                        "GPU '{}' cannot hold a {dimension}x{dimension} grid: {reason}",
                        gpu_context.adapter_name()
                    )));
                }
                Err(reason) => warn!(
                    "GPU cannot hold a {}x{} grid ({}), falling back to CPU",
                    dimension, dimension, reason
                ),
            },
            GpuInitResult::NoGpuFound => {
                if required {
                    return Err(OceanSimError::ResourceAllocation(
                        "no GPU adapter found".to_string(),
                    ));
                }
                info!("No GPU found, using CPU backend");
            }
            GpuInitResult::InitFailed {
                adapter_name,
                error,
            } => {
                if required {
                    return Err(OceanSimError::ResourceAllocation(format!(
                        "GPU '{adapter_name}' failed to initialize: {error}"
                    )));
                }
                warn!(
                    "GPU '{}' found but failed to initialize: {}. Falling back to CPU.",
                    adapter_name, error
                );
            }
        }
    }

    #[cfg(not(feature = "gpu"))]
    {
        if preference == BackendPreference::Gpu {
            return Err(OceanSimError::ResourceAllocation(
                "GPU support was not compiled in (enable the `gpu` feature)".to_string(),
            ));
        }
        info!("GPU feature disabled, using CPU backend");
    }

    Ok(Box::new(CpuBackend::new(dimension)?))
}
