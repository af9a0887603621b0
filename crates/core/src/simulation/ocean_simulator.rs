//! Ocean simulator orchestration
//!
//! `OceanSimulator` owns the parameters, the compute backend and the frame
//! buffers, and runs the per-frame pipeline:
//!
//! 1. Evolve `H0` to the effective time
//! 2. Inverse-transform the height and choppy spectra
//! 3. Compose displacement, gradient and foam
//! 4. Read the surface into the back frame and publish it

use super::frame::{FrameBuffers, SurfaceFrame, SurfaceReader};
use crate::backend::{create_backend, ComputeBackend};
use crate::compose::ComposeSettings;
use crate::core_types::{DisplacementField, GradientField, OceanParameters, SimulatorOptions};
use crate::error::OceanSimError;
use crate::spectrum::{initialize, InitialSpectrum};
use std::sync::Arc;
use tracing::{debug, info};

/// Lifecycle state of a simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatorState {
    /// Spectrum generated, no frame computed yet; the published surface is flat
    Initialized,
    /// At least one frame has been published
    Updated {
        /// Index of the last published frame
        frame: u64,
    },
}

/// FFT ocean simulator
///
/// Construction never yields a partially built simulator: either every buffer
/// is allocated and the spectrum uploaded, or an error is returned.
pub struct OceanSimulator {
    params: OceanParameters,
    options: SimulatorOptions,
    settings: ComposeSettings,
    spectrum: InitialSpectrum,
    backend: Box<dyn ComputeBackend>,
    frames: FrameBuffers,
    state: SimulatorState,
    frame_count: u64,
}

impl OceanSimulator {
    /// Create a simulator with default options (seed 0, automatic backend)
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::Configuration` for invalid parameters and
    /// `OceanSimError::ResourceAllocation` if buffers cannot be allocated.
    pub fn new(params: OceanParameters) -> Result<Self, OceanSimError> {
        Self::with_options(params, SimulatorOptions::default())
    }

    /// Create a simulator with explicit options
    ///
    /// # Arguments
    ///
    /// * `params` - Wave model parameters
    /// * `options` - Seed, spectrum constants and backend preference
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::Configuration` for invalid parameters or
    /// constants and `OceanSimError::ResourceAllocation` if the backend cannot
    /// provide its buffers.
    pub fn with_options(
        params: OceanParameters,
        options: SimulatorOptions,
    ) -> Result<Self, OceanSimError> {
        info!("Creating ocean simulator");

        params.validate()?;
        options.spectrum.validate()?;

        let n = params.grid_dimension;
        let mut backend = create_backend(n, options.backend)?;
        let spectrum = initialize(&params, &options.spectrum, options.seed)?;
        backend.upload_spectrum(&spectrum)?;
        let frames = FrameBuffers::try_new(n)?;

        info!(
            "Ocean simulator initialized: {}x{} grid, patch={:.1}m, wind={:.1}m/s, backend={}",
            n,
            n,
            params.patch_length,
            params.wind_speed,
            backend.name()
        );

        Ok(Self {
            settings: ComposeSettings::from_params(&params),
            params,
            options,
            spectrum,
            backend,
            frames,
            state: SimulatorState::Initialized,
            frame_count: 0,
        })
    }

    /// Compute and publish the surface at `time`
    ///
    /// Any finite time is valid, including repeated, negative and
    /// non-monotonic values; the result depends only on `time`.
    ///
    /// # Arguments
    ///
    /// * `time` - Simulation time in seconds (scaled by `time_scale`)
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::Configuration` for a non-finite time and
    /// `OceanSimError::Backend` if the compute backend fails. On error the
    /// previously published frame stays current.
    pub fn update(&mut self, time: f32) -> Result<(), OceanSimError> {
        if !time.is_finite() {
            return Err(OceanSimError::invalid_value("time", time, "must be finite"));
        }

        let effective_time = self.effective_time(time);

        self.backend.evolve(effective_time)?;
        self.backend.transform()?;
        self.backend.compose(&self.settings)?;

        let frame_index = self.frame_count + 1;
        let frame = self.frames.back_mut()?;
        self.backend
            .read_surface(&mut frame.displacement, &mut frame.gradient)?;
        frame.time = time;
        frame.effective_time = effective_time;
        frame.frame_index = frame_index;

        self.frames.publish();
        self.frame_count = frame_index;
        self.state = SimulatorState::Updated { frame: frame_index };

        debug!(
            "Ocean update: t={:.3}s, effective={:.3}s, frame={}",
            time, effective_time, frame_index
        );

        Ok(())
    }

    /// Time the spectrum is evolved to for caller time `time`
    ///
    /// With a loop period the caller time is wrapped first, so `t` and
    /// `t + period` give the same surface.
    #[must_use]
    pub fn effective_time(&self, time: f32) -> f32 {
        let wrapped = match self.options.spectrum.loop_period {
            Some(period) => f64::from(time).rem_euclid(f64::from(period)) as f32,
            None => time,
        };
        wrapped * self.params.time_scale
    }

    /// Rebuild the spectrum for new parameters
    ///
    /// Recreates the backend if the grid dimension changed. Resets the
    /// published surface to flat and the state to `Initialized`. On error the
    /// simulator is left unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`OceanSimulator::with_options`].
    pub fn reinitialize(&mut self, params: OceanParameters) -> Result<(), OceanSimError> {
        params.validate()?;

        let n = params.grid_dimension;
        let spectrum = initialize(&params, &self.options.spectrum, self.options.seed)?;

        if n == self.backend.dimension() {
            self.backend.upload_spectrum(&spectrum)?;
        } else {
            let mut backend = create_backend(n, self.options.backend)?;
            backend.upload_spectrum(&spectrum)?;
            self.backend = backend;
        }
        self.frames.reset(n)?;

        info!(
            "Ocean simulator reinitialized: {}x{} grid, wind={:.1}m/s",
            n, n, params.wind_speed
        );

        self.settings = ComposeSettings::from_params(&params);
        self.params = params;
        self.spectrum = spectrum;
        self.state = SimulatorState::Initialized;
        self.frame_count = 0;
        Ok(())
    }

    /// Displacement of the last published frame (flat before the first update)
    #[must_use]
    pub fn displacement_field(&self) -> &DisplacementField {
        &self.frames.current().displacement
    }

    /// Gradient and foam of the last published frame (flat before the first update)
    #[must_use]
    pub fn gradient_field(&self) -> &GradientField {
        &self.frames.current().gradient
    }

    /// Last published frame
    #[must_use]
    pub fn surface(&self) -> Arc<SurfaceFrame> {
        Arc::clone(self.frames.current())
    }

    /// Handle for reading published frames from other threads
    #[must_use]
    pub fn surface_reader(&self) -> SurfaceReader {
        self.frames.reader()
    }

    #[must_use]
    pub fn parameters(&self) -> &OceanParameters {
        &self.params
    }

    #[must_use]
    pub fn options(&self) -> &SimulatorOptions {
        &self.options
    }

    /// `H0` and `ω` the simulator evolves from
    #[must_use]
    pub fn initial_spectrum(&self) -> &InitialSpectrum {
        &self.spectrum
    }

    #[must_use]
    pub fn state(&self) -> SimulatorState {
        self.state
    }

    /// Check if the GPU backend is in use
    #[must_use]
    pub fn is_gpu_accelerated(&self) -> bool {
        self.backend.is_gpu_accelerated()
    }

    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}
