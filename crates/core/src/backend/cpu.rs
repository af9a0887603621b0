//! CPU compute backend
//!
//! Runs the pipeline on `Vec`-backed grids with Rayon for parallelism and
//! `rustfft` for the transform. This backend is always available and serves
//! as the fallback when GPU acceleration is not.

use super::ComputeBackend;
use crate::compose::{compose_into, ComposeSettings};
use crate::core_types::{ComplexGrid, DisplacementField, GradientField, GradientSample, RealGrid, Vec3};
use crate::error::OceanSimError;
use crate::spectrum::{evolve, EvolvedSpectra, InitialSpectrum};
use crate::transform::{SpatialFields, SpectralTransform};
use rustfft::num_complex::Complex32;

/// CPU backend holding every per-frame buffer in host memory
pub struct CpuBackend {
    initial: InitialSpectrum,
    evolved: EvolvedSpectra,
    spatial: SpatialFields,
    displacement: DisplacementField,
    gradient: GradientField,
    transform: SpectralTransform,
}

impl CpuBackend {
    /// Allocate buffers and plan the transform for `dimension × dimension` grids
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::Configuration` for an unsupported dimension and
    /// `OceanSimError::ResourceAllocation` if a buffer cannot be allocated.
    pub fn new(dimension: usize) -> Result<Self, OceanSimError> {
        let transform = SpectralTransform::new(dimension)?;

        Ok(Self {
            initial: InitialSpectrum {
                h0: ComplexGrid::try_filled(dimension, Complex32::new(0.0, 0.0))?,
                omega: RealGrid::try_filled(dimension, 0.0)?,
                patch_length: 1.0,
            },
            evolved: EvolvedSpectra::try_new(dimension)?,
            spatial: SpatialFields::try_new(dimension)?,
            displacement: DisplacementField::try_filled(dimension, Vec3::zeros())?,
            gradient: GradientField::try_filled(dimension, GradientSample::flat())?,
            transform,
        })
    }

    /// Spectra written by the last `evolve`, or transformed in place after
    /// `transform`
    #[must_use]
    pub fn evolved(&self) -> &EvolvedSpectra {
        &self.evolved
    }

    /// Spatial fields written by the last `transform`
    #[must_use]
    pub fn spatial(&self) -> &SpatialFields {
        &self.spatial
    }
}

impl ComputeBackend for CpuBackend {
    fn upload_spectrum(&mut self, spectrum: &InitialSpectrum) -> Result<(), OceanSimError> {
        if spectrum.dimension() != self.dimension() {
            return Err(OceanSimError::configuration(
                "grid_dimension",
                format!(
                    "spectrum is {0}x{0} but the backend was built for {1}x{1}",
                    spectrum.dimension(),
                    self.dimension()
                ),
            ));
        }

        self.initial.clone_from(spectrum);
        Ok(())
    }

    fn evolve(&mut self, time: f32) -> Result<(), OceanSimError> {
        evolve(&self.initial, time, &mut self.evolved);
        Ok(())
    }

    fn transform(&mut self) -> Result<(), OceanSimError> {
        self.transform
            .transform_spectra(&mut self.evolved, &mut self.spatial);
        Ok(())
    }

    fn compose(&mut self, settings: &ComposeSettings) -> Result<(), OceanSimError> {
        compose_into(
            &self.spatial.height,
            &self.spatial.choppy_x,
            &self.spatial.choppy_y,
            settings,
            &mut self.displacement,
            &mut self.gradient,
        );
        Ok(())
    }

    fn read_surface(
        &mut self,
        displacement: &mut DisplacementField,
        gradient: &mut GradientField,
    ) -> Result<(), OceanSimError> {
        displacement.clone_from(&self.displacement);
        gradient.clone_from(&self.gradient);
        Ok(())
    }

    fn dimension(&self) -> usize {
        self.transform.dimension()
    }

    fn is_gpu_accelerated(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "CPU (rayon + rustfft)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{OceanParameters, SpectrumConstants};
    use crate::spectrum::initialize;

    fn params() -> OceanParameters {
        OceanParameters {
            grid_dimension: 32,
            patch_length: 250.0,
            ..OceanParameters::default()
        }
    }

    #[test]
    fn test_cpu_backend_creation() {
        let backend = CpuBackend::new(64).unwrap();
        assert_eq!(backend.dimension(), 64);
        assert!(!backend.is_gpu_accelerated());
        assert!(backend.name().contains("CPU"));
    }

    #[test]
    fn test_rejects_unsupported_dimension() {
        assert!(CpuBackend::new(48).err().unwrap().is_configuration());
    }

    #[test]
    fn test_rejects_mismatched_spectrum() {
        let spectrum = initialize(&params(), &SpectrumConstants::default(), Some(0)).unwrap();
        let mut backend = CpuBackend::new(16).unwrap();
        assert!(backend.upload_spectrum(&spectrum).unwrap_err().is_configuration());
    }

    #[test]
    fn test_full_frame_produces_real_surface() {
        let params = params();
        let spectrum = initialize(&params, &SpectrumConstants::default(), Some(5)).unwrap();
        let mut backend = CpuBackend::new(32).unwrap();
        backend.upload_spectrum(&spectrum).unwrap();

        backend.evolve(2.0).unwrap();
        backend.transform().unwrap();

        // Conjugate symmetry leaves no imaginary residue after the inverse
        let peak = backend
            .spatial()
            .height
            .as_slice()
            .iter()
            .fold(0.0_f32, |m, v| m.max(v.abs()));
        assert!(peak > 0.0);
        for c in backend.evolved().height.as_slice() {
            assert!(c.im.abs() <= 1e-4 * peak);
        }

        backend.compose(&ComposeSettings::from_params(&params)).unwrap();
        let mut displacement = DisplacementField::flat(32);
        let mut gradient = GradientField::flat(32);
        backend
            .read_surface(&mut displacement, &mut gradient)
            .unwrap();

        assert_eq!(displacement.get(3, 7).z, backend.spatial().height.get(3, 7));
        assert!(displacement.as_slice().iter().all(|d| d.iter().all(|v| v.is_finite())));
        assert!(gradient
            .as_slice()
            .iter()
            .all(|g| (0.0..=1.0).contains(&g.foam) && g.slope.iter().all(|v| v.is_finite())));
    }
}
