//! Ocean configuration: wave parameters, tunable spectrum constants and
//! simulator options
//!
//! `OceanParameters` mirrors what a host engine exposes to artists. It is
//! validated once at construction; an invalid value is a fatal configuration
//! error. Parameter sets can be stored as JSON.

use super::vec::Vec2;
use crate::error::OceanSimError;
use crate::transform::validate_dimension;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Wave model parameters for one simulated ocean patch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OceanParameters {
    /// Cells per side of the simulation grid. Must be a power of two.
    pub grid_dimension: usize,
    /// World-space size of the tiled patch (meters)
    pub patch_length: f32,
    /// Multiplier applied to the time passed to `update()`
    pub time_scale: f32,
    /// Vertical amplitude multiplier applied to the height field
    pub wave_amplitude: f32,
    /// Wind direction. Normalization not required, must be non-zero.
    pub wind_direction: Vec2,
    /// Wind speed (m/s). Zero produces a flat sea.
    pub wind_speed: f32,
    /// Damping of waves travelling against the wind, in [0, 1].
    /// 0 removes them entirely, 1 keeps them unattenuated.
    pub wind_dependency: f32,
    /// Horizontal (choppy) displacement strength, must be non-negative
    pub choppy_scale: f32,
}

impl Default for OceanParameters {
    /// Moderate breeze over a 1 km patch at 512×512
    fn default() -> Self {
        Self {
            grid_dimension: 512,
            patch_length: 1000.0,
            time_scale: 0.8,
            wave_amplitude: 1.0,
            wind_direction: Vec2::new(0.8, 0.6),
            wind_speed: 20.0,
            wind_dependency: 0.07,
            choppy_scale: 1.3,
        }
    }
}

impl OceanParameters {
    /// Light wind, long gentle swell
    #[must_use]
    pub fn calm() -> Self {
        Self {
            grid_dimension: 256,
            patch_length: 500.0,
            time_scale: 0.6,
            wave_amplitude: 1.0,
            wind_direction: Vec2::new(1.0, 0.0),
            wind_speed: 8.0,
            wind_dependency: 0.1,
            choppy_scale: 0.8,
        }
    }

    /// Gale-force wind with strongly folded crests
    #[must_use]
    pub fn storm() -> Self {
        Self {
            grid_dimension: 512,
            patch_length: 2000.0,
            time_scale: 1.0,
            wave_amplitude: 1.2,
            wind_direction: Vec2::new(0.6, -0.8),
            wind_speed: 35.0,
            wind_dependency: 0.05,
            choppy_scale: 1.6,
        }
    }

    /// Check every parameter against its valid range
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::Configuration` naming the first invalid parameter.
    pub fn validate(&self) -> Result<(), OceanSimError> {
        validate_dimension(self.grid_dimension)?;

        if !self.patch_length.is_finite() || self.patch_length <= 0.0 {
            return Err(OceanSimError::invalid_value(
                "patch_length",
                self.patch_length,
                "must be finite and positive",
            ));
        }

        if !self.time_scale.is_finite() {
            return Err(OceanSimError::invalid_value(
                "time_scale",
                self.time_scale,
                "must be finite",
            ));
        }

        if !self.wave_amplitude.is_finite() || self.wave_amplitude < 0.0 {
            return Err(OceanSimError::invalid_value(
                "wave_amplitude",
                self.wave_amplitude,
                "must be finite and non-negative",
            ));
        }

        let wind_len = self.wind_direction.norm();
        if !wind_len.is_finite() || wind_len <= f32::EPSILON {
            return Err(OceanSimError::configuration(
                "wind_direction",
                format!(
                    "must be a finite non-zero vector, got ({}, {})",
                    self.wind_direction.x, self.wind_direction.y
                ),
            ));
        }

        if !self.wind_speed.is_finite() || self.wind_speed < 0.0 {
            return Err(OceanSimError::invalid_value(
                "wind_speed",
                self.wind_speed,
                "must be finite and non-negative",
            ));
        }

        if !(0.0..=1.0).contains(&self.wind_dependency) {
            return Err(OceanSimError::invalid_value(
                "wind_dependency",
                self.wind_dependency,
                "must be in [0, 1]",
            ));
        }

        if !self.choppy_scale.is_finite() || self.choppy_scale < 0.0 {
            return Err(OceanSimError::invalid_value(
                "choppy_scale",
                self.choppy_scale,
                "must be finite and non-negative",
            ));
        }

        Ok(())
    }

    /// Unit-length wind direction
    #[must_use]
    pub fn normalized_wind_direction(&self) -> Vec2 {
        self.wind_direction.normalize()
    }

    /// World-space size of one grid cell (meters)
    #[must_use]
    pub fn cell_length(&self) -> f32 {
        self.patch_length / self.grid_dimension as f32
    }

    /// Load parameters from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::ParameterFile` if the file cannot be read or parsed.
    /// The loaded values are not validated; construction does that.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, OceanSimError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| OceanSimError::ParameterFile(format!("failed to load: {e}")))?;

        serde_json::from_str(&contents)
            .map_err(|e| OceanSimError::ParameterFile(format!("failed to parse: {e}")))
    }

    /// Save parameters to a JSON file
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::ParameterFile` if serialization or writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), OceanSimError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| OceanSimError::ParameterFile(format!("failed to serialize: {e}")))?;

        fs::write(path, contents)
            .map_err(|e| OceanSimError::ParameterFile(format!("failed to save: {e}")))
    }
}

/// Tunable constants of the statistical wave model
///
/// These are implementation choices rather than physical requirements; the
/// defaults are calibrated for SI units (meters, seconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumConstants {
    /// Gravitational acceleration (m/s²)
    pub gravity: f32,
    /// Phillips spectrum amplitude constant `A`
    pub phillips_constant: f32,
    /// Small-wave cutoff as a fraction of the largest wind wave `L = V²/g`
    pub small_wave_ratio: f32,
    /// When set, angular frequencies are quantized so the animation repeats
    /// exactly every `loop_period` seconds of `update()` time
    pub loop_period: Option<f32>,
}

impl Default for SpectrumConstants {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            phillips_constant: 1.0e-8,
            small_wave_ratio: 1.0e-3,
            loop_period: None,
        }
    }
}

impl SpectrumConstants {
    /// Check the constants against their valid ranges
    ///
    /// # Errors
    ///
    /// Returns `OceanSimError::Configuration` naming the first invalid constant.
    pub fn validate(&self) -> Result<(), OceanSimError> {
        if !self.gravity.is_finite() || self.gravity <= 0.0 {
            return Err(OceanSimError::invalid_value(
                "gravity",
                self.gravity,
                "must be finite and positive",
            ));
        }

        if !self.phillips_constant.is_finite() || self.phillips_constant < 0.0 {
            return Err(OceanSimError::invalid_value(
                "phillips_constant",
                self.phillips_constant,
                "must be finite and non-negative",
            ));
        }

        if !self.small_wave_ratio.is_finite() || self.small_wave_ratio < 0.0 {
            return Err(OceanSimError::invalid_value(
                "small_wave_ratio",
                self.small_wave_ratio,
                "must be finite and non-negative",
            ));
        }

        if let Some(period) = self.loop_period {
            if !period.is_finite() || period <= 0.0 {
                return Err(OceanSimError::invalid_value(
                    "loop_period",
                    period,
                    "must be finite and positive",
                ));
            }
        }

        Ok(())
    }
}

/// Which compute backend the simulator should run on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BackendPreference {
    /// GPU when available, CPU otherwise
    #[default]
    Auto,
    /// Always the CPU backend
    Cpu,
    /// GPU only; construction fails if no usable adapter exists
    Gpu,
}

/// Construction options that are not part of the wave model itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorOptions {
    /// Seed for the Gaussian draws. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Spectrum model constants
    pub spectrum: SpectrumConstants,
    /// Compute backend selection
    pub backend: BackendPreference,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self {
            seed: Some(0),
            spectrum: SpectrumConstants::default(),
            backend: BackendPreference::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(OceanParameters::default().validate().is_ok());
        assert!(OceanParameters::calm().validate().is_ok());
        assert!(OceanParameters::storm().validate().is_ok());
        assert!(SpectrumConstants::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        for n in [0, 1, 2, 3, 6, 100, 513, 8192] {
            let params = OceanParameters {
                grid_dimension: n,
                ..OceanParameters::default()
            };
            let err = params.validate().unwrap_err();
            assert!(
                matches!(
                    err,
                    OceanSimError::Configuration {
                        parameter: "grid_dimension",
                        ..
                    }
                ),
                "dimension {n} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let base = OceanParameters::default();
        let cases = [
            OceanParameters {
                patch_length: 0.0,
                ..base.clone()
            },
            OceanParameters {
                wind_speed: -1.0,
                ..base.clone()
            },
            OceanParameters {
                wind_speed: f32::NAN,
                ..base.clone()
            },
            OceanParameters {
                wind_direction: Vec2::zeros(),
                ..base.clone()
            },
            OceanParameters {
                wind_dependency: 1.5,
                ..base.clone()
            },
            OceanParameters {
                choppy_scale: -0.1,
                ..base.clone()
            },
            OceanParameters {
                time_scale: f32::INFINITY,
                ..base.clone()
            },
        ];

        for params in cases {
            assert!(params.validate().unwrap_err().is_configuration());
        }
    }

    #[test]
    fn test_zero_wind_speed_is_accepted() {
        let params = OceanParameters {
            wind_speed: 0.0,
            ..OceanParameters::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_wind_direction_is_normalized() {
        let params = OceanParameters {
            wind_direction: Vec2::new(3.0, 4.0),
            ..OceanParameters::default()
        };
        let dir = params.normalized_wind_direction();
        assert!((dir.norm() - 1.0).abs() < 1e-6);
        assert!((dir.x - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_loop_period() {
        let constants = SpectrumConstants {
            loop_period: Some(0.0),
            ..SpectrumConstants::default()
        };
        assert!(constants.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "ocean_params_round_trip_{}.json",
            std::process::id()
        ));
        let params = OceanParameters::storm();
        params.save(&path).unwrap();
        let loaded = OceanParameters::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(params, loaded);
    }

    #[test]
    fn test_load_missing_file() {
        let err = OceanParameters::load("/nonexistent/ocean.json").unwrap_err();
        assert!(matches!(err, OceanSimError::ParameterFile(_)));
    }
}
