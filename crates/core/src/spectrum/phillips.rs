//! Phillips spectrum for wind-driven deep-water waves
//!
//! ```text
//! P(k) = A · exp(−1/(|k|L)²) / |k|⁴ · (k̂·ŵ)² · exp(−|k|²w²)
//! ```
//!
//! Where:
//! - `L = V²/g`: largest wave arising from a continuous wind of speed `V`
//! - `w = L · small_wave_ratio`: suppression length for very short waves
//! - `ŵ`: unit wind direction
//!
//! Waves travelling against the wind (`k̂·ŵ < 0`) are further scaled by the
//! wind dependency factor.

use super::MIN_WAVE_NUMBER;
use crate::core_types::{OceanParameters, SpectrumConstants, Vec2};

/// Phillips spectrum evaluated for a fixed wind model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhillipsSpectrum {
    amplitude: f32,
    wind_direction: Vec2,
    largest_wave: f32,
    small_wave: f32,
    wind_dependency: f32,
}

impl PhillipsSpectrum {
    /// Build the spectrum from validated parameters
    #[must_use]
    pub fn new(params: &OceanParameters, constants: &SpectrumConstants) -> Self {
        let largest_wave = params.wind_speed * params.wind_speed / constants.gravity;
        Self {
            amplitude: constants.phillips_constant,
            wind_direction: params.normalized_wind_direction(),
            largest_wave,
            small_wave: largest_wave * constants.small_wave_ratio,
            wind_dependency: params.wind_dependency,
        }
    }

    /// Largest wind wave `L = V²/g` in meters
    #[must_use]
    pub fn largest_wave(&self) -> f32 {
        self.largest_wave
    }

    /// Spectral energy density at wave vector `k`
    ///
    /// Returns 0 for `k = 0` and for a windless sea.
    #[must_use]
    pub fn evaluate(&self, k: Vec2) -> f32 {
        let k_sq = k.norm_squared();
        if k_sq < MIN_WAVE_NUMBER * MIN_WAVE_NUMBER || self.largest_wave <= 0.0 {
            return 0.0;
        }

        let k_len = k_sq.sqrt();
        let cos_wind = k.dot(&self.wind_direction) / k_len;
        let l_sq = self.largest_wave * self.largest_wave;
        let w_sq = self.small_wave * self.small_wave;

        let mut phillips = self.amplitude * (-1.0 / (k_sq * l_sq)).exp() / (k_sq * k_sq)
            * cos_wind
            * cos_wind
            * (-k_sq * w_sq).exp();

        if cos_wind < 0.0 {
            phillips *= self.wind_dependency;
        }

        phillips
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum(wind_speed: f32, wind_dependency: f32) -> PhillipsSpectrum {
        let params = OceanParameters {
            wind_direction: Vec2::new(2.0, 0.0),
            wind_speed,
            wind_dependency,
            ..OceanParameters::default()
        };
        PhillipsSpectrum::new(&params, &SpectrumConstants::default())
    }

    #[test]
    fn test_zero_at_origin() {
        assert_eq!(spectrum(20.0, 0.5).evaluate(Vec2::zeros()), 0.0);
    }

    #[test]
    fn test_windless_sea_is_flat() {
        let p = spectrum(0.0, 0.5);
        assert_eq!(p.largest_wave(), 0.0);
        assert_eq!(p.evaluate(Vec2::new(0.1, 0.05)), 0.0);
    }

    #[test]
    fn test_perpendicular_waves_vanish() {
        assert_eq!(spectrum(20.0, 1.0).evaluate(Vec2::new(0.0, 0.05)), 0.0);
    }

    #[test]
    fn test_wind_dependency_damps_upwind_waves() {
        let p = spectrum(20.0, 0.25);
        let downwind = p.evaluate(Vec2::new(0.05, 0.0));
        let upwind = p.evaluate(Vec2::new(-0.05, 0.0));
        assert!(downwind > 0.0);
        assert!((upwind - 0.25 * downwind).abs() <= 1e-6 * downwind);

        let p = spectrum(20.0, 0.0);
        assert_eq!(p.evaluate(Vec2::new(-0.05, 0.0)), 0.0);
    }

    #[test]
    fn test_largest_wave() {
        let p = spectrum(9.81, 1.0);
        assert!((p.largest_wave() - 9.81).abs() < 1e-4);
    }
}
