//! Quality presets for grid resolution
//!
//! A preset picks the simulation grid dimension. Higher quality resolves
//! shorter waves but costs O(N² log N) per frame.

use serde::{Deserialize, Serialize};

/// Quality preset determining the spectral grid resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityPreset {
    /// 1024×1024 grid
    Ultra,
    /// 512×512 grid
    High,
    /// 256×256 grid
    Medium,
    /// 128×128 grid
    Low,
}

impl QualityPreset {
    /// Grid cells per side for this preset
    #[must_use]
    pub const fn grid_dimension(&self) -> usize {
        match self {
            Self::Ultra => 1024,
            Self::High => 512,
            Self::Medium => 256,
            Self::Low => 128,
        }
    }

    /// World-space cell size for a patch of the given length
    ///
    /// # Arguments
    ///
    /// * `patch_length` - Side length of the simulated patch in meters
    ///
    /// # Returns
    ///
    /// Cell size in meters
    #[must_use]
    pub fn cell_length(&self, patch_length: f32) -> f32 {
        patch_length / self.grid_dimension() as f32
    }

    /// Pick the finest preset whose grid does not exceed `max_dimension`
    ///
    /// Falls back to `Low` when even the coarsest preset is too large.
    #[must_use]
    pub fn for_max_dimension(max_dimension: usize) -> Self {
        [Self::Ultra, Self::High, Self::Medium]
            .into_iter()
            .find(|preset| preset.grid_dimension() <= max_dimension)
            .unwrap_or(Self::Low)
    }
}
