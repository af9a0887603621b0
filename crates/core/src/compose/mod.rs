//! Surface composition: displacement, gradient and foam
//!
//! Reads the three spatial fields produced by the inverse transform and
//! writes the renderer-facing outputs:
//!
//! ```text
//! D(x)     = (λ·dx(x), λ·dy(x), a·h(x))
//! ∇z(x)    = (z(x+1) − z(x−1), z(y+1) − z(y−1)) / 2Δ
//! J        = (1 + ∂Dx/∂x)(1 + ∂Dy/∂y) − (∂Dx/∂y)(∂Dy/∂x)
//! foam(x)  = clamp(1 − J, 0, 1)
//! ```
//!
//! Where `λ` is the choppy scale, `a` the wave amplitude and `Δ` the cell
//! length. Every neighbour lookup wraps modulo N: the patch tiles.

use crate::core_types::{
    DisplacementField, GradientField, GradientSample, OceanParameters, RealGrid, Vec2, Vec3,
};
use rayon::prelude::*;

/// Scale factors applied while composing the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposeSettings {
    /// Horizontal displacement multiplier
    pub choppy_scale: f32,
    /// Vertical displacement multiplier
    pub wave_amplitude: f32,
    /// World-space cell size (meters)
    pub cell_length: f32,
}

impl ComposeSettings {
    #[must_use]
    pub fn from_params(params: &OceanParameters) -> Self {
        Self {
            choppy_scale: params.choppy_scale,
            wave_amplitude: params.wave_amplitude,
            cell_length: params.cell_length(),
        }
    }
}

/// Compose displacement and gradient into preallocated fields
///
/// # Arguments
///
/// * `height` - Recentered spatial height field
/// * `choppy_x` - Recentered spatial x displacement
/// * `choppy_y` - Recentered spatial y displacement
/// * `settings` - Scale factors and cell length
/// * `displacement` - Output displacement field
/// * `gradient` - Output slope and foam field
pub fn compose_into(
    height: &RealGrid,
    choppy_x: &RealGrid,
    choppy_y: &RealGrid,
    settings: &ComposeSettings,
    displacement: &mut DisplacementField,
    gradient: &mut GradientField,
) {
    let n = height.dimension;
    let (h, dx, dy) = (height.as_slice(), choppy_x.as_slice(), choppy_y.as_slice());

    displacement
        .as_mut_slice()
        .par_chunks_mut(n)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                let idx = y * n + x;
                *cell = Vec3::new(
                    dx[idx] * settings.choppy_scale,
                    dy[idx] * settings.choppy_scale,
                    h[idx] * settings.wave_amplitude,
                );
            }
        });

    // Barrier: the gradient pass reads neighbouring displacement rows
    let disp: &DisplacementField = displacement;
    let inv_two_cells = 0.5 / settings.cell_length;

    gradient
        .as_mut_slice()
        .par_chunks_mut(n)
        .enumerate()
        .for_each(|(y, row)| {
            let yi = y as isize;
            for (x, cell) in row.iter_mut().enumerate() {
                let xi = x as isize;
                let left = disp.get_wrapped(xi - 1, yi);
                let right = disp.get_wrapped(xi + 1, yi);
                let down = disp.get_wrapped(xi, yi - 1);
                let up = disp.get_wrapped(xi, yi + 1);

                // Central differences of the displacement vector along x and y
                let ddx = (right - left) * inv_two_cells;
                let ddy = (up - down) * inv_two_cells;

                let jacobian = (1.0 + ddx.x) * (1.0 + ddy.y) - ddy.x * ddx.y;

                *cell = GradientSample {
                    slope: Vec2::new(ddx.z, ddy.z),
                    foam: (1.0 - jacobian).clamp(0.0, 1.0),
                };
            }
        });
}

/// Compose into newly allocated fields
#[must_use]
pub fn compose_surface(
    height: &RealGrid,
    choppy_x: &RealGrid,
    choppy_y: &RealGrid,
    settings: &ComposeSettings,
) -> (DisplacementField, GradientField) {
    let n = height.dimension;
    let mut displacement = DisplacementField::flat(n);
    let mut gradient = GradientField::flat(n);
    compose_into(
        height,
        choppy_x,
        choppy_y,
        settings,
        &mut displacement,
        &mut gradient,
    );
    (displacement, gradient)
}
