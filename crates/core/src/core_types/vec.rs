//! Vector type aliases for wave vectors, wind and surface displacement.

use nalgebra::{Vector2, Vector3};

/// 2D vector type for wave vectors, wind direction and surface slopes.
///
/// This is a simple alias for `nalgebra::Vector2<f32>`.
pub type Vec2 = Vector2<f32>;

/// 3D vector type for per-cell surface displacement.
///
/// Components are `(horizontal x, horizontal y, vertical)`. This is a simple
/// alias for `nalgebra::Vector3<f32>`, which is `#[repr(C)]` and can be handed
/// to a renderer as three packed floats.
pub type Vec3 = Vector3<f32>;
