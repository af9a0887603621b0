//! Core types and utilities

pub mod grid;
pub mod params;
pub mod quality;
pub mod vec;

pub use grid::{ComplexGrid, DisplacementField, GradientField, GradientSample, Grid, RealGrid};
pub use params::{BackendPreference, OceanParameters, SimulatorOptions, SpectrumConstants};
pub use quality::QualityPreset;
pub use vec::{Vec2, Vec3};
