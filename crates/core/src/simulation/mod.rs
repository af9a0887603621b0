//! Simulation orchestration and frame publication

mod frame;
mod ocean_simulator;

pub use frame::{SurfaceFrame, SurfaceReader, SurfaceStatistics};
pub use ocean_simulator::{OceanSimulator, SimulatorState};
