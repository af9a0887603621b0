//! C ABI for embedding the ocean simulator in game engines
//!
//! Every fallible function returns an [`OceanSimErrorCode`]; details of the
//! last failure on the calling thread are available from
//! [`ocean_sim_get_last_error`]. The build script writes the matching C header
//! to `OceanSimFFI.h` at the workspace root.

mod error;
mod helpers;
mod instance;
mod params;
mod surface;

pub use error::{ocean_sim_get_last_error, ocean_sim_get_last_error_code, OceanSimErrorCode};
pub use instance::{
    ocean_sim_destroy, ocean_sim_get_parameters, ocean_sim_is_gpu_accelerated, ocean_sim_new,
    ocean_sim_reinitialize, ocean_sim_update, OceanSimInstance,
};
pub use params::{
    ocean_sim_default_options, ocean_sim_default_parameters, ocean_sim_load_parameters,
    ocean_sim_save_parameters, OceanSimBackend, OceanSimOptions, OceanSimParameters,
    OceanSimStatistics,
};
pub use surface::{
    ocean_sim_copy_displacement, ocean_sim_copy_gradient, ocean_sim_get_statistics,
    ocean_sim_grid_dimension,
};
