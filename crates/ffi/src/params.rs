//! C mirrors of the core configuration types
use ocean_sim_core::{
    BackendPreference, OceanParameters, SimulatorOptions, SpectrumConstants, SurfaceStatistics,
    Vec2,
};
use std::ffi::CStr;
use std::os::raw::c_char;

use crate::error::{FfiError, OceanSimErrorCode};
use crate::helpers::{to_code, track_error, track_result};

/// Wave model parameters, field for field the same as the core `OceanParameters`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OceanSimParameters {
    /// Cells per side, power of two in 4..=4096
    pub grid_dimension: u32,
    /// Patch size in meters
    pub patch_length: f32,
    pub time_scale: f32,
    pub wave_amplitude: f32,
    /// Wind direction, need not be normalized but must be non-zero
    pub wind_direction_x: f32,
    pub wind_direction_y: f32,
    /// Wind speed in m/s
    pub wind_speed: f32,
    /// Damping of waves against the wind, in [0, 1]
    pub wind_dependency: f32,
    pub choppy_scale: f32,
}

impl From<&OceanSimParameters> for OceanParameters {
    fn from(p: &OceanSimParameters) -> Self {
        Self {
            grid_dimension: p.grid_dimension as usize,
            patch_length: p.patch_length,
            time_scale: p.time_scale,
            wave_amplitude: p.wave_amplitude,
            wind_direction: Vec2::new(p.wind_direction_x, p.wind_direction_y),
            wind_speed: p.wind_speed,
            wind_dependency: p.wind_dependency,
            choppy_scale: p.choppy_scale,
        }
    }
}

impl From<&OceanParameters> for OceanSimParameters {
    fn from(p: &OceanParameters) -> Self {
        Self {
            grid_dimension: u32::try_from(p.grid_dimension).unwrap_or(u32::MAX),
            patch_length: p.patch_length,
            time_scale: p.time_scale,
            wave_amplitude: p.wave_amplitude,
            wind_direction_x: p.wind_direction.x,
            wind_direction_y: p.wind_direction.y,
            wind_speed: p.wind_speed,
            wind_dependency: p.wind_dependency,
            choppy_scale: p.choppy_scale,
        }
    }
}

/// Compute backend selection
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OceanSimBackend {
    /// GPU when available, CPU otherwise
    Auto = 0,
    Cpu = 1,
    /// GPU only, creation fails without a usable adapter
    Gpu = 2,
}

/// Construction options that are not part of the wave model.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OceanSimOptions {
    /// Seed for the random wave phases
    pub seed: u64,
    /// Ignore `seed` and draw from OS entropy
    pub random_seed: bool,
    /// Animation loop period in seconds, 0 disables looping
    pub loop_period: f32,
    pub backend: OceanSimBackend,
}

impl Default for OceanSimOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            random_seed: false,
            loop_period: 0.0,
            backend: OceanSimBackend::Auto,
        }
    }
}

impl From<&OceanSimOptions> for SimulatorOptions {
    fn from(o: &OceanSimOptions) -> Self {
        Self {
            seed: (!o.random_seed).then_some(o.seed),
            spectrum: SpectrumConstants {
                loop_period: (o.loop_period != 0.0).then_some(o.loop_period),
                ..SpectrumConstants::default()
            },
            backend: match o.backend {
                OceanSimBackend::Auto => BackendPreference::Auto,
                OceanSimBackend::Cpu => BackendPreference::Cpu,
                OceanSimBackend::Gpu => BackendPreference::Gpu,
            },
        }
    }
}

/// Summary of one published surface frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OceanSimStatistics {
    pub max_height: f32,
    pub min_height: f32,
    pub rms_height: f32,
    pub max_horizontal: f32,
    pub mean_foam: f32,
    /// Fraction of cells with any foam
    pub foam_coverage: f32,
    /// Simulation time passed to the update that produced the frame
    pub time: f32,
    pub frame_index: u64,
}

impl OceanSimStatistics {
    pub(crate) fn new(stats: &SurfaceStatistics, time: f32, frame_index: u64) -> Self {
        Self {
            max_height: stats.max_height,
            min_height: stats.min_height,
            rms_height: stats.rms_height,
            max_horizontal: stats.max_horizontal,
            mean_foam: stats.mean_foam,
            foam_coverage: stats.foam_coverage,
            time,
            frame_index,
        }
    }
}

/// Write the default wave parameters into `out_params`.
///
/// # Safety
/// `out_params` must be null or point to writable memory for one `OceanSimParameters`.
#[no_mangle]
pub unsafe extern "C" fn ocean_sim_default_parameters(
    out_params: *mut OceanSimParameters,
) -> OceanSimErrorCode {
    if out_params.is_null() {
        return track_error(&FfiError::null_pointer("out_params"));
    }

    unsafe {
        *out_params = OceanSimParameters::from(&OceanParameters::default());
    }
    to_code(track_result(Ok(())))
}

/// Write the default construction options into `out_options`.
///
/// # Safety
/// `out_options` must be null or point to writable memory for one `OceanSimOptions`.
#[no_mangle]
pub unsafe extern "C" fn ocean_sim_default_options(
    out_options: *mut OceanSimOptions,
) -> OceanSimErrorCode {
    if out_options.is_null() {
        return track_error(&FfiError::null_pointer("out_options"));
    }

    unsafe {
        *out_options = OceanSimOptions::default();
    }
    to_code(track_result(Ok(())))
}

/// Load wave parameters from a JSON file.
///
/// Returns `OceanSimErrorCode::ParameterFile` if the file cannot be read or parsed.
/// The loaded values are validated when passed to `ocean_sim_new`.
///
/// # Safety
/// - `path` must be null or a valid null-terminated UTF-8 string.
/// - `out_params` must be null or point to writable memory for one `OceanSimParameters`.
#[no_mangle]
pub unsafe extern "C" fn ocean_sim_load_parameters(
    path: *const c_char,
    out_params: *mut OceanSimParameters,
) -> OceanSimErrorCode {
    if path.is_null() {
        return track_error(&FfiError::null_pointer("path"));
    }
    if out_params.is_null() {
        return track_error(&FfiError::null_pointer("out_params"));
    }

    let path = unsafe { CStr::from_ptr(path) };
    let loaded = path
        .to_str()
        .map_err(|e| FfiError::invalid_parameter(format!("path is not valid UTF-8: {e}")))
        .and_then(|path| OceanParameters::load(path).map_err(FfiError::from));

    to_code(track_result(loaded).map(|params| unsafe {
        *out_params = OceanSimParameters::from(&params);
    }))
}

/// Save wave parameters to a JSON file.
///
/// # Safety
/// - `path` must be null or a valid null-terminated UTF-8 string.
/// - `params` must be null or point to a valid `OceanSimParameters`.
#[no_mangle]
pub unsafe extern "C" fn ocean_sim_save_parameters(
    path: *const c_char,
    params: *const OceanSimParameters,
) -> OceanSimErrorCode {
    if path.is_null() {
        return track_error(&FfiError::null_pointer("path"));
    }
    if params.is_null() {
        return track_error(&FfiError::null_pointer("params"));
    }

    let path = unsafe { CStr::from_ptr(path) };
    let params = OceanParameters::from(unsafe { &*params });
    let saved = path
        .to_str()
        .map_err(|e| FfiError::invalid_parameter(format!("path is not valid UTF-8: {e}")))
        .and_then(|path| params.save(path).map_err(FfiError::from));

    to_code(track_result(saved))
}
