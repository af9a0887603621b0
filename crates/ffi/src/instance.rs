use ocean_sim_core::{OceanParameters, OceanSimulator, SimulatorOptions, SurfaceReader};
use std::ptr;
use std::sync::{Mutex, MutexGuard};

use crate::error::{FfiError, OceanSimErrorCode};
use crate::helpers::{to_code, track_error, track_result};
use crate::params::{OceanSimOptions, OceanSimParameters};

/// Opaque handle to one simulated ocean patch.
///
/// # Thread Safety
/// `OceanSimInstance` can be shared across threads. `ocean_sim_update` and
/// `ocean_sim_reinitialize` serialize on an internal mutex. The copy and
/// statistics functions read the last published frame through a separate
/// reader handle, so a render thread can copy a complete frame while the game
/// thread is running the next update.
///
/// ## Unreal Engine Example
/// ```cpp
/// OceanSimInstance* Ocean = nullptr;
///
/// void AOceanActor::BeginPlay() {
///     OceanSimParameters Params;
///     ocean_sim_default_parameters(&Params);
///     if (ocean_sim_new(&Params, nullptr, &Ocean) != OceanSimErrorCode::Ok) {
///         UE_LOG(LogTemp, Error, TEXT("%hs"), ocean_sim_get_last_error());
///     }
/// }
///
/// void AOceanActor::Tick(float DeltaTime) {
///     Elapsed += DeltaTime;
///     ocean_sim_update(Ocean, Elapsed);
///     ocean_sim_copy_displacement(Ocean, Texels.GetData(), Texels.Num());
/// }
///
/// void AOceanActor::EndPlay(const EEndPlayReason::Type Reason) {
///     ocean_sim_destroy(Ocean);
///     Ocean = nullptr;
/// }
/// ```
pub struct OceanSimInstance {
    pub(crate) sim: Mutex<OceanSimulator>,
    /// Published frames, readable without taking `sim`
    pub(crate) reader: SurfaceReader,
}

impl OceanSimInstance {
    pub(crate) fn new(
        params: &OceanSimParameters,
        options: &OceanSimOptions,
    ) -> Result<Box<Self>, FfiError> {
        let sim = OceanSimulator::with_options(
            OceanParameters::from(params),
            SimulatorOptions::from(options),
        )?;
        let reader = sim.surface_reader();

        Ok(Box::new(Self {
            sim: Mutex::new(sim),
            reader,
        }))
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, OceanSimulator>, FfiError> {
        self.sim
            .lock()
            .map_err(|_| FfiError::lock_poisoned("simulator"))
    }
}

/// Borrow the instance behind a caller pointer, recording a null-pointer error.
pub(crate) fn instance_ref<'a>(
    instance: *const OceanSimInstance,
) -> Result<&'a OceanSimInstance, OceanSimErrorCode> {
    if instance.is_null() {
        return Err(track_error(&FfiError::null_pointer("instance")));
    }
    // SAFETY: non-null pointers passed to the API come from `ocean_sim_new`.
    Ok(unsafe { &*instance })
}

/// Create a new ocean simulation and return it via out-parameter.
///
/// Returns
/// - `OceanSimErrorCode::Ok` (0): success, `out_instance` contains a valid pointer
/// - `OceanSimErrorCode::NullPointer`: `params` or `out_instance` is null
/// - `OceanSimErrorCode::InvalidParameter`: a parameter is outside its valid range
/// - `OceanSimErrorCode::ResourceAllocation`: the backend could not allocate its buffers,
///   or the GPU backend was requested and no usable adapter exists
///
/// On failure `out_instance` is set to null. Call `ocean_sim_get_last_error()`
/// for a human-readable description.
///
/// # Safety
///
/// - `params` must be null or point to a valid `OceanSimParameters`.
/// - `options` may be null (defaults are used) or point to a valid `OceanSimOptions`.
/// - `out_instance` must be null or point to writable memory.
/// - The caller owns the returned instance and MUST call `ocean_sim_destroy` exactly once.
#[no_mangle]
pub unsafe extern "C" fn ocean_sim_new(
    params: *const OceanSimParameters,
    options: *const OceanSimOptions,
    out_instance: *mut *mut OceanSimInstance,
) -> OceanSimErrorCode {
    if out_instance.is_null() {
        return track_error(&FfiError::null_pointer("out_instance"));
    }
    if params.is_null() {
        unsafe {
            *out_instance = ptr::null_mut();
        }
        return track_error(&FfiError::null_pointer("params"));
    }

    let params = unsafe { &*params };
    let options = if options.is_null() {
        OceanSimOptions::default()
    } else {
        unsafe { *options }
    };

    match track_result(OceanSimInstance::new(params, &options)) {
        Ok(instance) => {
            unsafe {
                *out_instance = Box::into_raw(instance);
            }
            OceanSimErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                *out_instance = ptr::null_mut();
            }
            code
        }
    }
}

/// Destroy an instance previously created by `ocean_sim_new`.
///
/// Null is a no-op.
///
/// # Safety
/// - The pointer MUST have been created by `ocean_sim_new` and not freed already.
/// - The caller must not use the pointer again.
#[no_mangle]
pub unsafe extern "C" fn ocean_sim_destroy(instance: *mut OceanSimInstance) {
    if instance.is_null() {
        return;
    }

    // SAFETY: created by `Box::into_raw` in `ocean_sim_new`.
    unsafe {
        drop(Box::from_raw(instance));
    }
}

/// Advance the simulation to absolute time `time` (seconds) and publish the new surface.
///
/// Returns `InvalidParameter` for a non-finite time and `Backend` if the compute
/// backend fails; the previously published surface stays visible in both cases.
///
/// # Safety
/// `instance` must be null or a valid pointer from `ocean_sim_new`.
#[no_mangle]
pub unsafe extern "C" fn ocean_sim_update(
    instance: *const OceanSimInstance,
    time: f32,
) -> OceanSimErrorCode {
    let instance = match instance_ref(instance) {
        Ok(instance) => instance,
        Err(code) => return code,
    };

    let result = instance
        .lock()
        .and_then(|mut sim| sim.update(time).map_err(FfiError::from));
    to_code(track_result(result))
}

/// Rebuild the wave spectrum for new parameters.
///
/// The published surface becomes flat until the next `ocean_sim_update`. If the
/// grid dimension changes, buffers passed to the copy functions must be resized.
/// On error the instance keeps its previous parameters.
///
/// # Safety
/// - `instance` must be null or a valid pointer from `ocean_sim_new`.
/// - `params` must be null or point to a valid `OceanSimParameters`.
#[no_mangle]
pub unsafe extern "C" fn ocean_sim_reinitialize(
    instance: *const OceanSimInstance,
    params: *const OceanSimParameters,
) -> OceanSimErrorCode {
    let instance = match instance_ref(instance) {
        Ok(instance) => instance,
        Err(code) => return code,
    };
    if params.is_null() {
        return track_error(&FfiError::null_pointer("params"));
    }

    let params = OceanParameters::from(unsafe { &*params });
    let result = instance
        .lock()
        .and_then(|mut sim| sim.reinitialize(params).map_err(FfiError::from));
    to_code(track_result(result))
}

/// Copy the parameters the instance is running with into `out_params`.
///
/// # Safety
/// - `instance` must be null or a valid pointer from `ocean_sim_new`.
/// - `out_params` must be null or point to writable memory for one `OceanSimParameters`.
#[no_mangle]
pub unsafe extern "C" fn ocean_sim_get_parameters(
    instance: *const OceanSimInstance,
    out_params: *mut OceanSimParameters,
) -> OceanSimErrorCode {
    let instance = match instance_ref(instance) {
        Ok(instance) => instance,
        Err(code) => return code,
    };
    if out_params.is_null() {
        return track_error(&FfiError::null_pointer("out_params"));
    }

    let result = instance.lock().map(|sim| unsafe {
        *out_params = OceanSimParameters::from(sim.parameters());
    });
    to_code(track_result(result))
}

/// Returns whether the simulation runs on the GPU backend.
///
/// Returns false for a null instance.
///
/// # Safety
/// `instance` must be null or a valid pointer from `ocean_sim_new`.
#[no_mangle]
pub unsafe extern "C" fn ocean_sim_is_gpu_accelerated(instance: *const OceanSimInstance) -> bool {
    let Ok(instance) = instance_ref(instance) else {
        return false;
    };

    instance
        .lock()
        .map(|sim| sim.is_gpu_accelerated())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ocean_sim_get_last_error_code;
    use crate::params::OceanSimBackend;

    fn cpu_options() -> OceanSimOptions {
        OceanSimOptions {
            backend: OceanSimBackend::Cpu,
            ..OceanSimOptions::default()
        }
    }

    fn small_params() -> OceanSimParameters {
        OceanSimParameters::from(&OceanParameters {
            grid_dimension: 16,
            patch_length: 100.0,
            ..OceanParameters::default()
        })
    }

    #[test]
    fn test_new_rejects_null_out_instance() {
        let params = small_params();
        let code = unsafe { ocean_sim_new(&params, ptr::null(), ptr::null_mut()) };
        assert_eq!(code, OceanSimErrorCode::NullPointer);
        assert_eq!(ocean_sim_get_last_error_code(), OceanSimErrorCode::NullPointer);
    }

    #[test]
    fn test_new_rejects_null_params() {
        let mut out: *mut OceanSimInstance = ptr::NonNull::dangling().as_ptr();
        let code = unsafe { ocean_sim_new(ptr::null(), ptr::null(), &mut out) };
        assert_eq!(code, OceanSimErrorCode::NullPointer);
        assert!(out.is_null());
    }

    #[test]
    fn test_invalid_dimension_reports_invalid_parameter() {
        let params = OceanSimParameters {
            grid_dimension: 100,
            ..small_params()
        };
        let options = cpu_options();
        let mut out: *mut OceanSimInstance = ptr::null_mut();

        let code = unsafe { ocean_sim_new(&params, &options, &mut out) };
        assert_eq!(code, OceanSimErrorCode::InvalidParameter);
        assert!(out.is_null());

        let message = unsafe { std::ffi::CStr::from_ptr(crate::error::ocean_sim_get_last_error()) };
        assert!(message.to_string_lossy().contains("grid_dimension"));
    }

    #[test]
    fn test_lifecycle() {
        let params = small_params();
        let options = cpu_options();
        let mut ocean: *mut OceanSimInstance = ptr::null_mut();

        unsafe {
            assert_eq!(ocean_sim_new(&params, &options, &mut ocean), OceanSimErrorCode::Ok);
            assert!(!ocean.is_null());
            assert!(!ocean_sim_is_gpu_accelerated(ocean));

            assert_eq!(ocean_sim_update(ocean, 1.0), OceanSimErrorCode::Ok);
            assert_eq!(ocean_sim_update(ocean, f32::NAN), OceanSimErrorCode::InvalidParameter);

            let calmer = OceanSimParameters {
                wind_speed: 5.0,
                grid_dimension: 32,
                ..params
            };
            assert_eq!(ocean_sim_reinitialize(ocean, &calmer), OceanSimErrorCode::Ok);

            let mut current = params;
            assert_eq!(ocean_sim_get_parameters(ocean, &mut current), OceanSimErrorCode::Ok);
            assert_eq!(current, calmer);

            ocean_sim_destroy(ocean);
        }
    }

    #[test]
    fn test_reinitialize_failure_keeps_parameters() {
        let params = small_params();
        let options = cpu_options();
        let mut ocean: *mut OceanSimInstance = ptr::null_mut();

        unsafe {
            assert_eq!(ocean_sim_new(&params, &options, &mut ocean), OceanSimErrorCode::Ok);

            let bad = OceanSimParameters {
                wind_dependency: 2.0,
                ..params
            };
            assert_eq!(ocean_sim_reinitialize(ocean, &bad), OceanSimErrorCode::InvalidParameter);

            let mut current = bad;
            assert_eq!(ocean_sim_get_parameters(ocean, &mut current), OceanSimErrorCode::Ok);
            assert_eq!(current, params);

            ocean_sim_destroy(ocean);
        }
    }

    #[test]
    fn test_null_instance() {
        unsafe {
            assert_eq!(ocean_sim_update(ptr::null(), 0.0), OceanSimErrorCode::NullPointer);
            assert_eq!(
                ocean_sim_reinitialize(ptr::null(), &small_params()),
                OceanSimErrorCode::NullPointer
            );
            assert!(!ocean_sim_is_gpu_accelerated(ptr::null()));
            ocean_sim_destroy(ptr::null_mut());
        }
    }
}
