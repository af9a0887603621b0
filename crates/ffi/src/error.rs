use ocean_sim_core::OceanSimError;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Error raised at the FFI boundary: a code for the caller plus a message for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FfiError {
    code: OceanSimErrorCode,
    msg: String,
}

impl FfiError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_instance"`, `"out_texels"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: OceanSimErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for an out-of-range argument that never reached the core.
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: OceanSimErrorCode::InvalidParameter,
            msg: message,
        }
    }

    /// Create error for poisoned lock.
    ///
    /// # Arguments
    /// * `lock_name` - The name of the lock that was poisoned (e.g., `"simulator"`)
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: OceanSimErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    /// Create error for a caller buffer smaller than the surface it must hold.
    pub fn buffer_too_small(param_name: &str, required: usize, provided: usize) -> Self {
        Self {
            code: OceanSimErrorCode::BufferTooSmall,
            msg: format!(
                "Buffer '{param_name}' holds {provided} floats, {required} are required"
            ),
        }
    }

    pub fn code(&self) -> OceanSimErrorCode {
        self.code
    }

    pub fn msg(&self) -> &str {
        &self.msg
    }
}

impl From<OceanSimError> for FfiError {
    fn from(error: OceanSimError) -> Self {
        let code = match error {
            OceanSimError::Configuration { .. } => OceanSimErrorCode::InvalidParameter,
            OceanSimError::ResourceAllocation(_) => OceanSimErrorCode::ResourceAllocation,
            OceanSimError::Backend(_) => OceanSimErrorCode::Backend,
            OceanSimError::ParameterFile(_) => OceanSimErrorCode::ParameterFile,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

/// FFI error codes returned by ocean simulation functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OceanSimErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// A parameter is outside its valid range (grid dimension, wind, patch size, time...).
    InvalidParameter = 2,

    /// The compute backend could not allocate the simulation buffers.
    ResourceAllocation = 3,

    /// The compute backend failed while running a frame.
    Backend = 4,

    /// A parameter file could not be read, parsed or written.
    ParameterFile = 5,

    /// Caller-provided output buffer is too small.
    BufferTooSmall = 6,

    /// Lock poisoned: a panic in another thread left the simulator in an unknown state.
    LockPoisoned = 7,
}

thread_local! {
    /// Thread-local storage for the most recent FFI error (C string, error code).
    /// The CString is stored to keep the pointer handed out by `ocean_sim_get_last_error` alive.
    static LAST_ERROR: RefCell<(Option<CString>, OceanSimErrorCode)> = const { RefCell::new((None, OceanSimErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, OceanSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, OceanSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if an error occurred.
/// - `null` if the last call on this thread succeeded.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```cpp
/// OceanSimInstance* ocean = nullptr;
/// OceanSimErrorCode err = ocean_sim_new(&params, &options, &ocean);
/// if (err != OceanSimErrorCode::Ok) {
///     const char* error = ocean_sim_get_last_error();
///     if (error) {
///         printf("Ocean sim creation failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn ocean_sim_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `OceanSimErrorCode::Ok` (0) if the last call on this thread succeeded.
/// Error state is per thread.
#[no_mangle]
pub extern "C" fn ocean_sim_get_last_error_code() -> OceanSimErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
