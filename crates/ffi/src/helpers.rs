use crate::error::{with_last_error_mut, FfiError, OceanSimErrorCode};
use std::ffi::CString;

/// Set the thread-local error message and code.
/// Internal helper for FFI functions to record failure details.
pub(crate) fn set_last_error(error: &FfiError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &FfiError) -> OceanSimErrorCode {
    set_last_error(error);
    error.code()
}

/// Record the outcome of a fallible operation and return its code.
/// Success clears the thread's last error.
pub(crate) fn track_result<T>(result: Result<T, FfiError>) -> Result<T, OceanSimErrorCode> {
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(error) => Err(track_error(&error)),
    }
}

/// Clear the thread-local error message and code.
/// Internal helper called on successful operations.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = OceanSimErrorCode::Ok;
    });
}

/// Collapse a tracked result into the code returned across the boundary.
#[inline]
pub(crate) fn to_code(result: Result<(), OceanSimErrorCode>) -> OceanSimErrorCode {
    match result {
        Ok(()) => OceanSimErrorCode::Ok,
        Err(code) => code,
    }
}
