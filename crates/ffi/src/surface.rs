//! Copy-out of published surface frames into caller-owned texel buffers
use ocean_sim_core::SurfaceFrame;

use crate::error::{FfiError, OceanSimErrorCode};
use crate::helpers::{to_code, track_error, track_result};
use crate::instance::{instance_ref, OceanSimInstance};
use crate::params::OceanSimStatistics;

/// Floats per texel in the copy-out layouts
const TEXEL_FLOATS: usize = 4;

fn required_floats(frame: &SurfaceFrame) -> usize {
    frame.displacement.cell_count() * TEXEL_FLOATS
}

fn output_slice<'a>(
    frame: &SurfaceFrame,
    name: &str,
    out: *mut f32,
    len: usize,
) -> Result<&'a mut [f32], FfiError> {
    if out.is_null() {
        return Err(FfiError::null_pointer(name));
    }
    let required = required_floats(frame);
    if len < required {
        return Err(FfiError::buffer_too_small(name, required, len));
    }
    // SAFETY: caller guarantees `out` holds `len` writable floats.
    Ok(unsafe { std::slice::from_raw_parts_mut(out, required) })
}

/// Write `[x, y, z, 1]` per cell, row-major.
fn write_displacement(frame: &SurfaceFrame, out: &mut [f32]) {
    for (texel, d) in out
        .chunks_exact_mut(TEXEL_FLOATS)
        .zip(frame.displacement.as_slice())
    {
        texel.copy_from_slice(&[d.x, d.y, d.z, 1.0]);
    }
}

/// Write `[slope_x, slope_y, 0, foam]` per cell, row-major.
fn write_gradient(frame: &SurfaceFrame, out: &mut [f32]) {
    for (texel, g) in out
        .chunks_exact_mut(TEXEL_FLOATS)
        .zip(frame.gradient.as_slice())
    {
        texel.copy_from_slice(&[g.slope.x, g.slope.y, 0.0, g.foam]);
    }
}

/// Grid cells per side of the published surface, or 0 for a null instance.
///
/// Copy buffers need `4 * dimension * dimension` floats.
///
/// # Safety
/// `instance` must be null or a valid pointer from `ocean_sim_new`.
#[no_mangle]
pub unsafe extern "C" fn ocean_sim_grid_dimension(instance: *const OceanSimInstance) -> u32 {
    let Ok(instance) = instance_ref(instance) else {
        return 0;
    };
    u32::try_from(instance.reader.latest().dimension()).unwrap_or(0)
}

/// Copy the latest displacement field into `out_texels` as `[x, y, z, 1]` per cell.
///
/// Cells are row-major (`y * dimension + x`). `x`/`y` are the horizontal
/// (choppy) offsets and `z` the height, all in meters. Before the first update
/// the surface is flat.
///
/// Returns `BufferTooSmall` if `len` is less than `4 * dimension²`.
///
/// # Safety
/// - `instance` must be null or a valid pointer from `ocean_sim_new`.
/// - `out_texels` must be null or point to `len` writable floats.
#[no_mangle]
pub unsafe extern "C" fn ocean_sim_copy_displacement(
    instance: *const OceanSimInstance,
    out_texels: *mut f32,
    len: usize,
) -> OceanSimErrorCode {
    let instance = match instance_ref(instance) {
        Ok(instance) => instance,
        Err(code) => return code,
    };

    let frame = instance.reader.latest();
    let result = output_slice(&frame, "out_texels", out_texels, len)
        .map(|out| write_displacement(&frame, out));
    to_code(track_result(result))
}

/// Copy the latest gradient field into `out_texels` as `[slope_x, slope_y, 0, foam]` per cell.
///
/// Foam is in `[0, 1]`. Layout and size requirements match `ocean_sim_copy_displacement`.
///
/// # Safety
/// - `instance` must be null or a valid pointer from `ocean_sim_new`.
/// - `out_texels` must be null or point to `len` writable floats.
#[no_mangle]
pub unsafe extern "C" fn ocean_sim_copy_gradient(
    instance: *const OceanSimInstance,
    out_texels: *mut f32,
    len: usize,
) -> OceanSimErrorCode {
    let instance = match instance_ref(instance) {
        Ok(instance) => instance,
        Err(code) => return code,
    };

    let frame = instance.reader.latest();
    let result = output_slice(&frame, "out_texels", out_texels, len)
        .map(|out| write_gradient(&frame, out));
    to_code(track_result(result))
}

/// Summary statistics of the latest published frame.
///
/// # Safety
/// - `instance` must be null or a valid pointer from `ocean_sim_new`.
/// - `out_stats` must be null or point to writable memory for one `OceanSimStatistics`.
#[no_mangle]
pub unsafe extern "C" fn ocean_sim_get_statistics(
    instance: *const OceanSimInstance,
    out_stats: *mut OceanSimStatistics,
) -> OceanSimErrorCode {
    let instance = match instance_ref(instance) {
        Ok(instance) => instance,
        Err(code) => return code,
    };
    if out_stats.is_null() {
        return track_error(&FfiError::null_pointer("out_stats"));
    }

    let frame = instance.reader.latest();
    unsafe {
        *out_stats = OceanSimStatistics::new(&frame.statistics(), frame.time, frame.frame_index);
    }
    to_code(track_result(Ok(())))
}
