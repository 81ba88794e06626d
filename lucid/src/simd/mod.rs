//! Fixed-width pixel kernels with a compile-time selected backend.
//!
//! With the `simd` feature enabled the kernels run on SSE2 (x86_64) or NEON
//! (aarch64); SSE2 and NEON are baseline on those targets, so the choice is
//! made entirely by `cfg` and never by runtime CPU detection. Every other
//! configuration uses [`scalar`], which is always compiled so the active
//! backend can be checked against it on the same inputs.
//!
//! All kernels are pure functions over fixed-size batches (8 bytes or 4 f32
//! lanes). The buffer-level helpers at the bottom of this module run the
//! batch kernels over whole slices and finish the tail with scalar code.

pub mod scalar;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
mod sse;

#[cfg(all(feature = "simd", target_arch = "aarch64"))]
mod neon;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
use sse as backend;

#[cfg(all(feature = "simd", target_arch = "aarch64"))]
use neon as backend;

#[cfg(not(all(feature = "simd", any(target_arch = "x86_64", target_arch = "aarch64"))))]
use scalar as backend;

/// Number of f32 lanes processed per batch.
pub const LANES: usize = 4;

/// Name of the backend compiled into this build.
pub const BACKEND: &str = backend::NAME;

/// Widen 8 bytes to 8 floats (no scaling).
#[inline]
pub fn u8x8_to_f32(src: &[u8; 8]) -> [f32; 8] {
    backend::u8x8_to_f32(src)
}

/// Narrow 4 floats to bytes, saturating to [0, 255] and truncating toward zero.
///
/// NaN maps to 0.
#[inline]
pub fn f32x4_to_u8(src: &[f32; 4]) -> [u8; 4] {
    backend::f32x4_to_u8(src)
}

/// Sum of absolute differences over 8 bytes.
#[inline]
pub fn sad_u8x8(a: &[u8; 8], b: &[u8; 8]) -> u32 {
    backend::sad_u8x8(a, b)
}

/// Sum of squared differences over 4 floats.
#[inline]
pub fn ssd_f32x4(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    backend::ssd_f32x4(a, b)
}

/// Horizontal Sobel response for 4 consecutive pixels.
///
/// Each row slice starts one column left of the first output pixel and must
/// hold at least 6 values. Lane `i` is the gradient centered on `row[i + 1]`.
#[inline]
pub fn sobel_x_3x3(row0: &[f32], row1: &[f32], row2: &[f32]) -> [f32; 4] {
    assert_sobel_rows(row0, row1, row2);
    backend::sobel_x_3x3(row0, row1, row2)
}

/// Vertical Sobel response for 4 consecutive pixels. Same layout as [`sobel_x_3x3`].
#[inline]
pub fn sobel_y_3x3(row0: &[f32], row1: &[f32], row2: &[f32]) -> [f32; 4] {
    assert_sobel_rows(row0, row1, row2);
    backend::sobel_y_3x3(row0, row1, row2)
}

/// `sqrt(gx² + gy²)` per lane.
///
/// The SIMD backends use the hardware reciprocal square root estimate
/// refined by one Newton-Raphson step. Maximum relative error against an
/// exact square root: about 2.5e-5 on NEON (8-bit estimate) and about 1e-6
/// on SSE (12-bit estimate). Zero input gives exactly zero.
#[inline]
pub fn gradient_magnitude(gx: &[f32; 4], gy: &[f32; 4]) -> [f32; 4] {
    backend::gradient_magnitude(gx, gy)
}

/// Bilinear interpolation of a 2×2 neighborhood, per lane.
///
/// `p00`/`p10` are the top-left/top-right samples, `p01`/`p11` the bottom
/// row; `fx`/`fy` are the fractional offsets in [0, 1]. Evaluated in lerp
/// form so a constant neighborhood interpolates to exactly that constant.
#[inline]
pub fn bilinear_interp_4(
    p00: &[f32; 4],
    p10: &[f32; 4],
    p01: &[f32; 4],
    p11: &[f32; 4],
    fx: &[f32; 4],
    fy: &[f32; 4],
) -> [f32; 4] {
    backend::bilinear_interp_4(p00, p10, p01, p11, fx, fy)
}

#[inline]
fn assert_sobel_rows(row0: &[f32], row1: &[f32], row2: &[f32]) {
    assert!(
        row0.len() >= 6 && row1.len() >= 6 && row2.len() >= 6,
        "sobel rows need at least 6 values, got {}/{}/{}",
        row0.len(),
        row1.len(),
        row2.len()
    );
}

// ---------------------------------------------------------------------------
// Buffer-level helpers
// ---------------------------------------------------------------------------

/// Sum of absolute differences over two byte buffers of equal length.
pub fn sad_u8(a: &[u8], b: &[u8]) -> u64 {
    assert_eq!(a.len(), b.len(), "sad_u8 buffers must have equal length");

    let (a_chunks, a_tail) = a.as_chunks::<8>();
    let (b_chunks, b_tail) = b.as_chunks::<8>();

    let mut sum: u64 = a_chunks
        .iter()
        .zip(b_chunks)
        .map(|(ca, cb)| sad_u8x8(ca, cb) as u64)
        .sum();

    sum += a_tail
        .iter()
        .zip(b_tail)
        .map(|(&x, &y)| x.abs_diff(y) as u64)
        .sum::<u64>();

    sum
}

/// Convert bytes to floats normalized to [0, 1].
pub fn u8_to_f32_normalized(src: &[u8], dst: &mut [f32]) {
    assert_eq!(src.len(), dst.len(), "source and destination lengths differ");

    let (src_chunks, src_tail) = src.as_chunks::<8>();
    let (dst_chunks, dst_tail) = dst.as_chunks_mut::<8>();

    for (s, d) in src_chunks.iter().zip(dst_chunks.iter_mut()) {
        let wide = u8x8_to_f32(s);
        for (out, v) in d.iter_mut().zip(wide) {
            *out = v / 255.0;
        }
    }
    for (out, &v) in dst_tail.iter_mut().zip(src_tail) {
        *out = v as f32 / 255.0;
    }
}

/// Convert normalized floats to bytes, rounding half up and saturating.
///
/// Non-finite values become 0.
pub fn f32_normalized_to_u8(src: &[f32], dst: &mut [u8]) {
    assert_eq!(src.len(), dst.len(), "source and destination lengths differ");

    let (src_chunks, src_tail) = src.as_chunks::<4>();
    let (dst_chunks, dst_tail) = dst.as_chunks_mut::<4>();

    for (s, d) in src_chunks.iter().zip(dst_chunks.iter_mut()) {
        let scaled = s.map(scale_to_byte_range);
        *d = f32x4_to_u8(&scaled);
    }
    for (out, &v) in dst_tail.iter_mut().zip(src_tail) {
        *out = scalar::f32_to_u8(scale_to_byte_range(v));
    }
}

#[inline]
fn scale_to_byte_range(v: f32) -> f32 {
    if v.is_finite() { v * 255.0 + 0.5 } else { 0.0 }
}

/// Sobel gradient magnitude for every interior column of one row.
///
/// `row0`, `row1`, `row2` are the rows above, at and below the output row;
/// all four slices share the image width. The first and last entries of
/// `out` are set to zero.
pub fn sobel_magnitude_row(row0: &[f32], row1: &[f32], row2: &[f32], out: &mut [f32]) {
    let width = out.len();
    assert!(
        row0.len() == width && row1.len() == width && row2.len() == width,
        "sobel rows must match the output width"
    );

    if width == 0 {
        return;
    }
    out[0] = 0.0;
    out[width - 1] = 0.0;
    if width < 3 {
        return;
    }

    let mut x = 1;
    while x + LANES < width {
        let gx = sobel_x_3x3(&row0[x - 1..], &row1[x - 1..], &row2[x - 1..]);
        let gy = sobel_y_3x3(&row0[x - 1..], &row1[x - 1..], &row2[x - 1..]);
        out[x..x + LANES].copy_from_slice(&gradient_magnitude(&gx, &gy));
        x += LANES;
    }

    while x < width - 1 {
        let (gx, gy) = scalar::sobel_at(row0, row1, row2, x);
        out[x] = (gx * gx + gy * gy).sqrt();
        x += 1;
    }
}
