//! Scalar (non-SIMD) implementations of the pixel kernels.
//!
//! Also used for tails that do not fill a full batch.

pub(super) const NAME: &str = "scalar";

#[inline]
pub fn u8x8_to_f32(src: &[u8; 8]) -> [f32; 8] {
    src.map(f32::from)
}

/// Saturating float to byte conversion for a single value.
#[inline]
pub fn f32_to_u8(v: f32) -> u8 {
    // `as` truncates toward zero and maps NaN to 0.
    v.clamp(0.0, 255.0) as u8
}

#[inline]
pub fn f32x4_to_u8(src: &[f32; 4]) -> [u8; 4] {
    src.map(f32_to_u8)
}

#[inline]
pub fn sad_u8x8(a: &[u8; 8], b: &[u8; 8]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| x.abs_diff(y) as u32)
        .sum()
}

#[inline]
pub fn ssd_f32x4(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[inline]
pub fn sobel_x_3x3(row0: &[f32], row1: &[f32], row2: &[f32]) -> [f32; 4] {
    std::array::from_fn(|i| {
        let top = row0[i + 2] - row0[i];
        let mid = row1[i + 2] - row1[i];
        let bot = row2[i + 2] - row2[i];
        top + 2.0 * mid + bot
    })
}

#[inline]
pub fn sobel_y_3x3(row0: &[f32], _row1: &[f32], row2: &[f32]) -> [f32; 4] {
    std::array::from_fn(|i| {
        let top = row0[i] + row0[i + 2] + 2.0 * row0[i + 1];
        let bot = row2[i] + row2[i + 2] + 2.0 * row2[i + 1];
        bot - top
    })
}

/// Sobel (gx, gy) centered on column `x` of `row1`. Requires `1 <= x < len - 1`.
#[inline]
pub fn sobel_at(row0: &[f32], row1: &[f32], row2: &[f32], x: usize) -> (f32, f32) {
    let gx = (row0[x + 1] - row0[x - 1])
        + 2.0 * (row1[x + 1] - row1[x - 1])
        + (row2[x + 1] - row2[x - 1]);
    let gy = (row2[x - 1] + row2[x + 1] + 2.0 * row2[x])
        - (row0[x - 1] + row0[x + 1] + 2.0 * row0[x]);
    (gx, gy)
}

#[inline]
pub fn gradient_magnitude(gx: &[f32; 4], gy: &[f32; 4]) -> [f32; 4] {
    std::array::from_fn(|i| (gx[i] * gx[i] + gy[i] * gy[i]).sqrt())
}

#[inline]
pub fn bilinear_interp_4(
    p00: &[f32; 4],
    p10: &[f32; 4],
    p01: &[f32; 4],
    p11: &[f32; 4],
    fx: &[f32; 4],
    fy: &[f32; 4],
) -> [f32; 4] {
    std::array::from_fn(|i| {
        let top = p00[i] + (p10[i] - p00[i]) * fx[i];
        let bot = p01[i] + (p11[i] - p01[i]) * fx[i];
        top + (bot - top) * fy[i]
    })
}
