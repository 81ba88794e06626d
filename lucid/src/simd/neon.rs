//! NEON implementations of the pixel kernels (aarch64).
//!
//! NEON is mandatory on aarch64, so the wrappers are safe.

use std::arch::aarch64::*;

pub(super) const NAME: &str = "neon";

#[inline]
pub fn u8x8_to_f32(src: &[u8; 8]) -> [f32; 8] {
    let mut out = [0.0f32; 8];
    unsafe {
        let words = vmovl_u8(vld1_u8(src.as_ptr()));
        let lo = vcvtq_f32_u32(vmovl_u16(vget_low_u16(words)));
        let hi = vcvtq_f32_u32(vmovl_u16(vget_high_u16(words)));
        vst1q_f32(out.as_mut_ptr(), lo);
        vst1q_f32(out.as_mut_ptr().add(4), hi);
    }
    out
}

#[inline]
pub fn f32x4_to_u8(src: &[f32; 4]) -> [u8; 4] {
    let mut out = [0u8; 8];
    unsafe {
        let v = vld1q_f32(src.as_ptr());
        let v = vminq_f32(vmaxq_f32(v, vdupq_n_f32(0.0)), vdupq_n_f32(255.0));
        // fcvtzu truncates toward zero and maps NaN to 0.
        let words = vmovn_u32(vcvtq_u32_f32(v));
        let bytes = vmovn_u16(vcombine_u16(words, words));
        vst1_u8(out.as_mut_ptr(), bytes);
    }
    [out[0], out[1], out[2], out[3]]
}

#[inline]
pub fn sad_u8x8(a: &[u8; 8], b: &[u8; 8]) -> u32 {
    unsafe {
        let diff = vabd_u8(vld1_u8(a.as_ptr()), vld1_u8(b.as_ptr()));
        vaddlv_u8(diff) as u32
    }
}

#[inline]
pub fn ssd_f32x4(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    unsafe {
        let diff = vsubq_f32(vld1q_f32(a.as_ptr()), vld1q_f32(b.as_ptr()));
        vaddvq_f32(vmulq_f32(diff, diff))
    }
}

#[inline]
pub fn sobel_x_3x3(row0: &[f32], row1: &[f32], row2: &[f32]) -> [f32; 4] {
    debug_assert!(row0.len() >= 6 && row1.len() >= 6 && row2.len() >= 6);
    let mut out = [0.0f32; 4];
    unsafe {
        let top = vsubq_f32(vld1q_f32(row0.as_ptr().add(2)), vld1q_f32(row0.as_ptr()));
        let mid = vsubq_f32(vld1q_f32(row1.as_ptr().add(2)), vld1q_f32(row1.as_ptr()));
        let bot = vsubq_f32(vld1q_f32(row2.as_ptr().add(2)), vld1q_f32(row2.as_ptr()));
        let acc = vaddq_f32(vaddq_f32(top, vmulq_n_f32(mid, 2.0)), bot);
        vst1q_f32(out.as_mut_ptr(), acc);
    }
    out
}

#[inline]
pub fn sobel_y_3x3(row0: &[f32], _row1: &[f32], row2: &[f32]) -> [f32; 4] {
    debug_assert!(row0.len() >= 6 && row2.len() >= 6);
    let mut out = [0.0f32; 4];
    unsafe {
        let weighted_row = |row: &[f32]| {
            let left = vld1q_f32(row.as_ptr());
            let center = vld1q_f32(row.as_ptr().add(1));
            let right = vld1q_f32(row.as_ptr().add(2));
            vaddq_f32(vaddq_f32(left, right), vmulq_n_f32(center, 2.0))
        };
        let top = weighted_row(row0);
        let bot = weighted_row(row2);
        vst1q_f32(out.as_mut_ptr(), vsubq_f32(bot, top));
    }
    out
}

#[inline]
pub fn gradient_magnitude(gx: &[f32; 4], gy: &[f32; 4]) -> [f32; 4] {
    let mut out = [0.0f32; 4];
    unsafe {
        let vx = vld1q_f32(gx.as_ptr());
        let vy = vld1q_f32(gy.as_ptr());
        let sum = vaddq_f32(vmulq_f32(vx, vx), vmulq_f32(vy, vy));

        // vrsqrts computes (3 - a * b) / 2, one Newton-Raphson step.
        let est = vrsqrteq_f32(sum);
        let est = vmulq_f32(est, vrsqrtsq_f32(vmulq_f32(sum, est), est));
        let mag = vmulq_f32(sum, est);

        let valid = vcgtq_f32(sum, vdupq_n_f32(f32::MIN_POSITIVE));
        let masked = vandq_u32(vreinterpretq_u32_f32(mag), valid);
        vst1q_f32(out.as_mut_ptr(), vreinterpretq_f32_u32(masked));
    }
    out
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
    let mut out = [0.0f32; 4];
    unsafe {
        let a = vld1q_f32(p00.as_ptr());
        let b = vld1q_f32(p10.as_ptr());
        let c = vld1q_f32(p01.as_ptr());
        let d = vld1q_f32(p11.as_ptr());
        let vfx = vld1q_f32(fx.as_ptr());
        let vfy = vld1q_f32(fy.as_ptr());

        let top = vaddq_f32(a, vmulq_f32(vsubq_f32(b, a), vfx));
        let bot = vaddq_f32(c, vmulq_f32(vsubq_f32(d, c), vfx));
        let result = vaddq_f32(top, vmulq_f32(vsubq_f32(bot, top), vfy));
        vst1q_f32(out.as_mut_ptr(), result);
    }
    out
}
