//! SSE2 implementations of the pixel kernels (x86_64).
//!
//! SSE2 is part of the x86_64 baseline, so no runtime feature check is needed
//! and the wrappers are safe. Unaligned loads/stores are used throughout.

use std::arch::x86_64::*;

pub(super) const NAME: &str = "sse2";

#[inline]
pub fn u8x8_to_f32(src: &[u8; 8]) -> [f32; 8] {
    let mut out = [0.0f32; 8];
    unsafe {
        let zero = _mm_setzero_si128();
        let bytes = _mm_loadl_epi64(src.as_ptr() as *const __m128i);
        let words = _mm_unpacklo_epi8(bytes, zero);
        let lo = _mm_cvtepi32_ps(_mm_unpacklo_epi16(words, zero));
        let hi = _mm_cvtepi32_ps(_mm_unpackhi_epi16(words, zero));
        _mm_storeu_ps(out.as_mut_ptr(), lo);
        _mm_storeu_ps(out.as_mut_ptr().add(4), hi);
    }
    out
}

#[inline]
pub fn f32x4_to_u8(src: &[f32; 4]) -> [u8; 4] {
    unsafe {
        let v = _mm_loadu_ps(src.as_ptr());
        // maxps returns its second operand when either input is NaN.
        let v = _mm_min_ps(_mm_max_ps(v, _mm_setzero_ps()), _mm_set1_ps(255.0));
        let ints = _mm_cvttps_epi32(v);
        let words = _mm_packs_epi32(ints, ints);
        let bytes = _mm_packus_epi16(words, words);
        (_mm_cvtsi128_si32(bytes) as u32).to_le_bytes()
    }
}

#[inline]
pub fn sad_u8x8(a: &[u8; 8], b: &[u8; 8]) -> u32 {
    unsafe {
        let va = _mm_loadl_epi64(a.as_ptr() as *const __m128i);
        let vb = _mm_loadl_epi64(b.as_ptr() as *const __m128i);
        _mm_cvtsi128_si32(_mm_sad_epu8(va, vb)) as u32
    }
}

#[inline]
pub fn ssd_f32x4(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    unsafe {
        let diff = _mm_sub_ps(_mm_loadu_ps(a.as_ptr()), _mm_loadu_ps(b.as_ptr()));
        let sq = _mm_mul_ps(diff, diff);
        // [a, b, c, d] -> [a+c, b+d, ..] -> a+c+b+d
        let pairs = _mm_add_ps(sq, _mm_movehl_ps(sq, sq));
        let odd = _mm_shuffle_ps::<0x55>(pairs, pairs);
        _mm_cvtss_f32(_mm_add_ss(pairs, odd))
    }
}

#[inline]
pub fn sobel_x_3x3(row0: &[f32], row1: &[f32], row2: &[f32]) -> [f32; 4] {
    debug_assert!(row0.len() >= 6 && row1.len() >= 6 && row2.len() >= 6);
    let mut out = [0.0f32; 4];
    unsafe {
        let two = _mm_set1_ps(2.0);
        let top = _mm_sub_ps(
            _mm_loadu_ps(row0.as_ptr().add(2)),
            _mm_loadu_ps(row0.as_ptr()),
        );
        let mid = _mm_sub_ps(
            _mm_loadu_ps(row1.as_ptr().add(2)),
            _mm_loadu_ps(row1.as_ptr()),
        );
        let bot = _mm_sub_ps(
            _mm_loadu_ps(row2.as_ptr().add(2)),
            _mm_loadu_ps(row2.as_ptr()),
        );
        let acc = _mm_add_ps(_mm_add_ps(top, _mm_mul_ps(two, mid)), bot);
        _mm_storeu_ps(out.as_mut_ptr(), acc);
    }
    out
}

#[inline]
pub fn sobel_y_3x3(row0: &[f32], _row1: &[f32], row2: &[f32]) -> [f32; 4] {
    debug_assert!(row0.len() >= 6 && row2.len() >= 6);
    let mut out = [0.0f32; 4];
    unsafe {
        let two = _mm_set1_ps(2.0);
        let weighted_row = |row: &[f32]| {
            let left = _mm_loadu_ps(row.as_ptr());
            let center = _mm_loadu_ps(row.as_ptr().add(1));
            let right = _mm_loadu_ps(row.as_ptr().add(2));
            _mm_add_ps(_mm_add_ps(left, right), _mm_mul_ps(two, center))
        };
        let top = weighted_row(row0);
        let bot = weighted_row(row2);
        _mm_storeu_ps(out.as_mut_ptr(), _mm_sub_ps(bot, top));
    }
    out
}

#[inline]
pub fn gradient_magnitude(gx: &[f32; 4], gy: &[f32; 4]) -> [f32; 4] {
    let mut out = [0.0f32; 4];
    unsafe {
        let vx = _mm_loadu_ps(gx.as_ptr());
        let vy = _mm_loadu_ps(gy.as_ptr());
        let sum = _mm_add_ps(_mm_mul_ps(vx, vx), _mm_mul_ps(vy, vy));

        // y' = y * (1.5 - 0.5 * s * y * y)
        let est = _mm_rsqrt_ps(sum);
        let half_sum = _mm_mul_ps(_mm_set1_ps(0.5), sum);
        let refined = _mm_mul_ps(
            est,
            _mm_sub_ps(_mm_set1_ps(1.5), _mm_mul_ps(half_sum, _mm_mul_ps(est, est))),
        );
        let mag = _mm_mul_ps(sum, refined);

        // rsqrt(0) is inf; denormals are flushed by rsqrtps.
        let valid = _mm_cmpgt_ps(sum, _mm_set1_ps(f32::MIN_POSITIVE));
        _mm_storeu_ps(out.as_mut_ptr(), _mm_and_ps(mag, valid));
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
        let a = _mm_loadu_ps(p00.as_ptr());
        let b = _mm_loadu_ps(p10.as_ptr());
        let c = _mm_loadu_ps(p01.as_ptr());
        let d = _mm_loadu_ps(p11.as_ptr());
        let vfx = _mm_loadu_ps(fx.as_ptr());
        let vfy = _mm_loadu_ps(fy.as_ptr());

        let top = _mm_add_ps(a, _mm_mul_ps(_mm_sub_ps(b, a), vfx));
        let bot = _mm_add_ps(c, _mm_mul_ps(_mm_sub_ps(d, c), vfx));
        let result = _mm_add_ps(top, _mm_mul_ps(_mm_sub_ps(bot, top), vfy));
        _mm_storeu_ps(out.as_mut_ptr(), result);
    }
    out
}
