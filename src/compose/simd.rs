//! SSE2 blend kernel.
//!
//! The widened multiply-add form of [`pixmix`](crate::compose::blend::pixmix):
//! destination and source bytes interleave into 16-bit lanes, one
//! `_mm_madd_epi16` against `(a << 16) | (0x100 - a)` pairs computes
//! `d*(256-a) + s*a` per channel, and the `>> 8` plus saturating packs
//! reproduce the scalar rounding exactly. Selected at runtime behind a
//! feature check; this is the only module in the crate allowed `unsafe`.
#![allow(unsafe_code)]

use std::arch::x86_64::{
    _mm_cvtsi32_si128, _mm_cvtsi128_si32, _mm_madd_epi16, _mm_packs_epi32,
    _mm_packus_epi16, _mm_set1_epi32, _mm_setzero_si128, _mm_srli_epi32,
    _mm_unpacklo_epi8, _mm_unpacklo_epi16,
};

use crate::compose::blend::PixMixer;

pub(crate) fn sse2_available() -> bool {
    std::is_x86_feature_detected!("sse2")
}

pub(crate) struct Sse2Mixer;

impl PixMixer for Sse2Mixer {
    fn mix(&self, dst: &mut u32, color: u32, alpha: u32) {
        // Callers only construct this mixer after `sse2_available`.
        unsafe { pixmix_sse2(dst, color, alpha) }
    }
}

#[target_feature(enable = "sse2")]
unsafe fn pixmix_sse2(dst: &mut u32, color: u32, alpha: u32) {
    let a = alpha.wrapping_mul(color >> 24) >> 12 & 0xff;
    let color = color & 0xffffff;

    let zero = _mm_setzero_si128();
    let aa = _mm_set1_epi32(((a << 16) | (0x100 - a)) as i32);
    let d = _mm_unpacklo_epi8(_mm_cvtsi32_si128(*dst as i32), zero);
    let s = _mm_unpacklo_epi8(_mm_cvtsi32_si128(color as i32), zero);
    let mut r = _mm_unpacklo_epi16(d, s);

    r = _mm_madd_epi16(r, aa);
    r = _mm_srli_epi32(r, 8);
    r = _mm_packs_epi32(r, r);
    r = _mm_packus_epi16(r, r);

    *dst = _mm_cvtsi128_si32(r) as u32;
}
