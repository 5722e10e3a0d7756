use super::*;

fn solid_coverage(w: i32, h: i32, value: u8) -> CoverageBuffer {
    CoverageBuffer {
        width: w,
        height: h,
        data: std::iter::repeat_n([value, 0], (w * h) as usize)
            .flatten()
            .collect(),
        offset_x: 0,
        offset_y: 0,
    }
}

fn pixel(buf: &[u8], w: i32, x: i32, y: i32) -> u32 {
    let at = ((y * w + x) * 4) as usize;
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

const OPAQUE_RED: u32 = 0xff00_0000 | 0xff0000;

#[test]
fn full_coverage_blends_to_near_source() {
    // a = 255, ia = 1: channels land one notch under the source value.
    assert_eq!(pixmix(0, OPAQUE_RED, 64 << 6), 0x00fe_0000);
    // Blending a color onto itself is stable.
    assert_eq!(pixmix(0x00ff_0000, OPAQUE_RED, 64 << 6), 0x00ff_0000);
}

#[test]
fn zero_coverage_is_identity() {
    assert_eq!(pixmix(0x0012_3456, OPAQUE_RED, 0), 0x0012_3456);
}

#[test]
fn destination_alpha_decays() {
    // Source contributes no alpha; existing alpha fades with ia.
    let out = pixmix(0xff00_0000, OPAQUE_RED, 64 << 6);
    assert_eq!(out >> 24, 0);
    let half = pixmix(0xff00_0000, OPAQUE_RED, 32 << 6);
    assert_eq!(half >> 24, 0x80);
}

#[test]
fn draw_writes_body_inside_clip_only() {
    let cov = solid_coverage(4, 2, 64);
    let mut buf = vec![0u8; 8 * 4 * 4];
    let mut surface = SurfaceMut::rgb32(&mut buf, 8, 4).unwrap();

    let clip = Rect::new(0, 0, 2, 4);
    let sw = single_color(OPAQUE_RED);
    let touched = draw(&mut surface, clip, None, &cov, 0, 0, &sw, true, false);

    assert_eq!(touched, Rect::new(0, 0, 2, 2));
    assert_eq!(pixel(&buf, 8, 0, 0), 0x00fe_0000);
    assert_eq!(pixel(&buf, 8, 1, 1), 0x00fe_0000);
    // Clipped-out and uncovered pixels stay black.
    assert_eq!(pixel(&buf, 8, 2, 0), 0);
    assert_eq!(pixel(&buf, 8, 0, 3), 0);
}

#[test]
fn empty_clip_is_a_noop() {
    let cov = solid_coverage(2, 2, 64);
    let mut buf = vec![0u8; 4 * 4 * 4];
    let mut surface = SurfaceMut::rgb32(&mut buf, 4, 4).unwrap();

    let sw = single_color(OPAQUE_RED);
    let touched = draw(&mut surface, Rect::empty(), None, &cov, 0, 0, &sw, true, false);

    assert!(touched.is_empty());
    assert!(buf.iter().all(|&b| b == 0));
}

#[test]
fn switch_points_recolor_left_to_right() {
    let cov = solid_coverage(4, 1, 64);
    let mut buf = vec![0u8; 4 * 1 * 4];
    let mut surface = SurfaceMut::rgb32(&mut buf, 4, 1).unwrap();

    let blue = 0xff00_0000 | 0x0000ff;
    let pts: SwitchPoints = smallvec![
        (OPAQUE_RED, 0),
        (blue, 2),
        (blue, 0x00ff_ffff),
    ];
    draw(
        &mut surface,
        Rect::new(0, 0, 4, 1),
        None,
        &cov,
        0,
        0,
        &pts,
        true,
        false,
    );

    assert_eq!(pixel(&buf, 4, 0, 0), 0x00fe_0000);
    assert_eq!(pixel(&buf, 4, 1, 0), 0x00fe_0000);
    assert_eq!(pixel(&buf, 4, 2, 0), 0x0000_00fe);
    assert_eq!(pixel(&buf, 4, 3, 0), 0x0000_00fe);
}

#[test]
fn alpha_mask_scales_the_blend_weight() {
    let cov = solid_coverage(2, 1, 64);
    let mut buf = vec![0u8; 2 * 1 * 4];
    let mut surface = SurfaceMut::rgb32(&mut buf, 2, 1).unwrap();

    // Mask: left pixel clipped out, right fully inside.
    let mask = vec![0u8, 64u8];
    let sw = single_color(OPAQUE_RED);
    draw(
        &mut surface,
        Rect::new(0, 0, 2, 1),
        Some(&mask),
        &cov,
        0,
        0,
        &sw,
        true,
        false,
    );

    assert_eq!(pixel(&buf, 2, 0, 0), 0);
    assert_eq!(pixel(&buf, 2, 1, 0), 0x00fe_0000);
}

#[test]
fn border_is_the_channel_difference() {
    // fill 0, wide 64 everywhere: pure border coverage.
    let mut cov = solid_coverage(2, 1, 0);
    for px in cov.data.chunks_exact_mut(2) {
        px[1] = 64;
    }
    let mut buf = vec![0u8; 2 * 1 * 4];
    let mut surface = SurfaceMut::rgb32(&mut buf, 2, 1).unwrap();

    let sw = single_color(OPAQUE_RED);
    draw(
        &mut surface,
        Rect::new(0, 0, 2, 1),
        None,
        &cov,
        0,
        0,
        &sw,
        false,
        true,
    );

    assert_eq!(pixel(&buf, 2, 0, 0), 0x00fe_0000);
}

#[cfg(target_arch = "x86_64")]
#[test]
fn simd_matches_scalar_bit_for_bit() {
    use crate::compose::simd::{Sse2Mixer, sse2_available};

    if !sse2_available() {
        return;
    }

    let mixer = Sse2Mixer;
    let dsts = [0u32, 0x00ff_ffff, 0x1234_5678, 0xffff_ffff, 0x8000_0001];
    let colors = [
        0u32,
        OPAQUE_RED,
        0x8000_ff00,
        0x7f12_3456,
        0x01ab_cdef,
        0xff00_00ff,
    ];
    // Coverage-shaped alphas, mask products, and a negative border
    // difference wrapped to u32.
    let alphas: Vec<u32> = (0..=64u32)
        .map(|c| c << 6)
        .chain((0..=64).map(|c| c * 255))
        .chain([(-32i32 << 6) as u32, u32::MAX])
        .collect();

    for &d in &dsts {
        for &c in &colors {
            for &a in &alphas {
                let mut simd = d;
                mixer.mix(&mut simd, c, a);
                assert_eq!(
                    simd,
                    pixmix(d, c, a),
                    "diverged for dst={d:#x} color={c:#x} alpha={a:#x}"
                );
            }
        }
    }
}
