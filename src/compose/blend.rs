//! Alpha compositing of coverage onto a destination frame.
//!
//! The blend weight is `coverage * style-alpha` (plus an optional per-pixel
//! clip-mask byte), applied with the packed-u32 arithmetic of the classic
//! `pixmix` kernel. Karaoke recoloring walks an ordered list of switch
//! points monotonically forward per scanline.

use smallvec::{SmallVec, smallvec};

use crate::compose::surface::SurfaceMut;
use crate::foundation::core::Rect;
use crate::raster::coverage::CoverageBuffer;

/// Ordered `(color, x)` pairs for left-to-right recoloring.
///
/// The active color at a pixel is that of the last pair whose `x` does not
/// exceed the pixel position, so the second pair's `x` is where the first
/// color hands off. A single-color draw is the lone pair `(color, u32::MAX)`;
/// that sentinel selects the fast path with no per-pixel comparisons.
pub(crate) type SwitchPoints = SmallVec<[(u32, u32); 3]>;

pub(crate) fn single_color(color: u32) -> SwitchPoints {
    smallvec![(color, u32::MAX)]
}

/// One-pixel blend kernel; implementations must agree bit-for-bit.
pub(crate) trait PixMixer {
    fn mix(&self, dst: &mut u32, color: u32, alpha: u32);
}

/// Blend `color` into `dst` with weight `alpha * color_alpha >> 12`.
///
/// `alpha` is coverage scaled by 64 (or coverage times a mask byte); the
/// color's high byte is its opacity. The wrapping multiply keeps negative
/// border coverage (a blurred wide channel can dip under the fill channel)
/// on the same low-bit route as the SIMD path.
pub(crate) fn pixmix(dst: u32, color: u32, alpha: u32) -> u32 {
    let a = (alpha.wrapping_mul(color >> 24) >> 12) & 0xff;
    let ia = 256 - a;

    ((((dst & 0x00ff00ff) * ia + (color & 0x00ff00ff) * a) & 0xff00ff00) >> 8)
        | ((((dst & 0x0000ff00) * ia + (color & 0x0000ff00) * a) & 0x00ff0000) >> 8)
        | ((((dst >> 8) & 0x00ff0000) * ia) & 0xff000000)
}

pub(crate) struct ScalarMixer;

impl PixMixer for ScalarMixer {
    fn mix(&self, dst: &mut u32, color: u32, alpha: u32) {
        *dst = pixmix(*dst, color, alpha);
    }
}

/// Blend a coverage buffer onto the surface.
///
/// `x8`/`y8` position the owning word in 1/8-pixel space; `mask` is a
/// surface-sized byte mask (the `\clip` alpha mask). `body` selects fill
/// coverage, `border` the widened-minus-fill difference; with both set the
/// wide channel is drawn as body (the shadow pass does this). Returns the
/// touched rect, empty when the clip intersection is empty.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw(
    surface: &mut SurfaceMut<'_>,
    clip: Rect,
    mask: Option<&[u8]>,
    overlay: &CoverageBuffer,
    x8: i32,
    y8: i32,
    switchpts: &[(u32, u32)],
    body: bool,
    border: bool,
) -> Rect {
    if switchpts.is_empty() || (!body && !border) {
        return Rect::empty();
    }

    #[cfg(target_arch = "x86_64")]
    if crate::compose::simd::sse2_available() {
        return draw_with(
            &crate::compose::simd::Sse2Mixer,
            surface,
            clip,
            mask,
            overlay,
            x8,
            y8,
            switchpts,
            body,
            border,
        );
    }

    draw_with(
        &ScalarMixer,
        surface,
        clip,
        mask,
        overlay,
        x8,
        y8,
        switchpts,
        body,
        border,
    )
}

#[allow(clippy::too_many_arguments)]
fn draw_with<M: PixMixer>(
    mixer: &M,
    surface: &mut SurfaceMut<'_>,
    clip: Rect,
    mask: Option<&[u8]>,
    overlay: &CoverageBuffer,
    x8: i32,
    y8: i32,
    switchpts: &[(u32, u32)],
    body: bool,
    border: bool,
) -> Rect {
    let screen = Rect::new(0, 0, surface.width(), surface.height());
    let r = screen.intersect(&clip);

    let mut x = (x8 + overlay.offset_x + 4) >> 3;
    let mut y = (y8 + overlay.offset_y + 4) >> 3;
    let mut w = overlay.width;
    let mut h = overlay.height;
    let (mut xo, mut yo) = (0i32, 0i32);

    if x < r.left {
        xo = r.left - x;
        w -= r.left - x;
        x = r.left;
    }
    if y < r.top {
        yo = r.top - y;
        h -= r.top - y;
        y = r.top;
    }
    if x + w > r.right {
        w = r.right - x;
    }
    if y + h > r.bottom {
        h = r.bottom - y;
    }

    if w <= 0 || h <= 0 {
        return Rect::empty();
    }

    let bbox = Rect::new(x, y, x + w, y + h).intersect(&screen);

    let ow = overlay.width as usize;
    let stride = surface.width() as usize;
    let multi = switchpts[0].1 != u32::MAX;

    for row in 0..h {
        let src_base = 2 * (ow * (yo + row) as usize + xo as usize);
        let mask_base = (y + row) as usize * stride + x as usize;
        let dst_row = surface.row_mut(y + row);

        let mut sw = 0usize;
        let mut color = switchpts[0].0;

        for wt in 0..w as usize {
            if multi {
                let pos = (wt as i32 + xo) as u32;
                if sw < switchpts.len() && pos >= switchpts[sw].1 {
                    while sw < switchpts.len() && pos >= switchpts[sw].1 {
                        sw += 1;
                    }
                    color = switchpts[sw - 1].0;
                }
            }

            let cov = if body {
                i32::from(overlay.data[src_base + 2 * wt + usize::from(border)])
            } else {
                i32::from(overlay.data[src_base + 2 * wt + 1])
                    - i32::from(overlay.data[src_base + 2 * wt])
            };

            let alpha = match mask {
                None => (cov << 6) as u32,
                Some(am) => (cov * i32::from(am[mask_base + wt])) as u32,
            };

            let at = (x as usize + wt) * 4;
            let px = &mut dst_row[at..at + 4];
            let mut d = u32::from_le_bytes([px[0], px[1], px[2], px[3]]);
            mixer.mix(&mut d, color, alpha);
            px.copy_from_slice(&d.to_le_bytes());
        }
    }

    bbox
}

#[cfg(test)]
#[path = "../../tests/unit/compose/blend.rs"]
mod tests;
