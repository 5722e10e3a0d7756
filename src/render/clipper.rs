//! Clip masks: `\clip` vector paths and banner/scroll fadeaway ramps.
//!
//! A vector clip runs the drawing through the normal rasterization pipeline
//! and lands its fill coverage in a screen-sized byte mask that the
//! compositor multiplies into the blend weight. Banner and scroll fadeaways
//! synthesize a full-screen mask and attenuate edge columns/rows with a
//! Q14 fixed-point ramp.

use tracing::warn;

use crate::doc::outline::OutlineProvider;
use crate::doc::style::StyleState;
use crate::foundation::core::try_filled_vec;
use crate::render::word::Word;
use crate::tags::effect::{EffectKind, EffectSet};

/// A screen-sized per-pixel alpha mask, 0 = clipped out, 64 = fully inside.
#[derive(Clone, Debug)]
pub(crate) struct ClipMask {
    pub width: i32,
    pub height: i32,
    pub data: Vec<u8>,
}

/// Rasterize a `\clip` drawing into a mask of `size_px` pixels.
pub(crate) fn vector_mask(
    provider: &dyn OutlineProvider,
    drawing: &str,
    scale_x: f64,
    scale_y: f64,
    size_px: (i32, i32),
) -> Option<ClipMask> {
    let (w, h) = size_px;
    if w < 0 || h < 0 {
        return None;
    }
    let Some(data) = try_filled_vec(0u8, w as usize * h as usize) else {
        warn!(w, h, "clip mask allocation failed");
        return None;
    };
    let mut mask = ClipMask { width: w, height: h, data };

    // The clip shape renders with a bare style: no outline, no blur, so
    // only the fill channel carries information.
    let mut style = StyleState::default();
    style.outline_width_x = 0.0;
    style.outline_width_y = 0.0;
    style.shadow_depth_x = 0.0;
    style.shadow_depth_y = 0.0;

    let Some(mut word) = Word::new_polygon(style, drawing, 0, 0, 0, scale_x, scale_y, 0) else {
        return Some(mask);
    };
    word.paint(provider, (0, 0), (0, 0));

    let Some(cov) = word.coverage() else {
        return Some(mask);
    };

    let mut x = (cov.offset_x + 4) >> 3;
    let mut y = (cov.offset_y + 4) >> 3;
    let mut cw = cov.width;
    let mut ch = cov.height;
    let (mut xo, mut yo) = (0i32, 0i32);

    if x < 0 {
        xo = -x;
        cw += x;
        x = 0;
    }
    if y < 0 {
        yo = -y;
        ch += y;
        y = 0;
    }
    if x + cw > w {
        cw = w - x;
    }
    if y + ch > h {
        ch = h - y;
    }

    if cw <= 0 || ch <= 0 {
        return Some(mask);
    }

    for row in 0..ch {
        let src = 2 * (cov.width * (yo + row) + xo) as usize;
        let dst = ((y + row) * w + x) as usize;
        for i in 0..cw as usize {
            mask.data[dst + i] = cov.data[src + 2 * i];
        }
    }

    Some(mask)
}

/// A full-screen rectangle mask, the base for fadeaway attenuation.
pub(crate) fn full_mask(provider: &dyn OutlineProvider, size_px: (i32, i32)) -> Option<ClipMask> {
    let (w, h) = size_px;
    let drawing = format!("m 0 0 l {w} 0 {w} {h} 0 {h}");
    vector_mask(provider, &drawing, 1.0, 1.0, size_px)
}

/// Apply banner/scroll fadeaway ramps for this subtitle's effects.
///
/// `existing` is the `\clip` mask when one was requested; fadeaways reuse it
/// so both constraints apply. Returns the mask to composite with, if any.
pub(crate) fn effect_mask(
    provider: &dyn OutlineProvider,
    effects: &EffectSet,
    existing: Option<ClipMask>,
    size_px: (i32, i32),
) -> Option<ClipMask> {
    if let Some(banner) = effects.get(EffectKind::Banner).filter(|e| e.params[2] != 0) {
        let mut mask = match existing {
            Some(m) => m,
            None => full_mask(provider, size_px)?,
        };
        banner_fadeaway(&mut mask, banner.params[2]);
        return Some(mask);
    }

    if let Some(scroll) = effects.get(EffectKind::Scroll).filter(|e| e.params[4] != 0) {
        let mut mask = match existing {
            Some(m) => m,
            None => full_mask(provider, size_px)?,
        };
        scroll_fadeaway(&mut mask, scroll.params[0], scroll.params[1], scroll.params[4]);
        return Some(mask);
    }

    existing
}

// Linear side ramps over `width` columns, Q14: full weight is 0x40 << 8.
fn banner_fadeaway(mask: &mut ClipMask, width: i32) {
    let (w, h) = (mask.width, mask.height);
    if width == 0 || w <= 0 {
        return;
    }

    let da = (64 << 8) / width;

    for j in 0..h {
        let row = (j * w) as usize;

        let mut a = 0i32;
        let k = width.min(w);
        for i in 0..k.max(0) {
            let at = row + i as usize;
            mask.data[at] = ((i32::from(mask.data[at]) * a) >> 14) as u8;
            a += da;
        }

        let mut a = 0x40 << 8;
        let mut k = w - width;
        if k < 0 {
            a -= -k * da;
            k = 0;
        }
        for i in k..w {
            let at = row + i as usize;
            mask.data[at] = ((i32::from(mask.data[at]) * a) >> 14) as u8;
            a -= da;
        }
    }
}

// Top and bottom ramps over `height` rows inside the scroll band
// `[top, bottom]` (1/8-pixel band edges); rows outside go dark.
fn scroll_fadeaway(mask: &mut ClipMask, top: i32, bottom: i32, height: i32) {
    let (w, h) = (mask.width, mask.height);
    if height == 0 || w <= 0 {
        return;
    }

    let da = (64 << 8) / height;
    let mut a = 0i32;
    let mut k = top >> 3;
    let mut l = k + height;
    if k < 0 {
        a += -k * da;
        k = 0;
    }
    l = l.min(h);

    if k < h {
        for p in mask.data[..(k * w) as usize].iter_mut() {
            *p = 0;
        }
        for j in k..l {
            let row = (j * w) as usize;
            for i in 0..w as usize {
                mask.data[row + i] = ((i32::from(mask.data[row + i]) * a) >> 14) as u8;
            }
            a += da;
        }
    }

    let da = -(64 << 8) / height;
    let mut a = 0x40 << 8;
    l = bottom >> 3;
    let mut k = l - height;
    if k < 0 {
        a += -k * da;
        k = 0;
    }
    l = l.min(h);

    if k < h {
        let mut j = k;
        while j < l {
            let row = (j * w) as usize;
            for i in 0..w as usize {
                mask.data[row + i] = ((i32::from(mask.data[row + i]) * a) >> 14) as u8;
            }
            a += da;
            j += 1;
        }
        for p in mask.data[(j * w) as usize..].iter_mut() {
            *p = 0;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/clipper.rs"]
mod tests;
