//! Coverage rasterization: span sets to a two-channel subpixel buffer.
//!
//! Channel 0 holds fill coverage, channel 1 the widened (border) region;
//! border-only coverage is read back as the channel difference. Each pixel
//! accumulates up to 64 units (8 subpixel rows of 8 cells), so a byte per
//! channel is exact.

use tracing::warn;

use crate::foundation::core::try_filled_vec;
use crate::raster::scan::{ScanShape, Span, span_row, span_x};

/// A transient per-word coverage buffer, 2 bytes per pixel.
///
/// `offset_x`/`offset_y` anchor the buffer in the word's 1/8-pixel space so
/// the compositor can convert a paint position into destination pixels.
#[derive(Clone, Debug)]
pub(crate) struct CoverageBuffer {
    pub width: i32,
    pub height: i32,
    pub data: Vec<u8>,
    pub offset_x: i32,
    pub offset_y: i32,
}

/// Rasterize fill (and optionally widened) spans at a subpixel phase.
///
/// `wide_border` is the dilation radius that produced `wide`; it is rounded
/// up to a whole pixel of padding here. `None` means the shape was empty or
/// the buffer could not be allocated; either way there is nothing to draw.
pub(crate) fn rasterize(
    shape: &ScanShape,
    wide: Option<&[Span]>,
    wide_border: i32,
    xsub: i32,
    ysub: i32,
    blur_passes: i32,
) -> Option<CoverageBuffer> {
    if shape.is_empty() {
        return None;
    }

    let mut xsub = xsub & 7;
    let mut ysub = ysub & 7;

    let mut width = shape.width + xsub;
    let mut height = shape.height + ysub;

    let mut offset_x = shape.offset_x - xsub;
    let mut offset_y = shape.offset_y - ysub;

    let border = (wide_border + 7) & !7;
    let has_wide = wide.is_some_and(|w| !w.is_empty());

    if has_wide {
        width += 2 * border;
        height += 2 * border;
        xsub += border;
        ysub += border;
        offset_x -= border;
        offset_y -= border;
    }

    let ow = ((width + 7) >> 3) + 1;
    let oh = ((height + 7) >> 3) + 1;

    let len = 2usize * ow as usize * oh as usize;
    let Some(mut data) = try_filled_vec(0u8, len) else {
        warn!(ow, oh, "coverage buffer allocation failed, dropping word");
        return None;
    };

    // Widened region first into channel 1, then fill into channel 0.
    let passes: [(&[Span], usize); 2] =
        [(wide.unwrap_or(&[]), 1), (&shape.spans, 0)];

    for (spans, channel) in passes {
        for &(first, second) in spans {
            let y = span_row(first) + ysub;
            let x1 = span_x(first) + xsub;
            let x2 = span_x(second) + xsub;

            if x2 <= x1 {
                continue;
            }

            let mut cell = x1 >> 3;
            let last = (x2 - 1) >> 3;
            let mut idx = 2 * (ow * (y >> 3) + cell) as usize + channel;

            if cell == last {
                data[idx] += (x2 - x1) as u8;
            } else {
                data[idx] += (((cell + 1) << 3) - x1) as u8;
                idx += 2;

                cell += 1;
                while cell < last {
                    data[idx] += 0x08;
                    idx += 2;
                    cell += 1;
                }

                data[idx] += (x2 - (last << 3)) as u8;
            }
        }
    }

    if blur_passes > 0 && ow >= 3 && oh >= 3 {
        // The 3x3 kernel [1 2 1; 2 4 2; 1 2 1]/16 runs over interior pixels
        // only, on the outermost channel (wide when a border exists).
        let pitch = (ow * 2) as usize;
        let channel = usize::from(has_wide);

        for _ in 0..blur_passes {
            let tmp = data.clone();

            for j in 1..(oh - 1) as usize {
                for i in 1..(ow - 1) as usize {
                    let at = pitch * j + 2 * i + channel;
                    let s = |off: isize| u32::from(tmp[(at as isize + off) as usize]);
                    let p = pitch as isize;

                    data[at] = ((s(-2 - p) + (s(-p) << 1) + s(2 - p)
                        + (s(-2) << 1) + (s(0) << 2) + (s(2) << 1)
                        + s(-2 + p) + (s(p) << 1) + s(2 + p))
                        >> 4) as u8;
                }
            }
        }
    }

    Some(CoverageBuffer {
        width: ow,
        height: oh,
        data,
        offset_x,
        offset_y,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/raster/coverage.rs"]
mod tests;
