//! Region dilation: widening a fill span set by a disk to derive borders.

use crate::raster::scan::Span;

/// Merge `src`, shifted by `(±dx, dy)`, into `dst`.
///
/// Both inputs are sorted and non-overlapping; the merge is a single linear
/// two-pointer pass that coalesces overlapping or touching spans. The span
/// keys carry a large bias, so the unsigned offset arithmetic below is exact
/// even for negative `dx`/`dy`.
pub(crate) fn overlap_region(dst: &mut Vec<Span>, src: &[Span], dx: i32, dy: i32) {
    let temp = std::mem::take(dst);
    dst.reserve(temp.len() + src.len());

    let offset1 = ((i64::from(dy) << 32) - i64::from(dx)) as u64;
    let offset2 = ((i64::from(dy) << 32) + i64::from(dx)) as u64;

    let (an, bn) = (temp.len(), src.len());
    let (mut ia, mut ib) = (0usize, 0usize);

    while ia < an && ib < bn {
        if src[ib].0.wrapping_add(offset1) < temp[ia].0 {
            // B span is earlier. B spans don't overlap each other, so the
            // merge loop starts with A.
            let x1 = src[ib].0.wrapping_add(offset1);
            let mut x2 = src[ib].1.wrapping_add(offset2);
            ib += 1;

            loop {
                if ia == an || temp[ia].0 > x2 {
                    break;
                }
                loop {
                    x2 = x2.max(temp[ia].1);
                    ia += 1;
                    if ia == an || temp[ia].0 > x2 {
                        break;
                    }
                }
                if ib == bn || src[ib].0.wrapping_add(offset1) > x2 {
                    break;
                }
                loop {
                    x2 = x2.max(src[ib].1.wrapping_add(offset2));
                    ib += 1;
                    if ib == bn || src[ib].0.wrapping_add(offset1) > x2 {
                        break;
                    }
                }
            }

            dst.push((x1, x2));
        } else {
            // A span is earlier; mirror of the branch above.
            let x1 = temp[ia].0;
            let mut x2 = temp[ia].1;
            ia += 1;

            loop {
                if ib == bn || src[ib].0.wrapping_add(offset1) > x2 {
                    break;
                }
                loop {
                    x2 = x2.max(src[ib].1.wrapping_add(offset2));
                    ib += 1;
                    if ib == bn || src[ib].0.wrapping_add(offset1) > x2 {
                        break;
                    }
                }
                if ia == an || temp[ia].0 > x2 {
                    break;
                }
                loop {
                    x2 = x2.max(temp[ia].1);
                    ia += 1;
                    if ia == an || temp[ia].0 > x2 {
                        break;
                    }
                }
            }

            dst.push((x1, x2));
        }
    }

    dst.extend_from_slice(&temp[ia..]);
    for s in &src[ib..] {
        dst.push((s.0.wrapping_add(offset1), s.1.wrapping_add(offset2)));
    }
}

/// Dilate a fill region by a disk of radius `r` (1/8-pixel units).
///
/// Accumulates the fill shifted along every discrete chord of the disk.
/// The border region itself is derived later as `wide - fill` at coverage
/// time, never materialized as spans.
pub(crate) fn widen(fill: &[Span], r: i32) -> Vec<Span> {
    let r = r.max(0);
    let mut wide = Vec::new();

    for dy in -r..=r {
        let dx = (0.5 + f64::from(r * r - dy * dy).sqrt()) as i32;
        overlap_region(&mut wide, fill, dx, dy);
    }

    wide
}

#[cfg(test)]
#[path = "../../tests/unit/raster/dilate.rs"]
mod tests;
