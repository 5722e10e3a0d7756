use super::*;
use crate::raster::dilate::widen;
use crate::raster::path::{CmdKind, PathBuffer};
use crate::raster::scan::scan_convert;

fn rect_shape(x0: i32, y0: i32, x1: i32, y1: i32) -> ScanShape {
    let mut path = PathBuffer::new();
    path.push_fine(CmdKind::MoveTo, x0, y0);
    path.push_fine(CmdKind::LineTo, x1, y0);
    path.push_fine(CmdKind::LineTo, x1, y1);
    path.push_fine(CmdKind::LineTo, x0, y1);
    scan_convert(&mut path)
}

fn channel_sum(cov: &CoverageBuffer, channel: usize) -> u32 {
    cov.data
        .chunks_exact(2)
        .map(|px| u32::from(px[channel]))
        .sum()
}

#[test]
fn empty_shape_rasterizes_to_nothing() {
    let shape = ScanShape::default();
    assert!(rasterize(&shape, None, 0, 0, 0, 0).is_none());
}

#[test]
fn full_pixels_accumulate_64_units() {
    let shape = rect_shape(0, 0, 128, 128);
    let cov = rasterize(&shape, None, 0, 0, 0, 0).unwrap();

    // 2 px of shape, a 17-unit span grid, one spare column: 4 pixels wide.
    assert_eq!(cov.width, 4);
    assert_eq!(cov.height, 4);
    for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        assert_eq!(cov.data[2 * (cov.width * y + x) as usize], 64);
    }
    assert_eq!(channel_sum(&cov, 0), 2 * 2 * 64);
    // No widened region: channel 1 stays empty.
    assert_eq!(channel_sum(&cov, 1), 0);
}

#[test]
fn subpixel_phase_splits_partial_cells() {
    let shape = rect_shape(0, 0, 128, 128);
    let cov = rasterize(&shape, None, 0, 4, 0, 0).unwrap();

    // Shifted right by half a pixel: leading column 32, interior 64,
    // trailing column 32. Total coverage is conserved.
    assert_eq!(cov.offset_x, shape.offset_x - 4);
    assert_eq!(cov.data[2 * (cov.width * 0 + 0) as usize], 32);
    assert_eq!(cov.data[2 * (cov.width * 0 + 1) as usize], 64);
    assert_eq!(cov.data[2 * (cov.width * 0 + 2) as usize], 32);
    assert_eq!(channel_sum(&cov, 0), 2 * 2 * 64);
}

#[test]
fn widened_region_lands_in_channel_one() {
    let shape = rect_shape(0, 0, 128, 128);
    let wide = widen(&shape.spans, 8);
    let cov = rasterize(&shape, Some(&wide), 8, 0, 0, 0).unwrap();

    // Padding grows the buffer by a pixel on each side.
    assert_eq!(cov.width, 4 + 2);
    assert_eq!(cov.offset_x, shape.offset_x - 8);

    assert!(channel_sum(&cov, 1) > channel_sum(&cov, 0));
    assert_eq!(channel_sum(&cov, 0), 2 * 2 * 64);

    // Fill sits inside the widened region: where fill is full, wide is too.
    for (i, px) in cov.data.chunks_exact(2).enumerate() {
        assert!(
            px[1] >= px[0],
            "wide below fill at pixel {i}: {} < {}",
            px[1],
            px[0]
        );
    }
}

#[test]
fn box_blur_redistributes_interior_coverage() {
    let shape = rect_shape(0, 0, 128, 128);
    let sharp = rasterize(&shape, None, 0, 0, 0, 0).unwrap();
    let blurred = rasterize(&shape, None, 0, 0, 0, 1).unwrap();

    // The interior pixel (1,1) of the 2x2 block loses weight to its
    // emptier neighborhood: (64 + 2*64 + 2*64 + 4*64) / 16 = 36.
    let at = |cov: &CoverageBuffer, x: i32, y: i32| cov.data[2 * (cov.width * y + x) as usize];
    assert_eq!(at(&sharp, 1, 1), 64);
    assert_eq!(at(&blurred, 1, 1), 36);
    // The halo row is excluded from the pass.
    assert_eq!(at(&blurred, 0, 0), 64);
}

#[test]
fn blur_passes_compound() {
    let shape = rect_shape(0, 0, 256, 256);
    let one = rasterize(&shape, None, 0, 0, 0, 1).unwrap();
    let two = rasterize(&shape, None, 0, 0, 0, 2).unwrap();

    let edge = |cov: &CoverageBuffer| cov.data[2 * (cov.width * 1 + 3) as usize];
    assert!(edge(&two) <= edge(&one));
}
