use super::*;
use crate::doc::outline::BlockOutlines;
use crate::tags::effect::Effect;

#[test]
fn full_mask_is_fully_inside() {
    let mask = full_mask(&BlockOutlines, (10, 8)).unwrap();
    assert_eq!(mask.width, 10);
    assert_eq!(mask.height, 8);
    assert!(mask.data.iter().all(|&v| v == 64));
}

#[test]
fn vector_mask_covers_the_drawing_only() {
    // Right half of a 10x8 screen.
    let mask = vector_mask(&BlockOutlines, "m 5 0 l 10 0 10 8 5 8", 1.0, 1.0, (10, 8)).unwrap();
    for y in 0..8 {
        for x in 0..10 {
            let v = mask.data[(y * 10 + x) as usize];
            if x < 5 {
                assert_eq!(v, 0, "({x},{y})");
            } else {
                assert_eq!(v, 64, "({x},{y})");
            }
        }
    }
}

#[test]
fn unparseable_drawing_clips_everything() {
    let mask = vector_mask(&BlockOutlines, "l 1 2 3", 1.0, 1.0, (4, 4)).unwrap();
    assert!(mask.data.iter().all(|&v| v == 0));
}

#[test]
fn banner_fadeaway_ramps_both_sides() {
    let mut banner = Effect::new(EffectKind::Banner);
    banner.params[0] = 1;
    banner.params[2] = 4;
    let mut set = EffectSet::default();
    set.insert_first(banner);

    let mask = effect_mask(&BlockOutlines, &set, None, (10, 2)).unwrap();
    let row = &mask.data[..10];
    assert_eq!(row, &[0, 16, 32, 48, 64, 64, 64, 48, 32, 16]);
    // Both rows are identical.
    assert_eq!(&mask.data[..10], &mask.data[10..20]);
}

#[test]
fn scroll_fadeaway_ramps_the_band_edges() {
    let mut scroll = Effect::new(EffectKind::Scroll);
    scroll.params[0] = 0;
    scroll.params[1] = 80;
    scroll.params[2] = 1;
    scroll.params[4] = 4;
    let mut set = EffectSet::default();
    set.insert_first(scroll);

    let mask = effect_mask(&BlockOutlines, &set, None, (2, 10)).unwrap();
    let col: Vec<u8> = (0..10).map(|y| mask.data[(y * 2) as usize]).collect();
    assert_eq!(col, vec![0, 16, 32, 48, 64, 64, 64, 48, 32, 16]);
}

#[test]
fn fadeaway_composes_with_an_existing_clip() {
    let mut banner = Effect::new(EffectKind::Banner);
    banner.params[0] = 1;
    banner.params[2] = 4;
    let mut set = EffectSet::default();
    set.insert_first(banner);

    // Existing clip: left half only.
    let clip = vector_mask(&BlockOutlines, "m 0 0 l 5 0 5 2 0 2", 1.0, 1.0, (10, 2)).unwrap();
    let mask = effect_mask(&BlockOutlines, &set, Some(clip), (10, 2)).unwrap();

    // The ramp applies on top of the clipped region.
    assert_eq!(&mask.data[..10], &[0, 16, 32, 48, 64, 0, 0, 0, 0, 0]);
}

#[test]
fn no_effects_passes_the_clip_through() {
    let set = EffectSet::default();
    assert!(effect_mask(&BlockOutlines, &set, None, (4, 4)).is_none());

    let clip = full_mask(&BlockOutlines, (4, 4)).unwrap();
    let out = effect_mask(&BlockOutlines, &set, Some(clip), (4, 4)).unwrap();
    assert!(out.data.iter().all(|&v| v == 64));
}
