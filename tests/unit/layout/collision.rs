use super::*;

fn rect(top: i32, height: i32) -> Rect {
    Rect::new(100, top, 500, top + height)
}

#[test]
fn same_key_returns_the_same_rect() {
    let mut a = LayoutAllocator::default();

    let r1 = a.alloc_rect(rect(400, 50), 4, 4, false, 7, 1, 0);
    let r2 = a.alloc_rect(rect(400, 50), 4, 4, false, 7, 1, 0);
    assert_eq!(r1, r2);
}

#[test]
fn overlap_shifts_up_for_bottom_aligned() {
    let mut a = LayoutAllocator::default();

    let first = a.alloc_rect(rect(400, 50), 0, 0, false, 0, 1, 0);
    let second = a.alloc_rect(rect(400, 50), 0, 0, false, 0, 2, 0);

    assert_eq!(first, rect(400, 50));
    assert!(!first.overlaps(&second));
    assert_eq!(second.bottom, first.top);
    assert_eq!(second.height(), 50);
}

#[test]
fn overlap_shifts_down_for_top_aligned() {
    let mut a = LayoutAllocator::default();

    let first = a.alloc_rect(rect(40, 50), 0, 0, true, 0, 1, 0);
    let second = a.alloc_rect(rect(40, 50), 0, 0, true, 0, 2, 0);

    assert_eq!(second.top, first.bottom);
}

#[test]
fn layers_do_not_collide() {
    let mut a = LayoutAllocator::default();

    let first = a.alloc_rect(rect(400, 50), 0, 0, false, 0, 1, 0);
    let second = a.alloc_rect(rect(400, 50), 0, 0, false, 0, 2, 1);
    assert_eq!(first, second);
}

#[test]
fn borders_pad_the_probe_and_unpad_the_result() {
    let mut a = LayoutAllocator::default();

    let first = a.alloc_rect(rect(400, 50), 8, 8, false, 0, 1, 0);
    assert_eq!(first, rect(400, 50));

    // The second block's padded probe must clear the first one's padding.
    let second = a.alloc_rect(rect(400, 50), 8, 8, false, 0, 2, 0);
    assert_eq!(second.bottom + 8, first.top - 8);
}

#[test]
fn adjacent_segment_keeps_history() {
    let mut a = LayoutAllocator::default();

    let r1 = a.alloc_rect(rect(400, 50), 0, 0, false, 10, 1, 0);
    a.advance_to_segment(11, &[1]);
    let r2 = a.alloc_rect(rect(300, 50), 0, 0, false, 11, 1, 0);
    // History wins over the new natural rect.
    assert_eq!(r1, r2);

    // Playing backwards also keeps the slot.
    a.advance_to_segment(10, &[1]);
    let r3 = a.alloc_rect(rect(300, 50), 0, 0, false, 10, 1, 0);
    assert_eq!(r1, r3);
}

#[test]
fn far_segment_drops_history() {
    let mut a = LayoutAllocator::default();

    a.alloc_rect(rect(400, 50), 0, 0, false, 10, 1, 0);
    a.advance_to_segment(20, &[1]);
    let fresh = a.alloc_rect(rect(300, 50), 0, 0, false, 20, 1, 0);
    assert_eq!(fresh, rect(300, 50));
}

#[test]
fn inactive_entries_drop_out() {
    let mut a = LayoutAllocator::default();

    a.alloc_rect(rect(400, 50), 0, 0, false, 10, 1, 0);
    a.alloc_rect(rect(400, 50), 0, 0, false, 10, 2, 0);
    a.advance_to_segment(11, &[2]);

    // Entry 1 left; entry 2 keeps its shifted spot.
    let r2 = a.alloc_rect(rect(400, 50), 0, 0, false, 11, 2, 0);
    assert_eq!(r2.bottom, 400);
}
