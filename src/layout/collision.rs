//! The collision-avoidance layout allocator.
//!
//! Rects are remembered per `(segment, entry, layer)` so a line keeps its
//! position while it stays on screen, even as neighbors appear and leave.
//! History survives a one-segment step in either direction (playing
//! backwards works too); anything further, or an entry leaving the active
//! set, drops the slot.

use crate::foundation::core::Rect;

#[derive(Clone, Debug)]
struct SubRect {
    rect: Rect,
    segment: i32,
    entry: usize,
    layer: i32,
}

/// Session-lived allocator state.
#[derive(Clone, Debug, Default)]
pub(crate) struct LayoutAllocator {
    slots: Vec<SubRect>,
}

impl LayoutAllocator {
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Carry history into `segment`, dropping slots that are stale.
    pub fn advance_to_segment(&mut self, segment: i32, active: &[usize]) {
        self.slots.retain_mut(|sr| {
            if (sr.segment - segment).abs() <= 1 && active.contains(&sr.entry) {
                sr.segment = segment;
                true
            } else {
                false
            }
        });
    }

    /// Place a subtitle rect, reusing history or probing for a free spot.
    ///
    /// The rect is padded by the block's top/bottom outline borders for the
    /// overlap search and unpadded again on return. While the padded rect
    /// overlaps an allocated rect on the same layer it shifts by its own
    /// height: downward for top-aligned text, upward for bottom-aligned.
    /// No horizontal repositioning is attempted.
    #[allow(clippy::too_many_arguments)]
    pub fn alloc_rect(
        &mut self,
        rect: Rect,
        top_border: i32,
        bottom_border: i32,
        search_down: bool,
        segment: i32,
        entry: usize,
        layer: i32,
    ) -> Rect {
        if let Some(sr) = self
            .slots
            .iter()
            .find(|sr| sr.segment == segment && sr.entry == entry)
        {
            return Rect::new(
                sr.rect.left,
                sr.rect.top + top_border,
                sr.rect.right,
                sr.rect.bottom - bottom_border,
            );
        }

        let mut r = Rect::new(
            rect.left,
            rect.top - top_border,
            rect.right,
            rect.bottom + bottom_border,
        );

        loop {
            let mut moved = false;
            for sr in &self.slots {
                if layer == sr.layer && r.overlaps(&sr.rect) {
                    let h = r.height();
                    if search_down {
                        r.bottom = sr.rect.bottom + h;
                        r.top = sr.rect.bottom;
                    } else {
                        r.top = sr.rect.top - h;
                        r.bottom = sr.rect.top;
                    }
                    moved = true;
                }
            }
            if !moved {
                break;
            }
        }

        self.slots.push(SubRect { rect: r, segment, entry, layer });

        Rect::new(r.left, r.top + top_border, r.right, r.bottom - bottom_border)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/collision.rs"]
mod tests;
