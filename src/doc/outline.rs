//! The glyph-outline boundary.
//!
//! Font selection, shaping and hinting live outside this crate; the renderer
//! only asks an [`OutlineProvider`] for per-character outlines and vertical
//! metrics. All coordinates are in the 1/8-pixel layout space at the
//! requested size, origin at the top-left of the glyph cell, y growing down.

use crate::raster::path::PathCommand;

/// A font lookup request.
///
/// `size` is the full glyph-cell height in 1/8-pixel units; the subtitle
/// assembly has already folded the play-resolution scale into it.
#[derive(Clone, Debug, PartialEq)]
pub struct FontRequest {
    /// Font family name.
    pub name: String,
    /// Glyph cell height in 1/8-pixel units.
    pub size: f64,
    /// Weight, 400 = normal, 700 = bold.
    pub weight: i32,
    /// Italic flag.
    pub italic: bool,
    /// Underline flag.
    pub underline: bool,
    /// Strikeout flag.
    pub strikeout: bool,
    /// Character set / encoding hint.
    pub charset: i32,
}

/// Vertical metrics for a font at a requested size, in 1/8-pixel units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FontMetrics {
    /// Height above the baseline.
    pub ascent: i32,
    /// Depth below the baseline.
    pub descent: i32,
}

/// One character's outline and horizontal advance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CharOutline {
    /// Closed outline contours; empty for blank glyphs such as spaces.
    pub commands: Vec<PathCommand>,
    /// Horizontal advance in 1/8-pixel units.
    pub advance: i32,
}

/// Supplies glyph outlines to the renderer.
///
/// Implementations must be pure: the same request always yields the same
/// outline, or rendering stops being idempotent.
pub trait OutlineProvider: Send + Sync {
    /// Vertical metrics for the requested font.
    fn metrics(&self, font: &FontRequest) -> FontMetrics;

    /// The outline for one character, or `None` when the font has no glyph
    /// for it. A missing glyph costs that character, nothing else.
    fn outline(&self, font: &FontRequest, ch: char) -> Option<CharOutline>;
}

/// A deterministic provider that renders every glyph as a filled block.
///
/// Exists for tests and headless smoke runs: coverage sums and advance
/// arithmetic become exactly predictable. Whitespace yields an empty outline
/// with the normal advance.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockOutlines;

impl BlockOutlines {
    fn em(font: &FontRequest) -> f64 {
        font.size.max(0.0)
    }
}

impl OutlineProvider for BlockOutlines {
    fn metrics(&self, font: &FontRequest) -> FontMetrics {
        let em = Self::em(font);
        FontMetrics {
            ascent: (em * 0.8 + 0.5) as i32,
            descent: (em * 0.2 + 0.5) as i32,
        }
    }

    fn outline(&self, font: &FontRequest, ch: char) -> Option<CharOutline> {
        let em = Self::em(font);
        let advance = (em * 0.5 + 0.5) as i32;

        if ch.is_whitespace() {
            return Some(CharOutline { commands: Vec::new(), advance });
        }

        let m = self.metrics(font);
        let height = m.ascent + m.descent;
        let inset = advance / 8;
        let (x0, y0) = (inset, inset);
        let (x1, y1) = ((advance - inset).max(x0 + 1), (height - inset).max(y0 + 1));

        let p = |x, y| crate::raster::path::PathPoint::new(x, y);
        Some(CharOutline {
            commands: vec![
                PathCommand::MoveTo(p(x0, y0)),
                PathCommand::LineTo(p(x1, y0)),
                PathCommand::LineTo(p(x1, y1)),
                PathCommand::LineTo(p(x0, y1)),
            ],
            advance,
        })
    }
}
