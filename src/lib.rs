//! Overtype is a subtitle rasterization and compositing engine.
//!
//! It turns styled, time-varying subtitle text — events carrying inline
//! override tags — into anti-aliased pixels blended onto a caller-owned
//! packed-RGB32 video frame. The pipeline is a classic scanline rasterizer:
//!
//! 1. **Flatten**: path commands (lines, cubic Beziers, B-splines) become
//!    polylines at fixed-point resolution
//! 2. **Scan-convert**: polylines become sorted per-scanline span sets via
//!    the non-zero winding rule
//! 3. **Dilate**: span sets are widened by a disk to derive borders
//! 4. **Rasterize**: span sets become a two-channel subpixel coverage buffer
//! 5. **Compose**: coverage is blended onto the destination frame, with
//!    karaoke recoloring, clip masks, and an SSE2 fast path that is
//!    bit-identical to the scalar one
//!
//! On top of that sit the override-tag evaluator (per-frame style folding,
//! `\t` transitions, fade/move/scroll/banner effects), the line layout
//! engine, and a collision allocator that keeps concurrently visible lines
//! from overlapping while staying put across frames.
//!
//! The key design constraints:
//!
//! - **Deterministic**: rendering is a pure function of
//!   `(document, time, allocator history)`; repeated calls are
//!   pixel-identical.
//! - **Failure-local**: a malformed tag or a degenerate path costs at most
//!   one run of one line in one frame, never the frame.
//! - **No font engine**: glyph outlines come from an [`OutlineProvider`]
//!   implementation supplied by the caller.
#![deny(missing_docs)]
#![deny(unsafe_code)]

mod compose;
mod foundation;
mod layout;
mod raster;
mod tags;

/// External collaborator types: documents, events, styles, outline providers.
pub mod doc;
/// Session-oriented rendering API.
pub mod render;

pub use crate::compose::surface::SurfaceMut;
pub use crate::doc::event::{Document, Event};
pub use crate::doc::outline::{BlockOutlines, CharOutline, FontMetrics, FontRequest, OutlineProvider};
pub use crate::doc::style::{
    Alignment, BorderStyle, Color, Margins, RelativeTo, StyleState, WrapStyle,
};
pub use crate::foundation::core::Rect;
pub use crate::foundation::error::{OvertypeError, OvertypeResult};
pub use crate::raster::path::{PathCommand, PathPoint};
pub use crate::render::session::{Renderer, RendererOpts};
