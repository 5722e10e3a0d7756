//! Words: the rasterizable unit of a subtitle.
//!
//! A word is either a run of text in one resolved style or a vector drawing
//! (`\p` mode). Each word owns its scan-converted outline and coverage
//! buffer; the outline is built once per layout and the coverage only
//! re-rasterizes when the word's subpixel phase changes between frames.

use crate::compose::blend;
use crate::compose::surface::SurfaceMut;
use crate::doc::outline::{FontRequest, OutlineProvider};
use crate::doc::style::{BorderStyle, StyleState};
use crate::foundation::core::Rect;
use crate::raster::coverage::{CoverageBuffer, rasterize};
use crate::raster::dilate::widen;
use crate::raster::path::{CmdKind, PathBuffer};
use crate::raster::scan::{ScanShape, Span, scan_convert};

/// A parsed `\p` drawing: the path in 1/64-pixel units plus raw extents.
#[derive(Clone, Debug)]
pub(crate) struct ParsedDrawing {
    path: PathBuffer,
    width64: i32,
    height64: i32,
}

#[derive(Clone, Debug)]
pub(crate) enum WordSource {
    Text(String),
    Polygon(Box<ParsedDrawing>),
}

#[derive(Clone, Debug)]
struct WordRaster {
    shape: ScanShape,
    wide: Vec<Span>,
    wide_border: i32,
    coverage: Option<CoverageBuffer>,
    phase: (i32, i32),
}

/// One word plus its style, karaoke range, metrics and raster cache.
///
/// Metrics are in 1/8-pixel units; the style here is the fully scaled copy
/// produced by the subtitle assembly.
#[derive(Clone, Debug)]
pub(crate) struct Word {
    pub source: WordSource,
    pub style: StyleState,
    pub ktype: i32,
    pub kstart: i32,
    pub kend: i32,
    pub width: i32,
    pub ascent: i32,
    pub descent: i32,
    pub is_whitespace: bool,
    pub is_linebreak: bool,
    pub opaque_box: Option<Box<Word>>,
    raster: Option<WordRaster>,
}

pub(crate) fn font_request(style: &StyleState) -> FontRequest {
    FontRequest {
        name: style.font_name.clone(),
        size: style.font_size,
        weight: style.font_weight,
        italic: style.italic,
        underline: style.underline,
        strikeout: style.strikeout,
        charset: style.charset,
    }
}

impl Word {
    /// Build a text word and measure it.
    pub fn new_text(
        provider: &dyn OutlineProvider,
        style: StyleState,
        text: String,
        ktype: i32,
        kstart: i32,
        kend: i32,
    ) -> Self {
        let is_linebreak = text.is_empty();
        let is_whitespace = is_linebreak || text == " " || text == "\u{00A0}";

        let font = font_request(&style);
        let m = provider.metrics(&font);
        let ascent = (style.font_scale_y / 100.0 * f64::from(m.ascent)) as i32;
        let descent = (style.font_scale_y / 100.0 * f64::from(m.descent)) as i32;

        let mut raw = 0i32;
        for ch in text.chars() {
            let adv = provider.outline(&font, ch).map_or(0, |o| o.advance);
            raw += adv + style.font_spacing as i32;
        }
        let width = (style.font_scale_x / 100.0 * f64::from(raw) + 0.5) as i32;

        Self {
            source: WordSource::Text(text),
            style,
            ktype,
            kstart,
            kend,
            width,
            ascent,
            descent,
            is_whitespace,
            is_linebreak,
            opaque_box: None,
            raster: None,
        }
    }

    /// Build a drawing word; `None` when the drawing fails to parse.
    #[allow(clippy::too_many_arguments)]
    pub fn new_polygon(
        style: StyleState,
        drawing: &str,
        ktype: i32,
        kstart: i32,
        kend: i32,
        scale_x: f64,
        scale_y: f64,
        baseline: i32,
    ) -> Option<Self> {
        let parsed = parse_drawing(drawing, scale_x, scale_y)?;

        let baseline64 = (64.0 * scale_y * f64::from(baseline)) as i32;
        let ascent64 = parsed.height64 - baseline64;
        let descent64 = baseline64;

        let width = ((style.font_scale_x / 100.0 * f64::from(parsed.width64)) as i32 + 4) >> 3;
        let ascent = ((style.font_scale_y / 100.0 * f64::from(ascent64)) as i32 + 4) >> 3;
        let descent = ((style.font_scale_y / 100.0 * f64::from(descent64)) as i32 + 4) >> 3;

        Some(Self {
            source: WordSource::Polygon(Box::new(parsed)),
            style,
            ktype,
            kstart,
            kend,
            width,
            ascent,
            descent,
            is_whitespace: false,
            is_linebreak: false,
            opaque_box: None,
            raster: None,
        })
    }

    /// Merge a following word into this one when nothing distinguishes them.
    ///
    /// Only text joins text, styles must match exactly, and karaoke-timed
    /// words stay separate.
    pub fn append(&mut self, w: &Word) -> bool {
        if self.style != w.style
            || self.is_linebreak
            || w.is_linebreak
            || w.kstart != w.kend
            || self.ktype != w.ktype
        {
            return false;
        }
        let WordSource::Text(ours) = &mut self.source else {
            return false;
        };
        let WordSource::Text(theirs) = &w.source else {
            return false;
        };

        self.is_whitespace = self.is_whitespace && w.is_whitespace;
        ours.push_str(theirs);
        self.width += w.width;
        self.raster = None;
        true
    }

    fn create_path(&self, provider: &dyn OutlineProvider) -> PathBuffer {
        match &self.source {
            WordSource::Text(text) => {
                let mut path = PathBuffer::new();
                let font = font_request(&self.style);
                let mut x = 0i32;
                for ch in text.chars() {
                    if let Some(o) = provider.outline(&font, ch) {
                        path.append_commands(&o.commands, x, 0);
                        x += o.advance + self.style.font_spacing as i32;
                    }
                }
                path
            }
            WordSource::Polygon(p) => p.path.clone(),
        }
    }

    fn create_opaque_box(&mut self) {
        if self.opaque_box.is_some() {
            return;
        }

        let mut style = self.style.clone();
        style.border_style = BorderStyle::Outline;
        style.outline_width_x = 0.0;
        style.outline_width_y = 0.0;
        style.colors[0] = self.style.colors[2];
        style.alpha[0] = self.style.alpha[2];

        let w = (self.style.outline_width_x + 0.5) as i32;
        let h = (self.style.outline_width_y + 0.5) as i32;
        let drawing = format!(
            "m {} {} l {} {} {} {} {} {}",
            -w,
            -h,
            self.width + w,
            -h,
            self.width + w,
            self.ascent + self.descent + h,
            -w,
            self.ascent + self.descent + h,
        );

        // Coordinates above are 1/8-pixel, so the drawing scale is 1/8.
        self.opaque_box =
            Word::new_polygon(style, &drawing, 0, 0, 0, 1.0 / 8.0, 1.0 / 8.0, 0).map(Box::new);
    }

    /// Prepare the word's coverage for painting at position `p` (1/8-pixel).
    ///
    /// The outline and span sets are built on first use; afterwards only a
    /// change of subpixel phase re-rasterizes coverage.
    pub fn paint(&mut self, provider: &dyn OutlineProvider, p: (i32, i32), org: (i32, i32)) {
        if matches!(&self.source, WordSource::Text(t) if t.is_empty()) {
            return;
        }

        let phase = (p.0 & 7, p.1 & 7);

        if self.raster.is_none() {
            let mut path = self.create_path(provider);
            if !path.is_empty() {
                path.transform(&self.style, (org.0 - p.0) * 8, (org.1 - p.1) * 8);
            }

            let shape = scan_convert(&mut path);

            let mut wide = Vec::new();
            let mut wide_border = 0;
            match self.style.border_style {
                BorderStyle::Outline
                    if self.style.outline_width_x + self.style.outline_width_y > 0.0 =>
                {
                    let rx = (self.style.outline_width_x + 0.5) as i32;
                    let ry = (self.style.outline_width_y + 0.5) as i32;
                    wide_border = rx.max(ry);
                    wide = widen(&shape.spans, wide_border);
                }
                BorderStyle::OpaqueBox => self.create_opaque_box(),
                BorderStyle::Outline => {}
            }

            let coverage = rasterize(
                &shape,
                (!wide.is_empty()).then_some(&wide[..]),
                wide_border,
                phase.0,
                phase.1,
                self.style.blur_passes(),
            );
            self.raster = Some(WordRaster { shape, wide, wide_border, coverage, phase });
        } else if let Some(r) = &mut self.raster {
            if r.phase != phase {
                r.coverage = rasterize(
                    &r.shape,
                    (!r.wide.is_empty()).then_some(&r.wide[..]),
                    r.wide_border,
                    phase.0,
                    phase.1,
                    self.style.blur_passes(),
                );
                r.phase = phase;
            }
        }

        if let Some(b) = &mut self.opaque_box {
            b.paint(provider, p, org);
        }
    }

    /// Blend this word's prepared coverage onto the surface.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        surface: &mut SurfaceMut<'_>,
        clip: Rect,
        mask: Option<&[u8]>,
        x8: i32,
        y8: i32,
        switchpts: &[(u32, u32)],
        body: bool,
        border: bool,
    ) -> Rect {
        let Some(raster) = &self.raster else {
            return Rect::empty();
        };
        let Some(cov) = &raster.coverage else {
            return Rect::empty();
        };
        blend::draw(surface, clip, mask, cov, x8, y8, switchpts, body, border)
    }

    /// The coverage buffer, for mask extraction.
    pub(crate) fn coverage(&self) -> Option<&CoverageBuffer> {
        self.raster.as_ref()?.coverage.as_ref()
    }
}

// `m n l b s p c` drawing parser. Numbers are integer script pixels scaled
// by `64 * scale` into 1/64-pixel units. Incomplete Bezier runs truncate to
// a multiple of 3, a spline needs at least 3 points, and `c` closes the
// spline by replaying its first three points. A drawing that does not open
// with `m` is rejected wholesale.
fn parse_drawing(drawing: &str, scale_x: f64, scale_y: f64) -> Option<ParsedDrawing> {
    let mut kinds: Vec<CmdKind> = Vec::new();
    let mut points: Vec<(i32, i32)> = Vec::new();

    let mut last_spline_start: Option<usize> = None;
    let mut first_moveto: Option<usize> = None;
    let mut seen_moveto = false;

    let mut it = drawing.chars().peekable();

    let read_point = |it: &mut std::iter::Peekable<std::str::Chars<'_>>| -> Option<(i32, i32)> {
        let read_long = |it: &mut std::iter::Peekable<std::str::Chars<'_>>| -> Option<i32> {
            while it.peek().is_some_and(|c| c.is_whitespace()) {
                it.next();
            }
            let neg = it.peek() == Some(&'-');
            if neg {
                it.next();
            }
            let mut v: i64 = 0;
            let mut any = false;
            while let Some(d) = it.peek().and_then(|c| c.to_digit(10)) {
                it.next();
                any = true;
                v = (v * 10 + i64::from(d)).min(i64::from(i32::MAX));
            }
            any.then_some(if neg { -v as i32 } else { v as i32 })
        };
        let x = read_long(it)?;
        let y = read_long(it)?;
        Some((x, y))
    };

    while let Some(&c) = it.peek() {
        if !matches!(c, 'm' | 'n' | 'l' | 'b' | 's' | 'p' | 'c') {
            it.next();
            continue;
        }
        it.next();

        match c {
            'm' => {
                if !seen_moveto {
                    first_moveto = Some(kinds.len());
                    seen_moveto = true;
                }
                while let Some(p) = read_point(&mut it) {
                    kinds.push(CmdKind::MoveTo);
                    points.push(p);
                }
            }
            'n' => {
                while let Some(p) = read_point(&mut it) {
                    kinds.push(CmdKind::MoveToNoClose);
                    points.push(p);
                }
            }
            'l' => {
                while let Some(p) = read_point(&mut it) {
                    kinds.push(CmdKind::LineTo);
                    points.push(p);
                }
            }
            'b' => {
                let start = kinds.len();
                while let Some(p) = read_point(&mut it) {
                    kinds.push(CmdKind::Bezier);
                    points.push(p);
                }
                let keep = kinds.len() - ((kinds.len() - start) % 3);
                kinds.truncate(keep);
                points.truncate(keep);
            }
            's' | 'p' => {
                if c == 's' {
                    let start = kinds.len();
                    last_spline_start = Some(start);
                    for _ in 0..3 {
                        let Some(p) = read_point(&mut it) else { break };
                        kinds.push(CmdKind::BSpline);
                        points.push(p);
                    }
                    if kinds.len() - start < 3 {
                        kinds.truncate(start);
                        points.truncate(start);
                        last_spline_start = None;
                    }
                }
                while let Some(p) = read_point(&mut it) {
                    kinds.push(CmdKind::BSplinePatch);
                    points.push(p);
                }
            }
            'c' => {
                if let Some(start) = last_spline_start.filter(|&s| s > 0) {
                    for k in 0..3 {
                        let p = points[start - 1 + k];
                        kinds.push(CmdKind::BSplinePatch);
                        points.push(p);
                    }
                    last_spline_start = None;
                }
            }
            _ => {}
        }
    }

    if !seen_moveto || first_moveto != Some(0) {
        return None;
    }

    let mut path = PathBuffer::new();
    let (mut minx, mut miny, mut maxx, mut maxy) = (i32::MAX, i32::MAX, i32::MIN, i32::MIN);
    for (k, &(x, y)) in kinds.iter().zip(&points) {
        let fx = (64.0 * scale_x * f64::from(x)) as i32;
        let fy = (64.0 * scale_y * f64::from(y)) as i32;
        minx = minx.min(fx);
        miny = miny.min(fy);
        maxx = maxx.max(fx);
        maxy = maxy.max(fy);
        path.push_fine(*k, fx, fy);
    }

    Some(ParsedDrawing {
        path,
        width64: (maxx - minx).max(0),
        height64: (maxy - miny).max(0),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/word.rs"]
mod tests;
