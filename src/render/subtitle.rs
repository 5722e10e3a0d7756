//! Per-event subtitle assembly.
//!
//! For one `(event, render time)` pair this walks the event text, folding
//! each `{...}` block over the running style and turning the text between
//! blocks into measured words (or drawings in `\p` mode), then wraps the
//! words into lines and places the block. The result caches across frames
//! while the event is not time-animated.

use crate::doc::event::Document;
use crate::doc::outline::OutlineProvider;
use crate::doc::style::{Alignment, RelativeTo, StyleState, WrapStyle};
use crate::foundation::core::Rect;
use crate::layout::wrap::{Line, make_lines};
use crate::render::clipper::{self, ClipMask};
use crate::render::session::RendererOpts;
use crate::render::word::Word;
use crate::tags::effect::{EffectKind, EffectSet, parse_line_effect};
use crate::tags::fold::{FoldTarget, TagContext, fold_block};

/// A fully assembled subtitle, ready to place and paint.
#[derive(Clone, Debug)]
pub(crate) struct Subtitle {
    pub lines: Vec<Line>,
    pub effects: EffectSet,
    /// Rect clip in pixels.
    pub clip: Rect,
    /// Vector-clip / fadeaway alpha mask, when any.
    pub clip_mask: Option<ClipMask>,
    pub alignment: Alignment,
    pub relative_to: RelativeTo,
    /// True when rendering depends on the frame time (`\t`, `\org` with a
    /// positioning effect); animated subtitles bypass the cache.
    pub animated: bool,
    /// Placement rect in 1/8-pixel units.
    pub rect: Rect,
    pub top_border: i32,
    pub bottom_border: i32,
}

/// Assemble one event at one render time.
///
/// `screen` and `vidrect` are in 1/8-pixel units; `time` is relative to the
/// event start and `delay` is the event duration.
#[allow(clippy::too_many_arguments)]
pub(crate) fn build_subtitle(
    doc: &Document,
    entry: usize,
    time: i32,
    delay: i32,
    provider: &dyn OutlineProvider,
    screen: (i32, i32),
    vidrect: Rect,
    opts: &RendererOpts,
) -> Subtitle {
    let event = &doc.events()[entry];
    let base = doc.style(&event.style);
    let org = base.clone();
    let mut style = base.clone();

    let play_res = doc.play_res();
    let relative_to = base.relative_to;

    let scale_x = match relative_to {
        RelativeTo::Video => f64::from(vidrect.width()) / f64::from(play_res.0 * 8),
        RelativeTo::Screen => f64::from(screen.0) / f64::from(play_res.0 * 8),
    };
    let scale_y = match relative_to {
        RelativeTo::Video => f64::from(vidrect.height()) / f64::from(play_res.1 * 8),
        RelativeTo::Screen => f64::from(screen.1) / f64::from(play_res.1 * 8),
    };

    let mut target = FoldTarget::new(
        Rect::new(0, 0, screen.0 >> 3, screen.1 >> 3),
        base.alignment,
        opts.default_wrap,
        relative_to,
        scale_x,
        scale_y,
    );

    let mut ctx = TagContext::new(
        doc,
        time,
        delay,
        (vidrect.left >> 3, vidrect.top >> 3),
        opts.default_wrap,
    );

    if let Some((effect, no_wrap)) = parse_line_effect(&event.effect, scale_x, scale_y) {
        target.effects.insert_first(effect);
        if no_wrap {
            target.wrap_style = WrapStyle::None;
        }
    }

    let mut words: Vec<Word> = Vec::new();
    let mut rest: &str = &event.text;

    while !rest.is_empty() {
        let mut parsed = false;

        if let Some(inner) = rest.strip_prefix('{') {
            if let Some(end) = inner.find('}') {
                fold_block(&inner[..end], &mut ctx, &mut target, &mut style, &org);
                rest = &inner[end + 1..];
                parsed = true;
            }
        }

        let chunk_len = if parsed {
            rest.find('{').unwrap_or(rest.len())
        } else {
            // No valid block here; the brace (or first char) is literal
            // text up to the next block opener.
            let lead = rest.chars().next().map_or(0, char::len_utf8);
            lead + rest[lead..].find('{').unwrap_or(rest.len() - lead)
        };

        if chunk_len == 0 {
            continue;
        }
        let chunk = &rest[..chunk_len];
        rest = &rest[chunk_len..];

        let scaled = scaled_style(&style, scale_x, scale_y, opts.scaled_border_and_shadow);

        if ctx.polygon_scale > 0 {
            emit_polygon(&mut words, chunk, scaled, &mut ctx, scale_x, scale_y);
        } else {
            emit_text(&mut words, chunk, scaled, &mut ctx, target.wrap_style, provider);
        }
    }

    // An origin override plus any positioning effect makes the placement a
    // function of time.
    if target.effects.get(EffectKind::Org).is_some()
        && (target.effects.get(EffectKind::Move).is_some()
            || target.effects.get(EffectKind::Banner).is_some()
            || target.effects.get(EffectKind::Scroll).is_some())
    {
        target.animated = true;
    }

    let margin = resolve_margins(event, &org, scale_x, scale_y, screen, vidrect, relative_to);

    let size_px = (screen.0 >> 3, screen.1 >> 3);
    let vector = target.clip_request.as_ref().and_then(|req| {
        clipper::vector_mask(provider, &req.path, req.scale_x, req.scale_y, size_px)
    });
    let clip_mask = clipper::effect_mask(provider, &target.effects, vector, size_px);

    let stack = make_lines(&words, target.wrap_style, target.alignment, screen, margin);

    Subtitle {
        lines: stack.lines,
        effects: target.effects,
        clip: target.clip,
        clip_mask,
        alignment: target.alignment,
        relative_to,
        animated: target.animated,
        rect: stack.rect,
        top_border: stack.top_border,
        bottom_border: stack.bottom_border,
    }
}

/// Scale a resolved style into the 1/8-pixel layout space.
fn scaled_style(style: &StyleState, scale_x: f64, scale_y: f64, scaled_bas: bool) -> StyleState {
    let mut s = style.clone();
    s.font_size = scale_y * s.font_size * 8.0;
    s.font_spacing = scale_x * s.font_spacing * 8.0;
    let bx = if scaled_bas { scale_x } else { 1.0 };
    let by = if scaled_bas { scale_y } else { 1.0 };
    s.outline_width_x *= bx * 8.0;
    s.outline_width_y *= by * 8.0;
    s.shadow_depth_x *= bx * 8.0;
    s.shadow_depth_y *= by * 8.0;
    s
}

fn resolve_margins(
    event: &crate::doc::event::Event,
    org: &StyleState,
    scale_x: f64,
    scale_y: f64,
    screen: (i32, i32),
    vidrect: Rect,
    relative_to: RelativeTo,
) -> Rect {
    let pick = |e: i32, s: i32| if e == 0 { s } else { e };
    let mut left = pick(event.margins.left, org.margins.left);
    let mut top = pick(event.margins.top, org.margins.top);
    let mut right = pick(event.margins.right, org.margins.right);
    let mut bottom = pick(event.margins.bottom, org.margins.bottom);

    left = (scale_x * f64::from(left) * 8.0) as i32;
    top = (scale_y * f64::from(top) * 8.0) as i32;
    right = (scale_x * f64::from(right) * 8.0) as i32;
    bottom = (scale_y * f64::from(bottom) * 8.0) as i32;

    if relative_to == RelativeTo::Video {
        left += vidrect.left;
        top += vidrect.top;
        right += screen.0 - vidrect.right;
        bottom += screen.1 - vidrect.bottom;
    }

    Rect::new(left, top, right, bottom)
}

// Text splitting: `\N` always breaks, `\n` breaks only in no-wrap mode,
// `\h` is a non-breaking space. Words are whitespace-delimited; every word
// consumes the current karaoke window.
fn emit_text(
    words: &mut Vec<Word>,
    chunk: &str,
    style: StyleState,
    ctx: &mut TagContext<'_>,
    wrap: WrapStyle,
    provider: &dyn OutlineProvider,
) {
    let text = chunk
        .replace("\\N", "\n")
        .replace("\\n", if wrap.collapses_soft_breaks() { " " } else { "\n" })
        .replace("\\h", "\u{00A0}");

    let mut push = |words: &mut Vec<Word>, s: String, ctx: &mut TagContext<'_>| {
        words.push(Word::new_text(
            provider,
            style.clone(),
            s,
            ctx.ktype,
            ctx.kstart,
            ctx.kend,
        ));
        ctx.kstart = ctx.kend;
    };

    let mut run = String::new();
    for c in text.chars().chain(std::iter::once('\0')) {
        if c != '\n' && c != ' ' && c != '\u{00A0}' && c != '\0' {
            run.push(c);
            continue;
        }

        if !run.is_empty() {
            push(words, std::mem::take(&mut run), ctx);
        }

        match c {
            '\n' => push(words, String::new(), ctx),
            ' ' | '\u{00A0}' => push(words, c.to_string(), ctx),
            _ => {}
        }
    }
}

fn emit_polygon(
    words: &mut Vec<Word>,
    chunk: &str,
    style: StyleState,
    ctx: &mut TagContext<'_>,
    scale_x: f64,
    scale_y: f64,
) {
    if chunk.is_empty() || ctx.polygon_scale <= 0 {
        return;
    }

    let denom = f64::from(1i32 << (ctx.polygon_scale - 1).min(30) as u32);
    if let Some(w) = Word::new_polygon(
        style,
        chunk,
        ctx.ktype,
        ctx.kstart,
        ctx.kend,
        scale_x / denom,
        scale_y / denom,
        ctx.polygon_baseline,
    ) {
        words.push(w);
        ctx.kstart = ctx.kend;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/subtitle.rs"]
mod tests;
