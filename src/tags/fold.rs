//! The override-tag fold.
//!
//! Tags are applied left to right over a running [`StyleState`]; each tag
//! either rewrites a field, restores it from the pre-override style when its
//! parameter is empty, or records subtitle-level state (effects, clipping,
//! alignment, karaoke timing). A `\t(...)` wraps a nested tag body in a time
//! window and re-enters the fold with animation enabled, which routes every
//! numeric assignment through [`calc_animation`]. Malformed bodies fall out
//! of their parse and the fold simply continues; numeric garbage parses to
//! zero exactly like the original `wcstol`/`wcstod` prefix scanners.

use tracing::debug;

use crate::doc::event::Document;
use crate::doc::style::{Alignment, RelativeTo, StyleState, WrapStyle};
use crate::foundation::core::Rect;
use crate::tags::effect::{Effect, EffectKind, EffectSet};
use crate::tags::parse::{self, RawTag};

/// Event-scoped evaluator state threaded through the fold.
///
/// Karaoke windows, the active `\t` window, and polygon-mode state all
/// accumulate across blocks of a single event.
pub(crate) struct TagContext<'a> {
    pub doc: &'a Document,
    /// Render time relative to the event start, ms.
    pub time: i32,
    /// Event duration, ms.
    pub delay: i32,
    /// Video-rect origin in pixels, for video-relative rect clips.
    pub vid_origin: (i32, i32),
    pub default_wrap: WrapStyle,
    pub anim_start: i32,
    pub anim_end: i32,
    pub anim_accel: f64,
    pub ktype: i32,
    pub kstart: i32,
    pub kend: i32,
    /// `\p` drawing scale exponent; zero means text mode.
    pub polygon_scale: i32,
    pub polygon_baseline: i32,
}

impl<'a> TagContext<'a> {
    pub fn new(
        doc: &'a Document,
        time: i32,
        delay: i32,
        vid_origin: (i32, i32),
        default_wrap: WrapStyle,
    ) -> Self {
        Self {
            doc,
            time,
            delay,
            vid_origin,
            default_wrap,
            anim_start: 0,
            anim_end: 0,
            anim_accel: 1.0,
            ktype: 0,
            kstart: 0,
            kend: 0,
            polygon_scale: 0,
            polygon_baseline: 0,
        }
    }
}

/// A deferred `\clip` vector mask, materialized by the render session.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ClipRequest {
    pub path: String,
    pub scale_x: f64,
    pub scale_y: f64,
}

/// Subtitle-level state accumulated by the fold.
#[derive(Clone, Debug)]
pub(crate) struct FoldTarget {
    /// Rect clip in pixels.
    pub clip: Rect,
    pub clip_request: Option<ClipRequest>,
    pub alignment: Alignment,
    /// The first alignment tag locks the value; later ones are ignored.
    pub alignment_latched: bool,
    pub wrap_style: WrapStyle,
    pub animated: bool,
    pub relative_to: RelativeTo,
    /// Script-to-screen scale ratios.
    pub scale_x: f64,
    pub scale_y: f64,
    pub effects: EffectSet,
}

impl FoldTarget {
    pub fn new(
        clip: Rect,
        alignment: Alignment,
        wrap_style: WrapStyle,
        relative_to: RelativeTo,
        scale_x: f64,
        scale_y: f64,
    ) -> Self {
        Self {
            clip,
            clip_request: None,
            alignment,
            alignment_latched: false,
            wrap_style,
            animated: false,
            relative_to,
            scale_x,
            scale_y,
            effects: EffectSet::default(),
        }
    }
}

/// Fold one `{...}` block (braces excluded) over the running style.
pub(crate) fn fold_block(
    block: &str,
    ctx: &mut TagContext<'_>,
    target: &mut FoldTarget,
    style: &mut StyleState,
    org: &StyleState,
) {
    fold_tags(block, ctx, target, style, org, false);
}

fn fold_tags(
    block: &str,
    ctx: &mut TagContext<'_>,
    target: &mut FoldTarget,
    style: &mut StyleState,
    org: &StyleState,
    animate: bool,
) {
    let mut unrecognized = 0u32;

    for mut tag in parse::scan_tags(block) {
        if !parse::peel(&mut tag) {
            unrecognized += 1;
        }
        apply(&tag, ctx, target, style, org, animate);
    }

    if unrecognized > 0 {
        debug!(unrecognized, "skipped unrecognized override tags");
    }
}

/// Interpolate toward `dst` inside the active `\t` window.
///
/// Before the window the source value holds, after it the destination; in
/// between the weight is `((t - t1) / (t2 - t1)) ^ accel`. A missing window
/// end means the event end. Differences under 1e-4 snap immediately.
pub(crate) fn calc_animation(
    ctx: &TagContext<'_>,
    dst: f64,
    src: f64,
    animate: bool,
) -> f64 {
    let s = ctx.anim_start;
    let e = if ctx.anim_end != 0 { ctx.anim_end } else { ctx.delay };

    if (dst - src).abs() >= 0.0001 && animate {
        if ctx.time < s {
            return src;
        }
        if s <= ctx.time && ctx.time < e {
            let t = (f64::from(ctx.time - s) / f64::from(e - s)).powf(ctx.anim_accel);
            return (1.0 - t) * src + t * dst;
        }
    }

    dst
}

fn calc_color(ctx: &TagContext<'_>, dst: u32, src: u32, animate: bool) -> u32 {
    let chan = |mask: u32| {
        (calc_animation(
            ctx,
            f64::from(dst & mask),
            f64::from(src & mask),
            animate,
        ) as u32)
            & mask
    };
    chan(0xff) | chan(0xff00) | chan(0xff0000)
}

// wcstol-style prefix parse: leading whitespace, optional sign, digits;
// anything unparseable yields zero.
fn parse_int(s: &str) -> i32 {
    let s = s.trim_start();
    let (neg, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let mut v: i64 = 0;
    for c in digits.chars() {
        let Some(d) = c.to_digit(10) else { break };
        v = (v * 10 + i64::from(d)).min(i64::from(i32::MAX));
    }
    if neg { -v as i32 } else { v as i32 }
}

fn parse_hex(s: &str) -> u32 {
    let s = s.trim_start();
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    let mut v: u64 = 0;
    for c in s.chars() {
        let Some(d) = c.to_digit(16) else { break };
        v = (v * 16 + u64::from(d)).min(u64::from(u32::MAX));
    }
    v as u32
}

fn parse_float(s: &str) -> f64 {
    let s = s.trim_start();
    let mut end = 0;
    let bytes = s.as_bytes();
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    s[..end].parse().unwrap_or(0.0)
}

fn apply(
    tag: &RawTag,
    ctx: &mut TagContext<'_>,
    target: &mut FoldTarget,
    style: &mut StyleState,
    org: &StyleState,
    animate: bool,
) {
    let params = &tag.params;
    let p: &str = params.first().map_or("", String::as_str);
    let has = !p.is_empty();

    match tag.cmd.as_str() {
        "1c" | "2c" | "3c" | "4c" | "c" => {
            let i = if tag.cmd == "c" {
                0
            } else {
                (tag.cmd.as_bytes()[0] - b'1') as usize
            };
            style.colors[i].0 = if has {
                calc_color(ctx, parse_hex(p), style.colors[i].0, animate)
            } else {
                org.colors[i].0
            };
        }
        "1a" | "2a" | "3a" | "4a" => {
            let i = (tag.cmd.as_bytes()[0] - b'1') as usize;
            style.alpha[i] = if has {
                calc_animation(
                    ctx,
                    f64::from(parse_hex(p)),
                    f64::from(style.alpha[i]),
                    animate,
                ) as u8
            } else {
                org.alpha[i]
            };
        }
        "alpha" => {
            for i in 0..4 {
                style.alpha[i] = if has {
                    calc_animation(
                        ctx,
                        f64::from(parse_hex(p)),
                        f64::from(style.alpha[i]),
                        animate,
                    ) as u8
                } else {
                    org.alpha[i]
                };
            }
        }
        "an" => {
            if !target.alignment_latched {
                let n = parse_int(p);
                target.alignment = u8::try_from(n)
                    .ok()
                    .and_then(Alignment::new)
                    .unwrap_or(org.alignment);
                target.alignment_latched = true;
            }
        }
        "a" => {
            if !target.alignment_latched {
                let n = parse_int(p);
                target.alignment = u8::try_from(n)
                    .ok()
                    .and_then(Alignment::from_legacy)
                    .unwrap_or(org.alignment);
                target.alignment_latched = true;
            }
        }
        "blur" => {
            let n = calc_animation(ctx, parse_float(p), style.gaussian_blur, animate);
            style.gaussian_blur = if has { n.max(0.0) } else { org.gaussian_blur };
        }
        "bord" => {
            let dst = parse_float(p);
            let nx = calc_animation(ctx, dst, style.outline_width_x, animate);
            style.outline_width_x = if has { nx.max(0.0) } else { org.outline_width_x };
            let ny = calc_animation(ctx, dst, style.outline_width_y, animate);
            style.outline_width_y = if has { ny.max(0.0) } else { org.outline_width_y };
        }
        "be" => {
            let n = (calc_animation(
                ctx,
                f64::from(parse_int(p)),
                f64::from(style.box_blur),
                animate,
            ) + 0.5) as i32;
            style.box_blur = if has { n } else { org.box_blur };
        }
        "b" => {
            let n = parse_int(p);
            style.font_weight = if has {
                match n {
                    0 => 400,
                    1 => 700,
                    _ if n >= 100 => n,
                    _ => org.font_weight,
                }
            } else {
                org.font_weight
            };
        }
        "clip" => match params.len() {
            1 if target.clip_request.is_none() => {
                target.clip_request = Some(ClipRequest {
                    path: params[0].clone(),
                    scale_x: target.scale_x,
                    scale_y: target.scale_y,
                });
            }
            2 if target.clip_request.is_none() => {
                let scale = parse_int(p).max(1);
                let denom = f64::from(1i32 << (scale - 1).min(30));
                target.clip_request = Some(ClipRequest {
                    path: params[1].clone(),
                    scale_x: target.scale_x / denom,
                    scale_y: target.scale_y / denom,
                });
            }
            4 => {
                let r: Vec<f64> = params.iter().map(|q| f64::from(parse_int(q))).collect();
                let o = match target.relative_to {
                    RelativeTo::Video => ctx.vid_origin,
                    RelativeTo::Screen => (0, 0),
                };
                let c = target.clip;
                target.clip = Rect::new(
                    calc_animation(
                        ctx,
                        target.scale_x * r[0] + f64::from(o.0),
                        f64::from(c.left),
                        animate,
                    ) as i32,
                    calc_animation(
                        ctx,
                        target.scale_y * r[1] + f64::from(o.1),
                        f64::from(c.top),
                        animate,
                    ) as i32,
                    calc_animation(
                        ctx,
                        target.scale_x * r[2] + f64::from(o.0),
                        f64::from(c.right),
                        animate,
                    ) as i32,
                    calc_animation(
                        ctx,
                        target.scale_y * r[3] + f64::from(o.1),
                        f64::from(c.bottom),
                        animate,
                    ) as i32,
                );
            }
            _ => {}
        },
        "fade" | "fad" => {
            if params.len() == 7 {
                let mut e = Effect::new(EffectKind::Fade);
                for i in 0..3 {
                    e.params[i] = parse_int(&params[i]);
                }
                for i in 0..4 {
                    e.times[i] = parse_int(&params[3 + i]);
                }
                target.effects.insert_first(e);
            } else if params.len() == 2 {
                let mut e = Effect::new(EffectKind::Fade);
                e.params[0] = 0xff;
                e.params[1] = 0x00;
                e.params[2] = 0xff;
                e.times[1] = parse_int(&params[0]);
                e.times[2] = parse_int(&params[1]);
                // Sentinels resolved against the event duration later.
                e.times[0] = -1;
                e.times[3] = -1;
                target.effects.insert_first(e);
            }
        }
        "fax" => {
            style.font_shift_x = if has {
                calc_animation(ctx, parse_float(p), style.font_shift_x, animate)
            } else {
                org.font_shift_x
            };
        }
        "fay" => {
            style.font_shift_y = if has {
                calc_animation(ctx, parse_float(p), style.font_shift_y, animate)
            } else {
                org.font_shift_y
            };
        }
        "fe" => {
            style.charset = if has { parse_int(p) } else { org.charset };
        }
        "fn" => {
            style.font_name = if has && p != "0" {
                p.trim().to_owned()
            } else {
                org.font_name.clone()
            };
        }
        "frx" => {
            style.font_angle_x = if has {
                calc_animation(ctx, parse_float(p), style.font_angle_x, animate)
            } else {
                org.font_angle_x
            };
        }
        "fry" => {
            style.font_angle_y = if has {
                calc_animation(ctx, parse_float(p), style.font_angle_y, animate)
            } else {
                org.font_angle_y
            };
        }
        "frz" | "fr" => {
            style.font_angle_z = if has {
                calc_animation(ctx, parse_float(p), style.font_angle_z, animate)
            } else {
                org.font_angle_z
            };
        }
        "fscx" => {
            let n = calc_animation(ctx, f64::from(parse_int(p)), style.font_scale_x, animate);
            style.font_scale_x = if has { n.max(0.0) } else { org.font_scale_x };
        }
        "fscy" => {
            let n = calc_animation(ctx, f64::from(parse_int(p)), style.font_scale_y, animate);
            style.font_scale_y = if has { n.max(0.0) } else { org.font_scale_y };
        }
        "fsc" => {
            style.font_scale_x = org.font_scale_x;
            style.font_scale_y = org.font_scale_y;
        }
        "fsp" => {
            style.font_spacing = if has {
                calc_animation(ctx, parse_float(p), style.font_spacing, animate)
            } else {
                org.font_spacing
            };
        }
        "fs" => {
            if has {
                let n = if p.starts_with('+') || p.starts_with('-') {
                    // Relative sizes move by tenths of the current size.
                    calc_animation(
                        ctx,
                        style.font_size + style.font_size * f64::from(parse_int(p)) / 10.0,
                        style.font_size,
                        animate,
                    )
                } else {
                    calc_animation(ctx, f64::from(parse_int(p)), style.font_size, animate)
                };
                style.font_size = if n > 0.0 { n } else { org.font_size };
            } else {
                style.font_size = org.font_size;
            }
        }
        "i" => {
            let n = parse_int(p);
            style.italic = if has {
                match n {
                    0 => false,
                    1 => true,
                    _ => org.italic,
                }
            } else {
                org.italic
            };
        }
        "kt" => {
            ctx.kstart = if has { parse_int(p) * 10 } else { 0 };
            ctx.kend = ctx.kstart;
        }
        "kf" | "K" => {
            ctx.ktype = 1;
            ctx.kstart = ctx.kend;
            ctx.kend += if has { parse_int(p) * 10 } else { 1000 };
        }
        "ko" => {
            ctx.ktype = 2;
            ctx.kstart = ctx.kend;
            ctx.kend += if has { parse_int(p) * 10 } else { 1000 };
        }
        "k" => {
            ctx.ktype = 0;
            ctx.kstart = ctx.kend;
            ctx.kend += if has { parse_int(p) * 10 } else { 1000 };
        }
        "move" => {
            if params.len() == 4 || params.len() == 6 {
                let mut e = Effect::new(EffectKind::Move);
                e.params[0] = (target.scale_x * parse_float(&params[0]) * 8.0) as i32;
                e.params[1] = (target.scale_y * parse_float(&params[1]) * 8.0) as i32;
                e.params[2] = (target.scale_x * parse_float(&params[2]) * 8.0) as i32;
                e.params[3] = (target.scale_y * parse_float(&params[3]) * 8.0) as i32;
                e.times[0] = -1;
                e.times[1] = -1;
                if params.len() == 6 {
                    e.times[0] = parse_int(&params[4]);
                    e.times[1] = parse_int(&params[5]);
                }
                target.effects.insert_first(e);
            }
        }
        "org" => {
            if params.len() == 2 {
                let mut e = Effect::new(EffectKind::Org);
                e.params[0] = (target.scale_x * parse_float(&params[0]) * 8.0) as i32;
                e.params[1] = (target.scale_y * parse_float(&params[1]) * 8.0) as i32;
                target.effects.insert_first(e);
            }
        }
        "pbo" => {
            ctx.polygon_baseline = parse_int(p);
        }
        "pos" => {
            if params.len() == 2 {
                let mut e = Effect::new(EffectKind::Move);
                let x = (target.scale_x * parse_float(&params[0]) * 8.0) as i32;
                let y = (target.scale_y * parse_float(&params[1]) * 8.0) as i32;
                e.params[0] = x;
                e.params[2] = x;
                e.params[1] = y;
                e.params[3] = y;
                target.effects.insert_first(e);
            }
        }
        "p" => {
            ctx.polygon_scale = parse_int(p).max(0);
        }
        "q" => {
            let n = parse_int(p);
            target.wrap_style = if has {
                WrapStyle::from_code(n).unwrap_or(ctx.default_wrap)
            } else {
                ctx.default_wrap
            };
        }
        "r" => {
            *style = if has {
                ctx.doc
                    .style_by_name(p)
                    .cloned()
                    .unwrap_or_else(|| org.clone())
            } else {
                org.clone()
            };
        }
        "shad" => {
            let dst = parse_float(p);
            let nx = calc_animation(ctx, dst, style.shadow_depth_x, animate);
            style.shadow_depth_x = if has { nx.max(0.0) } else { org.shadow_depth_x };
            let ny = calc_animation(ctx, dst, style.shadow_depth_y, animate);
            style.shadow_depth_y = if has { ny.max(0.0) } else { org.shadow_depth_y };
        }
        "s" => {
            let n = parse_int(p);
            style.strikeout = if has {
                match n {
                    0 => false,
                    1 => true,
                    _ => org.strikeout,
                }
            } else {
                org.strikeout
            };
        }
        "t" => {
            ctx.anim_start = 0;
            ctx.anim_end = 0;
            ctx.anim_accel = 1.0;

            let body = match params.len() {
                1 => params[0].clone(),
                2 => {
                    ctx.anim_accel = parse_float(&params[0]);
                    params[1].clone()
                }
                3 => {
                    ctx.anim_start = parse_float(&params[0]) as i32;
                    ctx.anim_end = parse_float(&params[1]) as i32;
                    params[2].clone()
                }
                4 => {
                    ctx.anim_start = parse_int(&params[0]);
                    ctx.anim_end = parse_int(&params[1]);
                    ctx.anim_accel = parse_float(&params[2]);
                    params[3].clone()
                }
                _ => String::new(),
            };

            fold_tags(&body, ctx, target, style, org, true);
            target.animated = true;
        }
        "u" => {
            let n = parse_int(p);
            style.underline = if has {
                match n {
                    0 => false,
                    1 => true,
                    _ => org.underline,
                }
            } else {
                org.underline
            };
        }
        "xbord" => {
            let nx = calc_animation(ctx, parse_float(p), style.outline_width_x, animate);
            style.outline_width_x = if has { nx.max(0.0) } else { org.outline_width_x };
        }
        "xshad" => {
            let nx = calc_animation(ctx, parse_float(p), style.shadow_depth_x, animate);
            style.shadow_depth_x = if has { nx } else { org.shadow_depth_x };
        }
        "ybord" => {
            let ny = calc_animation(ctx, parse_float(p), style.outline_width_y, animate);
            style.outline_width_y = if has { ny.max(0.0) } else { org.outline_width_y };
        }
        "yshad" => {
            let ny = calc_animation(ctx, parse_float(p), style.shadow_depth_y, animate);
            style.shadow_depth_y = if has { ny } else { org.shadow_depth_y };
        }
        _ => {}
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tags/fold.rs"]
mod tests;
