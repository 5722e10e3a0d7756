//! The session-oriented rendering entry point.
//!
//! A [`Renderer`] owns the mutable session state — the per-event subtitle
//! cache and the collision allocator history — behind one coarse mutex, so
//! concurrent `render` calls from a decoder thread serialize rather than
//! interleave. Everything else in the pipeline is a pure function of its
//! inputs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use smallvec::smallvec;
use tracing::{debug, warn};
use xxhash_rust::xxh3::Xxh3;

use crate::compose::blend::{SwitchPoints, single_color};
use crate::compose::surface::SurfaceMut;
use crate::doc::event::Document;
use crate::doc::outline::OutlineProvider;
use crate::doc::style::{RelativeTo, WrapStyle};
use crate::foundation::core::Rect;
use crate::foundation::error::{OvertypeError, OvertypeResult};
use crate::layout::collision::LayoutAllocator;
use crate::layout::wrap::Line;
use crate::render::subtitle::{Subtitle, build_subtitle};
use crate::tags::effect::EffectKind;

const FINGERPRINT_SEED: u64 = 0x7c0a_91d3_55e8_2b6f;

/// How far outside the current time cached subtitles survive, ms.
const CACHE_WINDOW_MS: i32 = 30_000;

/// Renderer configuration.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RendererOpts {
    /// Reserved: scripts can request reversed collision stacking, but the
    /// probe direction currently follows alignment either way.
    pub reverse_collisions: bool,
    /// Scale outline and shadow widths with the play-resolution ratio.
    pub scaled_border_and_shadow: bool,
    /// Wrap mode used when an event does not override it with `\q`.
    pub default_wrap: WrapStyle,
}

impl Default for RendererOpts {
    fn default() -> Self {
        Self {
            reverse_collisions: false,
            scaled_border_and_shadow: true,
            default_wrap: WrapStyle::Smart,
        }
    }
}

struct CachedSubtitle {
    fingerprint: u64,
    subtitle: Subtitle,
}

struct SessionState {
    /// Destination size in 1/8-pixel units.
    size: (i32, i32),
    /// Video rectangle in 1/8-pixel units.
    vidrect: Rect,
    cache: HashMap<usize, CachedSubtitle>,
    allocator: LayoutAllocator,
}

/// Renders a [`Document`] onto caller-owned RGB32 frames.
pub struct Renderer {
    doc: Arc<Document>,
    provider: Arc<dyn OutlineProvider>,
    opts: RendererOpts,
    /// Configured video rect in pixels, re-applied after surface resizes.
    vidrect_px: Rect,
    state: Mutex<SessionState>,
}

impl Renderer {
    /// Create a renderer for a destination of `screen` pixels.
    ///
    /// `vidrect` is the active video area inside the destination, used by
    /// video-relative styles; pass the full screen when there is no
    /// letterboxing.
    pub fn new(
        doc: Arc<Document>,
        provider: Arc<dyn OutlineProvider>,
        screen: (i32, i32),
        vidrect: Rect,
        opts: RendererOpts,
    ) -> OvertypeResult<Self> {
        if screen.0 <= 0 || screen.1 <= 0 {
            return Err(OvertypeError::validation("screen size must be positive"));
        }
        let bounds = Rect::new(0, 0, screen.0, screen.1);
        let vidrect_px = {
            let r = vidrect.intersect(&bounds);
            if r.is_empty() { bounds } else { r }
        };

        Ok(Self {
            doc,
            provider,
            opts,
            vidrect_px,
            state: Mutex::new(SessionState {
                size: (screen.0 * 8, screen.1 * 8),
                vidrect: Rect::new(
                    vidrect_px.left * 8,
                    vidrect_px.top * 8,
                    vidrect_px.right * 8,
                    vidrect_px.bottom * 8,
                ),
                cache: HashMap::new(),
                allocator: LayoutAllocator::default(),
            }),
        })
    }

    /// Swap in an edited document snapshot.
    ///
    /// Cached layouts key on the snapshot's generation, so an edit with a
    /// bumped generation invalidates them; the collision history is dropped
    /// outright.
    pub fn set_document(&mut self, doc: Arc<Document>) {
        self.doc = doc;
        let mut state = lock(&self.state);
        state.cache.clear();
        state.allocator.clear();
    }

    /// Render the frame at `time_ms` onto `surface`.
    ///
    /// Returns the touched rect, or `None` when nothing was drawn. The
    /// frame-rate argument exists for frame-addressed documents and is
    /// ignored for the millisecond-addressed model here. For a fixed
    /// document, time and allocator history the call is idempotent.
    pub fn render(
        &self,
        surface: &mut SurfaceMut<'_>,
        time_ms: i32,
        _fps: f64,
    ) -> Option<Rect> {
        let mut state = lock(&self.state);

        let size8 = (surface.width() * 8, surface.height() * 8);
        if state.size != size8 {
            warn!(
                width = surface.width(),
                height = surface.height(),
                "surface size changed, resetting session state"
            );
            state.size = size8;
            let bounds = Rect::new(0, 0, surface.width(), surface.height());
            let v = self.vidrect_px.intersect(&bounds);
            let v = if v.is_empty() { bounds } else { v };
            state.vidrect = Rect::new(v.left * 8, v.top * 8, v.right * 8, v.bottom * 8);
            state.cache.clear();
            state.allocator.clear();
        }

        let doc = &*self.doc;
        let (segment, seg) = doc.segment_at(time_ms)?;
        let entries = seg.entries.clone();

        debug!(time_ms, segment, active = entries.len(), "rendering frame");

        // Cached subtitles far outside the current time are dead weight.
        let t = time_ms;
        state.cache.retain(|&entry, _| {
            let e = &doc.events()[entry];
            !(e.end_ms <= t - CACHE_WINDOW_MS || e.start_ms > t + CACHE_WINDOW_MS)
        });

        state.allocator.advance_to_segment(segment as i32, &entries);

        let mut order: Vec<usize> = entries;
        order.sort_by_key(|&i| {
            let e = &doc.events()[i];
            (e.layer, e.readorder, i)
        });

        let mut dirty = Rect::empty();
        let drew_any = !order.is_empty();

        for entry in order {
            let touched = self.render_entry(&mut state, surface, entry, segment, time_ms);
            dirty = dirty.union(&touched);
        }

        (drew_any && !dirty.is_empty()).then_some(dirty)
    }

    fn render_entry(
        &self,
        state: &mut SessionState,
        surface: &mut SurfaceMut<'_>,
        entry: usize,
        segment: usize,
        time_ms: i32,
    ) -> Rect {
        let doc = &*self.doc;
        let event = &doc.events()[entry];
        let time = time_ms - event.start_ms;
        let delay = event.end_ms - event.start_ms;

        let fp = self.fingerprint(state, entry);
        let reusable = state
            .cache
            .get(&entry)
            .is_some_and(|c| c.fingerprint == fp && !c.subtitle.animated);

        if !reusable {
            let subtitle = build_subtitle(
                doc,
                entry,
                time,
                delay,
                &*self.provider,
                state.size,
                state.vidrect,
                &self.opts,
            );
            state
                .cache
                .insert(entry, CachedSubtitle { fingerprint: fp, subtitle });
        }

        // Split borrows: the allocator and the cached subtitle are distinct
        // fields of the session state.
        let SessionState { cache, allocator, size, vidrect } = state;
        let Some(cached) = cache.get_mut(&entry) else {
            return Rect::empty();
        };
        let s = &mut cached.subtitle;
        let (size, vidrect) = (*size, *vidrect);

        let space = (s.rect.width(), s.rect.height());
        let mut clip_rect = s.clip;
        let mut r = s.rect;

        let mut pos_override = false;
        let mut org_override = false;
        let mut fade_alpha = 0i32;
        let mut org2 = (0i32, 0i32);

        for e in s.effects.iter() {
            match e.kind {
                EffectKind::Move => {
                    let p1 = (e.params[0], e.params[1]);
                    let p2 = (e.params[2], e.params[3]);
                    let (mut t1, mut t2) = (e.times[0], e.times[1]);
                    if t2 < t1 {
                        std::mem::swap(&mut t1, &mut t2);
                    }
                    if t1 <= 0 && t2 <= 0 {
                        t1 = 0;
                        t2 = delay;
                    }

                    let p = if time <= t1 || p1 == p2 {
                        p1
                    } else if t1 < time && time < t2 {
                        let k = f64::from(time - t1) / f64::from(t2 - t1);
                        (
                            ((1.0 - k) * f64::from(p1.0) + k * f64::from(p2.0)) as i32,
                            ((1.0 - k) * f64::from(p1.1) + k * f64::from(p2.1)) as i32,
                        )
                    } else {
                        p2
                    };

                    r = place_at(p, space, s.alignment);
                    if s.relative_to == RelativeTo::Video {
                        r = r.offset(vidrect.left, vidrect.top);
                    }
                    pos_override = true;
                }
                EffectKind::Org => {
                    org2 = (e.params[0], e.params[1]);
                    org_override = true;
                }
                EffectKind::Fade => {
                    fade_alpha = eval_fade(e.params, e.times, time, delay);
                }
                EffectKind::Banner => {
                    let (left, right) = match s.relative_to {
                        RelativeTo::Video => (vidrect.left, vidrect.right),
                        RelativeTo::Screen => (0, size.0),
                    };
                    let crawl = (f64::from(time) * 8.0 / f64::from(e.params[0])) as i32;
                    r.left = if e.params[1] != 0 {
                        (left - space.0) + crawl
                    } else {
                        right - crawl
                    };
                    r.right = r.left + space.0;

                    clip_rect = clip_rect.intersect(&Rect::new(
                        left >> 3,
                        clip_rect.top,
                        right >> 3,
                        clip_rect.bottom,
                    ));
                    pos_override = true;
                }
                EffectKind::Scroll => {
                    let crawl = (f64::from(time) * 8.0 / f64::from(e.params[2])) as i32;
                    r.top = if e.params[3] != 0 {
                        e.params[0] + crawl - space.1
                    } else {
                        e.params[1] - crawl
                    };
                    r.bottom = r.top + space.1;

                    let mut cr = Rect::new(
                        0,
                        (e.params[0] + 4) >> 3,
                        surface.width(),
                        (e.params[1] + 4) >> 3,
                    );
                    if s.relative_to == RelativeTo::Video {
                        r.top += vidrect.top;
                        r.bottom += vidrect.top;
                        cr.top += vidrect.top >> 3;
                        cr.bottom += vidrect.top >> 3;
                    }
                    clip_rect = clip_rect.intersect(&cr);
                    pos_override = true;
                }
            }
        }

        if !pos_override && !org_override && !s.animated {
            r = allocator.alloc_rect(
                s.rect,
                s.top_border,
                s.bottom_border,
                s.alignment.numpad() > 3,
                segment as i32,
                entry,
                event.layer,
            );
        }

        let org = (
            match s.alignment.column() {
                1 => r.left,
                2 => (r.left + r.right) / 2,
                _ => r.right,
            },
            if s.alignment.is_bottom() {
                r.bottom
            } else if s.alignment.is_middle() {
                (r.top + r.bottom) / 2
            } else {
                r.top
            },
        );
        if !org_override {
            org2 = org;
        }

        let mask = s.clip_mask.as_ref().map(|m| m.data.as_slice());

        let mut bbox = Rect::empty();
        let provider = &*self.provider;

        for pass in [Pass::Shadow, Pass::Outline, Pass::Body] {
            let mut p = (0, r.top);
            for line in &mut s.lines {
                p.0 = match s.alignment.column() {
                    1 => org.0,
                    0 => org.0 - line.width,
                    _ => org.0 - line.width / 2,
                };

                let touched =
                    paint_line(pass, line, surface, clip_rect, mask, p, org2, time, fade_alpha, provider);
                bbox = bbox.union(&touched);

                p.1 += line.ascent + line.descent;
            }
        }

        bbox
    }

    fn fingerprint(&self, state: &SessionState, entry: usize) -> u64 {
        let e = &self.doc.events()[entry];
        let mut h = Xxh3::with_seed(FINGERPRINT_SEED);
        h.update(e.text.as_bytes());
        h.update(&[0]);
        h.update(e.style.as_bytes());
        h.update(&[0]);
        h.update(&e.start_ms.to_le_bytes());
        h.update(&e.end_ms.to_le_bytes());
        h.update(&e.layer.to_le_bytes());
        h.update(&e.margins.left.to_le_bytes());
        h.update(&e.margins.top.to_le_bytes());
        h.update(&e.margins.right.to_le_bytes());
        h.update(&e.margins.bottom.to_le_bytes());
        h.update(e.effect.as_bytes());
        h.update(&[0]);
        h.update(&self.doc.generation().to_le_bytes());
        h.update(&state.size.0.to_le_bytes());
        h.update(&state.size.1.to_le_bytes());
        h.digest()
    }
}

fn lock(state: &Mutex<SessionState>) -> std::sync::MutexGuard<'_, SessionState> {
    match state.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Place `space` at anchor point `p` per the alignment (the anchor is the
/// alignment corner/edge of the rect).
fn place_at(p: (i32, i32), space: (i32, i32), alignment: crate::doc::style::Alignment) -> Rect {
    let x = match alignment.column() {
        1 => p.0,
        0 => p.0 - space.0,
        _ => p.0 - (space.0 + 1) / 2,
    };
    let y = if alignment.is_bottom() {
        p.1 - space.1
    } else if alignment.is_middle() {
        p.1 - (space.1 + 1) / 2
    } else {
        p.1
    };
    Rect::new(x, y, x + space.0, y + space.1)
}

/// Piecewise fade: ramp in over `[t1,t2]`, hold, ramp out over `[t3,t4]`.
///
/// `-1` endpoints mark the `\fad` short form, whose hold phase is anchored
/// to the event bounds.
fn eval_fade(params: [i32; 5], times: [i32; 4], time: i32, delay: i32) -> i32 {
    let (mut t1, t2, mut t3, mut t4) = (times[0], times[1], times[2], times[3]);

    if t1 == -1 && t4 == -1 {
        t1 = 0;
        t3 = delay - t3;
        t4 = delay;
    }

    if time < t1 {
        params[0]
    } else if time < t2 {
        let k = f64::from(time - t1) / f64::from(t2 - t1);
        (f64::from(params[0]) * (1.0 - k) + f64::from(params[1]) * k) as i32
    } else if time < t3 {
        params[1]
    } else if time < t4 {
        let k = f64::from(time - t3) / f64::from(t4 - t3);
        (f64::from(params[1]) * (1.0 - k) + f64::from(params[2]) * k) as i32
    } else {
        params[2]
    }
}

fn mul_div(a: i32, b: i32, c: i32) -> i32 {
    ((i64::from(a) * i64::from(b) + i64::from(c) / 2) / i64::from(c)) as i32
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Pass {
    Shadow,
    Outline,
    Body,
}

#[allow(clippy::too_many_arguments)]
fn paint_line(
    pass: Pass,
    line: &mut Line,
    surface: &mut SurfaceMut<'_>,
    clip: Rect,
    mask: Option<&[u8]>,
    p: (i32, i32),
    org: (i32, i32),
    time: i32,
    fade_alpha: i32,
    provider: &dyn OutlineProvider,
) -> Rect {
    use crate::doc::style::BorderStyle;

    let mut bbox = Rect::empty();
    let mut p = p;

    for w in &mut line.words {
        if w.is_linebreak {
            return bbox;
        }

        match pass {
            Pass::Shadow => {
                if w.style.shadow_depth_x != 0.0 || w.style.shadow_depth_y != 0.0 {
                    let x = p.0 + (w.style.shadow_depth_x + 0.5) as i32;
                    let y =
                        p.1 + line.ascent - w.ascent + (w.style.shadow_depth_y + 0.5) as i32;

                    let mut a = 0xff - i32::from(w.style.alpha[3]);
                    if fade_alpha > 0 {
                        a = mul_div(a, 0xff - fade_alpha, 0xff);
                    }
                    let shadow = w.style.colors[3].to_rgb() | ((a as u32) << 24);
                    let sw = single_color(shadow);

                    w.paint(provider, (x, y), org);

                    match w.style.border_style {
                        BorderStyle::Outline => {
                            // The shadow covers the body region only when
                            // the real body could let it show through.
                            let body =
                                w.ktype > 0 || w.style.alpha[0] < 0xff;
                            let border = w.style.outline_width_x + w.style.outline_width_y
                                > 0.0
                                && !(w.ktype == 2 && time < w.kstart);
                            bbox = bbox
                                .union(&w.draw(surface, clip, mask, x, y, &sw, body, border));
                        }
                        BorderStyle::OpaqueBox => {
                            if let Some(b) = &w.opaque_box {
                                bbox = bbox.union(&b.draw(
                                    surface, clip, mask, x, y, &sw, true, false,
                                ));
                            }
                        }
                    }
                }
            }
            Pass::Outline => {
                if w.style.outline_width_x + w.style.outline_width_y > 0.0
                    && !(w.ktype == 2 && time < w.kstart)
                {
                    let x = p.0;
                    let y = p.1 + line.ascent - w.ascent;

                    let mut a = i32::from(w.style.alpha[2]);
                    if fade_alpha > 0 {
                        a += mul_div(fade_alpha, 0xff - a, 0xff);
                    }
                    let outline = w.style.colors[2].to_rgb() | (((0xff - a) as u32) << 24);
                    let sw = single_color(outline);

                    w.paint(provider, (x, y), org);

                    match w.style.border_style {
                        BorderStyle::Outline => {
                            // Fill the widened interior too when the body is
                            // known opaque, so the outline can't fringe.
                            let body = w.style.alpha[0] == 0
                                && w.style.alpha[1] == 0
                                && fade_alpha == 0;
                            bbox = bbox
                                .union(&w.draw(surface, clip, mask, x, y, &sw, body, true));
                        }
                        BorderStyle::OpaqueBox => {
                            if let Some(b) = &w.opaque_box {
                                bbox = bbox.union(&b.draw(
                                    surface, clip, mask, x, y, &sw, true, false,
                                ));
                            }
                        }
                    }
                }
            }
            Pass::Body => {
                let x = p.0;
                let y = p.1 + line.ascent - w.ascent;

                let mut ap = i32::from(w.style.alpha[0]);
                if fade_alpha > 0 {
                    ap += mul_div(fade_alpha, 0xff - ap, 0xff);
                }
                let mut primary = w.style.colors[0].to_rgb() | (((0xff - ap) as u32) << 24);

                let mut asec = i32::from(w.style.alpha[1]);
                if fade_alpha > 0 {
                    asec += mul_div(fade_alpha, 0xff - asec, 0xff);
                }
                let mut secondary = w.style.colors[1].to_rgb() | (((0xff - asec) as u32) << 24);

                // Karaoke sweep fraction.
                let mut k = match w.ktype {
                    1 => {
                        if time < w.kstart {
                            0.0
                        } else if time < w.kend {
                            let mut k = f64::from(time - w.kstart)
                                / f64::from(w.kend - w.kstart);
                            let angle = w.style.font_angle_z % 360.0;
                            if angle > 90.0 && angle < 270.0 {
                                k = 1.0 - k;
                                std::mem::swap(&mut primary, &mut secondary);
                            }
                            k
                        } else {
                            1.0
                        }
                    }
                    _ => {
                        if time < w.kstart {
                            0.0
                        } else {
                            1.0
                        }
                    }
                };
                if k >= 1.0 {
                    k = 1.0;
                }

                let sw: SwitchPoints = if k >= 1.0 {
                    single_color(primary)
                } else {
                    let boundary =
                        ((w.style.outline_width_x + k * f64::from(w.width)) as i32 >> 3) as u32;
                    smallvec![
                        (primary, 0),
                        (secondary, boundary),
                        (secondary, 0x00ff_ffff),
                    ]
                };

                w.paint(provider, (x, y), org);
                bbox = bbox.union(&w.draw(surface, clip, mask, x, y, &sw, true, false));
            }
        }

        p.0 += w.width;
    }

    bbox
}

#[cfg(test)]
#[path = "../../tests/unit/render/session.rs"]
mod tests;
