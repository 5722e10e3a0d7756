//! Positioning and fade effects attached to a subtitle.

use smallvec::SmallVec;

/// The five effect families. At most one instance of each can attach to a
/// subtitle; the first tag of a kind wins and later duplicates are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EffectKind {
    Move,
    Org,
    Fade,
    Banner,
    Scroll,
}

/// One effect instance: a kind plus its integer parameters and timestamps.
///
/// Parameter meaning is positional per kind, matching the tag grammar:
/// `Move` carries two endpoints in 1/8-pixel space, `Fade` three alpha
/// levels and four times, `Banner`/`Scroll` crawl delays and fadeaway
/// extents. `-1` timestamps are sentinels resolved against the event
/// duration at evaluation time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Effect {
    pub kind: EffectKind,
    pub params: [i32; 5],
    pub times: [i32; 4],
}

impl Effect {
    pub fn new(kind: EffectKind) -> Self {
        Self { kind, params: [0; 5], times: [0; 4] }
    }
}

/// The per-subtitle effect slots.
#[derive(Clone, Debug, Default)]
pub(crate) struct EffectSet(SmallVec<[Effect; 2]>);

impl EffectSet {
    pub fn get(&self, kind: EffectKind) -> Option<&Effect> {
        self.0.iter().find(|e| e.kind == kind)
    }

    /// Install an effect unless its kind is already occupied.
    pub fn insert_first(&mut self, effect: Effect) {
        if self.get(effect.kind).is_none() {
            self.0.push(effect);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.0.iter()
    }
}

/// Parse an event's line-effect field (`Banner;...`, `Scroll up;...`,
/// `Scroll down;...`).
///
/// Returns the effect plus whether it forces no-wrap (banners do). Numbers
/// are scaled into the 1/8-pixel space with the subtitle's play-resolution
/// ratios. Anything unrecognized or short of required parameters is ignored.
pub(crate) fn parse_line_effect(
    s: &str,
    scale_x: f64,
    scale_y: f64,
) -> Option<(Effect, bool)> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let split = s.find(';').map_or(s.len(), |i| i + 1);
    let (name, rest) = s.split_at(split);
    let mut nums = rest.split(';').map(|p| p.trim().parse::<i32>().ok());

    if name.eq_ignore_ascii_case("Banner;") {
        let delay = nums.next().flatten()?;
        let left_to_right = nums.next().flatten().unwrap_or(0);
        let fadeaway_width = nums.next().flatten().unwrap_or(0);

        let mut e = Effect::new(EffectKind::Banner);
        e.params[0] = (f64::from(delay) / scale_x).max(1.0) as i32;
        e.params[1] = left_to_right;
        e.params[2] = (scale_x * f64::from(fadeaway_width)) as i32;
        return Some((e, true));
    }

    let down = name.eq_ignore_ascii_case("Scroll down;");
    if down || name.eq_ignore_ascii_case("Scroll up;") {
        let mut top = nums.next().flatten()?;
        let mut bottom = nums.next().flatten()?;
        let delay = nums.next().flatten()?;
        let fadeaway_height = nums.next().flatten().unwrap_or(0);

        if top > bottom {
            std::mem::swap(&mut top, &mut bottom);
        }

        let mut e = Effect::new(EffectKind::Scroll);
        e.params[0] = (scale_y * f64::from(top) * 8.0) as i32;
        e.params[1] = (scale_y * f64::from(bottom) * 8.0) as i32;
        e.params[2] = (f64::from(delay) / scale_y).max(1.0) as i32;
        e.params[3] = i32::from(down);
        e.params[4] = (scale_y * f64::from(fadeaway_height)) as i32;
        return Some((e, false));
    }

    None
}
