//! The document boundary: events, styles, and precomputed collision segments.
//!
//! Parsing subtitle files into these types is the job of an upstream
//! collaborator; the renderer consumes an immutable [`Document`] snapshot.
//! Edits are modeled by swapping in a new snapshot with a bumped generation,
//! which invalidates every cached layout.

use std::collections::HashMap;

use tracing::debug;

use crate::doc::style::{Margins, StyleState};
use crate::foundation::error::{OvertypeError, OvertypeResult};

/// One timed, styled subtitle event.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Event {
    /// Literal text with inline `{\...}` override tags.
    pub text: String,
    /// Start time in milliseconds.
    pub start_ms: i32,
    /// End time in milliseconds (exclusive).
    pub end_ms: i32,
    /// Name of the base style; unknown names fall back to the default style.
    pub style: String,
    /// Z-order layer; collisions are only resolved within a layer.
    pub layer: i32,
    /// Tie-breaker for events on the same layer.
    pub readorder: i32,
    /// Margin overrides in script pixels; zero entries defer to the style.
    pub margins: Margins,
    /// Line-effect string (`Banner;...`, `Scroll up;...`, `Scroll down;...`).
    pub effect: String,
}

/// A maximal time interval over which the set of active events is constant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Segment {
    pub start: i32,
    pub end: i32,
    /// Indices into [`Document::events`], in document order.
    pub entries: Vec<usize>,
}

/// An immutable snapshot of the subtitle script.
#[derive(Clone, Debug)]
pub struct Document {
    styles: HashMap<String, StyleState>,
    fallback: StyleState,
    events: Vec<Event>,
    play_res: (i32, i32),
    generation: u64,
    segments: Vec<Segment>,
}

impl Document {
    /// Build a snapshot from styles and events.
    ///
    /// `play_res` is the script's reference resolution; positions, margins
    /// and drawing coordinates in the events are interpreted at this size
    /// and scaled to the destination surface at render time.
    pub fn new(
        play_res: (i32, i32),
        styles: HashMap<String, StyleState>,
        events: Vec<Event>,
    ) -> OvertypeResult<Self> {
        if play_res.0 <= 0 || play_res.1 <= 0 {
            return Err(OvertypeError::validation("play resolution must be positive"));
        }
        for (i, e) in events.iter().enumerate() {
            if e.end_ms < e.start_ms {
                return Err(OvertypeError::validation(format!(
                    "event {i} ends at {} before it starts at {}",
                    e.end_ms, e.start_ms
                )));
            }
        }

        let segments = build_segments(&events);
        debug!(
            events = events.len(),
            segments = segments.len(),
            "document snapshot built"
        );

        Ok(Self {
            styles,
            fallback: StyleState::default(),
            events,
            play_res,
            generation: 0,
            segments,
        })
    }

    /// Tag this snapshot with an edit generation.
    ///
    /// Renderers key their caches on the generation, so giving an edited
    /// document a new value is what invalidates stale layouts.
    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// The edit generation of this snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The script reference resolution.
    pub fn play_res(&self) -> (i32, i32) {
        self.play_res
    }

    /// All events, in document order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Look up a style by name, falling back to the default style.
    pub fn style(&self, name: &str) -> &StyleState {
        self.styles.get(name).unwrap_or(&self.fallback)
    }

    pub(crate) fn style_by_name(&self, name: &str) -> Option<&StyleState> {
        self.styles.get(name)
    }

    /// The segment containing `t_ms`, with its index.
    pub(crate) fn segment_at(&self, t_ms: i32) -> Option<(usize, &Segment)> {
        let i = self
            .segments
            .partition_point(|s| s.end <= t_ms)
            .min(self.segments.len().saturating_sub(1));
        let seg = self.segments.get(i)?;
        (seg.start <= t_ms && t_ms < seg.end).then_some((i, seg))
    }
}

fn build_segments(events: &[Event]) -> Vec<Segment> {
    let mut cuts: Vec<i32> = events
        .iter()
        .filter(|e| e.end_ms > e.start_ms)
        .flat_map(|e| [e.start_ms, e.end_ms])
        .collect();
    cuts.sort_unstable();
    cuts.dedup();

    cuts.windows(2)
        .map(|w| Segment {
            start: w[0],
            end: w[1],
            entries: events
                .iter()
                .enumerate()
                .filter(|(_, e)| e.start_ms <= w[0] && w[0] < e.end_ms)
                .map(|(i, _)| i)
                .collect(),
        })
        .collect()
}
