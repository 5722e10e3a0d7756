use super::*;
use crate::doc::style::Alignment;

#[test]
fn short_fade_resolves_against_event_bounds() {
    // \fad(0,500) on a 500 ms event: no fade-in, fade-out over the whole
    // event.
    let params = [0xff, 0, 0xff, 0, 0];
    let times = [-1, 0, 500, -1];

    assert_eq!(eval_fade(params, times, 0, 500), 0);
    assert_eq!(eval_fade(params, times, 250, 500), 127);
    assert_eq!(eval_fade(params, times, 499, 500), 254);
}

#[test]
fn long_fade_is_piecewise() {
    // Ramp in over [0,100], hold, ramp out over [400,500].
    let params = [0xff, 0, 0xff, 0, 0];
    let times = [0, 100, 400, 500];

    assert_eq!(eval_fade(params, times, 0, 1000), 0xff);
    assert_eq!(eval_fade(params, times, 50, 1000), 127);
    assert_eq!(eval_fade(params, times, 200, 1000), 0);
    assert_eq!(eval_fade(params, times, 450, 1000), 127);
    assert_eq!(eval_fade(params, times, 700, 1000), 0xff);
}

#[test]
fn place_at_anchors_by_alignment() {
    let space = (100, 40);

    // Bottom-center: anchor is the bottom-center point.
    let r = place_at((200, 300), space, Alignment::new(2).unwrap());
    assert_eq!(r, Rect::new(150, 260, 250, 300));

    // Top-left: anchor is the top-left corner.
    let r = place_at((200, 300), space, Alignment::new(7).unwrap());
    assert_eq!(r, Rect::new(200, 300, 300, 340));

    // Middle-right.
    let r = place_at((200, 300), space, Alignment::new(6).unwrap());
    assert_eq!(r, Rect::new(100, 280, 200, 320));
}

#[test]
fn mul_div_rounds_to_nearest() {
    assert_eq!(mul_div(1, 1, 2), 1);
    assert_eq!(mul_div(100, 127, 255), 50);
    assert_eq!(mul_div(255, 255, 255), 255);
}

#[test]
fn default_opts_round_trip_through_serde() {
    let opts = RendererOpts::default();
    let json = serde_json::to_string(&opts).unwrap();
    let back: RendererOpts = serde_json::from_str(&json).unwrap();
    assert_eq!(back.scaled_border_and_shadow, opts.scaled_border_and_shadow);
    assert_eq!(back.default_wrap, opts.default_wrap);
}
