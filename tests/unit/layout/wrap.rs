use super::*;
use crate::doc::outline::BlockOutlines;
use crate::doc::style::StyleState;
use crate::render::word::Word;

// BlockOutlines at size 160 gives every glyph an advance of 80 and
// ascent/descent of 128/32 (1/8-pixel units).
fn style() -> StyleState {
    let mut s = StyleState::default();
    s.font_size = 160.0;
    s.outline_width_x = 0.0;
    s.outline_width_y = 0.0;
    s.shadow_depth_x = 0.0;
    s.shadow_depth_y = 0.0;
    s
}

fn word(text: &str) -> Word {
    Word::new_text(&BlockOutlines, style(), text.to_owned(), 0, 0, 0)
}

fn linebreak() -> Word {
    word("")
}

fn screen() -> (i32, i32) {
    (640 * 8, 480 * 8)
}

fn margin() -> Rect {
    Rect::new(80, 80, 80, 80)
}

#[test]
fn no_wrap_keeps_everything_on_one_line() {
    let words: Vec<Word> = vec![word("aaaaaaaaaa"), word(" "), word("bbbbbbbbbb")];
    let stack = make_lines(&words, WrapStyle::None, Alignment::new(2).unwrap(), screen(), margin());
    assert_eq!(stack.lines.len(), 1);
}

#[test]
fn explicit_break_splits_lines() {
    let words = vec![word("aa"), linebreak(), word("bb")];
    let stack = make_lines(&words, WrapStyle::None, Alignment::new(2).unwrap(), screen(), margin());
    assert_eq!(stack.lines.len(), 2);
    assert_eq!(stack.lines[0].width, 160);
    assert_eq!(stack.lines[1].width, 160);
}

#[test]
fn end_of_line_wrap_breaks_at_the_last_fit() {
    // Available width: 640*8 - 2*80 = 4960; each word is 4000.
    let words = vec![word("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"), word(" "), word("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb")];
    let stack = make_lines(&words, WrapStyle::EndOfLine, Alignment::new(2).unwrap(), screen(), margin());
    assert_eq!(stack.lines.len(), 2);
    // Whitespace is trimmed off the wrapped line ends.
    assert_eq!(stack.lines[0].width, 4000);
    assert_eq!(stack.lines[1].width, 4000);
}

#[test]
fn smart_wrap_balances_line_widths() {
    // Two 320-wide words and a space; 500 of room splits them evenly.
    let words = vec![word("abcd"), word(" "), word("efgh")];
    let margin = {
        let m = (640 * 8 - 500) / 2;
        Rect::new(m, 80, m, 80)
    };
    let stack = make_lines(&words, WrapStyle::Smart, Alignment::new(2).unwrap(), screen(), margin);
    assert_eq!(stack.lines.len(), 2);
    assert_eq!(stack.lines[0].width, 320);
    assert_eq!(stack.lines[1].width, 320);
}

#[test]
fn adjacent_same_style_words_merge() {
    let words = vec![word("ab"), word("cd")];
    let stack = make_lines(&words, WrapStyle::None, Alignment::new(2).unwrap(), screen(), margin());
    assert_eq!(stack.lines.len(), 1);
    assert_eq!(stack.lines[0].words.len(), 1);
    assert_eq!(stack.lines[0].words[0].width, 320);
}

#[test]
fn empty_line_halves_its_height() {
    let words = vec![linebreak(), word("aa")];
    let stack = make_lines(&words, WrapStyle::None, Alignment::new(2).unwrap(), screen(), margin());
    assert_eq!(stack.lines.len(), 2);
    assert_eq!(stack.lines[0].ascent, 64);
    assert_eq!(stack.lines[0].descent, 16);
    assert_eq!(stack.lines[1].ascent, 128);
}

#[test]
fn line_metrics_take_the_maximum() {
    let mut big = style();
    big.font_size = 320.0;
    let words = vec![
        word("aa"),
        Word::new_text(&BlockOutlines, big, "bb".to_owned(), 0, 0, 0),
    ];
    let stack = make_lines(&words, WrapStyle::None, Alignment::new(2).unwrap(), screen(), margin());
    assert_eq!(stack.lines[0].ascent, 256);
    assert_eq!(stack.lines[0].descent, 64);
}

#[test]
fn bottom_center_alignment_places_above_the_margin() {
    let words = vec![word("abcd")];
    let stack = make_lines(&words, WrapStyle::None, Alignment::new(2).unwrap(), screen(), margin());

    let (w, h) = screen();
    assert_eq!(stack.rect.bottom, h - 80);
    assert_eq!(stack.rect.height(), 160);
    // Centered horizontally: (80 + (w - 80) - 320 + 1) / 2.
    assert_eq!(stack.rect.left, (80 + (w - 80) - 320 + 1) / 2);
}

#[test]
fn top_alignment_starts_at_the_margin() {
    let words = vec![word("abcd")];
    let stack = make_lines(&words, WrapStyle::None, Alignment::new(8).unwrap(), screen(), margin());
    assert_eq!(stack.rect.top, 80);
}

#[test]
fn borders_pad_the_needed_width() {
    let mut s = style();
    s.outline_width_x = 16.0;
    s.outline_width_y = 16.0;
    let words = vec![Word::new_text(&BlockOutlines, s, "ab".to_owned(), 0, 0, 0)];
    let stack = make_lines(&words, WrapStyle::None, Alignment::new(2).unwrap(), screen(), margin());
    assert_eq!(stack.rect.width(), 160 + 16);
    assert_eq!(stack.top_border, 16);
    assert_eq!(stack.bottom_border, 16);
}
