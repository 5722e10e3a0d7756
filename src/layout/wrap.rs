//! Line building: a word list becomes wrapped lines and a placed rect.

use crate::doc::style::{Alignment, WrapStyle};
use crate::foundation::core::Rect;
use crate::render::word::Word;

/// One laid-out line: owned words plus aggregated metrics, all in 1/8-pixel
/// units.
#[derive(Clone, Debug, Default)]
pub(crate) struct Line {
    pub words: Vec<Word>,
    pub width: i32,
    pub ascent: i32,
    pub descent: i32,
    pub border_x: i32,
    pub border_y: i32,
}

/// The wrapped block: lines, the alignment-derived rect, and the outline
/// padding of the first and last line (the collision allocator reserves it).
#[derive(Clone, Debug, Default)]
pub(crate) struct LineStack {
    pub lines: Vec<Line>,
    pub rect: Rect,
    pub top_border: i32,
    pub bottom_border: i32,
}

fn full_line_width(words: &[Word], from: usize) -> i32 {
    words[from..]
        .iter()
        .take_while(|w| !w.is_linebreak)
        .map(|w| w.width)
        .sum()
}

fn wrap_width(words: &[Word], from: usize, maxwidth: i32, wrap: WrapStyle) -> i32 {
    match wrap {
        WrapStyle::Smart | WrapStyle::SmartLower => {
            if maxwidth <= 0 {
                return maxwidth;
            }
            // Aim each line at an equal share of the full width; the probe
            // below stops at the first word crossing that target.
            let fullwidth = full_line_width(words, from);
            let minwidth = fullwidth / ((fullwidth.abs() / maxwidth) + 1);

            let mut width = 0;
            let mut wordwidth = 0;
            let mut p = from;
            while p < words.len() && width < minwidth {
                wordwidth = words[p].width;
                p += 1;
                if (width + wordwidth).abs() < maxwidth.abs() {
                    width += wordwidth;
                }
            }

            let mut maxwidth = width;
            if wrap == WrapStyle::SmartLower && p < words.len() {
                maxwidth -= wordwidth;
            }
            maxwidth
        }
        WrapStyle::EndOfLine => maxwidth,
        WrapStyle::None => i32::MAX,
    }
}

fn compact(line: &mut Line) {
    while line.words.first().is_some_and(|w| w.is_whitespace) {
        line.width -= line.words.remove(0).width;
    }
    while line.words.last().is_some_and(|w| w.is_whitespace) {
        line.width -= line.words.pop().map_or(0, |w| w.width);
    }

    if line.words.is_empty() {
        return;
    }

    let old = std::mem::take(&mut line.words);
    for w in old {
        let appended = match line.words.last_mut() {
            Some(last) => last.append(&w),
            None => false,
        };
        if !appended {
            line.words.push(w);
        }
    }

    line.ascent = 0;
    line.descent = 0;
    line.border_x = 0;
    line.border_y = 0;
    for w in &line.words {
        line.ascent = line.ascent.max(w.ascent);
        line.descent = line.descent.max(w.descent);
        line.border_x = line.border_x.max((w.style.outline_width_x + 0.5) as i32);
        line.border_y = line.border_y.max((w.style.outline_width_y + 0.5) as i32);
    }
}

fn next_line(words: &[Word], i: &mut usize, maxwidth: i32, wrap: WrapStyle) -> Option<Line> {
    if *i >= words.len() {
        return None;
    }

    let mut line = Line::default();
    let maxwidth = wrap_width(words, *i, maxwidth, wrap);
    let mut empty = true;

    while *i < words.len() {
        let w = &words[*i];
        *i += 1;

        line.ascent = line.ascent.max(w.ascent);
        line.descent = line.descent.max(w.descent);
        line.border_x = line.border_x.max((w.style.outline_width_x + 0.5) as i32);
        line.border_y = line.border_y.max((w.style.outline_width_y + 0.5) as i32);

        if w.is_linebreak {
            if empty {
                // A bare break still occupies half a line of height.
                line.ascent /= 2;
                line.descent /= 2;
                line.border_x = 0;
                line.border_y = 0;
            }
            compact(&mut line);
            return Some(line);
        }

        empty = false;

        // Words of the same whitespace class move as one unit; a styled
        // word split across several runs must not wrap internally.
        let wsc = w.is_whitespace;
        let mut width = w.width;
        let mut j = *i;
        while j < words.len() && words[j].is_whitespace == wsc && !words[j].is_linebreak {
            width += words[j].width;
            j += 1;
        }

        line.width += width;
        if line.width <= maxwidth || line.words.is_empty() {
            line.words.push(w.clone());
            while *i < j {
                line.words.push(words[*i].clone());
                *i += 1;
            }
        } else {
            *i -= 1;
            line.width -= width;
            break;
        }
    }

    compact(&mut line);
    Some(line)
}

/// Wrap `words` into lines and place the block inside `size` and `margin`
/// per the alignment. Everything is in 1/8-pixel units.
pub(crate) fn make_lines(
    words: &[Word],
    wrap: WrapStyle,
    alignment: Alignment,
    size: (i32, i32),
    margin: Rect,
) -> LineStack {
    let mut out = LineStack::default();

    let mut needed = (0i32, 0i32);
    let mut first = true;
    let mut i = 0usize;
    let avail = size.0 - margin.left - margin.right;

    while let Some(l) = next_line(words, &mut i, avail, wrap) {
        if first {
            out.top_border = l.border_y;
            first = false;
        }
        out.bottom_border = l.border_y;

        needed.0 = needed.0.max(l.width + l.border_x);
        needed.1 += l.ascent + l.descent;
        out.lines.push(l);
    }

    let x = match alignment.column() {
        1 => margin.left,
        2 => (margin.left + (size.0 - margin.right) - needed.0 + 1) / 2,
        _ => size.0 - margin.right - needed.0,
    };
    let y = if alignment.is_bottom() {
        size.1 - margin.bottom - needed.1
    } else if alignment.is_middle() {
        (margin.top + (size.1 - margin.bottom) - needed.1 + 1) / 2
    } else {
        margin.top
    };

    out.rect = Rect::new(x, y, x + needed.0, y + needed.1);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/layout/wrap.rs"]
mod tests;
