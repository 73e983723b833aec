use crate::cli::Align;
use crate::domain::models::{Glyph, Label, Tone};
use colored::{ColoredString, Colorize};

pub fn plain(s: &str) -> Label {
    s.chars().map(Glyph::plain).collect()
}

pub fn toned(s: &str, tone: Tone) -> Label {
    s.chars().map(|c| Glyph::toned(c, tone)).collect()
}

pub fn blank(width: usize) -> Label {
    vec![Glyph::BLANK; width]
}

pub fn repeat(ch: char, width: usize) -> Label {
    vec![Glyph::plain(ch); width]
}

/// Pads `label` to `width`. `Top` keeps the text at the start (which becomes
/// the top once rotated), `Bottom` pushes it to the end.
pub fn aligned(mut label: Label, align: Align, width: usize) -> Label {
    let pad = width.saturating_sub(label.len());
    match align {
        Align::Top => {
            label.extend(blank(pad));
            label
        }
        Align::Bottom => {
            let mut out = blank(pad);
            out.extend(label);
            out
        }
    }
}

pub fn to_plain(label: &[Glyph]) -> String {
    label.iter().map(|g| g.ch).collect()
}

fn trimmed(label: &[Glyph]) -> &[Glyph] {
    let end = label
        .iter()
        .rposition(|g| g.ch != ' ')
        .map(|i| i + 1)
        .unwrap_or(0);
    &label[..end]
}

fn styled(g: &Glyph) -> ColoredString {
    let s = g.ch.to_string();
    let c = match g.tone {
        Tone::Default => s.normal(),
        Tone::Green => s.green(),
        Tone::Yellow => s.yellow(),
        Tone::Red => s.red(),
        Tone::Gray => s.bright_black(),
        Tone::Blue => s.blue(),
        Tone::Purple => s.purple(),
    };
    if g.bold {
        c.bold()
    } else {
        c
    }
}

/// Turns a styled line into printable text, dropping trailing blanks.
pub fn paint(label: &[Glyph], color: bool) -> String {
    let label = trimmed(label);
    if !color {
        return to_plain(label);
    }
    label.iter().map(|g| styled(g).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_pads_on_the_expected_side() {
        assert_eq!(to_plain(&aligned(plain("x86"), Align::Top, 5)), "x86  ");
        assert_eq!(to_plain(&aligned(plain("x86"), Align::Bottom, 5)), "  x86");
        assert_eq!(to_plain(&aligned(plain("amd64"), Align::Bottom, 3)), "amd64");
    }

    #[test]
    fn paint_without_color_trims_trailing_blanks() {
        let mut line = plain("+ ~");
        line.extend(blank(4));
        assert_eq!(paint(&line, false), "+ ~");
        assert_eq!(paint(&blank(3), false), "");
    }
}
