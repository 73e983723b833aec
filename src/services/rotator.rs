use crate::domain::models::{Glyph, Label, Strip};

/// Rotates strips by 90 degrees: line `i` holds the `i`-th character of
/// every text strip (blank when the text is shorter) and the glyph of every
/// rule. Each produced line is exactly `strips.len()` glyphs wide.
///
/// With `bold_alternate`, text strips 0, 2, 4, ... are emboldened; rules do
/// not advance the count so separators never shift the pattern.
pub fn rotate(strips: &[Strip], length: usize, bold_alternate: bool) -> Vec<Label> {
    if strips.is_empty() {
        return Vec::new();
    }
    (0..length)
        .map(|line| {
            let mut text_index = 0usize;
            strips
                .iter()
                .map(|strip| match strip {
                    Strip::Rule(g) => *g,
                    Strip::Text(label) => {
                        let g = label.get(line).copied().unwrap_or(Glyph::BLANK);
                        let bold = bold_alternate && text_index % 2 == 0;
                        text_index += 1;
                        if bold {
                            g.emboldened()
                        } else {
                            g
                        }
                    }
                })
                .collect()
        })
        .collect()
}

/// Text strips separated by single blank rules, the usual column layout.
pub fn spaced(labels: &[Label]) -> Vec<Strip> {
    let mut out = Vec::with_capacity(labels.len() * 2);
    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            out.push(Strip::Rule(Glyph::BLANK));
        }
        out.push(Strip::Text(label.clone()));
    }
    out
}
