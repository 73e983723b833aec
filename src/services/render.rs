use crate::cli::Topper;
use crate::domain::models::{
    DisplayConfig, Glyph, KeywordMatrix, KeywordsHeader, Label, MatrixRow, Strip, Tone,
};
use crate::services::matrix::unused_glyph;
use crate::services::rotator::{rotate, spaced};
use crate::services::text::{blank, paint, plain, repeat, toned};
use std::io::Write;

fn concat(parts: &[&[Glyph]]) -> Label {
    parts.iter().flat_map(|p| p.iter().copied()).collect()
}

fn bar() -> Label {
    plain(" | ")
}

fn cross() -> Label {
    plain("-+-")
}

fn dashes(width: usize) -> Label {
    repeat('-', width)
}

fn spaced_width(count: usize) -> usize {
    (count * 2).saturating_sub(1)
}

/// Rotated lines, or `length` empty lines when there is nothing to rotate.
fn rotated_or_empty(strips: &[Strip], length: usize, bold: bool) -> Vec<Label> {
    let lines = rotate(strips, length, bold);
    if lines.is_empty() {
        vec![Vec::new(); length]
    } else {
        lines
    }
}

fn cell(g: Glyph, column: usize, bold: bool) -> Glyph {
    if bold && column % 2 == 0 {
        g.emboldened()
    } else {
        g
    }
}

fn joined(glyphs: impl Iterator<Item = Glyph>) -> Label {
    let mut out = Vec::new();
    for (i, g) in glyphs.enumerate() {
        if i > 0 {
            out.push(Glyph::BLANK);
        }
        out.push(g);
    }
    out
}

/// Text strip followed by blank rules so it spans `width` value columns.
fn padded_strip(label: &Label, width: usize, out: &mut Vec<Strip>) {
    out.push(Strip::Text(label.clone()));
    for _ in 1..width {
        out.push(Strip::Rule(Glyph::BLANK));
    }
}

fn extras_of(row: &MatrixRow) -> Label {
    concat(&[
        &row.eapi,
        &[Glyph::BLANK, unused_glyph(row.unused), Glyph::BLANK],
        &row.slot,
    ])
}

fn render_archlist(
    matrix: &KeywordMatrix,
    header: &KeywordsHeader,
    config: &DisplayConfig,
) -> Vec<Label> {
    let corner = blank(matrix.version_length);
    let arch_lines = rotated_or_empty(&spaced(&header.content), header.length, config.bold);

    // eapi, unused, slot, then repo behind its own bar; blank filler keeps
    // each name over the first column of its value.
    let mut extra = Vec::new();
    padded_strip(&header.extra[0], matrix.eapi_length, &mut extra);
    extra.push(Strip::Rule(Glyph::BLANK));
    extra.push(Strip::Text(header.extra[1].clone()));
    extra.push(Strip::Rule(Glyph::BLANK));
    padded_strip(&header.extra[2], matrix.slot_length, &mut extra);
    extra.extend(bar().into_iter().map(Strip::Rule));
    padded_strip(&header.extra[3], matrix.repo_length, &mut extra);
    let extra_lines = rotated_or_empty(&extra, header.length, false);

    let mut out: Vec<Label> = arch_lines
        .iter()
        .zip(&extra_lines)
        .map(|(a, e)| concat(&[&corner, &bar(), a, &bar(), e]))
        .collect();

    let divider = concat(&[
        &dashes(matrix.version_length),
        &cross(),
        &dashes(spaced_width(header.arches.len())),
        &cross(),
        &dashes(matrix.eapi_length + 3 + matrix.slot_length),
        &cross(),
        &dashes(matrix.repo_length),
    ]);
    out.push(divider.clone());

    for (i, row) in matrix.rows.iter().enumerate() {
        if matrix.separators.contains(&i) {
            out.push(divider.clone());
        }
        let cells = joined(
            row.cells
                .iter()
                .enumerate()
                .map(|(j, s)| cell(s.glyph(), j, config.bold)),
        );
        out.push(concat(&[
            &row.label,
            &bar(),
            &cells,
            &bar(),
            &extras_of(row),
            &bar(),
            &row.repo,
        ]));
    }
    out
}

/// One strip per version, `|` between slot groups instead of a blank.
fn version_columns(
    matrix: &KeywordMatrix,
    column: impl Fn(usize, &MatrixRow) -> Strip,
) -> Vec<Strip> {
    let mut strips = Vec::new();
    for (i, row) in matrix.rows.iter().enumerate() {
        if i > 0 {
            let sep = if matrix.separators.contains(&i) { '|' } else { ' ' };
            strips.push(Strip::Rule(Glyph::plain(sep)));
        }
        strips.push(column(i, row));
    }
    strips
}

fn render_versionlist(
    matrix: &KeywordMatrix,
    header: &KeywordsHeader,
    config: &DisplayConfig,
) -> Vec<Label> {
    let gutter = header.length;
    let versions = version_columns(matrix, |_, row| Strip::Text(row.label.clone()));
    let mut out: Vec<Label> = rotated_or_empty(&versions, matrix.version_length, config.bold)
        .iter()
        .map(|l| concat(&[&blank(gutter), &bar(), l]))
        .collect();

    let divider = concat(&[
        &dashes(gutter),
        &cross(),
        &dashes(spaced_width(matrix.rows.len())),
    ]);
    out.push(divider.clone());

    for (j, name) in header.content.iter().enumerate() {
        let cells = version_columns(matrix, |i, row| {
            Strip::Rule(cell(row.cells[j].glyph(), i, config.bold))
        });
        let line = rotated_or_empty(&cells, 1, false).remove(0);
        out.push(concat(&[name, &bar(), &line]));
    }
    out.push(divider);

    let fields: [(usize, &dyn Fn(&MatrixRow) -> Label); 4] = [
        (matrix.eapi_length, &|r: &MatrixRow| r.eapi.clone()),
        (1, &|r: &MatrixRow| vec![unused_glyph(r.unused)]),
        (matrix.slot_length, &|r: &MatrixRow| r.slot.clone()),
        (matrix.repo_length, &|r: &MatrixRow| r.repo.clone()),
    ];
    for ((width, value), name) in fields.iter().zip(&header.extra) {
        let strips = version_columns(matrix, |_, row| Strip::Text(value(row)));
        for (t, line) in rotated_or_empty(&strips, *width, config.bold)
            .iter()
            .enumerate()
        {
            // only the first line carries the field name, the rest are filler
            let label = if t == 0 { name.clone() } else { blank(gutter) };
            out.push(concat(&[&label, &bar(), line]));
        }
    }
    out
}

/// Lays out the whole table. Pure: the same inputs give the same lines.
pub fn render(
    matrix: &KeywordMatrix,
    header: &KeywordsHeader,
    config: &DisplayConfig,
) -> Vec<Label> {
    match config.topper {
        Topper::Archlist => render_archlist(matrix, header, config),
        Topper::Versionlist => render_versionlist(matrix, header, config),
    }
}

pub fn title(cp: &str) -> Label {
    concat(&[&plain("Keywords for "), &toned(cp, Tone::Blue), &plain(":")])
}

pub fn display(
    out: &mut impl Write,
    matrix: &KeywordMatrix,
    header: &KeywordsHeader,
    config: &DisplayConfig,
) -> std::io::Result<()> {
    writeln!(out, "{}", paint(&title(&matrix.cp), config.color))?;
    for line in render(matrix, header, config) {
        writeln!(out, "{}", paint(&line, config.color))?;
    }
    Ok(())
}
