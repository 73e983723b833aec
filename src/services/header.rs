use crate::domain::models::{Arch, ArchStatus, DisplayConfig, KeywordsHeader, Tone};
use crate::services::text::{aligned, plain, toned};

/// Per-version fields shown after the keyword columns.
pub const EXTRA_FIELDS: [&str; 4] = ["eapi", "unused", "slot", "repo"];

fn rank(arch: &Arch) -> u8 {
    if arch.is_prefix() {
        return 4;
    }
    if arch.is_important() {
        return 0;
    }
    match arch.status {
        ArchStatus::Stable => 1,
        ArchStatus::Transitional => 2,
        ArchStatus::Testing => 3,
    }
}

/// Important arches first, then stable, transitional, testing; prefix
/// keywords last and only when requested. Names break ties.
pub fn select_arches(all: Vec<Arch>, config: &DisplayConfig) -> Vec<Arch> {
    let mut arches: Vec<Arch> = all
        .into_iter()
        .filter(|a| config.prefix || !a.is_prefix())
        .collect();

    if !config.arches.is_empty() {
        let wanted: Vec<Arch> = arches
            .iter()
            .filter(|a| config.arches.contains(&a.name))
            .cloned()
            .collect();
        if wanted.is_empty() {
            log::warn!(
                "none of the requested arches ({}) are known, showing all",
                config.arches.join(",")
            );
        } else {
            arches = wanted;
        }
    }

    arches.sort_by(|a, b| rank(a).cmp(&rank(b)).then_with(|| a.name.cmp(&b.name)));
    arches
}

pub fn build_header(all: Vec<Arch>, config: &DisplayConfig) -> KeywordsHeader {
    let arches = select_arches(all, config);
    let length = arches
        .iter()
        .map(|a| a.name.len())
        .chain(EXTRA_FIELDS.iter().map(|f| f.len()))
        .max()
        .unwrap_or(0);

    let content = arches
        .iter()
        .map(|a| {
            let label = if a.is_important() {
                toned(&a.name, Tone::Yellow)
            } else {
                plain(&a.name)
            };
            aligned(label, config.align, length)
        })
        .collect();
    let extra = EXTRA_FIELDS
        .iter()
        .map(|f| aligned(plain(f), config.align, length))
        .collect();

    KeywordsHeader {
        arches,
        length,
        content,
        extra,
    }
}
