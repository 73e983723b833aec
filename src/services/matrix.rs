use crate::cli::Align;
use crate::domain::models::{
    Arch, DisplayConfig, EapiStatus, Glyph, KeywordMatrix, KeywordsReport, Label, MatrixRow,
    PackageVersions, Tone, VersionRecord, VersionReport,
};
use crate::services::text::{aligned, blank, toned};
use std::collections::HashSet;

/// Display order of the records, where slot separators go and which
/// versions are redundant.
struct Arrangement<'a> {
    records: Vec<&'a VersionRecord>,
    separators: Vec<usize>,
    group_starts: HashSet<usize>,
    unused: Vec<bool>,
}

fn group_by_slot(versions: &[VersionRecord]) -> Vec<Vec<&VersionRecord>> {
    let mut groups: Vec<(&str, Vec<&VersionRecord>)> = Vec::new();
    for v in versions {
        match groups.iter_mut().find(|(slot, _)| *slot == v.slot) {
            Some((_, members)) => members.push(v),
            None => groups.push((v.slot.as_str(), vec![v])),
        }
    }
    groups.into_iter().map(|(_, members)| members).collect()
}

fn arrange<'a>(pkg: &'a PackageVersions, ignore_slots: bool) -> Arrangement<'a> {
    let groups = if ignore_slots {
        vec![pkg.versions.iter().collect::<Vec<_>>()]
    } else {
        group_by_slot(&pkg.versions)
    };

    let mut records = Vec::with_capacity(pkg.versions.len());
    let mut separators = Vec::new();
    let mut group_starts = HashSet::new();
    let mut unused = Vec::with_capacity(pkg.versions.len());
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            separators.push(records.len());
        }
        group_starts.insert(records.len());
        unused.extend(redundant_flags(group));
        records.extend(group.iter().copied());
    }

    Arrangement {
        records,
        separators,
        group_starts,
        unused,
    }
}

/// Keywords that can shadow or be shadowed: masks and `-*` are dropped.
fn cleaned(keywords: &[String]) -> HashSet<&str> {
    keywords
        .iter()
        .map(String::as_str)
        .filter(|k| !k.starts_with('-'))
        .collect()
}

/// A version is redundant once every keyword it carries is covered by later
/// unmasked versions of the same group. Stable `arch` covers `~arch` too.
pub fn redundant_flags(group: &[&VersionRecord]) -> Vec<bool> {
    (0..group.len())
        .map(|i| {
            let mut left = cleaned(&group[i].keywords);
            for later in &group[i + 1..] {
                let newer = cleaned(&later.keywords);
                if !newer.is_empty() && !later.masked {
                    for k in &newer {
                        left.remove(k);
                        if !k.starts_with('~') {
                            left.remove(format!("~{}", k).as_str());
                        }
                    }
                }
                if left.is_empty() {
                    return true;
                }
            }
            false
        })
        .collect()
}

fn revision_len(r: &VersionRecord) -> usize {
    r.revision.as_ref().map(|x| x.len()).unwrap_or(0)
}

/// `[M]`/`[I]` markers, then the version padded so revisions line up.
fn version_label(r: &VersionRecord, revlength: usize) -> Label {
    let current = revision_len(r);
    let mut suffix = revlength - current;
    // +1 for the dash a revision would bring
    if suffix != 0 && current == 0 {
        suffix += 1;
    }
    let (marker, tone, bold) = match (r.masked, r.installed) {
        (true, true) => ("[M][I]", Tone::Yellow, false),
        (true, false) => ("[M]", Tone::Red, false),
        (false, true) => ("[I]", Tone::Default, true),
        (false, false) => ("", Tone::Default, false),
    };
    let text = format!("{}{}{}", marker, r.full_version(), " ".repeat(suffix));
    text.chars()
        .map(|c| {
            let g = Glyph::toned(c, tone);
            if bold {
                g.emboldened()
            } else {
                g
            }
        })
        .collect()
}

fn eapi_tone(status: EapiStatus) -> Tone {
    match status {
        EapiStatus::Current => Tone::Default,
        EapiStatus::Deprecated => Tone::Yellow,
        EapiStatus::Banned => Tone::Red,
    }
}

fn widest<'a>(values: impl Iterator<Item = &'a str>) -> usize {
    values.map(|v| v.chars().count()).max().unwrap_or(0).max(1)
}

pub fn build_matrix(
    pkg: &PackageVersions,
    arches: &[Arch],
    config: &DisplayConfig,
) -> KeywordMatrix {
    let arrangement = arrange(pkg, config.ignore_slots);
    let records = &arrangement.records;

    let revlength = records.iter().map(|r| revision_len(r)).max().unwrap_or(0);
    let labels: Vec<Label> = records
        .iter()
        .map(|r| version_label(r, revlength))
        .collect();
    let version_length = labels.iter().map(Vec::len).max().unwrap_or(0);
    let slot_length = widest(records.iter().map(|r| r.slot.as_str()));
    let eapi_length = widest(records.iter().map(|r| r.eapi.as_str()));
    let repo_length = widest(records.iter().map(|r| r.repo.as_str()));

    let rows = records
        .iter()
        .zip(labels)
        .enumerate()
        .map(|(i, (r, label))| {
            let show_slot = config.ignore_slots || arrangement.group_starts.contains(&i);
            let slot = if show_slot {
                let bold: Label = r.slot.chars().map(|c| Glyph::plain(c).emboldened()).collect();
                aligned(bold, Align::Top, slot_length)
            } else {
                blank(slot_length)
            };
            MatrixRow {
                label: aligned(label, config.align, version_length),
                cells: arches.iter().map(|a| r.state(&a.name)).collect(),
                eapi: aligned(toned(&r.eapi, eapi_tone(r.eapi_status)), Align::Top, eapi_length),
                unused: arrangement.unused[i],
                slot,
                repo: aligned(toned(&r.repo, Tone::Yellow), Align::Top, repo_length),
            }
        })
        .collect();

    KeywordMatrix {
        cp: pkg.cp.clone(),
        rows,
        separators: arrangement.separators,
        slot_length,
        version_length,
        eapi_length,
        repo_length,
        content_length: arches.len(),
    }
}

pub fn unused_glyph(unused: bool) -> Glyph {
    if unused {
        Glyph::toned('#', Tone::Purple)
    } else {
        Glyph::toned('o', Tone::Gray)
    }
}

pub fn build_report(
    pkg: &PackageVersions,
    arches: &[Arch],
    config: &DisplayConfig,
) -> KeywordsReport {
    let arrangement = arrange(pkg, config.ignore_slots);
    let versions = arrangement
        .records
        .iter()
        .zip(&arrangement.unused)
        .map(|(r, unused)| VersionReport {
            cpv: r.cpv.clone(),
            version: r.full_version(),
            slot: r.slot.clone(),
            eapi: r.eapi.clone(),
            repo: r.repo.clone(),
            masked: r.masked,
            installed: r.installed,
            unused: *unused,
            keywords: r.keyword_map(arches),
        })
        .collect();
    KeywordsReport {
        package: pkg.cp.clone(),
        arches: arches.iter().map(|a| a.name.clone()).collect(),
        versions,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::models::{ArchStatus, KeywordState};
    use crate::services::text::to_plain;

    pub(crate) fn record(version: &str, slot: &str, keywords: &str) -> VersionRecord {
        let (version, revision) = match version.split_once("-r") {
            Some((v, r)) => (v.to_string(), Some(format!("r{}", r))),
            None => (version.to_string(), None),
        };
        VersionRecord {
            cpv: format!("app-misc/foo-{}", version),
            version,
            revision,
            slot: slot.to_string(),
            eapi: "8".to_string(),
            eapi_status: EapiStatus::Current,
            repo: "gentoo".to_string(),
            keywords: keywords.split_whitespace().map(str::to_string).collect(),
            masked: false,
            installed: false,
        }
    }

    pub(crate) fn arches() -> Vec<Arch> {
        vec![
            Arch::new("amd64", ArchStatus::Stable),
            Arch::new("x86", ArchStatus::Stable),
        ]
    }

    fn pkg(versions: Vec<VersionRecord>) -> PackageVersions {
        PackageVersions {
            cp: "app-misc/foo".to_string(),
            versions,
        }
    }

    #[test]
    fn one_slot_gives_rectangular_table_without_separators() {
        let p = pkg(vec![record("1.0", "0", "amd64 ~x86"), record("1.1", "0", "amd64 ~x86")]);
        let m = build_matrix(&p, &arches(), &DisplayConfig::default());
        assert_eq!(m.rows.len(), 2);
        assert!(m.rows.iter().all(|r| r.cells.len() == 2));
        assert_eq!(m.rows[0].cells, vec![KeywordState::Stable, KeywordState::Unstable]);
        assert!(m.separators.is_empty());
        assert_eq!(m.content_length, 2);
    }

    #[test]
    fn slots_group_rows_and_insert_separators() {
        let p = pkg(vec![
            record("1.0", "0", "amd64"),
            record("2.0", "2", "~amd64"),
            record("1.1", "0", "~amd64"),
            record("3.0", "3", "~amd64"),
        ]);
        let m = build_matrix(&p, &arches(), &DisplayConfig::default());
        let order: Vec<String> = m.rows.iter().map(|r| to_plain(&r.label)).collect();
        assert_eq!(order, vec!["1.0", "1.1", "2.0", "3.0"]);
        assert_eq!(m.separators, vec![2, 3]);
        assert_eq!(to_plain(&m.rows[0].slot), "0");
        assert_eq!(to_plain(&m.rows[1].slot), " ");
    }

    #[test]
    fn ignoring_slots_keeps_order_and_drops_separators() {
        let p = pkg(vec![
            record("1.0", "0", "amd64"),
            record("2.0", "2", "~amd64"),
            record("1.1", "0", "~amd64"),
        ]);
        let config = DisplayConfig {
            ignore_slots: true,
            ..Default::default()
        };
        let m = build_matrix(&p, &arches(), &config);
        assert!(m.separators.is_empty());
        let slots: Vec<String> = m.rows.iter().map(|r| to_plain(&r.slot)).collect();
        assert_eq!(slots, vec!["0", "2", "0"]);
    }

    #[test]
    fn revisions_line_up_and_markers_prefix_versions() {
        let mut masked = record("1.1-r1", "0", "~amd64");
        masked.masked = true;
        let p = pkg(vec![record("1.0", "0", "amd64"), masked]);
        let config = DisplayConfig {
            align: Align::Top,
            ..Default::default()
        };
        let m = build_matrix(&p, &arches(), &config);
        assert_eq!(to_plain(&m.rows[0].label), "1.0      ");
        assert_eq!(to_plain(&m.rows[1].label), "[M]1.1-r1");
        assert_eq!(m.version_length, 9);
        assert_eq!(m.rows[1].label[0].tone, Tone::Red);
    }

    #[test]
    fn newer_stable_shadows_older_testing() {
        let a = record("1.0", "0", "~amd64 ~x86");
        let b = record("1.1", "0", "amd64 x86");
        assert_eq!(redundant_flags(&[&a, &b]), vec![true, false]);
    }

    #[test]
    fn newer_testing_does_not_shadow_older_stable() {
        let a = record("1.0", "0", "amd64");
        let b = record("1.1", "0", "~amd64");
        assert_eq!(redundant_flags(&[&a, &b]), vec![false, false]);
    }

    #[test]
    fn masked_versions_never_shadow() {
        let a = record("1.0", "0", "~amd64");
        let mut b = record("1.1", "0", "~amd64");
        b.masked = true;
        assert_eq!(redundant_flags(&[&a, &b]), vec![false, false]);
    }

    #[test]
    fn redundancy_is_per_slot_unless_ignored() {
        let p = pkg(vec![record("1.0", "0", "~amd64"), record("2.0", "2", "~amd64")]);
        let grouped = build_matrix(&p, &arches(), &DisplayConfig::default());
        assert!(grouped.rows.iter().all(|r| !r.unused));

        let config = DisplayConfig {
            ignore_slots: true,
            ..Default::default()
        };
        let flat = build_matrix(&p, &arches(), &config);
        assert!(flat.rows[0].unused);
    }

    #[test]
    fn report_carries_keyword_map() {
        let p = pkg(vec![record("1.0", "0", "amd64")]);
        let report = build_report(&p, &arches(), &DisplayConfig::default());
        assert_eq!(report.versions[0].keywords["amd64"], KeywordState::Stable);
        assert_eq!(report.versions[0].keywords["x86"], KeywordState::Missing);
    }
}
