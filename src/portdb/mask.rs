use super::ebuild::{compare_pkg, compare_versions, pkgsplit, PkgSplit};
use crate::domain::models::VersionRecord;
use std::cmp::Ordering;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Less,
    LessEqual,
    Equal,
    /// `=cat/pkg-1.2*`
    Glob,
    /// `~cat/pkg-1.2`, any revision
    Tilde,
    GreaterEqual,
    Greater,
}

/// A `package.mask` entry. Blockers and USE dependencies are not
/// meaningful in mask files and are skipped by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskAtom {
    pub cp: String,
    pub version: Option<(Operator, PkgSplit)>,
    pub slot: Option<String>,
    pub repo: Option<String>,
}

fn split_operator(atom: &str) -> (Option<Operator>, &str) {
    const OPERATORS: [(&str, Operator); 6] = [
        (">=", Operator::GreaterEqual),
        ("<=", Operator::LessEqual),
        (">", Operator::Greater),
        ("<", Operator::Less),
        ("=", Operator::Equal),
        ("~", Operator::Tilde),
    ];
    for (prefix, op) in OPERATORS {
        if let Some(rest) = atom.strip_prefix(prefix) {
            return (Some(op), rest);
        }
    }
    (None, atom)
}

pub fn parse_mask_atom(line: &str) -> Option<MaskAtom> {
    let atom = line.split('#').next().unwrap_or("").trim();
    if atom.is_empty() {
        return None;
    }
    if atom.starts_with('!') || atom.contains('[') {
        log::debug!("skipping unsupported mask atom {}", atom);
        return None;
    }

    let (atom, repo) = match atom.split_once("::") {
        Some((a, r)) => (a, Some(r.to_string())),
        None => (atom, None),
    };
    let (atom, slot) = match atom.split_once(':') {
        Some((a, s)) => {
            let s = s.trim_end_matches('=');
            (a, (!s.is_empty() && s != "*").then(|| s.to_string()))
        }
        None => (atom, None),
    };
    let (op, body) = split_operator(atom);
    let malformed = || {
        log::debug!("skipping malformed mask atom {}", line.trim());
        None
    };
    let Some((category, rest)) = body.split_once('/') else {
        return malformed();
    };
    if category.is_empty() || rest.contains('/') {
        return malformed();
    }

    let Some(mut op) = op else {
        return Some(MaskAtom {
            cp: body.to_string(),
            version: None,
            slot,
            repo,
        });
    };
    let pf = match rest.strip_suffix('*') {
        Some(pf) if op == Operator::Equal => {
            op = Operator::Glob;
            pf
        }
        Some(_) => return malformed(),
        None => rest,
    };
    let Some(split) = pkgsplit(pf) else {
        return malformed();
    };
    Some(MaskAtom {
        cp: format!("{}/{}", category, split.name),
        version: Some((op, split)),
        slot,
        repo,
    })
}

/// `1.2*` matches `1.2`, `1.2.5` and `1.2-r3` but not `1.20`.
fn glob_matches(pattern: &PkgSplit, candidate: &PkgSplit) -> bool {
    let pattern = full_version(pattern);
    let candidate = full_version(candidate);
    let Some(tail) = candidate.strip_prefix(pattern.as_str()) else {
        return false;
    };
    let ends_in_digit = pattern.ends_with(|c: char| c.is_ascii_digit());
    !(ends_in_digit && tail.starts_with(|c: char| c.is_ascii_digit()))
}

fn full_version(split: &PkgSplit) -> String {
    match &split.revision {
        Some(rev) => format!("{}-{}", split.version, rev),
        None => split.version.clone(),
    }
}

fn slot_matches(wanted: &str, slot: &str) -> bool {
    if wanted.contains('/') {
        wanted == slot
    } else {
        slot.split('/').next() == Some(wanted)
    }
}

impl MaskAtom {
    pub fn matches(&self, cp: &str, record: &VersionRecord) -> bool {
        if self.cp != cp {
            return false;
        }
        if let Some(slot) = &self.slot {
            if !slot_matches(slot, &record.slot) {
                return false;
            }
        }
        if let Some(repo) = &self.repo {
            if *repo != record.repo {
                return false;
            }
        }
        let Some((op, wanted)) = &self.version else {
            return true;
        };
        let candidate = PkgSplit {
            name: wanted.name.clone(),
            version: record.version.clone(),
            revision: record.revision.clone(),
        };
        let ord = compare_pkg(&candidate, wanted);
        match op {
            Operator::Less => ord == Ordering::Less,
            Operator::LessEqual => ord != Ordering::Greater,
            Operator::Equal => ord == Ordering::Equal,
            Operator::Glob => glob_matches(wanted, &candidate),
            Operator::Tilde => compare_versions(&candidate.version, &wanted.version).is_eq(),
            Operator::GreaterEqual => ord != Ordering::Less,
            Operator::Greater => ord == Ordering::Greater,
        }
    }
}

pub fn load_mask_file(path: &Path) -> Vec<MaskAtom> {
    match std::fs::read_to_string(path) {
        Ok(raw) => raw.lines().filter_map(parse_mask_atom).collect(),
        Err(_) => Vec::new(),
    }
}
