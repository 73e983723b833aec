use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkgSplit {
    pub name: String,
    pub version: String,
    /// `r1`, `r2`, ...; `None` for `r0`.
    pub revision: Option<String>,
}

impl PkgSplit {
    fn revision_number(&self) -> &str {
        self.revision
            .as_deref()
            .and_then(|r| r.strip_prefix('r'))
            .unwrap_or("0")
    }
}

fn pf_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<pn>[A-Za-z0-9+_][A-Za-z0-9+_-]*?)-(?P<ver>\d+(?:\.\d+)*[a-z]?(?:_(?:alpha|beta|pre|rc|p)\d*)*)(?:-r(?P<rev>\d+))?$",
        )
        .expect("valid package file regex")
    })
}

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<nums>\d+(?:\.\d+)*)(?P<letter>[a-z]?)(?P<suffixes>(?:_(?:alpha|beta|pre|rc|p)\d*)*)$")
            .expect("valid version regex")
    })
}

fn suffix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_(alpha|beta|pre|rc|p)(\d*)").expect("valid suffix regex"))
}

fn var_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*(?:export\s+)?(EAPI|SLOT|KEYWORDS)=(?:"([^"]*)"|'([^']*)'|(\S*))"#)
            .expect("valid variable regex")
    })
}

/// Splits an ebuild file stem (`foo-1.2-r1`) into name, version and
/// revision. Returns `None` when the stem carries no valid version.
pub fn pkgsplit(pf: &str) -> Option<PkgSplit> {
    let caps = pf_regex().captures(pf)?;
    let revision = caps
        .name("rev")
        .map(|r| r.as_str().trim_start_matches('0'))
        .filter(|r| !r.is_empty())
        .map(|r| format!("r{}", r));
    Some(PkgSplit {
        name: caps["pn"].to_string(),
        version: caps["ver"].to_string(),
        revision,
    })
}

fn cmp_integers(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn suffix_rank(name: &str) -> u8 {
    match name {
        "alpha" => 0,
        "beta" => 1,
        "pre" => 2,
        "rc" => 3,
        _ => 5,
    }
}

struct ParsedVersion<'a> {
    nums: Vec<&'a str>,
    letter: Option<char>,
    suffixes: Vec<(u8, &'a str)>,
}

fn parse_version(v: &str) -> Option<ParsedVersion<'_>> {
    let caps = version_regex().captures(v)?;
    let nums = caps.name("nums")?.as_str().split('.').collect();
    let letter = caps.name("letter").and_then(|l| l.as_str().chars().next());
    let suffixes = caps
        .name("suffixes")
        .map(|s| {
            suffix_regex()
                .captures_iter(s.as_str())
                .filter_map(|c| {
                    let name = c.get(1)?.as_str();
                    let num = c.get(2).map(|n| n.as_str()).unwrap_or("");
                    Some((suffix_rank(name), num))
                })
                .collect()
        })
        .unwrap_or_default();
    Some(ParsedVersion {
        nums,
        letter,
        suffixes,
    })
}

/// Orders two versions (without revision) following the package manager
/// rules: numeric components, letter, then `_alpha < _beta < _pre < _rc <
/// (none) < _p`. Unparseable versions fall back to plain string order.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (Some(pa), Some(pb)) = (parse_version(a), parse_version(b)) else {
        return a.cmp(b);
    };

    let first = cmp_integers(pa.nums[0], pb.nums[0]);
    if first != Ordering::Equal {
        return first;
    }
    for (x, y) in pa.nums.iter().zip(&pb.nums).skip(1) {
        let ord = if x.starts_with('0') || y.starts_with('0') {
            x.trim_end_matches('0').cmp(y.trim_end_matches('0'))
        } else {
            cmp_integers(x, y)
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    let len = pa.nums.len().cmp(&pb.nums.len());
    if len != Ordering::Equal {
        return len;
    }

    let letter = pa.letter.cmp(&pb.letter);
    if letter != Ordering::Equal {
        return letter;
    }

    for (x, y) in pa.suffixes.iter().zip(&pb.suffixes) {
        let ord = x.0.cmp(&y.0).then_with(|| cmp_integers(x.1, y.1));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    // an extra suffix is newer only when it is _p
    match pa.suffixes.len().cmp(&pb.suffixes.len()) {
        Ordering::Greater => {
            if pa.suffixes[pb.suffixes.len()].0 == 5 {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        Ordering::Less => {
            if pb.suffixes[pa.suffixes.len()].0 == 5 {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        Ordering::Equal => Ordering::Equal,
    }
}

pub fn compare_pkg(a: &PkgSplit, b: &PkgSplit) -> Ordering {
    compare_versions(&a.version, &b.version)
        .then_with(|| cmp_integers(a.revision_number(), b.revision_number()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub eapi: String,
    pub slot: String,
    pub keywords: String,
}

impl Metadata {
    fn from_map(mut map: HashMap<String, String>) -> Self {
        Self {
            eapi: map
                .remove("EAPI")
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "0".to_string()),
            slot: map
                .remove("SLOT")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "0".to_string()),
            keywords: map.remove("KEYWORDS").unwrap_or_default(),
        }
    }
}

/// `metadata/md5-cache` entries are flat `KEY=VALUE` lines.
pub fn read_cache_entry(path: &Path) -> anyhow::Result<Metadata> {
    let raw = std::fs::read_to_string(path)?;
    let map = raw
        .lines()
        .filter_map(|l| l.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Ok(Metadata::from_map(map))
}

/// Fallback for trees without a metadata cache: the first assignment of each
/// variable wins. Values set by eclasses are not seen.
pub fn scan_ebuild(path: &Path) -> anyhow::Result<Metadata> {
    let raw = std::fs::read_to_string(path)?;
    let mut map = HashMap::new();
    for line in raw.lines() {
        if let Some(c) = var_regex().captures(line) {
            let value = c
                .get(2)
                .or_else(|| c.get(3))
                .or_else(|| c.get(4))
                .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            map.entry(c[1].to_string()).or_insert(value);
        }
    }
    Ok(Metadata::from_map(map))
}
