use crate::cli::{Align, Topper};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

/// Resolved display options. Built once from arguments and config file,
/// never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct DisplayConfig {
    pub align: Align,
    pub topper: Topper,
    pub bold: bool,
    pub color: bool,
    pub ignore_slots: bool,
    pub prefix: bool,
    pub arches: Vec<String>,
    pub overlays: bool,
    pub json: bool,
    pub require_package: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub name: String,
    pub location: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchStatus {
    Stable,
    Transitional,
    Testing,
}

pub const IMPORTANT_ARCHES: [&str; 3] = ["amd64", "arm", "x86"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Arch {
    pub name: String,
    pub status: ArchStatus,
}

impl Arch {
    pub fn new(name: &str, status: ArchStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
        }
    }

    /// Prefix keywords look like `amd64-linux`; `*-fbsd` are regular arches.
    pub fn is_prefix(&self) -> bool {
        match self.name.split_once('-') {
            Some((_, os)) => os != "fbsd",
            None => false,
        }
    }

    pub fn is_important(&self) -> bool {
        IMPORTANT_ARCHES.contains(&self.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordState {
    Stable,
    Unstable,
    Masked,
    Missing,
    Indeterminate,
}

impl KeywordState {
    /// First match wins: `~arch`, `-arch`, `arch`, `-*`.
    pub fn from_keywords(arch: &str, keywords: &[String]) -> Self {
        let has = |k: &str| keywords.iter().any(|x| x == k);
        if has(&format!("~{}", arch)) {
            KeywordState::Unstable
        } else if has(&format!("-{}", arch)) {
            KeywordState::Masked
        } else if has(arch) {
            KeywordState::Stable
        } else if has("-*") {
            KeywordState::Indeterminate
        } else {
            KeywordState::Missing
        }
    }

    pub fn glyph(self) -> Glyph {
        match self {
            KeywordState::Stable => Glyph::toned('+', Tone::Green),
            KeywordState::Unstable => Glyph::toned('~', Tone::Yellow),
            KeywordState::Masked => Glyph::toned('-', Tone::Red),
            KeywordState::Indeterminate => Glyph::toned('*', Tone::Red),
            KeywordState::Missing => Glyph::toned('o', Tone::Gray),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EapiStatus {
    #[default]
    Current,
    Deprecated,
    Banned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionRecord {
    pub cpv: String,
    pub version: String,
    /// `r1`, `r2`, ...; `None` for `r0`.
    pub revision: Option<String>,
    pub slot: String,
    pub eapi: String,
    pub eapi_status: EapiStatus,
    pub repo: String,
    pub keywords: Vec<String>,
    pub masked: bool,
    pub installed: bool,
}

impl VersionRecord {
    pub fn state(&self, arch: &str) -> KeywordState {
        KeywordState::from_keywords(arch, &self.keywords)
    }

    pub fn keyword_map(&self, arches: &[Arch]) -> BTreeMap<String, KeywordState> {
        arches
            .iter()
            .map(|a| (a.name.clone(), self.state(&a.name)))
            .collect()
    }

    /// Version with its revision, e.g. `1.2-r1`.
    pub fn full_version(&self) -> String {
        match &self.revision {
            Some(r) => format!("{}-{}", self.version, r),
            None => self.version.clone(),
        }
    }
}

/// All versions of one package as returned by the database.
#[derive(Debug, Clone, Serialize)]
pub struct PackageVersions {
    pub cp: String,
    pub versions: Vec<VersionRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tone {
    #[default]
    Default,
    Green,
    Yellow,
    Red,
    Gray,
    Blue,
    Purple,
}

/// One display cell. Styling travels with the character so layout code
/// never has to measure escape sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub tone: Tone,
    pub bold: bool,
}

impl Glyph {
    pub const BLANK: Glyph = Glyph::plain(' ');

    pub const fn plain(ch: char) -> Self {
        Self {
            ch,
            tone: Tone::Default,
            bold: false,
        }
    }

    pub const fn toned(ch: char, tone: Tone) -> Self {
        Self {
            ch,
            tone,
            bold: false,
        }
    }

    pub fn emboldened(self) -> Self {
        Self { bold: true, ..self }
    }
}

pub type Label = Vec<Glyph>;

/// Rotator input: text is read one character per line, a rule repeats its
/// glyph on every line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strip {
    Text(Label),
    Rule(Glyph),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixRow {
    pub label: Label,
    pub cells: Vec<KeywordState>,
    pub eapi: Label,
    pub unused: bool,
    /// Blank on continuation rows of a slot group.
    pub slot: Label,
    pub repo: Label,
}

#[derive(Debug, Clone)]
pub struct KeywordMatrix {
    pub cp: String,
    pub rows: Vec<MatrixRow>,
    /// Row indices that get a slot separator drawn above them.
    pub separators: Vec<usize>,
    pub slot_length: usize,
    pub version_length: usize,
    pub eapi_length: usize,
    pub repo_length: usize,
    pub content_length: usize,
}

#[derive(Debug, Clone)]
pub struct KeywordsHeader {
    pub arches: Vec<Arch>,
    /// Widest of the arch names and extra field names.
    pub length: usize,
    pub content: Vec<Label>,
    pub extra: Vec<Label>,
}

#[derive(Serialize)]
pub struct KeywordsReport {
    pub package: String,
    pub arches: Vec<String>,
    pub versions: Vec<VersionReport>,
}

#[derive(Serialize)]
pub struct VersionReport {
    pub cpv: String,
    pub version: String,
    pub slot: String,
    pub eapi: String,
    pub repo: String,
    pub masked: bool,
    pub installed: bool,
    pub unused: bool,
    pub keywords: BTreeMap<String, KeywordState>,
}
