//! Package database collaborator.
//!
//! The display code only sees the [`PackageDatabase`] trait. [`PortDb`] is
//! the filesystem implementation: `repos.conf`, the metadata cache, ebuilds,
//! `package.mask` and the installed-package database under `ROOT`.
//!
//! ## Files
//! - `repos.rs` — `repos.conf` / `PORTAGE_REPOSITORIES` parsing.
//! - `ebuild.rs` — file name splitting, version ordering, metadata reads.
//! - `mask.rs` — `package.mask` atoms.

pub mod ebuild;
pub mod mask;
pub mod repos;

use crate::domain::models::{
    Arch, ArchStatus, EapiStatus, PackageVersions, Repository, VersionRecord,
};
use ebuild::{compare_pkg, pkgsplit, read_cache_entry, scan_ebuild, Metadata, PkgSplit};
use mask::{load_mask_file, MaskAtom};
use repos::load_repos_conf;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("No package matching \"{0}\"")]
    NoMatch(String),
    #[error("Ambiguous package name \"{0}\": {1}")]
    Ambiguous(String, String),
    #[error("No package matching \"{0}\"")]
    NoVersions(String),
    #[error("Failed to obtain metadata for {0}")]
    Metadata(String),
    #[error("no profiles/arch.list found in the selected repositories")]
    NoArchList,
}

pub trait PackageDatabase {
    fn repositories(&self) -> &[Repository];
    /// Main repository only, or every repository when `overlays` is set.
    fn trees(&self, overlays: bool) -> Vec<Repository>;
    fn arches(&self, trees: &[Repository]) -> anyhow::Result<Vec<Arch>>;
    /// Every version of `package` found in `trees`, oldest first.
    fn query(&self, package: &str, trees: &[Repository]) -> anyhow::Result<PackageVersions>;
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub config_root: PathBuf,
    pub root: PathBuf,
    /// Raw `repos.conf` text replacing the configuration files.
    pub repositories: Option<String>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            config_root: PathBuf::from("/"),
            root: PathBuf::from("/"),
            repositories: None,
        }
    }
}

impl DbConfig {
    pub fn from_env() -> Self {
        let path = |var: &str| {
            std::env::var(var)
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/"))
        };
        Self {
            config_root: path("PORTAGE_CONFIGROOT"),
            root: path("ROOT"),
            repositories: std::env::var("PORTAGE_REPOSITORIES")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}

pub struct PortDb {
    config: DbConfig,
    repos: Vec<Repository>,
    main_repo: String,
    user_masks: Vec<MaskAtom>,
}

/// Not-a-category directories at the top of a repository.
const NON_CATEGORIES: [&str; 5] = ["eclass", "licenses", "metadata", "profiles", "scripts"];

fn read_list(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .map(|raw| {
            raw.lines()
                .map(|l| l.split('#').next().unwrap_or("").trim())
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_arch_status(raw: &str) -> ArchStatus {
    match raw {
        "stable" => ArchStatus::Stable,
        "transitional" | "dev" => ArchStatus::Transitional,
        _ => ArchStatus::Testing,
    }
}

/// `arches.desc` when present, else the best profile status per arch from
/// `profiles.desc`.
fn arch_statuses(profiles: &Path) -> Vec<(String, ArchStatus)> {
    let arches_desc = read_list(&profiles.join("arches.desc"));
    if !arches_desc.is_empty() {
        return arches_desc
            .iter()
            .filter_map(|l| {
                let mut f = l.split_whitespace();
                Some((f.next()?.to_string(), parse_arch_status(f.next()?)))
            })
            .collect();
    }
    let mut out: Vec<(String, ArchStatus)> = Vec::new();
    for l in read_list(&profiles.join("profiles.desc")) {
        let f: Vec<&str> = l.split_whitespace().collect();
        if f.len() < 3 {
            continue;
        }
        let status = parse_arch_status(f[2]);
        match out.iter_mut().find(|(a, _)| a == f[0]) {
            Some((_, best)) => *best = (*best).min(status),
            None => out.push((f[0].to_string(), status)),
        }
    }
    out
}

struct EapiPolicy {
    banned: Vec<String>,
    deprecated: Vec<String>,
}

impl EapiPolicy {
    fn load(tree: &Path) -> Self {
        let mut policy = EapiPolicy {
            banned: Vec::new(),
            deprecated: Vec::new(),
        };
        for line in read_list(&tree.join("metadata/layout.conf")) {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let values = value.split_whitespace().map(str::to_string).collect();
            match key.trim() {
                "eapis-banned" => policy.banned = values,
                "eapis-deprecated" => policy.deprecated = values,
                _ => {}
            }
        }
        policy
    }

    fn status(&self, eapi: &str) -> EapiStatus {
        if self.banned.iter().any(|e| e == eapi) {
            EapiStatus::Banned
        } else if self.deprecated.iter().any(|e| e == eapi) {
            EapiStatus::Deprecated
        } else {
            EapiStatus::Current
        }
    }
}

impl PortDb {
    pub fn open(config: DbConfig) -> anyhow::Result<Self> {
        let conf = load_repos_conf(&config.config_root, config.repositories.as_deref())?;
        let user_masks = load_mask_file(&config.config_root.join("etc/portage/package.mask"));
        log::debug!(
            "repositories: {}",
            conf.repositories
                .iter()
                .map(|r| format!("{}={}", r.name, r.location.display()))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(Self {
            main_repo: conf.main_repo_name().to_string(),
            repos: conf.repositories,
            config,
            user_masks,
        })
    }

    /// Registers a repository that is not configured, e.g. the tree the
    /// current directory lives in.
    pub fn add_repository(&mut self, repo: Repository) {
        self.repos.retain(|r| r.name != repo.name);
        self.repos.push(repo);
    }

    fn categories(tree: &Path) -> Option<Vec<String>> {
        let listed = read_list(&tree.join("profiles/categories"));
        (!listed.is_empty()).then_some(listed)
    }

    fn resolve_cp(&self, package: &str, trees: &[Repository]) -> anyhow::Result<String> {
        if package.contains('/') {
            if trees.iter().any(|t| t.location.join(package).is_dir()) {
                return Ok(package.to_string());
            }
            return Err(DbError::NoMatch(package.to_string()).into());
        }

        let mut found = BTreeSet::new();
        for tree in trees {
            let pattern = format!(
                "{}/*/{}",
                glob::Pattern::escape(&tree.location.to_string_lossy()),
                glob::Pattern::escape(package)
            );
            let categories = Self::categories(&tree.location);
            for path in glob::glob(&pattern)?.filter_map(Result::ok) {
                if !path.is_dir() {
                    continue;
                }
                let Some(category) = path
                    .parent()
                    .and_then(|p| p.file_name())
                    .map(|c| c.to_string_lossy().to_string())
                else {
                    continue;
                };
                let known = match &categories {
                    Some(list) => list.contains(&category),
                    None => !NON_CATEGORIES.contains(&category.as_str()),
                };
                if known {
                    found.insert(format!("{}/{}", category, package));
                }
            }
        }
        match found.len() {
            0 => Err(DbError::NoMatch(package.to_string()).into()),
            1 => Ok(found.into_iter().next().unwrap_or_default()),
            _ => Err(DbError::Ambiguous(
                package.to_string(),
                found.into_iter().collect::<Vec<_>>().join(", "),
            )
            .into()),
        }
    }

    fn metadata(&self, tree: &Path, category: &str, pf: &str) -> anyhow::Result<Metadata> {
        let cache = tree.join("metadata/md5-cache").join(category).join(pf);
        if cache.is_file() {
            return read_cache_entry(&cache);
        }
        let pn = pkgsplit(pf).map(|s| s.name).unwrap_or_default();
        let ebuild = tree
            .join(category)
            .join(&pn)
            .join(format!("{}.ebuild", pf));
        scan_ebuild(&ebuild)
            .map_err(|_| DbError::Metadata(format!("{}/{}", category, pf)).into())
    }

    fn is_installed(&self, category: &str, pf: &str) -> bool {
        self.config
            .root
            .join("var/db/pkg")
            .join(category)
            .join(pf)
            .is_dir()
    }
}

impl PackageDatabase for PortDb {
    fn repositories(&self) -> &[Repository] {
        &self.repos
    }

    fn trees(&self, overlays: bool) -> Vec<Repository> {
        if overlays {
            return self.repos.clone();
        }
        match self.repos.iter().find(|r| r.name == self.main_repo) {
            Some(main) => vec![main.clone()],
            None => {
                log::warn!(
                    "main repository {} is not configured, searching all repositories",
                    self.main_repo
                );
                self.repos.clone()
            }
        }
    }

    fn arches(&self, trees: &[Repository]) -> anyhow::Result<Vec<Arch>> {
        let main = self.repos.iter().filter(|r| r.name == self.main_repo);
        for tree in trees.iter().chain(main) {
            let profiles = tree.location.join("profiles");
            let names = read_list(&profiles.join("arch.list"));
            if names.is_empty() {
                continue;
            }
            let statuses = arch_statuses(&profiles);
            log::debug!("{} arches from {}", names.len(), tree.name);
            return Ok(names
                .iter()
                .map(|n| {
                    let status = statuses
                        .iter()
                        .find(|(a, _)| a == n)
                        .map(|(_, s)| *s)
                        .unwrap_or(ArchStatus::Testing);
                    Arch::new(n, status)
                })
                .collect());
        }
        Err(DbError::NoArchList.into())
    }

    fn query(&self, package: &str, trees: &[Repository]) -> anyhow::Result<PackageVersions> {
        let cp = self.resolve_cp(package, trees)?;
        let (category, name) = cp
            .split_once('/')
            .ok_or_else(|| DbError::NoMatch(package.to_string()))?;

        let mut found: Vec<(PkgSplit, VersionRecord)> = Vec::new();
        for tree in trees {
            let dir = tree.location.join(&cp);
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            let mut masks = load_mask_file(&tree.location.join("profiles/package.mask"));
            masks.extend(self.user_masks.iter().cloned());
            let eapis = EapiPolicy::load(&tree.location);

            let mut files: Vec<String> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect();
            files.sort();
            for file in files {
                let Some(pf) = file.strip_suffix(".ebuild") else {
                    continue;
                };
                let Some(split) = pkgsplit(pf) else {
                    log::debug!("ignoring {} with invalid version", file);
                    continue;
                };
                if split.name != name {
                    log::debug!("ignoring {} in {}", file, dir.display());
                    continue;
                }
                let meta = self.metadata(&tree.location, category, pf)?;
                let cpv = format!("{}/{}", category, pf);
                let mut record = VersionRecord {
                    masked: false,
                    installed: self.is_installed(category, pf),
                    cpv,
                    version: split.version.clone(),
                    revision: split.revision.clone(),
                    slot: meta.slot,
                    eapi_status: eapis.status(&meta.eapi),
                    eapi: meta.eapi,
                    repo: tree.name.clone(),
                    keywords: meta.keywords.split_whitespace().map(str::to_string).collect(),
                };
                record.masked = masks.iter().any(|m| m.matches(&cp, &record));
                found.push((split, record));
            }
        }

        if found.is_empty() {
            return Err(DbError::NoVersions(package.to_string()).into());
        }
        found.sort_by(|a, b| compare_pkg(&a.0, &b.0));
        Ok(PackageVersions {
            cp,
            versions: found.into_iter().map(|(_, r)| r).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: PathBuf, body: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn fixture() -> (TempDir, PortDb) {
        let tmp = TempDir::new().expect("temp dir");
        let tree = tmp.path().join("repo");
        write(tree.join("profiles/repo_name"), "fixture\n");
        write(tree.join("profiles/arch.list"), "amd64\nx86\n# comment\nppc\namd64-linux\n");
        write(
            tree.join("profiles/arches.desc"),
            "amd64 stable\nx86 stable\nppc testing\n",
        );
        write(tree.join("profiles/package.mask"), "=app-misc/foo-2.0\n");
        write(tree.join("metadata/layout.conf"), "eapis-deprecated = 7\n");
        write(
            tree.join("app-misc/foo/foo-1.0.ebuild"),
            "EAPI=7\nSLOT=\"0\"\nKEYWORDS=\"amd64 ~x86\"\n",
        );
        write(
            tree.join("app-misc/foo/foo-1.10.ebuild"),
            "EAPI=8\nSLOT=\"0\"\nKEYWORDS=\"~amd64\"\n",
        );
        write(
            tree.join("app-misc/foo/foo-2.0.ebuild"),
            "EAPI=8\nSLOT=\"2\"\nKEYWORDS=\"\"\n",
        );
        write(tree.join("app-misc/foo/bar-1.0.ebuild"), "EAPI=8\n");
        write(tree.join("app-misc/foo/metadata.xml"), "<pkgmetadata/>\n");
        write(
            tmp.path().join("root/var/db/pkg/app-misc/foo-1.0/SLOT"),
            "0\n",
        );
        let config = DbConfig {
            config_root: tmp.path().join("config"),
            root: tmp.path().join("root"),
            repositories: Some(format!(
                "[DEFAULT]\nmain-repo = fixture\n[fixture]\nlocation = {}\n",
                tree.display()
            )),
        };
        let db = PortDb::open(config).expect("open db");
        (tmp, db)
    }

    #[test]
    fn queries_versions_in_order_with_flags() {
        let (_tmp, db) = fixture();
        let trees = db.trees(false);
        let pkg = db.query("app-misc/foo", &trees).unwrap();
        let versions: Vec<&str> = pkg.versions.iter().map(|v| v.version.as_str()).collect();
        assert_eq!(versions, vec!["1.0", "1.10", "2.0"]);
        assert!(pkg.versions[0].installed);
        assert!(!pkg.versions[1].installed);
        assert!(pkg.versions[2].masked);
        assert_eq!(pkg.versions[0].eapi_status, EapiStatus::Deprecated);
        assert_eq!(pkg.versions[0].repo, "fixture");
    }

    #[test]
    fn bare_names_resolve_to_a_category() {
        let (_tmp, db) = fixture();
        let trees = db.trees(false);
        assert_eq!(db.query("foo", &trees).unwrap().cp, "app-misc/foo");
        let err = db.query("nope", &trees).unwrap_err();
        assert_eq!(err.to_string(), "No package matching \"nope\"");
    }

    #[test]
    fn bare_name_in_two_categories_is_ambiguous() {
        let (tmp, db) = fixture();
        let tree = tmp.path().join("repo");
        write(tree.join("dev-util/foo/foo-0.5.ebuild"), "EAPI=8\n");
        let trees = db.trees(false);
        let err = db.query("foo", &trees).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Ambiguous package name \"foo\": app-misc/foo, dev-util/foo"
        );

        write(tree.join("profiles/categories"), "app-misc\n");
        assert_eq!(db.query("foo", &trees).unwrap().cp, "app-misc/foo");
    }

    #[test]
    fn package_without_ebuilds_is_not_matched() {
        let (tmp, db) = fixture();
        write(tmp.path().join("repo/app-misc/empty/metadata.xml"), "<pkgmetadata/>\n");
        let err = db.query("app-misc/empty", &db.trees(false)).unwrap_err();
        assert_eq!(err.to_string(), "No package matching \"app-misc/empty\"");
    }

    #[test]
    fn range_and_slot_masks_apply_to_queries() {
        let (tmp, db) = fixture();
        let trees = db.trees(false);
        let mask = tmp.path().join("repo/profiles/package.mask");

        write(mask.clone(), "# last rites\n>=app-misc/foo-1.10\n");
        let pkg = db.query("app-misc/foo", &trees).unwrap();
        let masked: Vec<bool> = pkg.versions.iter().map(|v| v.masked).collect();
        assert_eq!(masked, vec![false, true, true]);

        write(mask, "app-misc/foo:0\n");
        let pkg = db.query("app-misc/foo", &trees).unwrap();
        let masked: Vec<bool> = pkg.versions.iter().map(|v| v.masked).collect();
        assert_eq!(masked, vec![true, true, false]);
    }

    #[test]
    fn arches_come_with_status() {
        let (_tmp, db) = fixture();
        let arches = db.arches(&db.trees(false)).unwrap();
        assert_eq!(arches.len(), 4);
        assert_eq!(arches[2], Arch::new("ppc", ArchStatus::Testing));
        assert_eq!(arches[3].status, ArchStatus::Testing);
    }

    #[test]
    fn profiles_desc_fallback_keeps_best_status() {
        let tmp = TempDir::new().expect("temp dir");
        write(
            tmp.path().join("profiles.desc"),
            "amd64 default/linux/amd64 exp\namd64 default/linux/amd64/23.0 stable\nmips default/linux/mips dev\n",
        );
        let statuses = arch_statuses(tmp.path());
        assert_eq!(
            statuses,
            vec![
                ("amd64".to_string(), ArchStatus::Stable),
                ("mips".to_string(), ArchStatus::Transitional)
            ]
        );
    }
}
