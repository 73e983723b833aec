use crate::domain::models::Repository;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAIN_REPO: &str = "gentoo";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReposConf {
    pub main_repo: Option<String>,
    pub repositories: Vec<Repository>,
}

impl ReposConf {
    fn set_location(&mut self, name: &str, location: &str) {
        let location = PathBuf::from(location);
        match self.repositories.iter_mut().find(|r| r.name == name) {
            Some(existing) => existing.location = location,
            None => self.repositories.push(Repository {
                name: name.to_string(),
                location,
            }),
        }
    }

    pub fn main_repo_name(&self) -> &str {
        self.main_repo.as_deref().unwrap_or(DEFAULT_MAIN_REPO)
    }
}

/// Reads `repos.conf` INI text. Later sections override earlier locations
/// with the same name.
pub fn parse_repos_conf(raw: &str, conf: &mut ReposConf) {
    let mut section: Option<String> = None;
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = Some(name.trim().to_string());
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            log::debug!("ignoring repos.conf line: {}", line);
            continue;
        };
        match (section.as_deref(), key.trim()) {
            (Some("DEFAULT"), "main-repo") => conf.main_repo = Some(value.trim().to_string()),
            (Some(name), "location") if name != "DEFAULT" => conf.set_location(name, value.trim()),
            _ => {}
        }
    }
}

fn read_conf_path(path: &Path, conf: &mut ReposConf) -> anyhow::Result<()> {
    if path.is_dir() {
        let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && !p
                        .file_name()
                        .map(|n| n.to_string_lossy().starts_with('.'))
                        .unwrap_or(true)
            })
            .collect();
        files.sort();
        for f in files {
            log::debug!("reading {}", f.display());
            parse_repos_conf(&std::fs::read_to_string(f)?, conf);
        }
    } else if path.is_file() {
        log::debug!("reading {}", path.display());
        parse_repos_conf(&std::fs::read_to_string(path)?, conf);
    }
    Ok(())
}

/// `override_text` (the `PORTAGE_REPOSITORIES` variable) replaces the
/// configuration files entirely.
pub fn load_repos_conf(config_root: &Path, override_text: Option<&str>) -> anyhow::Result<ReposConf> {
    let mut conf = ReposConf::default();
    if let Some(raw) = override_text {
        parse_repos_conf(raw, &mut conf);
        return Ok(conf);
    }
    read_conf_path(
        &config_root.join("usr/share/portage/config/repos.conf"),
        &mut conf,
    )?;
    read_conf_path(&config_root.join("etc/portage/repos.conf"), &mut conf)?;
    Ok(conf)
}
