use crate::domain::models::Repository;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum LocateError {
    #[error("No ebuilds at \"{0}\"")]
    NoEbuilds(String),
    #[error("cannot derive a package name from \"{0}\"")]
    NoPackageName(String),
    #[error("empty repository name in {0}")]
    EmptyRepoName(String),
}

/// Filesystem identity of a path: (inode, device) on unix.
pub type FileKey = (u64, u64);

pub trait PathIdentity {
    fn identify(&self, path: &Path) -> std::io::Result<FileKey>;
}

pub struct FsIdentity;

impl PathIdentity for FsIdentity {
    #[cfg(unix)]
    fn identify(&self, path: &Path) -> std::io::Result<FileKey> {
        use std::os::unix::fs::MetadataExt;
        let meta = std::fs::metadata(path)?;
        Ok((meta.ino(), meta.dev()))
    }

    #[cfg(not(unix))]
    fn identify(&self, path: &Path) -> std::io::Result<FileKey> {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        path.canonicalize()?.hash(&mut hasher);
        Ok((hasher.finish(), 0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirPackage {
    pub cp: String,
    /// Repository root, two levels above the package directory.
    pub tree: PathBuf,
}

pub fn has_ebuilds(dir: &Path) -> anyhow::Result<bool> {
    let pattern = glob::Pattern::new("*.ebuild")?;
    Ok(std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .any(|e| pattern.matches(&e.file_name().to_string_lossy())))
}

/// `<tree>/<category>/<package>` with at least one ebuild in it.
pub fn package_from_dir(dir: &Path) -> anyhow::Result<DirPackage> {
    if !has_ebuilds(dir)? {
        return Err(LocateError::NoEbuilds(dir.display().to_string()).into());
    }
    let name_of = |p: Option<&Path>| {
        p.and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
    };
    let (Some(category), Some(package)) = (name_of(dir.parent()), name_of(Some(dir))) else {
        return Err(LocateError::NoPackageName(dir.display().to_string()).into());
    };
    let tree = dir.join("..").join("..").canonicalize()?;
    Ok(DirPackage {
        cp: format!("{}/{}", category, package),
        tree,
    })
}

/// Finds the configured repository that is the same directory as `tree`.
pub fn resolve_repository(
    tree: &Path,
    repos: &[Repository],
    identity: &impl PathIdentity,
) -> Option<Repository> {
    let ours = match identity.identify(tree) {
        Ok(key) => key,
        Err(e) => {
            log::debug!("cannot stat {}: {}", tree.display(), e);
            return None;
        }
    };
    repos
        .iter()
        .find(|repo| match identity.identify(&repo.location) {
            Ok(key) => key == ours,
            Err(e) => {
                log::debug!("skipping {}: {}", repo.location.display(), e);
                false
            }
        })
        .cloned()
}

/// A repository entry for an unconfigured tree, named by `profiles/repo_name`.
pub fn synthetic_repository(tree: &Path) -> anyhow::Result<Repository> {
    let path = tree.join("profiles").join("repo_name");
    log::debug!("reading {}", path.display());
    let raw = std::fs::read_to_string(&path)?;
    let name = raw.lines().next().unwrap_or("").trim();
    if name.is_empty() {
        return Err(LocateError::EmptyRepoName(path.display().to_string()).into());
    }
    Ok(Repository {
        name: name.to_string(),
        location: tree.to_path_buf(),
    })
}
