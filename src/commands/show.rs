use crate::domain::models::{DisplayConfig, Repository};
use crate::portdb::{DbConfig, PackageDatabase, PortDb};
use crate::services::header::build_header;
use crate::services::locate::{
    package_from_dir, resolve_repository, synthetic_repository, FsIdentity,
};
use crate::services::matrix::{build_matrix, build_report};
use crate::services::output::print_json;
use crate::services::render;
use std::io::Write;

#[derive(thiserror::Error, Debug)]
pub enum ShowError {
    #[error("No packages specified")]
    NoPackageSpecified,
}

pub fn handle_show(
    config: &DisplayConfig,
    db_config: DbConfig,
    packages: &[String],
) -> anyhow::Result<()> {
    if packages.is_empty() && config.require_package {
        return Err(ShowError::NoPackageSpecified.into());
    }
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if !packages.is_empty() {
        let db = PortDb::open(db_config)?;
        let trees = db.trees(config.overlays);
        return process_display(&mut out, &db, packages, &trees, config);
    }

    // the directory is checked before any repository configuration is read
    let cwd = std::env::current_dir()?;
    let found = package_from_dir(&cwd)?;
    let mut db = PortDb::open(db_config)?;
    let repo = match resolve_repository(&found.tree, db.repositories(), &FsIdentity) {
        Some(repo) => repo,
        None => {
            let repo = synthetic_repository(&found.tree)?;
            log::info!(
                "{} is not configured, using it as repository {}",
                found.tree.display(),
                repo.name
            );
            db.add_repository(repo.clone());
            repo
        }
    };
    log::debug!("showing {} from {}", found.cp, repo.name);
    process_display(&mut out, &db, &[found.cp], &[repo], config)
}

/// Queries each package and prints its table, or one JSON document for all.
pub fn process_display(
    out: &mut impl Write,
    db: &impl PackageDatabase,
    packages: &[String],
    trees: &[Repository],
    config: &DisplayConfig,
) -> anyhow::Result<()> {
    let header = build_header(db.arches(trees)?, config);
    if config.json {
        let mut reports = Vec::new();
        for package in packages {
            let pkg = db.query(package, trees)?;
            reports.push(build_report(&pkg, &header.arches, config));
        }
        return print_json(out, reports);
    }
    for (i, package) in packages.iter().enumerate() {
        let pkg = db.query(package, trees)?;
        let matrix = build_matrix(&pkg, &header.arches, config);
        if i > 0 {
            writeln!(out)?;
        }
        render::display(out, &matrix, &header, config)?;
    }
    Ok(())
}
