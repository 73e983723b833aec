use crate::cli::{Align, Cli, Topper};
use crate::domain::models::DisplayConfig;
use serde::Deserialize;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Defaults read from `~/.config/eshowkw/config.toml`. Command line flags win.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct FileConfig {
    pub align: Option<Align>,
    pub top_position: Option<Topper>,
    pub bold: bool,
    pub color: bool,
    pub overlays: bool,
    pub prefix: bool,
    pub ignore_slot: bool,
}

pub fn config_path() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".config/eshowkw/config.toml"))
}

pub fn load_file_config() -> anyhow::Result<FileConfig> {
    let Some(path) = config_path() else {
        return Ok(FileConfig::default());
    };
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    log::debug!("loading {}", path.display());
    let raw = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&raw)?)
}

/// Colour unless stdout is redirected or `NO_COLOR` is set; `force` beats both.
pub fn color_enabled(force: bool, stdout_is_tty: bool, no_color: bool) -> bool {
    force || (stdout_is_tty && !no_color)
}

pub fn resolve(cli: &Cli, file: &FileConfig, stdout_is_tty: bool) -> DisplayConfig {
    let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    DisplayConfig {
        align: cli.align.or(file.align).unwrap_or_default(),
        topper: cli.top_position.or(file.top_position).unwrap_or_default(),
        bold: cli.bold || file.bold,
        color: color_enabled(cli.color || file.color, stdout_is_tty, no_color),
        ignore_slots: cli.ignore_slot || file.ignore_slot,
        // asking for specific arches implies prefix ones may be among them
        prefix: cli.prefix || file.prefix || !cli.arch.is_empty(),
        arches: cli
            .arch
            .iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect(),
        overlays: cli.overlays || file.overlays,
        json: cli.json,
        require_package: cli.require_package,
    }
}

pub fn stdout_is_tty() -> bool {
    std::io::stdout().is_terminal()
}
