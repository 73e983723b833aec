use clap::Parser;

mod cli;
mod commands;
mod domain;
mod portdb;
mod services;

use cli::Cli;
use commands::handle_show;
use portdb::DbConfig;
use services::settings::{load_file_config, resolve, stdout_is_tty};

fn main() -> anyhow::Result<()> {
    // stderr only; stdout carries the table
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let file = load_file_config()?;
    let config = resolve(&cli, &file, stdout_is_tty());
    colored::control::set_override(config.color);
    log::debug!("display config: {:?}", config);

    handle_show(&config, DbConfig::from_env(), &cli.packages)
}
