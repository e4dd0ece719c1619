//! statelog library root.
//! Exposes the CLI parser, the high-level run() function and the modules the
//! binary is built from.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod models;
pub mod transport;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Run => cli::commands::run::handle(cfg),
        Commands::Rotate => cli::commands::rotate::handle(cfg),
        Commands::Window => cli::commands::window::handle(cfg),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Init { force } => cli::commands::init::handle(cli.config.as_deref(), *force),
    }
}

/// File, then environment, then command line.
pub fn load_config(cli: &Cli) -> AppResult<Config> {
    let mut cfg = Config::load(cli.config.as_deref().map(std::path::Path::new))?;
    cfg.apply_env_vars()?;
    if let Some(dir) = &cli.dir {
        cfg.log_dir = Some(dir.clone());
    }
    Ok(cfg)
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    // `init` must work even when the existing file does not parse.
    if let Commands::Init { force } = &cli.command {
        return cli::commands::init::handle(cli.config.as_deref(), *force);
    }

    let cfg = load_config(&cli)?;
    dispatch(&cli, &cfg)
}
