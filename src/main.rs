use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use classroom::{app::ClassroomApp, config::AppConfig};

#[derive(Debug, Parser)]
#[command(name = "classroom", version, about = "Walk around a lit 3D classroom")]
struct Cli {
    /// TOML configuration file; built-in defaults are used without one
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };
    log::debug!("{:?}", config);

    ClassroomApp::new(config)?.run()
}
