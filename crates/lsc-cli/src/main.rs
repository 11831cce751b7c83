mod cli;
mod config;
mod error;
mod list;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use lsc_core::linode::LinodeSource;
use lsc_ssh::SshConfigFile;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::config::Settings;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    // Logs go to stderr; stdout carries the rendered config.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    let ssh_config_path = match cli.ssh_config {
        Some(path) => path,
        None => config::default_ssh_config_path()?,
    };

    let settings = Settings::load(&config_path)?;
    let policy = cli.policy.apply(settings.policy);
    tracing::debug!(config = %config_path.display(), ?policy, "settings loaded");

    let source = LinodeSource::new(settings.api_key);
    let directory = lsc_core::fetch_directory(&source).await?;

    match cli.command.unwrap_or(Command::Render) {
        Command::Render => {
            let contents = SshConfigFile::new(&ssh_config_path).render(&directory, &policy)?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(&contents)?;
            stdout.flush()?;
        }
        Command::Update => {
            let result = SshConfigFile::new(&ssh_config_path).update(&directory, &policy)?;
            println!(
                "Wrote {} host entries to {}",
                result.hosts,
                result.path.display()
            );
            if let Some(backup) = result.backup {
                println!("Previous config saved as {}", backup.display());
            }
        }
        Command::List => {
            let filtered = directory.filtered(&policy);
            let mut stdout = io::stdout().lock();
            list::write_listing(&mut stdout, &filtered)?;
        }
    }

    Ok(())
}
