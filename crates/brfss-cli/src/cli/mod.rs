//! CLI for the BRFSS archive fetcher.

mod commands;

use anyhow::{Context, Result};
use brfss_core::config::{self, FetchConfig};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use commands::{run_fetch, run_list, run_plan};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "brfss")]
#[command(about = "Download and unpack the CDC BRFSS annual survey archives", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of ~/.config/brfss/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download and unpack every archive whose artifact is missing.
    Fetch {
        /// Destination directory (overrides `dest_dir` in the config).
        #[arg(long, value_name = "DIR")]
        dest: Option<PathBuf>,
        /// Only process this year (repeatable).
        #[arg(long = "year", value_name = "YEAR")]
        years: Vec<u16>,
        /// If the verified download fails, retry once with TLS verification disabled.
        #[arg(long)]
        insecure_fallback: bool,
    },

    /// Show each catalog entry and what is on disk for it. No network access.
    Plan {
        /// Destination directory (overrides `dest_dir` in the config).
        #[arg(long, value_name = "DIR")]
        dest: Option<PathBuf>,
    },

    /// List extracted artifacts with their sizes.
    List {
        /// Destination directory (overrides `dest_dir` in the config).
        #[arg(long, value_name = "DIR")]
        dest: Option<PathBuf>,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = load_config(cli.config.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);
        let cwd = std::env::current_dir().context("current directory")?;

        match cli.command {
            CliCommand::Fetch {
                dest,
                years,
                insecure_fallback,
            } => {
                let dest_dir = resolve_dest(&cfg, dest, &cwd);
                run_fetch(&cfg, &dest_dir, &years, insecure_fallback)?;
            }
            CliCommand::Plan { dest } => run_plan(&cfg, &resolve_dest(&cfg, dest, &cwd))?,
            CliCommand::List { dest } => run_list(&cfg, &resolve_dest(&cfg, dest, &cwd))?,
        }

        Ok(())
    }
}

fn load_config(explicit: Option<&Path>) -> Result<FetchConfig> {
    match explicit {
        Some(path) => config::load_from_path(path),
        None => config::load_or_init(),
    }
}

/// `--dest` wins over the config; relative paths resolve against `cwd`.
fn resolve_dest(cfg: &FetchConfig, dest: Option<PathBuf>, cwd: &Path) -> PathBuf {
    match dest {
        Some(d) if d.is_absolute() => d,
        Some(d) => cwd.join(d),
        None => cfg.resolve_dest_dir(cwd),
    }
}

#[cfg(test)]
mod tests;
