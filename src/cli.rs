//! Command-line interface definition and argument parsing.
//!
//! Arguments are declared with [clap](https://docs.rs/clap/). Helper methods on
//! [`Cli`] take a [`FileConfig`] so that config-file values act as defaults the
//! command line can override (layered config).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use concatenator::config::file::{FileConfig, expand_tilde};
use concatenator::config::RunOptions;

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect or initialise the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Subcommands for `config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration (file values + defaults for unset keys)
    Show,
    /// Write a default config.toml if none exists yet
    Init,
    /// Print the path to the config file
    Path,
}

/// Main command-line interface structure.
#[derive(Parser, Debug)]
#[command(name = "concatenator")]
#[command(
    about = "Concatenate the smallest files of a directory until the result outgrows a filesystem block"
)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand (e.g. `config`)
    #[command(subcommand)]
    pub subcommand: Option<Commands>,

    /// File the source files are concatenated into
    ///
    /// The file is created if missing and truncated otherwise. When omitted,
    /// the usage is printed and nothing else happens.
    #[arg(short = 'p', long)]
    path: Option<PathBuf>,

    /// Directory the files are taken from
    ///
    /// Only regular files directly inside this directory are considered.
    /// Defaults to the current directory.
    #[arg(short = 's', long)]
    source_path: Option<PathBuf>,

    /// Delete the resulting file once the run is over
    #[arg(short = 'c', long)]
    clear: bool,

    /// Stop threshold overriding the block size of `/`
    ///
    /// Accepts plain bytes or units: 4096, 100B, 4KiB, 1.5KB.
    #[arg(long, value_name = "SIZE")]
    threshold: Option<String>,

    /// Print a single JSON report instead of progress lines
    #[arg(long)]
    json: bool,

    /// Show debug diagnostics on stderr
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    /// Whether `--verbose` was given.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Resolve the source directory.
    ///
    /// Priority: CLI argument > config file `source_path` (tilde-expanded) >
    /// current directory (`.`).
    #[must_use]
    pub fn source_dir(&self, config: &FileConfig) -> PathBuf {
        if let Some(ref path) = self.source_path {
            return path.clone();
        }

        config
            .source_path
            .as_deref()
            .map_or_else(|| PathBuf::from("."), expand_tilde)
    }

    /// Build the run options, or `None` when no output path was given.
    ///
    /// Boolean flags are enabled if set on the command line or in the config
    /// file. The threshold follows CLI > config file > root block size.
    #[must_use]
    pub fn run_options(&self, config: &FileConfig) -> Option<RunOptions> {
        let output_path = self.path.clone()?;

        Some(RunOptions {
            output_path,
            source_dir: self.source_dir(config),
            clear: self.clear || config.clear.unwrap_or(false),
            threshold: self
                .threshold
                .clone()
                .or_else(|| config.threshold.clone()),
            json: self.json || config.json.unwrap_or(false),
        })
    }
}
