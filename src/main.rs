//! # concatenator
//!
//! Concatenates the files of a directory, smallest first, into a single output
//! file until the output is larger than the block size of the root filesystem.
//!
//! ## Usage
//!
//! ```bash
//! # Concatenate files of the current directory into out.txt
//! concatenator --path out.txt
//!
//! # Take files from ./logs and delete the result afterward
//! concatenator -p out.txt -s ./logs --clear
//!
//! # Use a fixed threshold instead of the block size of /
//! concatenator -p out.txt --threshold 8KiB --json
//! ```

mod cli;

use anyhow::{Result, bail};
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, ConfigCommand};
use colored::Colorize;
use concatenator::{
    Concatenator, RunOptions, Threshold, config::FileConfig, logging::init_logging,
    output::JsonOutput,
};
use std::process::exit;

/// Entry point for the concatenator application.
///
/// Errors from [`inner_main`] are printed to stderr before exiting with a
/// non-zero status code.
fn main() {
    if let Err(err) = inner_main() {
        eprintln!("Error: {err:#}");

        exit(1);
    }
}

/// Main application logic that can return errors.
///
/// A missing `--path` prints the usage, and a source path that is missing or
/// not a directory prints a message. Both exit successfully without touching
/// the filesystem.
///
/// # Errors
///
/// Returns errors from logging setup, threshold resolution, the
/// concatenation run itself, or JSON serialization.
fn inner_main() -> Result<()> {
    let args = Cli::parse();

    if let Some(Commands::Config { command }) = &args.subcommand {
        return handle_config_command(command);
    }

    let file_config = load_config();

    let Some(options) = args.run_options(&file_config) else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    if !options.source_dir.exists() {
        println!(
            "{} {}",
            "The specified directory does not exist:".red(),
            options.source_dir.display()
        );
        return Ok(());
    }

    if !options.source_dir.is_dir() {
        println!(
            "{} {}",
            "The specified source path is not a directory:".red(),
            options.source_dir.display()
        );
        return Ok(());
    }

    init_logging(args.verbose(), file_config.logging.level.as_deref())?;

    run(&options)
}

/// Resolve the threshold and perform the concatenation.
fn run(options: &RunOptions) -> Result<()> {
    let threshold = Threshold::resolve(options.threshold.as_deref())?;
    let concatenator = Concatenator::new(threshold).with_quiet(options.json);

    let report = concatenator.run(&options.output_path, &options.source_dir, options.clear)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&JsonOutput::from(&report))?);
    }

    Ok(())
}

/// Dispatch `config` subcommands.
fn handle_config_command(command: &ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Path => {
            if let Some(path) = FileConfig::config_path() {
                println!("{}", path.display());
            } else {
                bail!("Could not determine the config directory on this platform");
            }
        }
        ConfigCommand::Show => {
            let config = FileConfig::load()?;
            println!("{}", format_config(&config));
        }
        ConfigCommand::Init => init_config()?,
    }

    Ok(())
}

const CONFIG_TEMPLATE: &str = r#"# concatenator configuration
# CLI arguments always take priority over values set here.

# Directory to take files from (default: current directory)
# source_path = "~/inbox"

# Delete the resulting file after the run
# clear = false

# Stop threshold; replaces the block size of / when set
# threshold = "4KiB"

# Print a JSON report instead of progress lines
# json = false

[logging]
# tracing filter directive; overridden by CONCATENATOR_LOG and --verbose
# level = "warn"
"#;

/// Render the effective configuration, marking keys that fall back to defaults.
fn format_config(config: &FileConfig) -> String {
    let show_bool = |v: Option<bool>, default: bool| {
        v.map_or_else(|| format!("{default}  (default)"), |b| b.to_string())
    };
    let show_str = |v: Option<&str>, default: &str| {
        v.map_or_else(|| format!("{default}  (default)"), |s| format!("\"{s}\""))
    };

    let source_path = config.source_path.as_ref().map_or_else(
        || "\".\"  (default)".to_string(),
        |p| format!("\"{}\"", p.display()),
    );

    format!(
        "source_path = {source_path}
clear       = {clear}
threshold   = {threshold}
json        = {json}

[logging]
level       = {level}",
        clear = show_bool(config.clear, false),
        threshold = show_str(config.threshold.as_deref(), "block size of /"),
        json = show_bool(config.json, false),
        level = show_str(config.logging.level.as_deref(), "warn"),
    )
}

/// Write a default config template to the config file path if it does not exist yet.
fn init_config() -> Result<()> {
    let Some(path) = FileConfig::config_path() else {
        bail!("Could not determine the config directory on this platform");
    };

    if path.exists() {
        println!("Config file already exists at: {}", path.display());
        println!("Remove it first if you want to regenerate it.");
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {e}",
                parent.display()
            )
        })?;
    }

    std::fs::write(&path, CONFIG_TEMPLATE)
        .map_err(|e| anyhow::anyhow!("Failed to write config file {}: {e}", path.display()))?;

    println!("Config file written to: {}", path.display());
    Ok(())
}

/// Load the configuration file, falling back to defaults on failure.
fn load_config() -> FileConfig {
    match FileConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e}", "Warning: Failed to load config file:".yellow());
            FileConfig::default()
        }
    }
}
