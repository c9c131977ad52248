//! Smallest-first concatenation.
//!
//! A run truncates the output file, lists the regular files of the source
//! directory, and appends them in ascending size order until the output's size
//! strictly exceeds the [`Threshold`]. Files left over once the threshold is
//! crossed are never touched.
//!
//! Any I/O failure aborts the run and leaves the output in whatever state it
//! had reached. Nothing is retried or rolled back.

use std::{
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::Threshold;
use crate::source::{SourceFile, list_source_files, sort_by_size};

/// One source file appended to the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppendRecord {
    /// Path of the appended file
    pub input_path: PathBuf,

    /// Size of the appended file right before it was read
    pub input_size: u64,

    /// Output size before the append
    pub output_size_before: u64,

    /// Output size after the append
    pub output_size_after: u64,
}

/// Outcome of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// File the sources were concatenated into
    pub output_path: PathBuf,

    /// Limit the output had to exceed
    pub threshold: Threshold,

    /// Appended files, in append order
    pub appended: Vec<AppendRecord>,

    /// Output size at the end of the append loop
    pub final_size: u64,

    /// Whether the loop stopped because the threshold was crossed
    pub threshold_exceeded: bool,

    /// Whether the output file was deleted afterward
    pub cleared: bool,
}

impl RunReport {
    /// Total number of bytes read from source files.
    #[must_use]
    pub fn appended_bytes(&self) -> u64 {
        self.appended.iter().map(|record| record.input_size).sum()
    }
}

/// Concatenates the smallest files of a directory into one output file.
#[derive(Debug)]
pub struct Concatenator {
    threshold: Threshold,
    quiet: bool,
}

impl Concatenator {
    /// Create a concatenator that stops once the output exceeds `threshold`.
    #[must_use]
    pub const fn new(threshold: Threshold) -> Self {
        Self {
            threshold,
            quiet: false,
        }
    }

    /// Create a concatenator bounded by the block size of the root filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the root block size cannot be queried.
    pub fn from_root_block_size() -> Result<Self> {
        Ok(Self::new(Threshold::root_block_size()?))
    }

    /// Enable or disable quiet mode (suppresses the progress lines).
    #[must_use]
    pub const fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// The threshold this concatenator stops at.
    #[must_use]
    pub const fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Concatenate the files of `source_dir` into `output`.
    ///
    /// The steps are:
    /// 1. Create `output`, or truncate it if it exists
    /// 2. List the regular files of `source_dir` and sort them by size
    /// 3. Append each file in turn, printing a progress line, until the
    ///    output is larger than the threshold
    /// 4. If `clear` is set, delete `output`
    ///
    /// `source_dir` must exist; checking that is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be created, opened, or deleted,
    /// if the directory cannot be listed, or if a source file cannot be read.
    /// The output keeps whatever was appended before the failure.
    pub fn run(&self, output: &Path, source_dir: &Path, clear: bool) -> Result<RunReport> {
        info!(
            output = %output.display(),
            source = %source_dir.display(),
            threshold = self.threshold.bytes,
            "starting concatenation"
        );

        File::create(output)
            .with_context(|| format!("Failed to create output file {}", output.display()))?;

        let mut sources = list_source_files(source_dir)?;
        sort_by_size(&mut sources);
        debug!(count = sources.len(), "listed source files");

        let mut appended = Vec::new();
        let mut final_size = 0;
        let mut threshold_exceeded = false;

        for source in &sources {
            let record = self.append(output, source)?;
            final_size = record.output_size_after;

            if !self.quiet {
                println!(
                    "Added {} {}B, {}: {} -> {}",
                    record.input_path.display(),
                    record.input_size,
                    output.display(),
                    record.output_size_before,
                    record.output_size_after
                );
            }

            appended.push(record);

            if self.threshold.is_exceeded_by(final_size) {
                threshold_exceeded = true;
                info!(size = final_size, "output exceeds threshold, stopping");
                break;
            }
        }

        if clear {
            let size = file_size(output)?;
            if !self.quiet {
                println!("Delete file {} of size {size}...", output.display());
            }
            fs::remove_file(output)
                .with_context(|| format!("Failed to delete output file {}", output.display()))?;
        }

        Ok(RunReport {
            output_path: output.to_path_buf(),
            threshold: self.threshold,
            appended,
            final_size,
            threshold_exceeded,
            cleared: clear,
        })
    }

    /// Append the full contents of `source` to `output` as raw bytes.
    fn append(&self, output: &Path, source: &SourceFile) -> Result<AppendRecord> {
        let input_size = source.current_size()?;
        let output_size_before = file_size(output)?;

        {
            let mut reader = File::open(&source.path)
                .with_context(|| format!("Failed to open {}", source.path.display()))?;
            let mut writer = OpenOptions::new()
                .append(true)
                .open(output)
                .with_context(|| format!("Failed to open output file {}", output.display()))?;

            io::copy(&mut reader, &mut writer).with_context(|| {
                format!(
                    "Failed to append {} to {}",
                    source.path.display(),
                    output.display()
                )
            })?;
        }

        let output_size_after = file_size(output)?;
        debug!(
            input = %source.path.display(),
            input_size,
            output_size_before,
            output_size_after,
            threshold = self.threshold.bytes,
            "appended file"
        );

        Ok(AppendRecord {
            input_path: source.path.clone(),
            input_size,
            output_size_before,
            output_size_after,
        })
    }
}

fn file_size(path: &Path) -> Result<u64> {
    Ok(fs::metadata(path)
        .with_context(|| format!("Failed to read metadata of {}", path.display()))?
        .len())
}
