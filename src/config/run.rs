//! Resolved options for a single concatenation run.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::block_size::root_block_size;
use crate::utils::parse_size;

/// Where the stopping threshold came from.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdOrigin {
    /// Block size of the filesystem mounted at `/`
    RootBlockSize,

    /// Given explicitly via `--threshold` or the config file
    Override,
}

/// Byte count the output must strictly exceed for the run to stop.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct Threshold {
    /// Limit in bytes
    pub bytes: u64,

    /// How the limit was obtained
    pub origin: ThresholdOrigin,
}

impl Threshold {
    /// An explicit threshold of `bytes`.
    #[must_use]
    pub const fn fixed(bytes: u64) -> Self {
        Self {
            bytes,
            origin: ThresholdOrigin::Override,
        }
    }

    /// Query the block size of the root filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the block size cannot be determined.
    pub fn root_block_size() -> Result<Self> {
        Ok(Self {
            bytes: root_block_size()?,
            origin: ThresholdOrigin::RootBlockSize,
        })
    }

    /// Resolve an optional size string, falling back to the root block size.
    ///
    /// # Errors
    ///
    /// Returns an error if `spec` is not a valid size, or if no override is
    /// given and the root block size cannot be queried.
    pub fn resolve(spec: Option<&str>) -> Result<Self> {
        spec.map_or_else(Self::root_block_size, |s| Ok(Self::fixed(parse_size(s)?)))
    }

    /// Whether an output of `size` bytes is past the threshold.
    #[must_use]
    pub const fn is_exceeded_by(&self, size: u64) -> bool {
        size > self.bytes
    }
}

/// Everything the binary needs to perform one run.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// File the sources are concatenated into
    pub output_path: PathBuf,

    /// Directory the sources are taken from
    pub source_dir: PathBuf,

    /// Delete the output file once the run completes
    pub clear: bool,

    /// Threshold override as a size string; `None` uses the root block size
    pub threshold: Option<String>,

    /// Print a JSON report instead of progress lines
    pub json: bool,
}
