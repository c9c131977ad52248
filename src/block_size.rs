//! Filesystem block size discovery.
//!
//! The stopping threshold of a run is the fundamental block size of the
//! filesystem mounted at `/`, not the one hosting the output file. Callers that
//! need a different limit pass an explicit [`Threshold`](crate::Threshold)
//! instead.

use std::path::Path;

use anyhow::Result;

/// Mount point whose block size is used as the default threshold.
pub const ROOT: &str = "/";

/// Query the block size of the filesystem mounted at [`ROOT`].
///
/// # Errors
///
/// Returns an error if the `statvfs` call fails, or on platforms where block
/// size discovery is not supported.
pub fn root_block_size() -> Result<u64> {
    block_size_of(Path::new(ROOT))
}

/// Query the block size (`f_bsize`) of the filesystem containing `path`.
///
/// # Errors
///
/// Returns an error if `statvfs` fails for `path`.
#[cfg(unix)]
#[allow(clippy::useless_conversion)]
pub fn block_size_of(path: &Path) -> Result<u64> {
    use anyhow::Context;
    use nix::sys::statvfs::statvfs;

    let stat = statvfs(path)
        .with_context(|| format!("Failed to query filesystem statistics for {}", path.display()))?;

    Ok(u64::from(stat.block_size()))
}

/// Block size discovery is only implemented through `statvfs`.
///
/// # Errors
///
/// Always returns an error; pass `--threshold` on this platform.
#[cfg(not(unix))]
pub fn block_size_of(path: &Path) -> Result<u64> {
    anyhow::bail!(
        "Cannot determine the block size of {} on this platform; pass --threshold explicitly",
        path.display()
    )
}
