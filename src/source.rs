//! Source directory listing.
//!
//! Candidate files are the regular files found directly inside the source
//! directory. Symlinks are classified by their target, so a link to a regular
//! file is a candidate while a link to a directory is not.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::debug;
use walkdir::WalkDir;

/// A regular file that may be appended to the output.
///
/// `size` is the byte size observed when the directory was listed. It is the
/// sort key; the size reported for an append is queried again with
/// [`SourceFile::current_size`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// Source directory joined with the entry name
    pub path: PathBuf,

    /// Size in bytes at listing time
    pub size: u64,
}

impl SourceFile {
    /// Query the file's size from the filesystem right now.
    ///
    /// # Errors
    ///
    /// Returns an error if the file vanished or its metadata is unreadable.
    pub fn current_size(&self) -> Result<u64> {
        let metadata = fs::metadata(&self.path)
            .with_context(|| format!("Failed to read metadata of {}", self.path.display()))?;

        Ok(metadata.len())
    }
}

/// List the regular files directly inside `dir`, in directory order.
///
/// Subdirectories, symlinks to directories, special files and dangling
/// symlinks are skipped.
///
/// # Errors
///
/// Returns an error if `dir` itself cannot be read.
pub fn list_source_files(dir: &Path) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = match entry {
            Ok(entry) => entry,
            // Loops and dangling links surface as per-entry errors below the root
            Err(err) if err.depth() > 0 => {
                debug!(error = %err, "skipping unreadable entry");
                continue;
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to list directory {}", dir.display()));
            }
        };

        if !entry.file_type().is_file() {
            debug!(path = %entry.path().display(), "skipping non-regular entry");
            continue;
        }

        let size = entry
            .metadata()
            .with_context(|| format!("Failed to read metadata of {}", entry.path().display()))?
            .len();

        files.push(SourceFile {
            path: dir.join(entry.file_name()),
            size,
        });
    }

    Ok(files)
}

/// Sort files ascending by their listing-time size.
///
/// The sort is stable: files of equal size keep their directory order.
pub fn sort_by_size(files: &mut [SourceFile]) {
    files.sort_by_key(|file| file.size);
}
