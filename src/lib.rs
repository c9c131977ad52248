//! # concatenator
//!
//! Library backing the `concatenator` CLI.
//!
//! The tool takes the regular files of a source directory, orders them from
//! smallest to largest, and appends them one by one to a single output file.
//! It stops as soon as the output grows past the block size of the root
//! filesystem (or an explicit threshold), and can delete the result afterward.
//!
//! ## Modules
//!
//! - [`concatenator`] runs the append loop and produces a [`RunReport`]
//! - [`source`] lists and orders the candidate files
//! - [`block_size`] queries the stopping threshold from the filesystem
//! - [`config`] holds run options and the persistent config file
//! - [`output`] renders a run as JSON for `--json`
//! - [`logging`] wires up `tracing` diagnostics
//! - [`utils`] size parsing helpers

pub mod block_size;
pub mod concatenator;
pub mod config;
pub mod logging;
pub mod output;
pub mod source;
pub mod utils;

pub use concatenator::{AppendRecord, Concatenator, RunReport};
pub use config::{RunOptions, Threshold, ThresholdOrigin};
pub use source::SourceFile;
