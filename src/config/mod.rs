//! Configuration for concatenation runs.
//!
//! [`RunOptions`] and [`Threshold`] describe a single resolved run, while
//! [`FileConfig`] maps the persistent TOML config file.

pub mod file;
pub mod run;

pub use file::FileConfig;
pub use run::{RunOptions, Threshold, ThresholdOrigin};
