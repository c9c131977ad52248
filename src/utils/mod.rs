//! Utility functions and helpers.

pub mod size;

pub use size::parse_size;
