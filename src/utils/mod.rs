//! Utility functions

pub mod hashing;
pub mod paths;

pub use hashing::fingerprint;
pub use paths::{normalize_group, strip_yaml_extension};
