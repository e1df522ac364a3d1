//! Composition errors and the stage they surface in

use std::path::PathBuf;
use thiserror::Error;

/// Lifecycle of a single composition request.
///
/// A request moves `Idle -> Loading -> Layering -> Resolving -> Done`. A
/// failure at any point ends the request with a [`ComposeError`], whose
/// [`ComposeError::stage`] reports where it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Loading,
    Layering,
    Resolving,
    Done,
}

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("base configuration '{name}' not found")]
    NotFound { name: String },

    #[error("unknown configuration group '{group}'")]
    UnknownGroup { group: String },

    #[error("unknown variant '{variant}' in group '{group}' (available: {})", available.join(", "))]
    UnknownVariant { group: String, variant: String, available: Vec<String> },

    #[error("cyclic interpolation: {}", chain.join(" -> "))]
    CyclicReference { chain: Vec<String> },

    #[error("interpolation at '{at}' references missing key '{target}'")]
    UnresolvedReference { at: String, target: String },

    #[error("interpolation at '{at}' embeds non-scalar value of '{target}' in a string")]
    NonScalarInterpolation { at: String, target: String },

    #[error("invalid interpolation '{token}': {reason}")]
    InvalidReference { token: String, reason: String },

    #[error("cyclic defaults in group '{group}': {}", chain.join(" -> "))]
    CyclicDefaults { group: String, chain: Vec<String> },

    #[error("invalid document '{source_name}': {reason}")]
    InvalidDocument { source_name: String, reason: String },

    #[error("failed to parse '{source_name}': {source}")]
    Parse {
        source_name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ComposeError {
    pub fn stage(&self) -> Stage {
        match self {
            ComposeError::NotFound { .. }
            | ComposeError::InvalidReference { .. }
            | ComposeError::InvalidDocument { .. }
            | ComposeError::Parse { .. }
            | ComposeError::Io { .. } => Stage::Loading,
            ComposeError::UnknownGroup { .. }
            | ComposeError::UnknownVariant { .. }
            | ComposeError::CyclicDefaults { .. } => Stage::Layering,
            ComposeError::CyclicReference { .. }
            | ComposeError::UnresolvedReference { .. }
            | ComposeError::NonScalarInterpolation { .. } => Stage::Resolving,
        }
    }
}

pub type Result<T> = std::result::Result<T, ComposeError>;
