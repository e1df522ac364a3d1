//! Core types shared by every stage of composition

pub mod error;
pub mod experiment;
pub mod node;
pub mod path;

pub use error::{ComposeError, Result, Stage};
pub use experiment::{DataLoading, ExperimentConfig, RunSummary, TrainerBounds};
pub use node::{Mapping, Node, Scalar, Value};
pub use path::KeyPath;
