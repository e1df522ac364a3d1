//! expcompose: layered configuration composition for experiment runners
//!
//! A base configuration tree is combined with group selections (`data=mnist`,
//! `trainer=default`) and inline overrides, and `${key.path}` references are
//! resolved against the merged result. The output is an immutable
//! [`ExperimentConfig`].
//!
//! ```
//! use expcompose::{Composer, MemoryRegistry, Node, OverrideDirective};
//!
//! let registry = MemoryRegistry::new()
//!     .with_base("train", "trainer:\n  max_epochs: 100\n")?
//!     .with_variant("data", "mnist", "num_workers: 4\n")?;
//! let composer = Composer::new(registry);
//!
//! let inline = Node::from_yaml_str("inline", "trainer:\n  max_epochs: 5\nrun: ${data.num_workers}\n")?;
//! let config = composer.compose("train", &[OverrideDirective::new("data", "mnist")], &inline)?;
//!
//! assert_eq!(config.get_i64("trainer.max_epochs"), Some(5));
//! assert_eq!(config.get_i64("run"), Some(4));
//! # Ok::<(), expcompose::ComposeError>(())
//! ```

pub mod compose;
pub mod config;
pub mod document;
pub mod domain;
pub mod interp;
pub mod registry;
pub mod utils;

pub use compose::{Assignment, Choice, Composer, OverrideDirective, Sweep, SweepJob};
pub use document::{DefaultsEntry, Document};
pub use domain::{
    ComposeError, ExperimentConfig, KeyPath, Node, Result, RunSummary, Scalar, Stage, Value,
};
pub use registry::{DirRegistry, MemoryRegistry, Registry};
