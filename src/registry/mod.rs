//! Named configuration sources
//!
//! The composer never touches the filesystem directly; it asks a
//! [`Registry`] for base documents and group variants by name.

pub mod dir;
pub mod memory;

pub use dir::DirRegistry;
pub use memory::MemoryRegistry;

use std::sync::Arc;

use crate::document::Document;
use crate::domain::Result;

pub trait Registry: Send + Sync {
    /// Fails with `NotFound` for unknown names.
    fn base(&self, name: &str) -> Result<Arc<Document>>;

    /// Fails with `UnknownGroup` or `UnknownVariant`.
    fn variant(&self, group: &str, name: &str) -> Result<Arc<Document>>;

    fn bases(&self) -> Vec<String>;

    fn groups(&self) -> Vec<String>;

    fn variants(&self, group: &str) -> Vec<String>;
}

impl<R: Registry + ?Sized> Registry for Arc<R> {
    fn base(&self, name: &str) -> Result<Arc<Document>> {
        (**self).base(name)
    }

    fn variant(&self, group: &str, name: &str) -> Result<Arc<Document>> {
        (**self).variant(group, name)
    }

    fn bases(&self) -> Vec<String> {
        (**self).bases()
    }

    fn groups(&self) -> Vec<String> {
        (**self).groups()
    }

    fn variants(&self, group: &str) -> Vec<String> {
        (**self).variants(group)
    }
}
