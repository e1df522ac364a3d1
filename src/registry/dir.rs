//! Directory-backed registry
//!
//! Layout:
//!
//! ```text
//! configs/
//!   train.yaml            base "train"
//!   data/mnist.yaml       group "data", variant "mnist"
//!   hparams/search/a.yaml group "hparams/search", variant "a"
//! ```
//!
//! The directory is indexed once on open. Each file is parsed on first use
//! and the parsed document is shared from then on.

use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use super::Registry;
use crate::document::Document;
use crate::domain::{ComposeError, Result};
use crate::utils::{normalize_group, strip_yaml_extension};

#[derive(Debug)]
struct Entry {
    path: PathBuf,
    document: OnceCell<Arc<Document>>,
}

impl Entry {
    fn new(path: PathBuf) -> Self {
        Self { path, document: OnceCell::new() }
    }

    fn load(&self) -> Result<Arc<Document>> {
        self.document
            .get_or_try_init(|| {
                tracing::debug!("Loading configuration {}", self.path.display());
                Document::from_path(&self.path).map(Arc::new)
            })
            .cloned()
    }
}

#[derive(Debug)]
pub struct DirRegistry {
    root: PathBuf,
    bases: BTreeMap<String, Entry>,
    groups: BTreeMap<String, BTreeMap<String, Entry>>,
}

impl DirRegistry {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ComposeError::Io {
                path: root,
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "configuration directory does not exist",
                ),
            });
        }

        let mut bases = BTreeMap::new();
        let mut groups: BTreeMap<String, BTreeMap<String, Entry>> = BTreeMap::new();

        let walker = WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name().to_str().unwrap_or("")));

        for entry in walker {
            let entry = entry.map_err(|err| ComposeError::Io {
                path: err.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone()),
                source: err
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
            })?;
            if !entry.file_type().is_file() || !is_yaml(entry.path()) {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&root) else { continue };
            let Some(file_name) = relative.file_name().and_then(|n| n.to_str()) else { continue };
            let name = strip_yaml_extension(file_name).to_string();
            let group = relative
                .parent()
                .map(|p| normalize_group(&p.to_string_lossy()))
                .unwrap_or_default();

            let slot = Entry::new(entry.path().to_path_buf());
            if group.is_empty() {
                bases.insert(name, slot);
            } else {
                groups.entry(group).or_default().insert(name, slot);
            }
        }

        tracing::debug!(
            "Indexed {} base(s) and {} group(s) under {}",
            bases.len(),
            groups.len(),
            root.display()
        );
        Ok(Self { root, bases, groups })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Registry for DirRegistry {
    fn base(&self, name: &str) -> Result<Arc<Document>> {
        self.bases
            .get(strip_yaml_extension(name))
            .ok_or_else(|| ComposeError::NotFound { name: name.to_string() })?
            .load()
    }

    fn variant(&self, group: &str, name: &str) -> Result<Arc<Document>> {
        let group = normalize_group(group);
        let variants = self
            .groups
            .get(&group)
            .ok_or_else(|| ComposeError::UnknownGroup { group: group.clone() })?;
        variants
            .get(strip_yaml_extension(name))
            .ok_or_else(|| ComposeError::UnknownVariant {
                group: group.clone(),
                variant: name.to_string(),
                available: variants.keys().cloned().collect(),
            })?
            .load()
    }

    fn bases(&self) -> Vec<String> {
        self.bases.keys().cloned().collect()
    }

    fn groups(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    fn variants(&self, group: &str) -> Vec<String> {
        self.groups
            .get(&normalize_group(group))
            .map(|variants| variants.keys().cloned().collect())
            .unwrap_or_default()
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref(),
        Some("yaml" | "yml")
    )
}
