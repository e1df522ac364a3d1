//! In-memory registry for tests and embedding

use std::collections::BTreeMap;
use std::sync::Arc;

use super::Registry;
use crate::document::Document;
use crate::domain::{ComposeError, Result};
use crate::utils::{normalize_group, strip_yaml_extension};

#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    bases: BTreeMap<String, Arc<Document>>,
    groups: BTreeMap<String, BTreeMap<String, Arc<Document>>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(mut self, name: &str, yaml: &str) -> Result<Self> {
        let document = Document::parse(&format!("{name}.yaml"), yaml)?;
        self.insert_base(name, document);
        Ok(self)
    }

    pub fn with_variant(mut self, group: &str, name: &str, yaml: &str) -> Result<Self> {
        let document = Document::parse(&format!("{group}/{name}.yaml"), yaml)?;
        self.insert_variant(group, name, document);
        Ok(self)
    }

    pub fn insert_base(&mut self, name: &str, document: Document) {
        self.bases.insert(strip_yaml_extension(name).to_string(), Arc::new(document));
    }

    pub fn insert_variant(&mut self, group: &str, name: &str, document: Document) {
        self.groups
            .entry(normalize_group(group))
            .or_default()
            .insert(strip_yaml_extension(name).to_string(), Arc::new(document));
    }
}

impl Registry for MemoryRegistry {
    fn base(&self, name: &str) -> Result<Arc<Document>> {
        self.bases
            .get(strip_yaml_extension(name))
            .cloned()
            .ok_or_else(|| ComposeError::NotFound { name: name.to_string() })
    }

    fn variant(&self, group: &str, name: &str) -> Result<Arc<Document>> {
        let group = normalize_group(group);
        let variants = self
            .groups
            .get(&group)
            .ok_or_else(|| ComposeError::UnknownGroup { group: group.clone() })?;
        variants.get(strip_yaml_extension(name)).cloned().ok_or_else(|| {
            ComposeError::UnknownVariant {
                group,
                variant: name.to_string(),
                available: variants.keys().cloned().collect(),
            }
        })
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
