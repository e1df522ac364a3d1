//! Configuration documents: a `defaults` list followed by inline keys
//!
//! ```yaml
//! defaults:
//!   - override /data: mnist
//!   - override /trainer: default
//!   - _self_
//!
//! tags:
//!   mnist: "batch_size_exp"
//! trainer:
//!   max_epochs: 10
//! ```

use std::fs;
use std::path::Path;

use crate::compose::OverrideDirective;
use crate::domain::{ComposeError, Node, Result};
use crate::utils::strip_yaml_extension;

const DEFAULTS_KEY: &str = "defaults";
const SELF_MARKER: &str = "_self_";

#[derive(Debug, Clone, PartialEq)]
pub enum DefaultsEntry {
    /// `_self_`; the document body is always applied after its defaults.
    SelfMarker,
    /// Bare name: a sibling variant of the same group.
    Include(String),
    Directive(OverrideDirective),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub defaults: Vec<DefaultsEntry>,
    /// Every top-level key except `defaults`. Always a mapping.
    pub body: Node,
}

impl Default for Document {
    fn default() -> Self {
        Self { defaults: Vec::new(), body: Node::empty_mapping() }
    }
}

impl Document {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|source| ComposeError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&path.display().to_string(), &text)
    }

    pub fn parse(source_name: &str, text: &str) -> Result<Self> {
        use serde_yaml::Value as Yaml;

        let raw: Yaml = serde_yaml::from_str(text).map_err(|source| ComposeError::Parse {
            source_name: source_name.to_string(),
            source,
        })?;

        let mut map = match raw {
            Yaml::Null => return Ok(Self::default()),
            Yaml::Mapping(map) => map,
            _ => return Err(invalid(source_name, "top level must be a mapping")),
        };

        let defaults = match map.remove(DEFAULTS_KEY) {
            None | Some(Yaml::Null) => Vec::new(),
            Some(Yaml::Sequence(entries)) => entries
                .iter()
                .map(|entry| parse_entry(source_name, entry))
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(invalid(source_name, "'defaults' must be a list")),
        };

        let body = Node::from_yaml(source_name, Yaml::Mapping(map))?;
        Ok(Self { defaults, body })
    }

    pub fn directives(&self) -> impl Iterator<Item = &OverrideDirective> {
        self.defaults.iter().filter_map(|entry| match entry {
            DefaultsEntry::Directive(directive) => Some(directive),
            _ => None,
        })
    }
}

fn parse_entry(source_name: &str, entry: &serde_yaml::Value) -> Result<DefaultsEntry> {
    use serde_yaml::Value as Yaml;

    match entry {
        Yaml::String(name) if name.trim() == SELF_MARKER => Ok(DefaultsEntry::SelfMarker),
        Yaml::String(name) => {
            let name = strip_yaml_extension(name);
            if name.is_empty() {
                return Err(invalid(source_name, "empty defaults entry"));
            }
            Ok(DefaultsEntry::Include(name.to_string()))
        }
        Yaml::Mapping(map) if map.len() == 1 => {
            let Some((key, value)) = map.iter().next() else {
                return Err(invalid(source_name, "empty defaults entry"));
            };
            let Yaml::String(key) = key else {
                return Err(invalid(source_name, "defaults keys must be group names"));
            };
            OverrideDirective::from_entry(source_name, key, value).map(DefaultsEntry::Directive)
        }
        _ => Err(invalid(source_name, "defaults entries must be '_self_', a name, or '{group: variant}'")),
    }
}

fn invalid(source_name: &str, reason: &str) -> ComposeError {
    ComposeError::InvalidDocument { source_name: source_name.to_string(), reason: reason.to_string() }
}
