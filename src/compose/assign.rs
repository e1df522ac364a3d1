//! `key.path=value` assignments applied as inline overrides

use crate::domain::{ComposeError, KeyPath, Mapping, Node, Result, Scalar};

use super::merge::{deep_merge, replace_at};

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub path: KeyPath,
    pub value: Node,
}

impl Assignment {
    /// Values are read as YAML scalars or flow collections, so `16` is an
    /// integer, `true` a boolean and `[a, b]` a sequence. An empty value is
    /// the empty string.
    pub fn parse(raw: &str) -> Result<Self> {
        let Some((key, value)) = raw.split_once('=') else {
            return Err(ComposeError::InvalidDocument {
                source_name: raw.to_string(),
                reason: "expected 'key.path=value'".to_string(),
            });
        };
        let path = KeyPath::parse(key)?;
        let value = if value.trim().is_empty() {
            Node::Scalar(Scalar::Str(String::new()))
        } else {
            Node::from_yaml_str(raw, value)?
        };
        Ok(Self { path, value })
    }
}

/// Fold assignments into one inline override tree; later ones win.
pub fn assignments_to_node(assignments: &[Assignment]) -> Node {
    let mut root = Node::Mapping(Mapping::new());
    for assignment in assignments {
        let mut layer = Node::empty_mapping();
        replace_at(&mut layer, &assignment.path, Some(assignment.value.clone()));
        deep_merge(&mut root, layer);
    }
    root
}
