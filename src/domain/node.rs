//! Configuration tree types
//!
//! [`Node`] is the layering-phase tree and may hold interpolation templates.
//! [`Value`] is its reference-free counterpart produced by resolution.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use super::error::{ComposeError, Result};
use super::path::KeyPath;
use crate::interp::{Parsed, Template};

pub type Mapping<T> = BTreeMap<String, T>;

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x:?}"),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(i) => serializer.serialize_i64(*i),
            Scalar::Float(x) => serializer.serialize_f64(*x),
            Scalar::Str(s) => serializer.serialize_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Mapping(Mapping<Node>),
    Interp(Template),
}

impl Node {
    pub fn empty_mapping() -> Self {
        Node::Mapping(Mapping::new())
    }

    pub fn str(value: impl Into<String>) -> Self {
        Node::Scalar(Scalar::Str(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Node::Scalar(Scalar::Int(value))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Node::Mapping(_))
    }

    /// Parse a YAML snippet into a tree. Strings containing `${...}` become
    /// interpolation templates.
    pub fn from_yaml_str(source_name: &str, text: &str) -> Result<Self> {
        let raw: serde_yaml::Value = serde_yaml::from_str(text).map_err(|source| {
            ComposeError::Parse { source_name: source_name.to_string(), source }
        })?;
        Self::from_yaml(source_name, raw)
    }

    pub fn from_yaml(source_name: &str, value: serde_yaml::Value) -> Result<Self> {
        use serde_yaml::Value as Yaml;

        Ok(match value {
            Yaml::Null => Node::Scalar(Scalar::Null),
            Yaml::Bool(b) => Node::Scalar(Scalar::Bool(b)),
            Yaml::Number(n) => Node::Scalar(number_to_scalar(&n)),
            Yaml::String(s) => match Template::parse(&s)? {
                Parsed::Literal(text) => Node::Scalar(Scalar::Str(text)),
                Parsed::Template(template) => Node::Interp(template),
            },
            Yaml::Sequence(items) => Node::Sequence(
                items.into_iter().map(|item| Self::from_yaml(source_name, item)).collect::<Result<_>>()?,
            ),
            Yaml::Mapping(map) => {
                let mut out = Mapping::new();
                for (key, item) in map {
                    out.insert(mapping_key(source_name, key)?, Self::from_yaml(source_name, item)?);
                }
                Node::Mapping(out)
            }
            Yaml::Tagged(tagged) => Self::from_yaml(source_name, tagged.value)?,
        })
    }
}

fn number_to_scalar(n: &serde_yaml::Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Int(i)
    } else {
        // u64 values above i64::MAX and all non-integers
        Scalar::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn mapping_key(source_name: &str, key: serde_yaml::Value) -> Result<String> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        other => Err(ComposeError::InvalidDocument {
            source_name: source_name.to_string(),
            reason: format!("unsupported mapping key {other:?}"),
        }),
    }
}

/// A fully resolved value. Contains no interpolation templates.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Sequence(Vec<Value>),
    Mapping(Mapping<Value>),
}

impl Value {
    pub fn get(&self, path: &KeyPath) -> Option<&Value> {
        self.get_segments(path.segments())
    }

    pub fn get_segments(&self, segments: &[String]) -> Option<&Value> {
        let mut current = self;
        for segment in segments {
            current = match current {
                Value::Mapping(map) => map.get(segment)?,
                Value::Sequence(items) => items.get(segment.parse::<usize>().ok()?)?,
                Value::Scalar(_) => return None,
            };
        }
        Some(current)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Scalar(Scalar::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Scalar(Scalar::Float(x)) => Some(*x),
            Value::Scalar(Scalar::Int(i)) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping<Value>> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Scalar(scalar) => scalar.serialize(serializer),
            Value::Sequence(items) => items.serialize(serializer),
            Value::Mapping(map) => map.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalars_and_nesting() {
        let node = Node::from_yaml_str(
            "inline",
            "trainer:\n  max_epochs: 10\n  gradient_clip_val: 0.5\ncompile: false\nname: mnist\n",
        )
        .expect("node");
        let Node::Mapping(root) = node else { panic!("expected mapping") };
        assert_eq!(root["compile"], Node::Scalar(Scalar::Bool(false)));
        assert_eq!(root["name"], Node::str("mnist"));
        let Node::Mapping(trainer) = &root["trainer"] else { panic!("expected mapping") };
        assert_eq!(trainer["max_epochs"], Node::int(10));
        assert_eq!(trainer["gradient_clip_val"], Node::Scalar(Scalar::Float(0.5)));
    }

    #[test]
    fn interpolations_become_templates() {
        let node = Node::from_yaml_str("inline", "tags: ${tags}\nplain: \\${escaped}\n").expect("node");
        let Node::Mapping(root) = node else { panic!("expected mapping") };
        assert!(matches!(root["tags"], Node::Interp(_)));
        assert_eq!(root["plain"], Node::str("${escaped}"));
    }

    #[test]
    fn non_string_keys_are_stringified() {
        let node = Node::from_yaml_str("inline", "1: one\ntrue: yes\n").expect("node");
        let Node::Mapping(root) = node else { panic!("expected mapping") };
        assert!(root.contains_key("1"));
        assert!(root.contains_key("true"));
    }

    #[test]
    fn invalid_yaml_reports_source() {
        let err = Node::from_yaml_str("broken.yaml", "a: [1, 2").unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn value_lookup_walks_sequences() {
        let value = Value::Mapping(Mapping::from([(
            "layers".to_string(),
            Value::Sequence(vec![Value::Scalar(Scalar::Int(64)), Value::Scalar(Scalar::Int(128))]),
        )]));
        let path = KeyPath::parse("layers.1").expect("path");
        assert_eq!(value.get(&path).and_then(Value::as_i64), Some(128));
        assert!(value.get(&KeyPath::parse("layers.7").expect("path")).is_none());
    }

    #[test]
    fn floats_render_with_fraction() {
        assert_eq!(Scalar::Float(1.0).to_string(), "1.0");
        assert_eq!(Scalar::Float(0.001).to_string(), "0.001");
    }
}
