//! Dotted key paths into a configuration tree

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use super::error::{ComposeError, Result};

static SEGMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^.\s${}:\[\]]+$").expect("valid key segment regex"));

/// A path such as `logger.mlflow.tags`. Numeric segments index sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid(raw, "empty key path"));
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('.') {
            if segment.is_empty() {
                return Err(invalid(raw, "empty path segment"));
            }
            if !SEGMENT_RE.is_match(segment) {
                return Err(invalid(raw, &format!("illegal characters in segment '{segment}'")));
            }
            segments.push(segment.to_string());
        }
        Ok(Self(segments))
    }

    /// Group names use `/` as separator (`hparams/search`); they address the
    /// same subtree as the dotted form.
    pub fn from_group(group: &str) -> Result<Self> {
        Self::parse(&group.trim_matches('/').replace('/', "."))
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("<root>");
        }
        f.write_str(&self.0.join("."))
    }
}

fn invalid(token: &str, reason: &str) -> ComposeError {
    ComposeError::InvalidReference { token: token.to_string(), reason: reason.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_paths() {
        let path = KeyPath::parse("logger.mlflow.tags").expect("path");
        assert_eq!(path.segments(), ["logger", "mlflow", "tags"]);
        assert_eq!(path.to_string(), "logger.mlflow.tags");
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(KeyPath::parse("a..b").is_err());
        assert!(KeyPath::parse("").is_err());
        assert!(KeyPath::parse("a.b.").is_err());
    }

    #[test]
    fn rejects_resolver_syntax() {
        let err = KeyPath::parse("oc.env:HOME").unwrap_err();
        assert!(matches!(err, ComposeError::InvalidReference { .. }));
    }

    #[test]
    fn group_paths_map_to_dotted_paths() {
        let path = KeyPath::from_group("/hparams/search").expect("group");
        assert_eq!(path.to_string(), "hparams.search");
    }

    #[test]
    fn root_displays_placeholder() {
        assert!(KeyPath::root().is_root());
        assert_eq!(KeyPath::root().to_string(), "<root>");
    }
}
