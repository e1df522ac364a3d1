//! Group selections (`data=mnist`)

use std::fmt;

use crate::domain::{ComposeError, KeyPath, Result};
use crate::utils::{normalize_group, strip_yaml_extension};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Variant(String),
    /// Several variants deep-merged in order into one replacement subtree.
    Merged(Vec<String>),
    /// Drop the group's subtree.
    Remove,
}

/// Selects which variant of a group occupies the group's subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideDirective {
    group: String,
    choice: Choice,
    optional: bool,
}

impl OverrideDirective {
    pub fn new(group: &str, variant: &str) -> Self {
        Self::with_choice(group, Choice::Variant(strip_yaml_extension(variant).to_string()))
    }

    pub fn merged<I, S>(group: &str, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let variants =
            variants.into_iter().map(|v| strip_yaml_extension(v.as_ref()).to_string()).collect();
        Self::with_choice(group, Choice::Merged(variants))
    }

    pub fn remove(group: &str) -> Self {
        Self::with_choice(group, Choice::Remove)
    }

    fn with_choice(group: &str, choice: Choice) -> Self {
        Self { group: normalize_group(group), choice, optional: false }
    }

    /// Missing groups or variants are skipped instead of failing.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Parse `[override ][optional ]/group=choice` where choice is a variant
    /// name, `[a,b]`, or `null`.
    pub fn parse(raw: &str) -> Result<Self> {
        let Some((key, choice)) = raw.split_once('=') else {
            return Err(invalid(raw, "expected 'group=variant'"));
        };
        Self::from_parts(raw, key, parse_choice(choice))
    }

    /// Build a directive from a defaults-list entry `{key: value}`.
    pub(crate) fn from_entry(
        source_name: &str,
        key: &str,
        value: &serde_yaml::Value,
    ) -> Result<Self> {
        use serde_yaml::Value as Yaml;

        let choice = match value {
            Yaml::Null => Choice::Remove,
            Yaml::String(s) => parse_choice(s),
            Yaml::Sequence(items) => {
                let mut variants = Vec::with_capacity(items.len());
                for item in items {
                    let Yaml::String(name) = item else {
                        return Err(invalid(source_name, &format!("variants of '{key}' must be strings")));
                    };
                    variants.push(strip_yaml_extension(name).to_string());
                }
                Choice::Merged(variants)
            }
            _ => return Err(invalid(source_name, &format!("unsupported selection for '{key}'"))),
        };
        Self::from_parts(source_name, key, choice)
    }

    fn from_parts(source_name: &str, key: &str, choice: Choice) -> Result<Self> {
        let mut key = key.trim();
        let mut optional = false;
        loop {
            if let Some(rest) = key.strip_prefix("override ") {
                key = rest.trim_start();
            } else if let Some(rest) = key.strip_prefix("optional ") {
                optional = true;
                key = rest.trim_start();
            } else {
                break;
            }
        }

        let group = normalize_group(key);
        if group.is_empty() {
            return Err(invalid(source_name, "empty group name"));
        }
        KeyPath::from_group(&group)
            .map_err(|_| invalid(source_name, &format!("illegal group name '{group}'")))?;

        match &choice {
            Choice::Variant(name) if name.is_empty() => {
                return Err(invalid(source_name, &format!("empty variant for group '{group}'")))
            }
            Choice::Merged(names) if names.iter().any(String::is_empty) => {
                return Err(invalid(source_name, &format!("empty variant for group '{group}'")))
            }
            _ => {}
        }

        Ok(Self { group, choice, optional })
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn choice(&self) -> &Choice {
        &self.choice
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Key path of the subtree this directive replaces.
    pub fn target(&self) -> Result<KeyPath> {
        KeyPath::from_group(&self.group)
    }
}

impl fmt::Display for OverrideDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            f.write_str("optional ")?;
        }
        match &self.choice {
            Choice::Variant(name) => write!(f, "{}={}", self.group, name),
            Choice::Merged(names) => write!(f, "{}=[{}]", self.group, names.join(",")),
            Choice::Remove => write!(f, "{}=null", self.group),
        }
    }
}

fn parse_choice(raw: &str) -> Choice {
    let raw = raw.trim();
    if raw == "null" || raw == "~" {
        return Choice::Remove;
    }
    if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        return Choice::Merged(
            inner
                .split(',')
                .map(|part| strip_yaml_extension(part).to_string())
                .filter(|part| !part.is_empty())
                .collect(),
        );
    }
    Choice::Variant(strip_yaml_extension(raw).to_string())
}

fn invalid(source_name: &str, reason: &str) -> ComposeError {
    ComposeError::InvalidDocument { source_name: source_name.to_string(), reason: reason.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_selection() {
        let d = OverrideDirective::parse("data=mnist").expect("parse");
        assert_eq!(d.group(), "data");
        assert_eq!(d.choice(), &Choice::Variant("mnist".into()));
        assert!(!d.is_optional());
    }

    #[test]
    fn strips_override_keyword_slash_and_extension() {
        let d = OverrideDirective::parse("override /data=nonexistent.yaml").expect("parse");
        assert_eq!(d, OverrideDirective::new("data", "nonexistent"));
    }

    #[test]
    fn parses_null_and_lists() {
        assert_eq!(
            OverrideDirective::parse("logger=null").expect("parse"),
            OverrideDirective::remove("logger")
        );
        assert_eq!(
            OverrideDirective::parse("callbacks=[early_stopping, model_checkpoint]").expect("parse"),
            OverrideDirective::merged("callbacks", ["early_stopping", "model_checkpoint"])
        );
    }

    #[test]
    fn optional_prefix_is_kept() {
        let d = OverrideDirective::parse("optional local=default").expect("parse");
        assert!(d.is_optional());
        assert_eq!(d.to_string(), "optional local=default");
    }

    #[test]
    fn nested_group_targets_dotted_path() {
        let d = OverrideDirective::new("hparams/search", "optuna");
        assert_eq!(d.target().expect("target").to_string(), "hparams.search");
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(OverrideDirective::parse("data").is_err());
        assert!(OverrideDirective::parse("=mnist").is_err());
        assert!(OverrideDirective::parse("data=").is_err());
        assert!(OverrideDirective::parse("da ta=mnist").is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for raw in ["data=mnist", "callbacks=[a,b]", "logger=null"] {
            assert_eq!(OverrideDirective::parse(raw).expect("parse").to_string(), raw);
        }
    }
}
