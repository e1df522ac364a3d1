//! Interpolation tokens and their resolution
//!
//! A string value may reference another key of the same tree with
//! `${key.path}`. A string that is exactly one reference takes the target's
//! value (any type); references embedded in surrounding text are rendered as
//! scalars. `\${` produces a literal `${`.

pub mod resolver;

pub use resolver::resolve;

use crate::domain::{ComposeError, KeyPath, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Ref(KeyPath),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

/// Outcome of scanning a raw string.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// No references; escapes already applied.
    Literal(String),
    Template(Template),
}

impl Template {
    pub fn parse(raw: &str) -> Result<Parsed> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = raw;

        while let Some(pos) = rest.find("${") {
            if rest[..pos].ends_with('\\') {
                literal.push_str(&rest[..pos - 1]);
                literal.push_str("${");
                rest = &rest[pos + 2..];
                continue;
            }
            literal.push_str(&rest[..pos]);
            let body = &rest[pos + 2..];
            let Some(end) = body.find('}') else {
                return Err(invalid(raw, "unterminated interpolation"));
            };
            let inner = &body[..end];
            if inner.contains("${") {
                return Err(invalid(raw, "nested interpolation is not supported"));
            }
            if inner.contains(':') {
                return Err(invalid(raw, "resolver calls are not supported"));
            }
            let path = KeyPath::parse(inner).map_err(|_| invalid(raw, "malformed key path"))?;

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Ref(path));
            rest = &body[end + 1..];
        }
        literal.push_str(rest);

        if segments.is_empty() {
            return Ok(Parsed::Literal(literal));
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Parsed::Template(Template { segments }))
    }

    /// The target path when the whole string is a single reference.
    pub fn as_whole_ref(&self) -> Option<&KeyPath> {
        match self.segments.as_slice() {
            [Segment::Ref(path)] => Some(path),
            _ => None,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn references(&self) -> impl Iterator<Item = &KeyPath> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Ref(path) => Some(path),
            Segment::Literal(_) => None,
        })
    }
}

fn invalid(token: &str, reason: &str) -> ComposeError {
    ComposeError::InvalidReference { token: token.to_string(), reason: reason.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(raw: &str) -> Template {
        match Template::parse(raw).expect("parse") {
            Parsed::Template(t) => t,
            Parsed::Literal(l) => panic!("expected template, got literal {l:?}"),
        }
    }

    #[test]
    fn plain_strings_stay_literal() {
        assert_eq!(Template::parse("mnist").expect("parse"), Parsed::Literal("mnist".into()));
        assert_eq!(Template::parse("cost: $5").expect("parse"), Parsed::Literal("cost: $5".into()));
    }

    #[test]
    fn whole_reference_is_detected() {
        let t = template("${tags}");
        assert_eq!(t.as_whole_ref().map(ToString::to_string).as_deref(), Some("tags"));
    }

    #[test]
    fn embedded_references_keep_surrounding_text() {
        let t = template("logs/${experiment_name}/seed_${seed}");
        assert!(t.as_whole_ref().is_none());
        let refs: Vec<String> = t.references().map(ToString::to_string).collect();
        assert_eq!(refs, ["experiment_name", "seed"]);
        assert_eq!(t.segments().len(), 4);
    }

    #[test]
    fn escaped_token_is_literal() {
        assert_eq!(
            Template::parse(r"echo \${HOME}").expect("parse"),
            Parsed::Literal("echo ${HOME}".into())
        );
    }

    #[test]
    fn escape_and_reference_mix() {
        let t = template(r"\${raw}-${seed}");
        assert_eq!(t.segments()[0], Segment::Literal("${raw}-".into()));
    }

    #[test]
    fn malformed_tokens_fail() {
        for raw in ["${unterminated", "${}", "${a.${b}}", "${oc.env:HOME}", "${a..b}"] {
            let err = Template::parse(raw).unwrap_err();
            assert!(matches!(err, ComposeError::InvalidReference { .. }), "{raw} -> {err}");
        }
    }
}
