//! Layered configuration composition
//!
//! A request runs in two phases. Layering builds one merged [`Node`] tree:
//! the base document, then each group selection replacing its subtree, then
//! the inline overrides deep-merged on top. Resolution then substitutes every
//! interpolation against that finished tree.

pub mod assign;
pub mod directive;
pub mod merge;
pub mod sweep;

pub use assign::{assignments_to_node, Assignment};
pub use directive::{Choice, OverrideDirective};
pub use merge::{deep_merge, replace_at};
pub use sweep::{Sweep, SweepJob};

use tracing::debug;

use crate::document::{DefaultsEntry, Document};
use crate::domain::{ComposeError, ExperimentConfig, Node, Result, Stage};
use crate::interp;
use crate::registry::Registry;

pub struct Composer<R> {
    registry: R,
}

impl<R: Registry> Composer<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Compose `base_name`, then apply `overrides` in order, then merge
    /// `inline`, then resolve interpolations.
    pub fn compose(
        &self,
        base_name: &str,
        overrides: &[OverrideDirective],
        inline: &Node,
    ) -> Result<ExperimentConfig> {
        let result = self.run(base_name, overrides, inline);
        if let Err(err) = &result {
            debug!(stage = ?err.stage(), "Composition of '{}' failed: {}", base_name, err);
        }
        result
    }

    /// Compose with a document's defaults as directives and its body as
    /// the inline map. `extra_overrides` follow the document's directives;
    /// `extra_inline` is merged after the document body.
    pub fn compose_document(
        &self,
        base_name: &str,
        document: &Document,
        extra_overrides: &[OverrideDirective],
        extra_inline: Option<&Node>,
    ) -> Result<ExperimentConfig> {
        let mut overrides = Vec::with_capacity(document.defaults.len() + extra_overrides.len());
        for entry in &document.defaults {
            match entry {
                DefaultsEntry::Directive(directive) => overrides.push(directive.clone()),
                DefaultsEntry::SelfMarker => {}
                DefaultsEntry::Include(name) => {
                    return Err(ComposeError::InvalidDocument {
                        source_name: name.clone(),
                        reason: "bare defaults entries are only valid inside group variants"
                            .to_string(),
                    })
                }
            }
        }
        overrides.extend_from_slice(extra_overrides);

        let mut inline = document.body.clone();
        if let Some(extra) = extra_inline {
            deep_merge(&mut inline, extra.clone());
        }
        self.compose(base_name, &overrides, &inline)
    }

    fn run(
        &self,
        base_name: &str,
        overrides: &[OverrideDirective],
        inline: &Node,
    ) -> Result<ExperimentConfig> {
        transition(Stage::Idle, Stage::Loading, base_name);
        let mut tree = self.load_base(base_name)?;

        transition(Stage::Loading, Stage::Layering, base_name);
        for directive in overrides {
            self.apply_directive(&mut tree, directive)?;
        }
        deep_merge(&mut tree, inline.clone());

        transition(Stage::Layering, Stage::Resolving, base_name);
        let resolved = interp::resolve(&tree)?;

        transition(Stage::Resolving, Stage::Done, base_name);
        Ok(ExperimentConfig::new(resolved))
    }

    /// The base tree is its own defaults applied to an empty tree, with the
    /// base body merged on top.
    fn load_base(&self, name: &str) -> Result<Node> {
        let document = self.registry.base(name)?;
        let mut tree = Node::empty_mapping();
        for entry in &document.defaults {
            match entry {
                DefaultsEntry::Directive(directive) => self.apply_directive(&mut tree, directive)?,
                DefaultsEntry::SelfMarker => {}
                DefaultsEntry::Include(include) => {
                    return Err(ComposeError::InvalidDocument {
                        source_name: format!("{name}.yaml"),
                        reason: format!(
                            "bare defaults entry '{include}' is only valid inside group variants"
                        ),
                    })
                }
            }
        }
        deep_merge(&mut tree, document.body.clone());
        Ok(tree)
    }

    fn apply_directive(&self, tree: &mut Node, directive: &OverrideDirective) -> Result<()> {
        let target = directive.target()?;
        let replacement = match directive.choice() {
            Choice::Remove => None,
            Choice::Variant(name) => self.load_selection(directive, &[name.clone()])?,
            Choice::Merged(names) => self.load_selection(directive, names)?,
        };

        match (&replacement, directive.choice()) {
            (None, Choice::Remove) => debug!("Removed group '{}'", directive.group()),
            (None, _) => {
                debug!("Skipped optional group selection {}", directive);
                return Ok(());
            }
            (Some(_), _) => debug!("Applied {}", directive),
        }
        replace_at(tree, &target, replacement);
        Ok(())
    }

    /// `Ok(None)` only for optional directives whose group is missing or
    /// none of whose variants exist. Missing names of an optional selection
    /// are dropped; failures inside a listed variant always propagate.
    fn load_selection(
        &self,
        directive: &OverrideDirective,
        names: &[String],
    ) -> Result<Option<Node>> {
        let names: Vec<&String> = if directive.is_optional() {
            let available = self.registry.variants(directive.group());
            let present: Vec<&String> = names
                .iter()
                .filter(|name| {
                    let listed = available.contains(*name);
                    if !listed {
                        debug!("Optional variant '{}' of '{}' is missing", name, directive.group());
                    }
                    listed
                })
                .collect();
            if present.is_empty() {
                return Ok(None);
            }
            present
        } else {
            names.iter().collect()
        };

        let mut merged = Node::empty_mapping();
        for name in names {
            let mut stack = Vec::new();
            let node = self.load_variant(directive.group(), name, &mut stack)?;
            deep_merge(&mut merged, node);
        }
        Ok(Some(merged))
    }

    /// A variant is its sibling includes merged in order, then its body.
    fn load_variant(&self, group: &str, name: &str, stack: &mut Vec<String>) -> Result<Node> {
        if stack.iter().any(|seen| seen == name) {
            let mut chain = stack.clone();
            chain.push(name.to_string());
            return Err(ComposeError::CyclicDefaults { group: group.to_string(), chain });
        }
        stack.push(name.to_string());

        let document = self.registry.variant(group, name)?;
        let mut node = Node::empty_mapping();
        for entry in &document.defaults {
            match entry {
                DefaultsEntry::Include(sibling) => {
                    let included = self.load_variant(group, sibling, stack)?;
                    deep_merge(&mut node, included);
                }
                DefaultsEntry::SelfMarker => {}
                DefaultsEntry::Directive(directive) => {
                    return Err(ComposeError::InvalidDocument {
                        source_name: format!("{group}/{name}.yaml"),
                        reason: format!(
                            "group selection '{directive}' is not allowed inside a variant"
                        ),
                    })
                }
            }
        }
        deep_merge(&mut node, document.body.clone());

        stack.pop();
        Ok(node)
    }
}

fn transition(from: Stage, to: Stage, base_name: &str) {
    debug!(?from, ?to, "Composing '{}'", base_name);
}
