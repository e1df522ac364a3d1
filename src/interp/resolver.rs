//! Second phase of composition: substitute every interpolation against the
//! fully merged tree.

use std::collections::HashMap;

use super::{Segment, Template};
use crate::domain::{ComposeError, KeyPath, Mapping, Node, Result, Scalar, Value};

/// Resolve all interpolations in `root`, following chains transitively.
pub fn resolve(root: &Node) -> Result<Value> {
    let mut resolver = Resolver { root, memo: HashMap::new(), visiting: Vec::new() };
    resolver.resolve_subtree(root, &KeyPath::root())
}

struct Resolver<'a> {
    root: &'a Node,
    memo: HashMap<KeyPath, Value>,
    // paths of interpolations currently being evaluated, outermost first
    visiting: Vec<KeyPath>,
}

impl<'a> Resolver<'a> {
    fn resolve_subtree(&mut self, node: &'a Node, at: &KeyPath) -> Result<Value> {
        match node {
            Node::Scalar(scalar) => Ok(Value::Scalar(scalar.clone())),
            Node::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| self.resolve_subtree(item, &at.child(index.to_string())))
                .collect::<Result<Vec<_>>>()
                .map(Value::Sequence),
            Node::Mapping(map) => {
                let mut out = Mapping::new();
                for (key, item) in map {
                    out.insert(key.clone(), self.resolve_subtree(item, &at.child(key.as_str()))?);
                }
                Ok(Value::Mapping(out))
            }
            Node::Interp(template) => self.resolve_interp(template, at),
        }
    }

    fn resolve_interp(&mut self, template: &'a Template, at: &KeyPath) -> Result<Value> {
        if let Some(value) = self.memo.get(at) {
            return Ok(value.clone());
        }
        if let Some(start) = self.visiting.iter().position(|path| path == at) {
            let mut chain: Vec<String> =
                self.visiting[start..].iter().map(ToString::to_string).collect();
            chain.push(at.to_string());
            return Err(ComposeError::CyclicReference { chain });
        }

        self.visiting.push(at.clone());
        let result = self.evaluate(template, at);
        self.visiting.pop();

        let value = result?;
        self.memo.insert(at.clone(), value.clone());
        Ok(value)
    }

    fn evaluate(&mut self, template: &'a Template, at: &KeyPath) -> Result<Value> {
        if let Some(target) = template.as_whole_ref() {
            return self.lookup(target, at);
        }

        let mut rendered = String::new();
        for segment in template.segments() {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Ref(target) => match self.lookup(target, at)? {
                    Value::Scalar(scalar) => rendered.push_str(&scalar.to_string()),
                    Value::Sequence(_) | Value::Mapping(_) => {
                        return Err(ComposeError::NonScalarInterpolation {
                            at: at.to_string(),
                            target: target.to_string(),
                        })
                    }
                },
            }
        }
        Ok(Value::Scalar(Scalar::Str(rendered)))
    }

    fn lookup(&mut self, target: &KeyPath, at: &KeyPath) -> Result<Value> {
        let missing = || ComposeError::UnresolvedReference {
            at: at.to_string(),
            target: target.to_string(),
        };

        let mut node: &'a Node = self.root;
        let mut walked = KeyPath::root();
        for (depth, segment) in target.segments().iter().enumerate() {
            if let Node::Interp(template) = node {
                // An intermediate key is itself a reference: resolve it, then
                // continue the walk inside the resolved value.
                let resolved = self.resolve_interp(template, &walked)?;
                return resolved
                    .get_segments(&target.segments()[depth..])
                    .cloned()
                    .ok_or_else(missing);
            }
            node = child(node, segment).ok_or_else(missing)?;
            walked = walked.child(segment.as_str());
        }
        self.resolve_subtree(node, &walked)
    }
}

fn child<'n>(node: &'n Node, segment: &str) -> Option<&'n Node> {
    match node {
        Node::Mapping(map) => map.get(segment),
        Node::Sequence(items) => items.get(segment.parse::<usize>().ok()?),
        Node::Scalar(_) | Node::Interp(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_yaml(text: &str) -> Result<Value> {
        resolve(&Node::from_yaml_str("test", text).expect("yaml"))
    }

    fn get<'v>(value: &'v Value, path: &str) -> &'v Value {
        value.get(&KeyPath::parse(path).expect("path")).expect("present")
    }

    #[test]
    fn whole_reference_copies_structure() {
        let value = resolve_yaml(
            "tags:\n  mnist: batch_size_exp\nlogger:\n  mlflow:\n    tags: ${tags}\n",
        )
        .expect("resolve");
        assert_eq!(get(&value, "logger.mlflow.tags"), get(&value, "tags"));
        assert_eq!(get(&value, "logger.mlflow.tags.mnist").as_str(), Some("batch_size_exp"));
    }

    #[test]
    fn whole_reference_preserves_type() {
        let value = resolve_yaml("seed: 12345\ncopy: ${seed}\n").expect("resolve");
        assert_eq!(get(&value, "copy").as_i64(), Some(12345));
    }

    #[test]
    fn embedded_reference_renders_string() {
        let value = resolve_yaml("name: mnist\nseed: 7\nrun: ${name}_${seed}\n").expect("resolve");
        assert_eq!(get(&value, "run").as_str(), Some("mnist_7"));
    }

    #[test]
    fn chains_are_followed_transitively() {
        let value = resolve_yaml("a: ${b}\nb: ${c}\nc: 3\n").expect("resolve");
        assert_eq!(get(&value, "a").as_i64(), Some(3));
    }

    #[test]
    fn walks_through_intermediate_reference() {
        let value = resolve_yaml("paths:\n  root: /data\nalias: ${paths}\nleaf: ${alias.root}\n")
            .expect("resolve");
        assert_eq!(get(&value, "leaf").as_str(), Some("/data"));
    }

    #[test]
    fn reference_into_sequence() {
        let value = resolve_yaml("dims: [32, 64]\nhidden: ${dims.1}\n").expect("resolve");
        assert_eq!(get(&value, "hidden").as_i64(), Some(64));
    }

    #[test]
    fn two_node_cycle_fails() {
        let err = resolve_yaml("a: ${b}\nb: ${a}\n").unwrap_err();
        match err {
            ComposeError::CyclicReference { chain } => assert_eq!(chain, ["a", "b", "a"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn self_reference_through_parent_fails() {
        let err = resolve_yaml("model:\n  width: 4\n  copy: ${model}\n").unwrap_err();
        assert!(matches!(err, ComposeError::CyclicReference { .. }));
    }

    #[test]
    fn missing_target_fails() {
        let err = resolve_yaml("logger:\n  tags: ${tags}\n").unwrap_err();
        match err {
            ComposeError::UnresolvedReference { at, target } => {
                assert_eq!(at, "logger.tags");
                assert_eq!(target, "tags");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn mapping_cannot_be_embedded_in_text() {
        let err = resolve_yaml("tags:\n  a: b\nlabel: run-${tags}\n").unwrap_err();
        assert!(matches!(err, ComposeError::NonScalarInterpolation { .. }));
    }

    #[test]
    fn long_chain_resolves_without_recomputation() {
        let mut text = String::from("k0: done\n");
        for i in 1..200 {
            text.push_str(&format!("k{i}: ${{k{}}}\n", i - 1));
        }
        let value = resolve_yaml(&text).expect("resolve");
        assert_eq!(get(&value, "k199").as_str(), Some("done"));
    }
}
