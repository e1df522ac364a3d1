//! Tree layering: deep merge and structural replacement

use crate::domain::{KeyPath, Mapping, Node};

/// Merge `overlay` onto `base`. Mappings merge key-by-key; any other
/// combination overwrites.
pub fn deep_merge(base: &mut Node, overlay: Node) {
    match (base, overlay) {
        (Node::Mapping(base_map), Node::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

/// Put `replacement` at `path`, discarding whatever was there. `None`
/// removes the key. Missing or non-mapping parents become mappings.
pub fn replace_at(root: &mut Node, path: &KeyPath, replacement: Option<Node>) {
    let Some((last, parents)) = path.segments().split_last() else {
        if let Some(node) = replacement {
            *root = node;
        }
        return;
    };

    let Some(node) = replacement else {
        remove_at(root, parents, last);
        return;
    };

    let mut current = root;
    for segment in parents {
        if !current.is_mapping() {
            *current = Node::empty_mapping();
        }
        current = match current {
            Node::Mapping(map) => map.entry(segment.clone()).or_insert_with(Node::empty_mapping),
            _ => return,
        };
    }
    if !current.is_mapping() {
        *current = Node::Mapping(Mapping::new());
    }
    if let Node::Mapping(map) = current {
        map.insert(last.clone(), node);
    }
}

fn remove_at(root: &mut Node, parents: &[String], last: &str) {
    let mut current = root;
    for segment in parents {
        current = match current {
            Node::Mapping(map) => match map.get_mut(segment) {
                Some(child) => child,
                None => return,
            },
            _ => return,
        };
    }
    if let Node::Mapping(map) = current {
        map.remove(last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn yaml(text: &str) -> Node {
        Node::from_yaml_str("test", text).expect("yaml")
    }

    #[test]
    fn deep_merge_recurses_into_mappings() {
        let mut base = yaml("trainer:\n  max_epochs: 100\n  min_epochs: 1\ndata:\n  num_workers: 4\n");
        deep_merge(&mut base, yaml("trainer:\n  max_epochs: 5\ndata:\n  num_workers: 16\n"));
        assert_eq!(
            base,
            yaml("trainer:\n  max_epochs: 5\n  min_epochs: 1\ndata:\n  num_workers: 16\n")
        );
    }

    #[test]
    fn deep_merge_overwrites_sequences_and_scalars() {
        let mut base = yaml("tags: [a, b]\nmodel: {width: 4}\n");
        deep_merge(&mut base, yaml("tags: [c]\nmodel: resnet\n"));
        assert_eq!(base, yaml("tags: [c]\nmodel: resnet\n"));
    }

    #[test]
    fn replace_is_structural() {
        let mut base = yaml("data:\n  batch_size: 64\n  num_workers: 4\nseed: 1\n");
        replace_at(&mut base, &KeyPath::parse("data").expect("path"), Some(yaml("dataset: cifar\n")));
        assert_eq!(base, yaml("data:\n  dataset: cifar\nseed: 1\n"));
    }

    #[test]
    fn replace_creates_missing_parents() {
        let mut base = yaml("seed: 1\n");
        replace_at(&mut base, &KeyPath::parse("hparams.search").expect("path"), Some(yaml("n: 3\n")));
        assert_eq!(base, yaml("seed: 1\nhparams:\n  search:\n    n: 3\n"));
    }

    #[test]
    fn replace_with_none_removes_key() {
        let mut base = yaml("logger:\n  csv: {}\nseed: 1\n");
        replace_at(&mut base, &KeyPath::parse("logger").expect("path"), None);
        assert_eq!(base, yaml("seed: 1\n"));

        replace_at(&mut base, &KeyPath::parse("missing.deeper").expect("path"), None);
        assert_eq!(base, yaml("seed: 1\n"));
    }
}
