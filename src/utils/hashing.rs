//! Stable hashing for resolved configurations

use sha2::{Digest, Sha256};

use crate::domain::Value;

/// First 16 hex chars of SHA-256 over the canonical JSON form.
///
/// Mappings are ordered, so equal trees always hash equally.
pub fn fingerprint(value: &Value) -> String {
    let canonical = serde_json::to_string(value).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Mapping, Scalar};

    fn mapping(pairs: &[(&str, i64)]) -> Value {
        Value::Mapping(
            pairs.iter().map(|(k, v)| (k.to_string(), Value::Scalar(Scalar::Int(*v)))).collect::<Mapping<_>>(),
        )
    }

    #[test]
    fn fingerprint_ignores_insertion_order() {
        let a = mapping(&[("epochs", 5), ("workers", 4)]);
        let b = mapping(&[("workers", 4), ("epochs", 5)]);
        assert_eq!(fingerprint(&a), fingerprint(&b));
        assert_eq!(fingerprint(&a).len(), 16);
    }

    #[test]
    fn fingerprint_changes_with_content() {
        assert_ne!(fingerprint(&mapping(&[("epochs", 5)])), fingerprint(&mapping(&[("epochs", 6)])));
    }
}
