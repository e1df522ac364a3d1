//! Group and variant name normalization

pub fn normalize_group(group: &str) -> String {
    // Accept Windows separators and absolute group names (`/data`)
    group.trim().replace('\\', "/").trim_matches('/').to_string()
}

/// `mnist.yaml` and `mnist` name the same variant.
pub fn strip_yaml_extension(name: &str) -> &str {
    let name = name.trim();
    name.strip_suffix(".yaml").or_else(|| name.strip_suffix(".yml")).unwrap_or(name)
}
