//! The frozen result of a composition

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::node::Value;
use super::path::KeyPath;
use crate::utils::fingerprint;

/// A fully resolved configuration. Read-only once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    root: Value,
}

impl ExperimentConfig {
    pub(crate) fn new(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Look up a dotted path. Malformed paths yield `None`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let path = KeyPath::parse(path).ok()?;
        self.root.get(&path)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    /// Deserialize the whole tree into a typed structure.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::to_value(&self.root)?)
    }

    /// Deserialize the subtree at `path`, or `None` when the path is absent.
    pub fn extract_at<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, serde_json::Error> {
        match self.get(path) {
            Some(value) => serde_json::from_value(serde_json::to_value(value)?).map(Some),
            None => Ok(None),
        }
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.root)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.root)
    }

    /// Stable short identifier of the resolved content.
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.root)
    }
}

/// The keys a training driver reads from a resolved experiment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSummary {
    pub experiment_name: Option<String>,
    pub seed: Option<i64>,
    pub compile: Option<bool>,
    pub tags: Option<serde_json::Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub trainer: TrainerBounds,
    #[serde(deserialize_with = "null_as_default")]
    pub data: DataLoading,
    #[serde(skip_deserializing)]
    pub loggers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerBounds {
    pub min_epochs: Option<u64>,
    pub max_epochs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataLoading {
    pub batch_size: Option<u64>,
    pub num_workers: Option<u64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl RunSummary {
    pub fn from_config(config: &ExperimentConfig) -> Result<Self, serde_json::Error> {
        let mut summary: RunSummary = config.extract()?;
        summary.loggers = config
            .get("logger")
            .and_then(Value::as_mapping)
            .map(|loggers| loggers.keys().cloned().collect())
            .unwrap_or_default();
        Ok(summary)
    }

    /// Tags flattened to `key=value` (mapping) or `value` (sequence) labels.
    pub fn tag_labels(&self) -> Vec<String> {
        use serde_json::Value as Json;

        fn label(value: &Json) -> String {
            match value {
                Json::String(s) => s.clone(),
                other => other.to_string(),
            }
        }

        match &self.tags {
            Some(Json::Object(map)) => {
                let sorted: BTreeMap<_, _> = map.iter().collect();
                sorted.into_iter().map(|(k, v)| format!("{k}={}", label(v))).collect()
            }
            Some(Json::Array(items)) => items.iter().map(label).collect(),
            Some(Json::Null) | None => Vec::new(),
            Some(other) => vec![label(other)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Node;
    use crate::interp::resolve;

    fn config(text: &str) -> ExperimentConfig {
        let node = Node::from_yaml_str("test", text).expect("yaml");
        ExperimentConfig::new(resolve(&node).expect("resolve"))
    }

    #[test]
    fn typed_getters() {
        let cfg = config("trainer:\n  max_epochs: 5\n  lr: 0.01\ncompile: true\nname: mnist\n");
        assert_eq!(cfg.get_i64("trainer.max_epochs"), Some(5));
        assert_eq!(cfg.get_f64("trainer.lr"), Some(0.01));
        assert_eq!(cfg.get_f64("trainer.max_epochs"), Some(5.0));
        assert_eq!(cfg.get_bool("compile"), Some(true));
        assert_eq!(cfg.get_str("name"), Some("mnist"));
        assert_eq!(cfg.get_str("trainer..lr"), None);
    }

    #[test]
    fn extract_subtree() {
        #[derive(Deserialize)]
        struct Trainer {
            min_epochs: u32,
            max_epochs: u32,
        }
        let cfg = config("trainer:\n  min_epochs: 1\n  max_epochs: 10\n  accelerator: cpu\n");
        let trainer: Trainer = cfg.extract_at("trainer").expect("extract").expect("present");
        assert_eq!((trainer.min_epochs, trainer.max_epochs), (1, 10));
        let missing: Option<Trainer> = cfg.extract_at("model").expect("extract");
        assert!(missing.is_none());
    }

    #[test]
    fn summary_reads_driver_keys() {
        let cfg = config(
            "experiment_name: mnist_bs\nseed: 12345\ncompile: false\n\
             tags:\n  mnist: batch_size_exp\n\
             trainer:\n  min_epochs: 1\n  max_epochs: 5\n\
             data:\n  batch_size: 64\n  num_workers: 16\n\
             logger:\n  mlflow:\n    tags: ${tags}\n  csv:\n    save_dir: logs\n",
        );
        let summary = RunSummary::from_config(&cfg).expect("summary");
        assert_eq!(summary.experiment_name.as_deref(), Some("mnist_bs"));
        assert_eq!(summary.seed, Some(12345));
        assert_eq!(summary.compile, Some(false));
        assert_eq!(summary.trainer, TrainerBounds { min_epochs: Some(1), max_epochs: Some(5) });
        assert_eq!(summary.data.num_workers, Some(16));
        assert_eq!(summary.loggers, ["csv", "mlflow"]);
        assert_eq!(summary.tag_labels(), ["mnist=batch_size_exp"]);
    }

    #[test]
    fn summary_tolerates_missing_keys() {
        let summary = RunSummary::from_config(&config("model:\n  width: 4\n")).expect("summary");
        assert_eq!(summary, RunSummary::default());
    }

    #[test]
    fn summary_treats_null_sections_as_missing() {
        let summary =
            RunSummary::from_config(&config("trainer: null\ndata: null\nseed: 3\n")).expect("summary");
        assert_eq!(summary.trainer, TrainerBounds::default());
        assert_eq!(summary.data, DataLoading::default());
        assert_eq!(summary.seed, Some(3));
    }

    #[test]
    fn sequence_tags_are_labels() {
        let summary = RunSummary::from_config(&config("tags: [dev, mnist]\n")).expect("summary");
        assert_eq!(summary.tag_labels(), ["dev", "mnist"]);
    }

    #[test]
    fn yaml_and_json_rendering() {
        let cfg = config("b: 2\na: x\n");
        assert_eq!(cfg.to_yaml().expect("yaml"), "a: x\nb: 2\n");
        assert!(cfg.to_json_pretty().expect("json").contains("\"b\": 2"));
    }
}
