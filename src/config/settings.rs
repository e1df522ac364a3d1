//! Tool settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the configuration tree (`<dir>/<base>.yaml`, `<dir>/<group>/<variant>.yaml`)
    pub config_dir: PathBuf,
    /// Group searched when an experiment is named without a path
    pub experiment_group: String,
    pub format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("configs"),
            experiment_group: "experiment".to_string(),
            format: OutputFormat::Yaml,
        }
    }
}
