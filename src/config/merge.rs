//! CLI flags layered over loaded settings

use std::path::PathBuf;

use super::settings::{OutputFormat, Settings};

/// Settings given on the command line. `None` keeps the loaded value.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_dir: Option<PathBuf>,
    pub experiment_group: Option<String>,
    pub format: Option<OutputFormat>,
}

pub fn merge_cli_with_settings(mut settings: Settings, cli: CliOverrides) -> Settings {
    if let Some(config_dir) = cli.config_dir {
        settings.config_dir = config_dir;
    }
    if let Some(group) = cli.experiment_group {
        settings.experiment_group = group;
    }
    if let Some(format) = cli.format {
        settings.format = format;
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_values_win() {
        let merged = merge_cli_with_settings(
            Settings::default(),
            CliOverrides {
                config_dir: Some(PathBuf::from("conf")),
                experiment_group: None,
                format: Some(OutputFormat::Json),
            },
        );
        assert_eq!(merged.config_dir, PathBuf::from("conf"));
        assert_eq!(merged.experiment_group, "experiment");
        assert_eq!(merged.format, OutputFormat::Json);
    }

    #[test]
    fn empty_overrides_keep_settings() {
        let settings = Settings { format: OutputFormat::Json, ..Settings::default() };
        assert_eq!(merge_cli_with_settings(settings.clone(), CliOverrides::default()), settings);
    }
}
