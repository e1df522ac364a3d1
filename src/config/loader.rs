//! Settings file loading

use anyhow::{bail, Context, Result};
use figment::providers::{Env, Format, Serialized, Toml, Yaml};
use figment::Figment;
use std::path::{Path, PathBuf};

use super::settings::Settings;

pub const ENV_PREFIX: &str = "EXPCOMPOSE_";

/// Defaults, then the settings file, then `EXPCOMPOSE_*` variables.
///
/// An explicitly given file must load cleanly. An auto-discovered file that
/// fails to load is skipped with a warning.
pub fn load_settings(work_dir: &Path, settings_path: Option<&Path>) -> Result<Settings> {
    let settings_path_provided = settings_path.is_some();

    let discovered = match settings_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_settings(work_dir),
    };

    let mut figment = Figment::from(Serialized::defaults(Settings::default()));

    if let Some(settings_file) = discovered {
        match file_layer(&figment, &settings_file) {
            Ok(layered) => figment = layered,
            Err(e) => {
                if settings_path_provided {
                    return Err(e);
                }
                tracing::warn!(
                    "Failed to load auto-discovered settings {}: {:#}",
                    settings_file.display(),
                    e
                );
            }
        }
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX));
    figment.extract().context("Invalid expcompose settings in environment")
}

fn file_layer(base: &Figment, settings_file: &Path) -> Result<Figment> {
    if !settings_file.is_file() {
        bail!("Settings file not found: {}", settings_file.display());
    }

    let ext = settings_file
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let layered = match ext.as_str() {
        "toml" => base.clone().merge(Toml::file(settings_file)),
        "yaml" | "yml" => base.clone().merge(Yaml::file(settings_file)),
        other => bail!(
            "Unsupported settings extension '.{}' for file {}",
            other,
            settings_file.display()
        ),
    };

    // Extract once here so a broken file is attributed to the file, not the env.
    layered
        .extract::<Settings>()
        .with_context(|| format!("Invalid settings file: {}", settings_file.display()))?;
    Ok(layered)
}

fn discover_settings(work_dir: &Path) -> Option<PathBuf> {
    let candidates = [
        "expcompose.toml",
        ".expcompose.toml",
        "expcompose.yaml",
        ".expcompose.yaml",
        "expcompose.yml",
        ".expcompose.yml",
    ];

    for candidate in candidates {
        let path = work_dir.join(candidate);
        if path.exists() {
            return Some(path);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use figment::Jail;

    fn load(jail: &Jail, explicit: Option<&str>) -> figment::Result<Settings> {
        let explicit = explicit.map(|name| jail.directory().join(name));
        load_settings(jail.directory(), explicit.as_deref()).map_err(|e| format!("{e:#}").into())
    }

    #[test]
    fn defaults_when_missing() {
        Jail::expect_with(|jail| {
            assert_eq!(load(jail, None)?, Settings::default());
            Ok(())
        });
    }

    #[test]
    fn discovers_toml_settings() {
        Jail::expect_with(|jail| {
            jail.create_file("expcompose.toml", "config_dir = 'conf'\nformat = 'json'\n")?;
            let settings = load(jail, None)?;
            assert_eq!(settings.config_dir, PathBuf::from("conf"));
            assert_eq!(settings.format, OutputFormat::Json);
            assert_eq!(settings.experiment_group, "experiment");
            Ok(())
        });
    }

    #[test]
    fn discovers_hidden_yaml_settings() {
        Jail::expect_with(|jail| {
            jail.create_file(".expcompose.yml", "experiment_group: exp\n")?;
            assert_eq!(load(jail, None)?.experiment_group, "exp");
            Ok(())
        });
    }

    #[test]
    fn environment_beats_file() {
        Jail::expect_with(|jail| {
            jail.create_file("expcompose.toml", "config_dir = 'conf'\n")?;
            jail.set_env("EXPCOMPOSE_CONFIG_DIR", "/srv/configs");
            assert_eq!(load(jail, None)?.config_dir, PathBuf::from("/srv/configs"));
            Ok(())
        });
    }

    #[test]
    fn explicit_invalid_file_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("bad.toml", "format = 'xml'\n")?;
            assert!(load(jail, Some("bad.toml")).is_err());
            Ok(())
        });
    }

    #[test]
    fn explicit_missing_or_unsupported_file_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("settings.ini", "format = json\n")?;
            assert!(load(jail, Some("settings.ini")).is_err());
            assert!(load(jail, Some("nope.toml")).is_err());
            Ok(())
        });
    }

    #[test]
    fn auto_discovered_invalid_file_falls_back_to_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("expcompose.toml", "format = 'xml'\n")?;
            assert_eq!(load(jail, None)?, Settings::default());
            Ok(())
        });
    }
}
