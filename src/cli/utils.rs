//! Shared CLI utilities.

use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;

use expcompose::compose::assignments_to_node;
use expcompose::config::{OutputFormat, Settings};
use expcompose::{
    Assignment, Composer, DirRegistry, Document, ExperimentConfig, Node, OverrideDirective,
    Registry,
};

/// Selection flags shared by every composing subcommand.
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Base configuration name (e.g. 'train' for <config-dir>/train.yaml)
    #[arg(value_name = "BASE")]
    pub base: String,

    /// Experiment document: a file path, 'group/name', or a name in the experiment group
    #[arg(short = 'x', long, value_name = "EXPERIMENT")]
    pub experiment: Option<String>,

    /// Group searched for bare experiment names
    #[arg(long, value_name = "GROUP")]
    pub experiment_group: Option<String>,

    /// Group selection such as 'data=mnist' (repeatable)
    #[arg(short = 'o', long = "override", value_name = "GROUP=VARIANT")]
    pub overrides: Vec<String>,

    /// Inline assignment such as 'trainer.max_epochs=5' (repeatable)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    pub assignments: Vec<String>,
}

/// Everything needed to compose: the registry-backed composer and the
/// experiment document (empty when no experiment was given).
pub struct Request {
    pub composer: Composer<DirRegistry>,
    pub base: String,
    pub document: Document,
}

pub fn prepare(args: &SelectionArgs, settings: &Settings) -> Result<Request> {
    let registry = DirRegistry::open(&settings.config_dir).with_context(|| {
        format!("Cannot open configuration directory {}", settings.config_dir.display())
    })?;

    let document = match &args.experiment {
        Some(raw) => load_experiment(&registry, raw, &settings.experiment_group)?,
        None => Document::default(),
    };

    Ok(Request { composer: Composer::new(registry), base: args.base.clone(), document })
}

fn load_experiment(registry: &DirRegistry, raw: &str, experiment_group: &str) -> Result<Document> {
    let path = Path::new(raw);
    if path.is_file() {
        return Document::from_path(path)
            .with_context(|| format!("Failed to load experiment {}", path.display()));
    }

    let (group, name) = match raw.trim_matches('/').rsplit_once('/') {
        Some((group, name)) => (group, name),
        None => (experiment_group, raw),
    };
    let document = registry
        .variant(group, name)
        .with_context(|| format!("Failed to load experiment '{raw}'"))?;
    Ok((*document).clone())
}

pub fn parse_overrides(raw: &[String]) -> Result<Vec<OverrideDirective>> {
    raw.iter()
        .map(|r| OverrideDirective::parse(r).with_context(|| format!("Invalid override '{r}'")))
        .collect()
}

pub fn parse_assignments(raw: &[String]) -> Result<Node> {
    let assignments = raw
        .iter()
        .map(|r| Assignment::parse(r).with_context(|| format!("Invalid assignment '{r}'")))
        .collect::<Result<Vec<_>>>()?;
    Ok(assignments_to_node(&assignments))
}

/// Compose a single configuration from the selection flags.
pub fn compose_selection(args: &SelectionArgs, settings: &Settings) -> Result<ExperimentConfig> {
    let request = prepare(args, settings)?;
    let overrides = parse_overrides(&args.overrides)?;
    let inline = parse_assignments(&args.assignments)?;
    request
        .composer
        .compose_document(&request.base, &request.document, &overrides, Some(&inline))
        .with_context(|| format!("Failed to compose '{}'", request.base))
}

pub fn render(config: &ExperimentConfig, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => config.to_yaml().context("Failed to render YAML"),
        OutputFormat::Json => {
            config.to_json_pretty().map(|json| json + "\n").context("Failed to render JSON")
        }
    }
}
