//! Summary command implementation

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use super::utils::{compose_selection, SelectionArgs};
use expcompose::config::{merge_cli_with_settings, CliOverrides, OutputFormat, Settings};
use expcompose::RunSummary;

#[derive(Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

pub fn run(args: SummaryArgs, settings: Settings) -> Result<()> {
    let settings = merge_cli_with_settings(
        settings,
        CliOverrides {
            config_dir: None,
            experiment_group: args.selection.experiment_group.clone(),
            format: args.format,
        },
    );

    let config = compose_selection(&args.selection, &settings)?;
    let summary = RunSummary::from_config(&config)
        .context("Resolved configuration does not match the training driver's keys")?;
    let fingerprint = config.fingerprint();

    if settings.format == OutputFormat::Json {
        let out = json!({ "fingerprint": fingerprint, "summary": summary });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Experiment: {}", or_dash(summary.experiment_name.as_deref()));
    println!("Fingerprint: {}", fingerprint);
    println!("Seed: {}", or_dash(summary.seed));
    println!("Compile: {}", or_dash(summary.compile));
    println!(
        "Epochs: {}..{}",
        or_dash(summary.trainer.min_epochs),
        or_dash(summary.trainer.max_epochs)
    );
    println!("Batch size: {}", or_dash(summary.data.batch_size));
    println!("Data workers: {}", or_dash(summary.data.num_workers));
    println!("Loggers: {}", or_dash(non_empty(summary.loggers.join(", "))));
    println!("Tags: {}", or_dash(non_empty(summary.tag_labels().join(", "))));
    Ok(())
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
