//! Sweep command implementation

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use super::utils::{prepare, render, SelectionArgs};
use expcompose::config::{merge_cli_with_settings, CliOverrides, OutputFormat, Settings};
use expcompose::Sweep;

#[derive(Args)]
pub struct SweepArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Print every composed configuration instead of one line per job
    #[arg(long)]
    pub full: bool,

    /// Output format for --full
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

pub fn run(args: SweepArgs, settings: Settings) -> Result<()> {
    let settings = merge_cli_with_settings(
        settings,
        CliOverrides {
            config_dir: None,
            experiment_group: args.selection.experiment_group.clone(),
            format: args.format,
        },
    );

    let sweep = Sweep::parse(&args.selection.overrides[..], &args.selection.assignments[..])
        .context("Invalid sweep")?;
    let request = prepare(&args.selection, &settings)?;
    let results = sweep
        .run(&request.composer, &request.base, &request.document)
        .with_context(|| format!("Sweep over '{}' failed", request.base))?;

    if !args.full {
        for (job, config) in &results {
            println!("#{} {} {}", job.index, config.fingerprint(), job.label());
        }
        return Ok(());
    }

    match settings.format {
        OutputFormat::Yaml => {
            for (position, (job, config)) in results.iter().enumerate() {
                if position > 0 {
                    println!("---");
                }
                println!("# job {}: {}", job.index, job.label());
                print!("{}", render(config, OutputFormat::Yaml)?);
            }
        }
        OutputFormat::Json => {
            let jobs: Vec<_> = results
                .iter()
                .map(|(job, config)| {
                    json!({
                        "job": job.index,
                        "overrides": job.label(),
                        "fingerprint": config.fingerprint(),
                        "config": config.root(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&jobs)?);
        }
    }
    Ok(())
}
