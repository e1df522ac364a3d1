//! Compose command implementation

use anyhow::Result;
use clap::Args;

use super::utils::{compose_selection, render, SelectionArgs};
use expcompose::config::{merge_cli_with_settings, CliOverrides, OutputFormat, Settings};

#[derive(Args)]
pub struct ComposeArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

pub fn run(args: ComposeArgs, settings: Settings) -> Result<()> {
    let settings = merge_cli_with_settings(
        settings,
        CliOverrides {
            config_dir: None,
            experiment_group: args.selection.experiment_group.clone(),
            format: args.format,
        },
    );

    let config = compose_selection(&args.selection, &settings)?;
    tracing::debug!("Composed '{}' ({})", args.selection.base, config.fingerprint());
    print!("{}", render(&config, settings.format)?);
    Ok(())
}
