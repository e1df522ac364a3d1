//! List command implementation

use anyhow::{bail, Context, Result};
use clap::Args;

use expcompose::config::Settings;
use expcompose::{DirRegistry, Registry};

#[derive(Args)]
pub struct ListArgs {
    /// Only list the variants of this group
    #[arg(value_name = "GROUP")]
    pub group: Option<String>,
}

pub fn run(args: ListArgs, settings: Settings) -> Result<()> {
    let registry = DirRegistry::open(&settings.config_dir).with_context(|| {
        format!("Cannot open configuration directory {}", settings.config_dir.display())
    })?;

    if let Some(group) = args.group {
        let variants = registry.variants(&group);
        if variants.is_empty() {
            bail!("Unknown configuration group '{}'", group);
        }
        for variant in variants {
            println!("{}", variant);
        }
        return Ok(());
    }

    println!("Configuration directory: {}", registry.root().display());
    println!("Bases:");
    for base in registry.bases() {
        println!("  {}", base);
    }
    println!("Groups:");
    for group in registry.groups() {
        println!("  {}: {}", group, registry.variants(&group).join(", "));
    }
    Ok(())
}
