//! expcompose: compose layered experiment configurations
//!
//! Loads a base configuration, applies group selections and inline overrides,
//! resolves `${...}` references and prints the result.

use anyhow::Result;

mod cli;

fn main() -> Result<()> {
    cli::run()
}
