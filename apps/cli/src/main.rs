//! Jutsudex CLI — compendium export normalizer.
//!
//! Turns a line-delimited jutsu compendium export into a normalized,
//! de-duplicated library with stats and a browsable Markdown tree.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
