//! Re-execute every notebook in the repository to refresh rendered outputs.

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use notebook_ci::cli::{ExecuteCli, init_tracing};
use notebook_ci::commands;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = ExecuteCli::parse();
    init_tracing(&cli.common);
    commands::execute_notebooks(&cli.common)
}
