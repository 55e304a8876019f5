//! Write the generated notebooks page with launch links.

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use notebook_ci::cli::{PageCli, init_tracing};
use notebook_ci::commands;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = PageCli::parse();
    init_tracing(&cli.common);
    commands::generate_notebooks_page(&cli.common)
}
