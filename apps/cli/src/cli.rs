//! CLI argument definitions and tracing setup.
//!
//! Both binaries run without arguments; everything that matters comes from
//! the environment. The flags here only cover where to run and how to log.

use std::path::PathBuf;

use clap::Parser;

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Flags shared by both binaries.
#[derive(clap::Args, Debug)]
pub struct CommonArgs {
    /// Repository root to scan (defaults to the current directory).
    #[arg(long, env = "NOTEBOOK_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Re-execute all notebooks in place to refresh their outputs.
///
/// Hidden directories are skipped except .github, whose notebooks are run
/// too; add `.github/**` to the exclude file to leave them out.
///
/// Environment: NOTEBOOK_TIMEOUT_SECONDS (default 1800), FAIL_FAST ("0"
/// disables), NOTEBOOK_EXCLUDE (comma-separated globs), NOTEBOOK_PYTHON.
/// Extra patterns are read from .github/notebook-excludes.txt.
#[derive(Parser, Debug)]
#[command(name = "execute-notebooks", version, long_about = None)]
pub struct ExecuteCli {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Generate notebooks.qmd with launch links for every notebook.
///
/// Environment: REPO_SLUG / GITHUB_REPOSITORY, REPO_BRANCH / GITHUB_REF_NAME.
#[derive(Parser, Debug)]
#[command(name = "generate-notebooks-page", version, long_about = None)]
pub struct PageCli {
    #[command(flatten)]
    pub common: CommonArgs,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so stdout stays
/// a clean transcript for CI logs.
pub fn init_tracing(args: &CommonArgs) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match args.verbose {
        0 => "notebook_ci=warn",
        1 => "notebook_ci=info",
        2 => "notebook_ci=debug",
        _ => "notebook_ci=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match args.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
