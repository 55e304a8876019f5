//! Command bodies for the two binaries.

use std::cell::RefCell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use color_eyre::eyre::{Result, eyre};
use tracing::info;

use notebook_ci_core::page::generate_page;
use notebook_ci_core::runner::{
    NbconvertExecutor, NotebookExecutor, RunReporter, empty_message, run_notebooks, summary_lines,
};
use notebook_ci_discovery::{
    DiscoveryOptions, ExcludeSet, discover_notebooks, load_exclude_patterns,
};
use notebook_ci_shared::{NotebookPath, PageConfig, RunFailure, RunSummary, RunnerConfig};

use crate::cli::CommonArgs;

/// Writes the per-notebook console transcript.
///
/// The reporter callbacks cannot fail, so the first write error is kept and
/// surfaced once the run is over.
struct ConsoleReporter<'a, W: Write> {
    out: RefCell<&'a mut W>,
    error: RefCell<Option<io::Error>>,
}

impl<'a, W: Write> ConsoleReporter<'a, W> {
    fn new(out: &'a mut W) -> Self {
        Self {
            out: RefCell::new(out),
            error: RefCell::new(None),
        }
    }

    fn emit(&self, line: &str) {
        let mut out = self.out.borrow_mut();
        // Flush so the line lands before nbconvert writes to the same terminal.
        if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
            self.error.borrow_mut().get_or_insert(e);
        }
    }

    fn into_result(self) -> io::Result<()> {
        match self.error.into_inner() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<W: Write> RunReporter for ConsoleReporter<'_, W> {
    fn started(&self, notebook: &NotebookPath, index: usize, total: usize) {
        info!(rel = %notebook.rel, index, total, "executing notebook");
        self.emit(&format!("\n=== Executing: {} ===", notebook.rel));
    }

    fn failed(&self, _notebook: &NotebookPath, failure: &RunFailure) {
        self.emit(&failure.message);
    }

    fn finished(&self, summary: &RunSummary) {
        info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failures.len(),
            aborted = summary.aborted,
            "run finished"
        );
    }
}

/// `execute-notebooks`
pub fn execute_notebooks(args: &CommonArgs) -> Result<ExitCode> {
    let root = resolve_root(&args.root)?;
    let config = RunnerConfig::from_env(root)?;
    let executor = NbconvertExecutor::from_config(&config);

    let code = run_execute(&config, &executor, &mut io::stdout().lock())?;
    Ok(ExitCode::from(code))
}

/// Load excludes, discover, execute, and write the transcript to `out`.
/// Returns the process exit code.
pub fn run_execute(
    config: &RunnerConfig,
    executor: &dyn NotebookExecutor,
    out: &mut impl Write,
) -> Result<u8> {
    let patterns = load_exclude_patterns(config.exclude_env.as_deref(), &config.excludes_file)?;
    if !patterns.is_empty() {
        writeln!(out, "Exclude patterns:")?;
        for pattern in &patterns {
            writeln!(out, "- {pattern}")?;
        }
    }

    let has_excludes = !patterns.is_empty();
    let opts = DiscoveryOptions::default().with_excludes(ExcludeSet::new(patterns)?);
    let notebooks = discover_notebooks(&config.root, &opts)?;

    if notebooks.is_empty() {
        writeln!(out, "{}", empty_message(has_excludes))?;
        return Ok(0);
    }

    let reporter = ConsoleReporter::new(out);
    let summary = run_notebooks(&notebooks, executor, config.fail_fast, &reporter);
    reporter.into_result()?;

    for line in summary_lines(&summary) {
        writeln!(out, "{line}")?;
    }

    Ok(summary.exit_code())
}

/// `generate-notebooks-page`
pub fn generate_notebooks_page(args: &CommonArgs) -> Result<ExitCode> {
    let root = resolve_root(&args.root)?;
    let config = PageConfig::from_env(root);

    let result = generate_page(&config, &DiscoveryOptions::default())?;
    info!(notebooks = result.notebook_count, "page generated");
    println!("Wrote {}", result.path.display());

    Ok(ExitCode::SUCCESS)
}

/// Absolute root, so notebook paths stay valid when nbconvert runs from it.
fn resolve_root(root: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(root)
        .map_err(|e| eyre!("cannot resolve repository root '{}': {e}", root.display()))
}
