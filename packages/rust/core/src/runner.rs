//! In-place notebook execution.
//!
//! Each notebook is handed to a [`NotebookExecutor`] in order. A non-zero exit
//! is recorded as a [`RunFailure`]; with fail-fast on, the run stops at the
//! first one.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use tracing::{info, instrument, warn};

use notebook_ci_shared::{
    KERNEL_NAME, NotebookCiError, NotebookPath, Result, RunFailure, RunSummary, RunnerConfig,
};

/// Result of executing a single notebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    Success,
    /// The tool exited non-zero; `-N` when it was killed by signal N.
    Failed { exit_code: i32 },
}

/// Executes one notebook and saves the outputs back into the file.
pub trait NotebookExecutor {
    /// `Err` means the tool could not be run at all.
    fn execute(&self, notebook: &NotebookPath) -> Result<ExecOutcome>;
}

/// Progress callback for reporting runner status.
pub trait RunReporter {
    /// Called before a notebook is executed (`index` is 1-based).
    fn started(&self, notebook: &NotebookPath, index: usize, total: usize);
    /// Called when a notebook fails.
    fn failed(&self, notebook: &NotebookPath, failure: &RunFailure);
    /// Called once the run ends, including fail-fast aborts.
    fn finished(&self, summary: &RunSummary);
}

/// No-op reporter for headless/test usage.
pub struct SilentReporter;

impl RunReporter for SilentReporter {
    fn started(&self, _notebook: &NotebookPath, _index: usize, _total: usize) {}
    fn failed(&self, _notebook: &NotebookPath, _failure: &RunFailure) {}
    fn finished(&self, _summary: &RunSummary) {}
}

// ---------------------------------------------------------------------------
// nbconvert
// ---------------------------------------------------------------------------

/// Runs `python -m jupyter nbconvert --execute --inplace` from the repository root.
#[derive(Debug, Clone)]
pub struct NbconvertExecutor {
    /// Interpreter that provides the `jupyter` module.
    pub python: String,
    /// Working directory for the subprocess.
    pub root: PathBuf,
    /// Passed through as `ExecutePreprocessor.timeout`.
    pub timeout_secs: i64,
}

impl NbconvertExecutor {
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self {
            python: config.python.clone(),
            root: config.root.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Arguments after the interpreter.
    pub fn args(&self, notebook: &NotebookPath) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-m",
            "jupyter",
            "nbconvert",
            "--to",
            "notebook",
            "--execute",
            "--inplace",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        args.push(format!("--ExecutePreprocessor.timeout={}", self.timeout_secs).into());
        args.push(format!("--ExecutePreprocessor.kernel_name={KERNEL_NAME}").into());
        args.push(notebook.path.clone().into_os_string());
        args
    }
}

impl NotebookExecutor for NbconvertExecutor {
    fn execute(&self, notebook: &NotebookPath) -> Result<ExecOutcome> {
        let status = Command::new(&self.python)
            .args(self.args(notebook))
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| NotebookCiError::exec(format!("failed to spawn {}: {e}", self.python)))?;

        if status.success() {
            Ok(ExecOutcome::Success)
        } else {
            Ok(ExecOutcome::Failed {
                exit_code: exit_code_of(status),
            })
        }
    }
}

/// Exit code of a finished process, `-N` for a death by signal N.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// Execute every notebook in order and collect the results.
#[instrument(skip_all, fields(total = notebooks.len(), fail_fast = fail_fast))]
pub fn run_notebooks(
    notebooks: &[NotebookPath],
    executor: &dyn NotebookExecutor,
    fail_fast: bool,
    reporter: &dyn RunReporter,
) -> RunSummary {
    let total = notebooks.len();
    let mut summary = RunSummary::default();

    for (i, notebook) in notebooks.iter().enumerate() {
        reporter.started(notebook, i + 1, total);
        summary.attempted += 1;

        let message = match executor.execute(notebook) {
            Ok(ExecOutcome::Success) => {
                info!(rel = %notebook.rel, "notebook executed");
                summary.succeeded += 1;
                continue;
            }
            Ok(ExecOutcome::Failed { exit_code }) => exit_code_message(exit_code),
            Err(e) => format!("Execution failed: {e}"),
        };

        warn!(rel = %notebook.rel, %message, "notebook failed");
        let failure = RunFailure {
            rel: notebook.rel.clone(),
            message,
        };
        reporter.failed(notebook, &failure);
        summary.failures.push(failure);

        if fail_fast {
            summary.aborted = true;
            break;
        }
    }

    reporter.finished(&summary);
    summary
}

/// `Execution failed with exit code N`
pub fn exit_code_message(exit_code: i32) -> String {
    format!("Execution failed with exit code {exit_code}")
}

/// Message printed when discovery returns nothing.
pub fn empty_message(has_excludes: bool) -> &'static str {
    if has_excludes {
        "No notebooks found (or all excluded)."
    } else {
        "No notebooks found."
    }
}

/// Closing lines of the console transcript.
///
/// A fail-fast abort prints nothing here; the failure was already reported
/// when it happened.
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    if summary.aborted {
        return Vec::new();
    }

    if summary.failures.is_empty() {
        return vec![String::new(), "All notebooks executed successfully.".to_string()];
    }

    let mut lines = vec![String::new(), "Some notebooks failed:".to_string()];
    lines.extend(
        summary
            .failures
            .iter()
            .map(|f| format!("- {}: {}", f.rel, f.message)),
    );
    lines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
