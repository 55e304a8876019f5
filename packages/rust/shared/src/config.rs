//! Runtime configuration for the notebook CI tools.
//!
//! Both binaries are configured from environment variables. Every loader takes
//! a lookup closure so tests can supply an environment without touching the
//! process-wide one; `from_env` binds it to [`std::env::var`].

use std::path::{Path, PathBuf};

use crate::error::{NotebookCiError, Result};
use crate::types::RepoRef;

/// Default per-notebook execution timeout handed to nbconvert.
pub const DEFAULT_TIMEOUT_SECS: i64 = 1800;

/// Repository used for launch links when neither override nor CI variable is set.
pub const DEFAULT_REPO_SLUG: &str = "Deutsche-Digitale-Bibliothek/ddblabs-statistics";

/// Branch used for launch links when neither override nor CI variable is set.
pub const DEFAULT_BRANCH: &str = "main";

/// Interpreter used to launch `jupyter nbconvert`.
pub const DEFAULT_PYTHON: &str = "python3";

/// Jupyter kernel every notebook is executed with.
pub const KERNEL_NAME: &str = "python3";

/// Exclude-pattern file, relative to the repository root.
pub const EXCLUDES_FILE: &str = ".github/notebook-excludes.txt";

/// Generated page, relative to the repository root.
pub const PAGE_FILE: &str = "notebooks.qmd";

const ENV_TIMEOUT: &str = "NOTEBOOK_TIMEOUT_SECONDS";
const ENV_FAIL_FAST: &str = "FAIL_FAST";
const ENV_EXCLUDE: &str = "NOTEBOOK_EXCLUDE";
const ENV_PYTHON: &str = "NOTEBOOK_PYTHON";
const ENV_REPO_SLUG: &str = "REPO_SLUG";
const ENV_GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
const ENV_REPO_BRANCH: &str = "REPO_BRANCH";
const ENV_GITHUB_REF_NAME: &str = "GITHUB_REF_NAME";

// ---------------------------------------------------------------------------
// Runner config
// ---------------------------------------------------------------------------

/// Configuration for `execute-notebooks`.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Repository root; discovery starts here and nbconvert runs from here.
    pub root: PathBuf,
    /// Per-notebook timeout in seconds (enforced by nbconvert; `-1` disables it).
    pub timeout_secs: i64,
    /// Stop at the first failing notebook.
    pub fail_fast: bool,
    /// Raw `NOTEBOOK_EXCLUDE` value, comma-separated globs.
    pub exclude_env: Option<String>,
    /// Path to the line-oriented exclude-pattern file.
    pub excludes_file: PathBuf,
    /// Python interpreter used for `-m jupyter`.
    pub python: String,
}

impl RunnerConfig {
    /// Load from the process environment.
    pub fn from_env(root: impl Into<PathBuf>) -> Result<Self> {
        Self::from_lookup(root, |key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(root: impl Into<PathBuf>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = root.into();

        let timeout_secs = match non_empty(lookup(ENV_TIMEOUT)) {
            Some(raw) => raw.trim().parse::<i64>().map_err(|e| {
                NotebookCiError::config(format!(
                    "{ENV_TIMEOUT} must be an integer, got '{raw}': {e}"
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        // Anything except an explicit "0" keeps fail-fast on.
        let fail_fast = lookup(ENV_FAIL_FAST).is_none_or(|v| v != "0");

        let python = non_empty(lookup(ENV_PYTHON)).unwrap_or_else(|| DEFAULT_PYTHON.to_string());

        tracing::debug!(
            root = %root.display(),
            timeout_secs,
            fail_fast,
            %python,
            "runner config loaded"
        );

        Ok(Self {
            excludes_file: excludes_file_path(&root),
            exclude_env: lookup(ENV_EXCLUDE),
            root,
            timeout_secs,
            fail_fast,
            python,
        })
    }
}

// ---------------------------------------------------------------------------
// Page config
// ---------------------------------------------------------------------------

/// Configuration for `generate-notebooks-page`.
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// Repository root to scan.
    pub root: PathBuf,
    /// Repository coordinates for launch links.
    pub repo: RepoRef,
    /// Where the page is written.
    pub output_path: PathBuf,
}

impl PageConfig {
    /// Load from the process environment.
    pub fn from_env(root: impl Into<PathBuf>) -> Self {
        Self::from_lookup(root, |key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(root: impl Into<PathBuf>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = root.into();
        let repo = RepoRef::resolve(lookup);
        tracing::debug!(slug = %repo.slug, branch = %repo.branch, "page config loaded");

        Self {
            output_path: root.join(PAGE_FILE),
            root,
            repo,
        }
    }
}

impl RepoRef {
    /// Resolve slug and branch: explicit override, then GitHub Actions
    /// variables, then the built-in defaults. Empty values count as unset.
    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let slug = non_empty(lookup(ENV_REPO_SLUG))
            .or_else(|| non_empty(lookup(ENV_GITHUB_REPOSITORY)))
            .unwrap_or_else(|| DEFAULT_REPO_SLUG.to_string());
        let branch = non_empty(lookup(ENV_REPO_BRANCH))
            .or_else(|| non_empty(lookup(ENV_GITHUB_REF_NAME)))
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

        Self { slug, branch }
    }
}

/// `<root>/.github/notebook-excludes.txt`
pub fn excludes_file_path(root: &Path) -> PathBuf {
    EXCLUDES_FILE
        .split('/')
        .fold(root.to_path_buf(), |acc, part| acc.join(part))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
