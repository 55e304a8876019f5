//! Core domain types shared by the runner and the page generator.

use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// NotebookPath
// ---------------------------------------------------------------------------

/// A notebook found during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookPath {
    /// Absolute (or root-joined) path on disk.
    pub path: PathBuf,
    /// Path relative to the repository root, always with `/` separators.
    pub rel: String,
}

impl NotebookPath {
    /// Build a notebook path from the repository root and a relative path.
    pub fn new(root: &Path, rel: impl Into<String>) -> Self {
        let rel = rel.into();
        let path = rel.split('/').fold(root.to_path_buf(), |acc, part| acc.join(part));
        Self { path, rel }
    }

    /// File name without its extension, used as the fallback title.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.rel.clone())
    }

    /// Key used to order discovery results (case-insensitive path).
    pub fn sort_key(&self) -> String {
        self.rel.to_lowercase()
    }
}

impl std::fmt::Display for NotebookPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.rel)
    }
}

// ---------------------------------------------------------------------------
// Run results
// ---------------------------------------------------------------------------

/// A notebook whose execution did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    /// Repository-relative notebook path.
    pub rel: String,
    /// Human-readable reason, e.g. `Execution failed with exit code 1`.
    pub message: String,
}

/// Outcome of a full runner invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Notebooks handed to the executor.
    pub attempted: usize,
    /// Notebooks that executed with a zero exit status.
    pub succeeded: usize,
    /// Failures in execution order.
    pub failures: Vec<RunFailure>,
    /// True when fail-fast stopped the run at the first failure.
    pub aborted: bool,
}

impl RunSummary {
    /// Whether every attempted notebook succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Process exit status: 0 on success (including nothing to do), 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }
}

// ---------------------------------------------------------------------------
// RepoRef
// ---------------------------------------------------------------------------

/// GitHub repository coordinates used to build launch links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// `owner/name` slug.
    pub slug: String,
    /// Branch the links point at.
    pub branch: String,
}

impl RepoRef {
    pub fn new(slug: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            branch: branch.into(),
        }
    }

    /// `https://github.com/<slug>`
    pub fn repo_url(&self) -> String {
        format!("https://github.com/{}", self.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notebook_path_joins_relative_segments() {
        let nb = NotebookPath::new(Path::new("/repo"), "analysis/Stats 2024.ipynb");
        assert_eq!(nb.path, Path::new("/repo").join("analysis").join("Stats 2024.ipynb"));
        assert_eq!(nb.stem(), "Stats 2024");
        assert_eq!(nb.to_string(), "analysis/Stats 2024.ipynb");
    }

    #[test]
    fn sort_key_is_case_insensitive() {
        let a = NotebookPath::new(Path::new("/r"), "B.ipynb");
        let b = NotebookPath::new(Path::new("/r"), "a.ipynb");
        assert!(b.sort_key() < a.sort_key());
    }

    #[test]
    fn summary_exit_codes() {
        let mut summary = RunSummary::default();
        assert_eq!(summary.exit_code(), 0);

        summary.failures.push(RunFailure {
            rel: "x.ipynb".into(),
            message: "Execution failed with exit code 2".into(),
        });
        assert!(!summary.is_success());
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn repo_url_from_slug() {
        let repo = RepoRef::new("owner/project", "main");
        assert_eq!(repo.repo_url(), "https://github.com/owner/project");
    }
}
