//! Notebook discovery for the CI tools.
//!
//! Walks a repository from its root, prunes build output, checkpoints, VCS
//! metadata and hidden directories, applies exclude globs, and returns the
//! notebooks sorted case-insensitively by their repository-relative path.

mod patterns;

use std::fs;
use std::path::Path;

use tracing::{debug, info, instrument, warn};

use notebook_ci_shared::{NotebookCiError, NotebookPath, Result};

pub use patterns::{ExcludeSet, load_exclude_patterns, parse_env_patterns, parse_pattern_file};

/// File extension of Jupyter notebooks.
pub const NOTEBOOK_EXTENSION: &str = "ipynb";

/// Directory names never descended into.
pub const SKIP_DIRS: &[&str] = &[".ipynb_checkpoints", "_site", ".quarto", ".git"];

/// Hidden directories that are still scanned.
pub const ALLOWED_HIDDEN_DIRS: &[&str] = &[".github"];

// ---------------------------------------------------------------------------
// Discovery options
// ---------------------------------------------------------------------------

/// Configuration for a discovery walk.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Extension (without the dot) a file must have to count as a notebook.
    pub extension: String,
    /// Path components that disqualify a path.
    pub skip_dirs: Vec<String>,
    /// Dot-prefixed components that are allowed anyway.
    pub allowed_hidden: Vec<String>,
    /// Exclude globs matched against the relative path.
    pub excludes: ExcludeSet,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            extension: NOTEBOOK_EXTENSION.to_string(),
            skip_dirs: SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
            allowed_hidden: ALLOWED_HIDDEN_DIRS.iter().map(|s| s.to_string()).collect(),
            excludes: ExcludeSet::default(),
        }
    }
}

impl DiscoveryOptions {
    /// Replace the exclude set.
    pub fn with_excludes(mut self, excludes: ExcludeSet) -> Self {
        self.excludes = excludes;
        self
    }

    /// Whether a single path component disqualifies everything beneath it.
    pub fn is_skipped_component(&self, name: &str) -> bool {
        if self.skip_dirs.iter().any(|d| d == name) {
            return true;
        }
        name.starts_with('.') && !self.allowed_hidden.iter().any(|d| d == name)
    }

    /// Pure path predicate: true when no component of the relative path is
    /// skipped and the path is not excluded by a glob.
    pub fn accepts(&self, rel_path: &str) -> bool {
        is_walkable(rel_path, self) && !self.excludes.is_excluded(rel_path)
    }
}

/// True when no `/`-separated component of `rel_path` is skipped or hidden.
pub fn is_walkable(rel_path: &str, opts: &DiscoveryOptions) -> bool {
    rel_path
        .split('/')
        .filter(|part| !part.is_empty())
        .all(|part| !opts.is_skipped_component(part))
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Find all notebooks under `root`.
///
/// Skipped and hidden directories are pruned rather than filtered after the
/// fact, and only components below `root` are inspected. Symlinked
/// directories are not followed.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn discover_notebooks(root: &Path, opts: &DiscoveryOptions) -> Result<Vec<NotebookPath>> {
    // Fail loudly if the root itself is unreadable; deeper errors are skipped.
    let entries = fs::read_dir(root).map_err(|e| NotebookCiError::io(root, e))?;

    let mut found = Vec::new();
    let mut excluded = 0usize;
    walk_entries(entries, root, "", opts, &mut found, &mut excluded);

    found.sort_by_key(NotebookPath::sort_key);

    info!(
        count = found.len(),
        excluded,
        "notebook discovery complete"
    );

    Ok(found)
}

fn walk_dir(
    dir: &Path,
    rel_prefix: &str,
    opts: &DiscoveryOptions,
    found: &mut Vec<NotebookPath>,
    excluded: &mut usize,
) {
    match fs::read_dir(dir) {
        Ok(entries) => walk_entries(entries, dir, rel_prefix, opts, found, excluded),
        Err(e) => warn!(path = %dir.display(), error = %e, "skipping unreadable directory"),
    }
}

fn walk_entries(
    entries: fs::ReadDir,
    dir: &Path,
    rel_prefix: &str,
    opts: &DiscoveryOptions,
    found: &mut Vec<NotebookPath>,
    excluded: &mut usize,
) {
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        let rel = if rel_prefix.is_empty() {
            name.clone()
        } else {
            format!("{rel_prefix}/{name}")
        };

        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();

        if file_type.is_dir() {
            if opts.is_skipped_component(&name) {
                debug!(%rel, "pruning directory");
                continue;
            }
            walk_dir(&path, &rel, opts, found, excluded);
            continue;
        }

        // Regular files, or symlinks that resolve to one.
        let is_file = file_type.is_file()
            || (file_type.is_symlink() && fs::metadata(&path).is_ok_and(|m| m.is_file()));
        if !is_file || !has_extension(&path, &opts.extension) {
            continue;
        }

        if !is_walkable(&rel, opts) {
            debug!(%rel, "skipping hidden notebook");
            continue;
        }

        if !opts.accepts(&rel) {
            debug!(%rel, "excluded by pattern");
            *excluded += 1;
            continue;
        }

        found.push(NotebookPath { path, rel });
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const NOTEBOOK: &str = r#"{"cells": [], "metadata": {}, "nbformat": 4, "nbformat_minor": 5}"#;

    fn temp_repo() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nbci-discovery-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, NOTEBOOK).unwrap();
    }

    fn rels(found: &[NotebookPath]) -> Vec<&str> {
        found.iter().map(|nb| nb.rel.as_str()).collect()
    }

    #[test]
    fn skip_components_are_rejected() {
        let opts = DiscoveryOptions::default();
        for rel in [
            ".ipynb_checkpoints/a-checkpoint.ipynb",
            "nested/.ipynb_checkpoints/a.ipynb",
            "_site/a.ipynb",
            "docs/_site/deep/a.ipynb",
            ".quarto/a.ipynb",
            ".git/a.ipynb",
            "sub/.git/x/a.ipynb",
        ] {
            assert!(!is_walkable(rel, &opts), "{rel} should be skipped");
        }
    }

    #[test]
    fn hidden_components_are_rejected_except_allowlist() {
        let opts = DiscoveryOptions::default();
        assert!(!is_walkable(".venv/lib/a.ipynb", &opts));
        assert!(!is_walkable("data/.cache/a.ipynb", &opts));
        assert!(!is_walkable(".hidden.ipynb", &opts));
        assert!(is_walkable(".github/templates/a.ipynb", &opts));
        assert!(is_walkable("analysis/a.ipynb", &opts));
    }

    #[test]
    fn accepts_applies_excludes() {
        let excludes = ExcludeSet::new(vec!["a/*.ipynb".into()]).unwrap();
        let opts = DiscoveryOptions::default().with_excludes(excludes);
        assert!(!opts.accepts("a/x.ipynb"));
        assert!(opts.accepts("b/x.ipynb"));
        assert!(!opts.accepts("_site/b.ipynb"));
    }

    #[test]
    fn discover_walks_and_sorts_case_insensitively() {
        let root = temp_repo();
        touch(&root, "b.ipynb");
        touch(&root, "A.ipynb");
        touch(&root, "analysis/c.ipynb");
        touch(&root, "analysis/.ipynb_checkpoints/c-checkpoint.ipynb");
        touch(&root, "_site/rendered.ipynb");
        touch(&root, ".venv/pkg/demo.ipynb");
        touch(&root, ".github/templates/t.ipynb");
        std::fs::write(root.join("notes.md"), "# not a notebook").unwrap();

        let found = discover_notebooks(&root, &DiscoveryOptions::default()).expect("discover");
        assert_eq!(
            rels(&found),
            vec![".github/templates/t.ipynb", "A.ipynb", "analysis/c.ipynb", "b.ipynb"]
        );
        assert_eq!(found[2].path, root.join("analysis").join("c.ipynb"));

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn discover_applies_exclude_patterns() {
        let root = temp_repo();
        touch(&root, "a/x.ipynb");
        touch(&root, "b/x.ipynb");

        let excludes = ExcludeSet::new(vec!["a/*.ipynb".into()]).unwrap();
        let opts = DiscoveryOptions::default().with_excludes(excludes);
        let found = discover_notebooks(&root, &opts).expect("discover");
        assert_eq!(rels(&found), vec!["b/x.ipynb"]);

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn discovered_paths_satisfy_accepts() {
        let root = temp_repo();
        touch(&root, "keep/a.ipynb");
        touch(&root, "keep/.b.ipynb");
        touch(&root, "drop/c.ipynb");
        touch(&root, ".git/d.ipynb");

        let excludes = ExcludeSet::new(vec!["drop/*".into()]).unwrap();
        let opts = DiscoveryOptions::default().with_excludes(excludes);
        let found = discover_notebooks(&root, &opts).expect("discover");
        assert_eq!(rels(&found), vec!["keep/a.ipynb"]);
        assert!(found.iter().all(|nb| opts.accepts(&nb.rel)));
        for rel in ["keep/.b.ipynb", "drop/c.ipynb", ".git/d.ipynb"] {
            assert!(!opts.accepts(rel), "{rel} should be rejected");
        }

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn discover_empty_repo() {
        let root = temp_repo();
        let found = discover_notebooks(&root, &DiscoveryOptions::default()).expect("discover");
        assert!(found.is_empty());
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn discover_missing_root_is_io_error() {
        let root = std::env::temp_dir().join(format!("nbci-absent-{}", uuid::Uuid::now_v7()));
        let err = discover_notebooks(&root, &DiscoveryOptions::default()).unwrap_err();
        assert!(matches!(err, NotebookCiError::Io { .. }));
    }

    #[test]
    fn repo_under_hidden_parent_is_still_scanned() {
        let parent = temp_repo().join(".workspace");
        touch(&parent, "nb.ipynb");

        let found = discover_notebooks(&parent, &DiscoveryOptions::default()).expect("discover");
        assert_eq!(rels(&found), vec!["nb.ipynb"]);

        std::fs::remove_dir_all(parent.parent().unwrap()).ok();
    }
}
