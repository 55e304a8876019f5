//! Shared types, error model, and configuration for the notebook CI tools.
//!
//! This crate is the foundation depended on by all other notebook-ci crates.
//! It provides:
//! - [`NotebookCiError`] — the unified error type
//! - Domain types ([`NotebookPath`], [`RunFailure`], [`RunSummary`], [`RepoRef`])
//! - Configuration ([`RunnerConfig`], [`PageConfig`], environment lookup)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    DEFAULT_BRANCH, DEFAULT_PYTHON, DEFAULT_REPO_SLUG, DEFAULT_TIMEOUT_SECS, EXCLUDES_FILE,
    KERNEL_NAME, PAGE_FILE, PageConfig, RunnerConfig,
};
pub use error::{NotebookCiError, Result};
pub use types::{NotebookPath, RepoRef, RunFailure, RunSummary};
