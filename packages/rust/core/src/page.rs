//! Generated notebooks page (`notebooks.qmd`).
//!
//! The page is a Quarto document: front matter, a block of repository-wide
//! reuse links, then one section per notebook with launch buttons for Colab,
//! Binder, nbviewer, GitHub and a raw download.

use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::{info, instrument};

use notebook_ci_discovery::{DiscoveryOptions, discover_notebooks};
use notebook_ci_shared::{NotebookCiError, PageConfig, RepoRef, Result};

use crate::title::notebook_title;

/// Characters left as-is when escaping a path: RFC 3986 unreserved plus `/`.
const PATH_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

const KAGGLE_NEW_NOTEBOOK: &str = "https://www.kaggle.com/code/new";

const EMPTY_STATE: &str = "Keine Notebooks gefunden.";

/// Percent-escape a repository-relative path for use in a URL.
pub fn escape_path(rel: &str) -> String {
    utf8_percent_encode(rel, PATH_ESCAPE).to_string()
}

// ---------------------------------------------------------------------------
// Link sets
// ---------------------------------------------------------------------------

/// Links that apply to the repository as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReuseLinks {
    pub vscode: String,
    pub zip: String,
    pub github_desktop: String,
    pub codespaces: String,
    pub kaggle: String,
}

impl ReuseLinks {
    pub fn new(repo: &RepoRef) -> Self {
        let repo_url = repo.repo_url();
        Self {
            vscode: format!("https://vscode.dev/github/{}", repo.slug),
            zip: format!("{repo_url}/archive/refs/heads/{}.zip", repo.branch),
            github_desktop: format!("x-github-client://openRepo/{repo_url}"),
            codespaces: format!(
                "https://github.com/codespaces/new?repo={}&ref={}",
                repo.slug, repo.branch
            ),
            kaggle: KAGGLE_NEW_NOTEBOOK.to_string(),
        }
    }
}

/// Launch links for a single notebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookLinks {
    pub colab: String,
    pub binder: String,
    pub nbviewer: String,
    pub github: String,
    pub raw: String,
}

impl NotebookLinks {
    pub fn new(repo: &RepoRef, rel: &str) -> Self {
        let path = escape_path(rel);
        let RepoRef { slug, branch } = repo;
        Self {
            colab: format!("https://colab.research.google.com/github/{slug}/blob/{branch}/{path}"),
            binder: format!("https://mybinder.org/v2/gh/{slug}/{branch}?filepath={path}"),
            nbviewer: format!("https://nbviewer.org/github/{slug}/blob/{branch}/{path}"),
            github: format!("{}/blob/{branch}/{path}", repo.repo_url()),
            raw: format!("https://raw.githubusercontent.com/{slug}/{branch}/{path}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// One notebook as it appears on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub title: String,
    /// Repository-relative path with `/` separators.
    pub rel: String,
}

/// Outcome of [`generate_page`].
#[derive(Debug, Clone)]
pub struct PageResult {
    pub path: PathBuf,
    pub notebook_count: usize,
}

fn button(class: &str, href: &str, tooltip: &str, label: &str) -> String {
    format!(r#"<a class="btn btn-sm {class}" href="{href}" title="{tooltip}">{label}</a>"#)
}

/// Render the full page. Lines are joined with `\n` and no trailing newline
/// is added.
pub fn render_page(repo: &RepoRef, entries: &[PageEntry]) -> String {
    let reuse = ReuseLinks::new(repo);

    let mut lines: Vec<String> = vec![
        "---".into(),
        r#"title: "Notebooks""#.into(),
        "---".into(),
        "".into(),
        "Diese Seite wird automatisch aus den vorhandenen `.ipynb`-Dateien erzeugt.".into(),
        "".into(),
        "Hinweis: Auf GitHub Pages werden Notebooks **nicht ausgeführt**; es werden nur vorhandene Outputs gerendert.".into(),
        "".into(),
        "## Nachnutzen".into(),
        "".into(),
        "::: {.launch-buttons}".into(),
        button(
            "btn-outline-primary",
            &reuse.vscode,
            "Repository im Browser öffnen (zum Ansehen/Bearbeiten; nicht zum Ausführen)",
            "VS Code (Web)",
        ),
        button(
            "btn-outline-primary",
            &reuse.zip,
            "Repository als ZIP herunterladen",
            "Download ZIP",
        ),
        button(
            "btn-outline-primary",
            &reuse.github_desktop,
            "Repository in GitHub Desktop öffnen",
            "GitHub Desktop",
        ),
        button(
            "btn-outline-primary",
            &reuse.codespaces,
            "Repository in GitHub Codespaces starten (Cloud-IDE)",
            "Codespaces",
        ),
        button(
            "btn-outline-primary",
            &reuse.kaggle,
            "Neues Kaggle-Notebook anlegen; anschließend via GitHub importieren",
            "Kaggle",
        ),
        ":::".into(),
        "".into(),
        "Kaggle-Import: im Editor *File → Import Notebook → GitHub*.".into(),
        "".into(),
    ];

    if entries.is_empty() {
        lines.push(EMPTY_STATE.into());
        lines.push("".into());
    }

    for entry in entries {
        let links = NotebookLinks::new(repo, &entry.rel);
        lines.extend([
            format!("## {}", entry.title),
            "".into(),
            "::: {.launch-buttons}".into(),
            button("btn-primary", &links.colab, "Notebook in Google Colab öffnen", "Colab"),
            button(
                "btn-secondary",
                &links.binder,
                "Notebook in Binder starten (reproduzierbare Umgebung; Start kann dauern)",
                "Binder",
            ),
            button(
                "btn-outline-secondary",
                &links.nbviewer,
                "Notebook nur ansehen (nbviewer)",
                "nbviewer",
            ),
            button(
                "btn-outline-secondary",
                &links.github,
                "Notebook auf GitHub ansehen",
                "GitHub",
            ),
            button(
                "btn-outline-secondary",
                &links.raw,
                "Notebook-Datei (.ipynb) direkt herunterladen",
                "Download",
            ),
            ":::".into(),
            "".into(),
            format!("- Seite: [{rel}]({rel})", rel = entry.rel),
            "".into(),
        ]);
    }

    lines.join("\n")
}

/// Write the page, replacing any existing file.
pub fn write_page(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| NotebookCiError::io(path, e))
}

/// Discover notebooks, extract titles, render, and write the page.
#[instrument(skip_all, fields(root = %config.root.display(), slug = %config.repo.slug))]
pub fn generate_page(config: &PageConfig, opts: &DiscoveryOptions) -> Result<PageResult> {
    let notebooks = discover_notebooks(&config.root, opts)?;

    let entries: Vec<PageEntry> = notebooks
        .iter()
        .map(|nb| PageEntry {
            title: notebook_title(nb),
            rel: nb.rel.clone(),
        })
        .collect();

    let contents = render_page(&config.repo, &entries);
    write_page(&config.output_path, &contents)?;

    info!(
        path = %config.output_path.display(),
        notebooks = entries.len(),
        "notebooks page written"
    );

    Ok(PageResult {
        path: config.output_path.clone(),
        notebook_count: entries.len(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
