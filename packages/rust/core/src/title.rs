//! Notebook title extraction.
//!
//! The title is taken from the first markdown cell that has something usable:
//! its first `#` heading, or failing that its first non-empty line. Anything
//! else (unreadable file, invalid JSON, no markdown) falls back to the file
//! stem.

use serde::Deserialize;
use tracing::debug;

use notebook_ci_shared::NotebookPath;

/// The subset of the nbformat document needed for titles.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub cell_type: String,
    #[serde(default)]
    pub source: Option<CellSource>,
}

/// nbformat allows `source` as one string or as a list of line strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CellSource {
    Text(String),
    Lines(Vec<String>),
}

impl Cell {
    pub fn is_markdown(&self) -> bool {
        self.cell_type == "markdown"
    }

    /// Source split into lines, each trimmed.
    pub fn lines(&self) -> Vec<&str> {
        match &self.source {
            Some(CellSource::Text(text)) => split_lines(text).map(str::trim).collect(),
            Some(CellSource::Lines(lines)) => lines
                .iter()
                .flat_map(|line| split_lines(line))
                .map(str::trim)
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Split on `\n`, `\r\n` and a lone `\r`.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().flat_map(|line| line.split('\r'))
}

/// Pick a title from parsed notebook JSON.
pub fn title_from_notebook(notebook: &Notebook, stem: &str) -> String {
    for cell in notebook.cells.iter().filter(|c| c.is_markdown()) {
        let lines = cell.lines();

        if let Some(heading) = lines.iter().find(|line| line.starts_with('#')) {
            let text = heading.trim_start_matches('#').trim();
            // A bare `#` ends the search rather than falling through.
            return if text.is_empty() { stem.to_string() } else { text.to_string() };
        }

        if let Some(first) = lines.iter().find(|line| !line.is_empty()) {
            return first.to_string();
        }
    }

    stem.to_string()
}

/// Read and parse a notebook file, then pick its title.
pub fn notebook_title(notebook: &NotebookPath) -> String {
    let stem = notebook.stem();

    let content = match std::fs::read_to_string(&notebook.path) {
        Ok(content) => content,
        Err(e) => {
            debug!(rel = %notebook.rel, error = %e, "unreadable notebook, using file stem");
            return stem;
        }
    };

    match serde_json::from_str::<Notebook>(&content) {
        Ok(parsed) => title_from_notebook(&parsed, &stem),
        Err(e) => {
            debug!(rel = %notebook.rel, error = %e, "invalid notebook JSON, using file stem");
            stem
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn parse(json: &str) -> Notebook {
        serde_json::from_str(json).expect("valid notebook JSON")
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nbci-title-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn heading_in_first_markdown_cell() {
        let nb = parse(
            r###"{"cells": [
                {"cell_type": "code", "source": "# not markdown"},
                {"cell_type": "markdown", "source": "# My Title\nbody"}
            ]}"###,
        );
        assert_eq!(title_from_notebook(&nb, "stem"), "My Title");
    }

    #[test]
    fn list_source_with_deeper_heading() {
        let nb = parse(
            r###"{"cells": [{"cell_type": "markdown", "source": ["Intro text\n", "\n", "## Besucherstatistik  \n"]}]}"###,
        );
        assert_eq!(title_from_notebook(&nb, "stem"), "Besucherstatistik");
    }

    #[test]
    fn first_non_empty_line_without_heading() {
        let nb = parse(
            r###"{"cells": [{"cell_type": "markdown", "source": ["\n", "  Overview of uploads\n", "more"]}]}"###,
        );
        assert_eq!(title_from_notebook(&nb, "stem"), "Overview of uploads");
    }

    #[test]
    fn empty_markdown_cell_falls_through_to_next() {
        let nb = parse(
            r###"{"cells": [
                {"cell_type": "markdown", "source": ["   \n", ""]},
                {"cell_type": "markdown", "source": null},
                {"cell_type": "markdown", "source": "# Second"}
            ]}"###,
        );
        assert_eq!(title_from_notebook(&nb, "stem"), "Second");
    }

    #[test]
    fn bare_heading_marker_uses_stem() {
        let nb = parse(
            r###"{"cells": [
                {"cell_type": "markdown", "source": "##\nSomething"},
                {"cell_type": "markdown", "source": "# Later"}
            ]}"###,
        );
        assert_eq!(title_from_notebook(&nb, "stem"), "stem");
    }

    #[test]
    fn carriage_return_separates_lines() {
        let nb = parse(r###"{"cells": [{"cell_type": "markdown", "source": "# Title\rbody"}]}"###);
        assert_eq!(title_from_notebook(&nb, "stem"), "Title");

        let nb = parse(
            r###"{"cells": [{"cell_type": "markdown", "source": ["\r", "intro\r## Heading\r\n"]}]}"###,
        );
        assert_eq!(title_from_notebook(&nb, "stem"), "Heading");
    }

    #[test]
    fn no_markdown_cells_uses_stem() {
        let nb = parse(r###"{"cells": [{"cell_type": "code", "source": "print(1)"}]}"###);
        assert_eq!(title_from_notebook(&nb, "federal_state"), "federal_state");

        let nb = parse(r###"{"metadata": {}}"###);
        assert_eq!(title_from_notebook(&nb, "empty"), "empty");
    }

    #[test]
    fn notebook_title_reads_file() {
        let dir = temp_dir();
        std::fs::write(
            dir.join("stats.ipynb"),
            r###"{"cells": [{"cell_type": "markdown", "metadata": {}, "source": ["# Jahresstatistik\n"]}], "nbformat": 4}"###,
        )
        .unwrap();

        let nb = NotebookPath::new(&dir, "stats.ipynb");
        assert_eq!(notebook_title(&nb), "Jahresstatistik");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn invalid_json_uses_stem() {
        let dir = temp_dir();
        std::fs::write(dir.join("broken.ipynb"), "{ not json").unwrap();

        let nb = NotebookPath::new(&dir, "broken.ipynb");
        assert_eq!(notebook_title(&nb), "broken");

        let missing = NotebookPath::new(&dir, "missing.ipynb");
        assert_eq!(notebook_title(&missing), "missing");

        std::fs::remove_dir_all(&dir).ok();
    }
}
