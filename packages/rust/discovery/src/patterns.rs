//! Exclude-pattern loading and glob matching.
//!
//! Patterns follow shell `fnmatch` rules: `*` matches any run of characters
//! (including `/`), `?` matches one character, and `[...]` / `[!...]` are
//! character classes. Matching is anchored and case-sensitive.

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use notebook_ci_shared::{NotebookCiError, Result};

/// Collect exclude patterns from the `NOTEBOOK_EXCLUDE` value and the
/// pattern file, env patterns first, deduplicated in first-seen order.
///
/// A missing pattern file is not an error.
pub fn load_exclude_patterns(env_value: Option<&str>, file: &Path) -> Result<Vec<String>> {
    let mut patterns: Vec<String> = Vec::new();

    if let Some(raw) = env_value {
        patterns.extend(parse_env_patterns(raw));
    }

    if file.is_file() {
        let content =
            std::fs::read_to_string(file).map_err(|e| NotebookCiError::io(file, e))?;
        let from_file = parse_pattern_file(&content);
        debug!(path = %file.display(), count = from_file.len(), "loaded exclude file");
        patterns.extend(from_file);
    }

    Ok(dedup_preserving_order(patterns))
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn parse_env_patterns(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// One pattern per line; blank lines and `#` comments are ignored.
pub fn parse_pattern_file(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

fn dedup_preserving_order(patterns: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    patterns
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// ExcludeSet
// ---------------------------------------------------------------------------

/// A compiled list of exclude globs.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    compiled: Vec<Regex>,
}

impl ExcludeSet {
    /// Compile the given globs. A class left empty by reversed ranges
    /// (`[z-a]`) compiles to one that never matches.
    pub fn new(patterns: Vec<String>) -> Result<Self> {
        let compiled = patterns
            .iter()
            .map(|p| {
                Regex::new(&glob_to_regex(p)).map_err(|e| {
                    NotebookCiError::parse(format!("invalid exclude pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { compiled })
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// Whether a root-relative, `/`-separated path matches any pattern.
    /// An empty set never excludes.
    pub fn is_excluded(&self, rel_path: &str) -> bool {
        self.compiled.iter().any(|re| re.is_match(rel_path))
    }
}

/// Translate an `fnmatch`-style glob into an anchored regex.
fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("(?s)^");
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                // `**` and `*` are the same thing here
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i..end]));
                    i = end + 1;
                }
                None => out.push_str(r"\["),
            },
            other => out.push_str(&escape_char(other)),
        }
    }

    out.push('$');
    out
}

/// Index of the `]` closing a class whose body starts at `start`.
/// A `!` and a `]` directly after the opening bracket belong to the body.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if j < chars.len() && chars[j] == '!' {
        j += 1;
    }
    if j < chars.len() && chars[j] == ']' {
        j += 1;
    }
    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    (j < chars.len()).then_some(j)
}

fn translate_class(body: &[char]) -> String {
    let (negated, rest) = match body {
        ['!', tail @ ..] => (true, tail),
        _ => (false, body),
    };

    // Reversed ranges such as `z-a` can never match and are dropped.
    let items: Vec<String> = class_items(rest)
        .into_iter()
        .filter_map(|(lo, hi)| match hi {
            None => Some(escape_char(lo)),
            Some(hi) if lo <= hi => Some(format!("{}-{}", escape_char(lo), escape_char(hi))),
            Some(_) => None,
        })
        .collect();

    match (items.is_empty(), negated) {
        (true, false) => r"[^\s\S]".to_string(),
        (true, true) => ".".to_string(),
        (false, negated) => {
            let prefix = if negated { "^" } else { "" };
            format!("[{prefix}{}]", items.concat())
        }
    }
}

/// Split a class body into single characters and `lo-hi` ranges. A `-` at
/// either end is literal.
fn class_items(body: &[char]) -> Vec<(char, Option<char>)> {
    let mut items = Vec::new();
    let mut i = 0;
    while i < body.len() {
        if i + 2 < body.len() && body[i + 1] == '-' {
            items.push((body[i], Some(body[i + 2])));
            i += 3;
        } else {
            items.push((body[i], None));
            i += 1;
        }
    }
    items
}

fn escape_char(c: char) -> String {
    regex::escape(c.encode_utf8(&mut [0; 4]))
}
