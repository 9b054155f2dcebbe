//! Talk id sources: inline arguments and line-oriented id files.
//!
//! Ids are passed on verbatim; validation happens when a schema adapter
//! builds the detail URL.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::schema::utils::compile_static_regex;

/// Suffix of favourite lists exported from the schedule app.
pub const FAVOURITES_SUFFIX: &str = ".fav.list";

static FAVOURITE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"https?://.*/([^./]*)\.html"));

/// Errors reading an id file.
#[derive(Debug, Error)]
pub enum TalkIdError {
    /// The file could not be read.
    #[error("cannot read id file {path}: {source}")]
    Io {
        /// The id file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A favourites line looked like a URL but named no talk page.
    #[error("{path}:{line_number}: cannot extract a talk id from '{line}'")]
    InvalidFavourite {
        /// The favourites file.
        path: PathBuf,
        /// 1-based line number.
        line_number: usize,
        /// The offending line.
        line: String,
    },
}

/// Ids given on the command line, trimmed, blanks dropped.
#[must_use]
pub fn from_args<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    ids.into_iter()
        .map(|id| id.as_ref().trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

/// Parses a plain id list.
///
/// Blank lines and lines starting with `#` are skipped; a trailing
/// `# comment` after an id is removed.
#[must_use]
pub fn parse_id_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .map(|line| line.split('#').next().unwrap_or(line).trim())
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Parses a favourites export: every line starting with `http` must be a
/// talk page URL ending in `/<id>.html`. Other lines are ignored.
///
/// # Errors
///
/// Returns [`TalkIdError::InvalidFavourite`] for a URL line without an id.
pub fn parse_favourites(content: &str, path: &Path) -> Result<Vec<String>, TalkIdError> {
    let mut ids = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if !line.starts_with("http") {
            continue;
        }
        let id = FAVOURITE_URL_RE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| TalkIdError::InvalidFavourite {
                path: path.to_path_buf(),
                line_number: index + 1,
                line: line.to_string(),
            })?;
        ids.push(id.to_string());
    }
    Ok(ids)
}

/// Reads ids from `path`, choosing the favourites parser for `*.fav.list`.
///
/// # Errors
///
/// Returns [`TalkIdError::Io`] if the file cannot be read, or
/// [`TalkIdError::InvalidFavourite`] for a malformed favourites entry.
pub fn from_file(path: &Path) -> Result<Vec<String>, TalkIdError> {
    let content = std::fs::read_to_string(path).map_err(|source| TalkIdError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_favourites = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(FAVOURITES_SUFFIX));

    let ids = if is_favourites {
        parse_favourites(&content, path)?
    } else {
        parse_id_lines(&content)
    };
    debug!(path = %path.display(), count = ids.len(), favourites = is_favourites, "read id file");
    Ok(ids)
}

/// File ids first, then argument ids. Duplicates are kept.
#[must_use]
pub fn merge(from_args: Vec<String>, from_file: Vec<String>) -> Vec<String> {
    let mut merged = from_file;
    merged.extend(from_args);
    merged
}
