//! Filename helpers shared by the schema adapters and the output layout.

use std::collections::HashSet;
use std::path::{Component, Path};

use tracing::debug;
use url::Url;

/// Sanitizes a single path component for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems
/// (`/ \ : * ? " < > |`) and control characters. Components that would
/// still navigate (`.`, `..`) have their dots replaced.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

/// Filename from the last URL path segment (query string ignored), decoded and sanitized.
#[must_use]
pub fn filename_from_url(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    if last.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(last).map_or_else(
        |e| {
            debug!(segment = %last, error = %e, "URL decoding failed, using raw segment");
            last.to_string()
        },
        std::borrow::Cow::into_owned,
    );
    Some(sanitize_filename(&decoded))
}

/// Lowercase extension of the last URL path segment, if any.
#[must_use]
pub fn extension_from_url(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    let (stem, ext) = last.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Returns `name`, or `stem-2.ext`, `stem-3.ext`, ... if it is already in `taken`.
///
/// The returned name is inserted into `taken`. Names without an extension
/// get the suffix appended.
pub fn claim_unique_filename(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    let mut counter = 2_u32;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{stem}-{counter}.{ext}"),
            None => format!("{name}-{counter}"),
        };
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}
