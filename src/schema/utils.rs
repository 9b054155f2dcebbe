//! Shared markup helpers for the schema adapters: static regexes, text
//! extraction from HTML fragments and URL joining.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use url::Url;

use super::Attachment;
use crate::download::filename::{filename_from_url, sanitize_filename};

/// Placeholder the legacy schedule serves when an uploaded file has gone missing.
const MISSING_ATTACHMENT_MARKER: &str = "attachments/original/missing.png";

/// Compiles a regex at static init; panics on invalid pattern.
pub fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(?s)<[^>]*>"));
static BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r"(?i)<br\s*/?>|</p\s*>|</div\s*>|</li\s*>|</h[1-6]\s*>")
});
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);"));
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"[ \t\r\f\v]+"));

/// Locator for the first `<tag class="... class ...">` element of a page.
///
/// The element ends at its matching close tag; same-name elements nested
/// inside it are balanced.
#[derive(Debug)]
pub struct ClassElement {
    open: Regex,
    tags: Regex,
}

impl ClassElement {
    /// Builds the locator for `tag` carrying `class`.
    #[must_use]
    pub fn new(tag: &str, class: &str) -> Self {
        Self {
            open: compile_static_regex(&format!(
                r#"(?is)<{tag}\b[^>]*\bclass\s*=\s*["'][^"']*\b{class}\b[^"']*["'][^>]*>"#
            )),
            tags: compile_static_regex(&format!(r"(?is)<(/?){tag}\b[^>]*?(/?)>")),
        }
    }

    /// Inner markup of the first matching element, or `None` if it is
    /// missing or never closed.
    #[must_use]
    pub fn inner<'h>(&self, html: &'h str) -> Option<&'h str> {
        let start = self.open.find(html)?.end();
        let mut depth = 1_usize;
        for caps in self.tags.captures_iter(&html[start..]) {
            let is_close = !caps[1].is_empty();
            let is_self_closing = !caps[2].is_empty();
            if is_close {
                depth -= 1;
                if depth == 0 {
                    let end = start + caps.get(0).map_or(0, |m| m.start());
                    return Some(&html[start..end]);
                }
            } else if !is_self_closing {
                depth += 1;
            }
        }
        None
    }
}

/// Returns the first capture group of `regex` in `html`.
#[must_use]
pub fn capture_first<'h>(html: &'h str, regex: &Regex) -> Option<&'h str> {
    regex
        .captures(html)
        .and_then(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Decodes the named and numeric HTML entities that appear in schedule pages.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    _ => None,
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

/// Converts an HTML fragment to plain text: block ends become line breaks,
/// tags are dropped, entities decoded, whitespace collapsed per line.
#[must_use]
pub fn html_to_text(fragment: &str) -> String {
    let with_breaks = BREAK_RE.replace_all(fragment, "\n");
    let without_tags = TAG_RE.replace_all(&with_breaks, "");
    let decoded = decode_entities(&without_tags);
    decoded
        .lines()
        .map(|line| SPACE_RE.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Resolves a possibly relative URL against `base`.
///
/// Protocol-relative `//host/...` values become `https:`.
#[must_use]
pub fn absolutize_url(value: &str, base: &Url) -> Option<Url> {
    let value = decode_entities(value.trim());
    if value.is_empty() {
        return None;
    }
    if let Some(rest) = value.strip_prefix("//") {
        return Url::parse(&format!("https://{rest}")).ok();
    }
    base.join(&value).ok()
}

/// Base URL with a trailing slash so `join` appends instead of replacing the last segment.
#[must_use]
pub fn directory_url(base: &str) -> Option<Url> {
    Url::parse(&format!("{}/", base.trim_end_matches('/'))).ok()
}

/// Builds an attachment entry, dropping the "file has gone missing" placeholder.
///
/// The filename is the explicit one when given, else the URL's last path segment.
#[must_use]
pub fn attachment_from_url(url: &Url, explicit_filename: Option<&str>) -> Option<Attachment> {
    if url.path().contains(MISSING_ATTACHMENT_MARKER) {
        return None;
    }
    let filename = explicit_filename
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(sanitize_filename)
        .or_else(|| filename_from_url(url))?;
    Some(Attachment {
        filename,
        url: url.to_string(),
    })
}
