//! Legacy schedule backend: one HTML detail page per talk at
//! `<base>/events/<id>.html`.

use std::collections::HashSet;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, instrument};
use url::Url;

use super::language::normalize_language;
use super::utils::{
    ClassElement, absolutize_url, attachment_from_url, capture_first, compile_static_regex,
    html_to_text,
};
use super::{Link, MediaVariant, ResolveError, SchemaAdapter, TalkRecord, fetch_document};
use crate::download::filename::extension_from_url;
use crate::event::{EventConfig, SchemaKind};
use crate::fetch::Fetcher;

/// File extensions recognized as recordings.
pub const MEDIA_EXTENSIONS: [&str; 9] =
    ["webm", "mp4", "mkv", "ogv", "m4v", "mov", "mp3", "opus", "ogg"];

/// Label used when no quality token appears in the filename.
pub const UNKNOWN_QUALITY: &str = "unknown";

static TITLE: LazyLock<ClassElement> = LazyLock::new(|| ClassElement::new("h2", "title"));
static SUBTITLE: LazyLock<ClassElement> = LazyLock::new(|| ClassElement::new("h3", "subtitle"));
static ABSTRACT: LazyLock<ClassElement> = LazyLock::new(|| ClassElement::new("p", "abstract"));
static DESCRIPTION: LazyLock<ClassElement> =
    LazyLock::new(|| ClassElement::new("div", "description"));
static LANGUAGE: LazyLock<ClassElement> = LazyLock::new(|| ClassElement::new("span", "language"));
static LINKS: LazyLock<ClassElement> = LazyLock::new(|| ClassElement::new("ul", "links"));
static ATTACHMENTS: LazyLock<ClassElement> =
    LazyLock::new(|| ClassElement::new("table", "attachments"));
static META_LANGUAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#"(?is)<meta\s+[^>]*name\s*=\s*["']language["'][^>]*content\s*=\s*["']([^"']+)["']"#,
    )
});
static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?is)<a\b[^>]*\bhref\s*=\s*["']([^"']+)["'][^>]*>(.*?)</a\s*>"#)
});
static MEDIA_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?is)<(?:video|source)\b[^>]*\bsrc\s*=\s*["']([^"']+)["']"#)
});

/// Adapter for the legacy HTML schedule pages.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacySchema;

impl LegacySchema {
    /// Creates the adapter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SchemaAdapter for LegacySchema {
    fn kind(&self) -> SchemaKind {
        SchemaKind::Legacy
    }

    fn detail_url(&self, talk_id: &str, event: &EventConfig) -> Result<String, ResolveError> {
        if talk_id.is_empty() || !talk_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ResolveError::parse(
                talk_id,
                "legacy schedule talk ids must be numeric",
            ));
        }
        Ok(format!("{}/events/{talk_id}.html", event.base_url_trimmed()))
    }

    #[instrument(skip(self, event, fetcher), fields(event = %event.name))]
    async fn resolve(
        &self,
        talk_id: &str,
        event: &EventConfig,
        fetcher: &dyn Fetcher,
    ) -> Result<TalkRecord, ResolveError> {
        let url = self.detail_url(talk_id, event)?;
        let page_url = Url::parse(&url)
            .map_err(|e| ResolveError::parse(talk_id, format!("invalid detail URL {url}: {e}")))?;
        let body = fetch_document(talk_id, &url, fetcher).await?;
        let html = String::from_utf8_lossy(&body);
        parse_detail_page(talk_id, &html, &page_url)
    }
}

/// Parses a legacy detail page into a [`TalkRecord`].
///
/// Relative URLs are resolved against `page_url`.
///
/// # Errors
///
/// Returns [`ResolveError::Parse`] when the page has no title node.
pub fn parse_detail_page(
    talk_id: &str,
    html: &str,
    page_url: &Url,
) -> Result<TalkRecord, ResolveError> {
    let title = TITLE.inner(html)
        .map(html_to_text)
        .filter(|title| !title.is_empty())
        .ok_or_else(|| ResolveError::parse(talk_id, "detail page has no title node"))?;

    let text_of = |element: &ClassElement| element.inner(html).map(html_to_text).unwrap_or_default();

    let language_raw = LANGUAGE.inner(html)
        .map(html_to_text)
        .or_else(|| capture_first(html, &META_LANGUAGE_RE).map(html_to_text));

    let links = LINKS.inner(html)
        .map(|block| extract_links(block, page_url))
        .unwrap_or_default();

    let attachments: Vec<_> = ATTACHMENTS.inner(html)
        .map(|block| {
            ANCHOR_RE
                .captures_iter(block)
                .filter_map(|caps| absolutize_url(&caps[1], page_url))
                .filter_map(|url| attachment_from_url(&url, None))
                .collect()
        })
        .unwrap_or_default();

    let media_variants = extract_media_variants(html, page_url);
    debug!(
        talk_id,
        variants = media_variants.len(),
        "parsed legacy detail page"
    );

    Ok(TalkRecord {
        id: talk_id.to_string(),
        title,
        subtitle: text_of(&SUBTITLE),
        abstract_text: text_of(&ABSTRACT),
        summary: text_of(&DESCRIPTION),
        language: normalize_language(language_raw.as_deref()),
        links,
        attachments,
        media_variants,
    })
}

fn extract_links(block: &str, page_url: &Url) -> Vec<Link> {
    ANCHOR_RE
        .captures_iter(block)
        .filter_map(|caps| {
            let url = absolutize_url(&caps[1], page_url)?;
            let label = html_to_text(&caps[2]);
            Some(Link {
                label: if label.is_empty() {
                    url.to_string()
                } else {
                    label
                },
                url: url.to_string(),
            })
        })
        .collect()
}

fn extract_media_variants(html: &str, page_url: &Url) -> Vec<MediaVariant> {
    let candidates = MEDIA_SRC_RE
        .captures_iter(html)
        .chain(ANCHOR_RE.captures_iter(html))
        .filter_map(|caps| absolutize_url(&caps[1], page_url));

    let mut seen = HashSet::new();
    let mut variants = Vec::new();
    for url in candidates {
        let Some(format) = media_format(&url) else {
            continue;
        };
        if !seen.insert(url.to_string()) {
            continue;
        }
        let quality = infer_quality(&url);
        variants.push(MediaVariant::new(format, quality, url.to_string()));
    }
    variants
}

/// Lowercase media extension of `url`, if it is one of [`MEDIA_EXTENSIONS`].
fn media_format(url: &Url) -> Option<String> {
    extension_from_url(url).filter(|ext| MEDIA_EXTENSIONS.contains(&ext.as_str()))
}

/// Infers a quality label from the filename tokens of `url`.
///
/// The first token naming a quality wins; resolution tokens map onto the
/// nearest label. Falls back to [`UNKNOWN_QUALITY`].
#[must_use]
pub fn infer_quality(url: &Url) -> String {
    let Some(filename) = url.path_segments().and_then(|mut segments| segments.next_back()) else {
        return UNKNOWN_QUALITY.to_string();
    };
    let stem = filename.rsplit_once('.').map_or(filename, |(stem, _)| stem);
    stem.split(|c: char| !c.is_ascii_alphanumeric())
        .find_map(|token| quality_for_token(&token.to_ascii_lowercase()))
        .unwrap_or(UNKNOWN_QUALITY)
        .to_string()
}

fn quality_for_token(token: &str) -> Option<&'static str> {
    match token {
        "uhd" | "2160p" => Some("uhd"),
        "hd" | "1080p" | "720p" => Some("hd"),
        "hq" => Some("hq"),
        "sd" | "576p" | "480p" | "360p" => Some("sd"),
        "lq" => Some("lq"),
        _ => None,
    }
}
