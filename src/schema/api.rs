//! JSON schedule backend: one document per talk at `<base>/talks/<id>.json`.
//!
//! Field names follow the schedule export. Both spellings seen across
//! releases are accepted, and when a document carries both the first one
//! wins: `summary` over `description`, `media` over `recordings`, and
//! `filename` over `title` for attachments. Unknown fields (including the
//! document's own `id`/`code`) are ignored.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::language::normalize_language;
use super::utils::{absolutize_url, attachment_from_url, directory_url};
use super::{
    Attachment, Link, MediaVariant, ResolveError, SchemaAdapter, TalkRecord, fetch_document,
};
use crate::event::{EventConfig, SchemaKind};
use crate::fetch::Fetcher;

#[derive(Debug, Deserialize)]
struct ApiTalk {
    title: Option<String>,
    subtitle: Option<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    language: Option<String>,
    links: Option<Vec<ApiLink>>,
    attachments: Option<Vec<ApiAttachment>>,
    media: Option<Vec<ApiMedia>>,
    recordings: Option<Vec<ApiMedia>>,
}

#[derive(Debug, Deserialize)]
struct ApiLink {
    title: Option<String>,
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiAttachment {
    url: String,
    filename: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMedia {
    format: String,
    quality: String,
    url: String,
}

/// Adapter for the JSON schedule API.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiSchema;

impl ApiSchema {
    /// Creates the adapter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SchemaAdapter for ApiSchema {
    fn kind(&self) -> SchemaKind {
        SchemaKind::Api
    }

    fn detail_url(&self, talk_id: &str, event: &EventConfig) -> Result<String, ResolveError> {
        let valid = !talk_id.is_empty()
            && talk_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ResolveError::parse(
                talk_id,
                "api schedule talk ids must be alphanumeric (with '-' or '_')",
            ));
        }
        Ok(format!("{}/talks/{talk_id}.json", event.base_url_trimmed()))
    }

    #[instrument(skip(self, event, fetcher), fields(event = %event.name))]
    async fn resolve(
        &self,
        talk_id: &str,
        event: &EventConfig,
        fetcher: &dyn Fetcher,
    ) -> Result<TalkRecord, ResolveError> {
        let url = self.detail_url(talk_id, event)?;
        let base = directory_url(&event.base_url).ok_or_else(|| {
            ResolveError::parse(talk_id, format!("invalid event base URL {}", event.base_url))
        })?;
        let body = fetch_document(talk_id, &url, fetcher).await?;
        parse_talk_json(talk_id, &body, &base)
    }
}

/// Decodes a talk JSON document into a [`TalkRecord`].
///
/// Relative URLs are resolved against `base`.
///
/// # Errors
///
/// Returns [`ResolveError::Parse`] if the body is not valid JSON of the
/// expected shape or carries no title.
pub fn parse_talk_json(talk_id: &str, body: &[u8], base: &Url) -> Result<TalkRecord, ResolveError> {
    let talk: ApiTalk = serde_json::from_slice(body)
        .map_err(|e| ResolveError::parse(talk_id, format!("invalid talk JSON: {e}")))?;

    let title = talk
        .title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .ok_or_else(|| ResolveError::parse(talk_id, "talk JSON has no title"))?;

    let links = talk
        .links
        .unwrap_or_default()
        .into_iter()
        .filter_map(|link| {
            let url = absolutize_url(&link.url, base)?;
            let label = link
                .title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| url.to_string());
            Some(Link {
                label,
                url: url.to_string(),
            })
        })
        .collect();

    let attachments: Vec<Attachment> = talk
        .attachments
        .unwrap_or_default()
        .into_iter()
        .filter_map(|attachment| {
            let url = absolutize_url(&attachment.url, base)?;
            let filename = attachment.filename.or(attachment.title);
            attachment_from_url(&url, filename.as_deref())
        })
        .collect();

    let media_variants: Vec<MediaVariant> = talk
        .media
        .or(talk.recordings)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|media| match absolutize_url(&media.url, base) {
            Some(url) => Some(MediaVariant::new(media.format, media.quality, url.to_string())),
            None => {
                debug!(talk_id, url = %media.url, "skipping media entry with unusable URL");
                None
            }
        })
        .collect();

    debug!(
        talk_id,
        variants = media_variants.len(),
        "parsed api talk document"
    );

    Ok(TalkRecord {
        id: talk_id.to_string(),
        title,
        subtitle: talk.subtitle.unwrap_or_default().trim().to_string(),
        abstract_text: talk.abstract_text.unwrap_or_default().trim().to_string(),
        summary: talk
            .summary
            .or(talk.description)
            .unwrap_or_default()
            .trim()
            .to_string(),
        language: normalize_language(talk.language.as_deref()),
        links,
        attachments,
        media_variants,
    })
}
