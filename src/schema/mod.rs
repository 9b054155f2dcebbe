//! Talk resolution: turn a talk id plus an event into a normalized [`TalkRecord`].
//!
//! Each schedule backend has its own [`SchemaAdapter`]:
//!
//! - [`LegacySchema`] - per-talk HTML detail pages (`<base>/events/<id>.html`)
//! - [`ApiSchema`] - per-talk JSON documents (`<base>/talks/<id>.json`)
//!
//! The adapter is picked once per run from [`EventConfig::schema`] via
//! [`adapter_for`]; the orchestrator never inspects markup itself.
//!
//! # Example
//!
//! ```no_run
//! use fahrplan_core::event::EventRegistry;
//! use fahrplan_core::fetch::{FetchTimeouts, HttpFetcher};
//! use fahrplan_core::schema::adapter_for;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = EventRegistry::builtin();
//! let event = registry.resolve("36c3")?;
//! let fetcher = HttpFetcher::new(FetchTimeouts::default())?;
//!
//! let talk = adapter_for(event.schema).resolve("10500", event, &fetcher).await?;
//! println!("{}: {} media variants", talk.title, talk.media_variants.len());
//! # Ok(())
//! # }
//! ```

mod api;
mod error;
mod language;
mod legacy;
pub(crate) mod utils;

pub use api::{ApiSchema, parse_talk_json};
pub use error::ResolveError;
pub use language::{language_display_name, normalize_language};
pub use legacy::{LegacySchema, infer_quality, parse_detail_page};

use async_trait::async_trait;

use crate::event::{EventConfig, SchemaKind};
use crate::fetch::Fetcher;

/// A titled reference link from a talk page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Link text (falls back to the URL when the page gives none).
    pub label: String,
    /// Absolute target URL.
    pub url: String,
}

/// A file attached to a talk (slides, papers, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Sanitized local filename.
    pub filename: String,
    /// Absolute download URL.
    pub url: String,
}

/// One downloadable encoding of a talk recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaVariant {
    /// Container format, lowercase (`webm`, `mp4`, ...).
    pub format: String,
    /// Quality label (`hd`, `sd`, ...; `unknown` when it cannot be inferred).
    pub quality_label: String,
    /// Absolute download URL.
    pub url: String,
}

impl MediaVariant {
    /// Creates a variant; `format` is lowercased.
    #[must_use]
    pub fn new(
        format: impl Into<String>,
        quality_label: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            format: format.into().to_ascii_lowercase(),
            quality_label: quality_label.into(),
            url: url.into(),
        }
    }
}

/// Normalized talk data, identical in shape for both schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TalkRecord {
    /// The talk id as requested.
    pub id: String,
    /// Talk title.
    pub title: String,
    /// Subtitle, empty when absent.
    pub subtitle: String,
    /// Short abstract, empty when absent.
    pub abstract_text: String,
    /// Long description, empty when absent.
    pub summary: String,
    /// Display name of the talk language.
    pub language: Option<String>,
    /// Reference links in page order.
    pub links: Vec<Link>,
    /// Attached files in page order.
    pub attachments: Vec<Attachment>,
    /// Available recordings; may be empty.
    pub media_variants: Vec<MediaVariant>,
}

/// Resolves talk ids for one schedule backend.
///
/// # Object Safety
///
/// Uses `async_trait` so adapters can be selected at runtime as
/// `Box<dyn SchemaAdapter>`.
#[async_trait]
pub trait SchemaAdapter: Send + Sync {
    /// The backend this adapter understands.
    fn kind(&self) -> SchemaKind;

    /// Detail document URL for `talk_id` under `event`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Parse`] if the id cannot form a valid URL for
    /// this schema.
    fn detail_url(&self, talk_id: &str, event: &EventConfig) -> Result<String, ResolveError>;

    /// Fetches and parses the detail document for `talk_id`.
    async fn resolve(
        &self,
        talk_id: &str,
        event: &EventConfig,
        fetcher: &dyn Fetcher,
    ) -> Result<TalkRecord, ResolveError>;
}

/// Returns the adapter implementing `kind`.
#[must_use]
pub fn adapter_for(kind: SchemaKind) -> Box<dyn SchemaAdapter> {
    match kind {
        SchemaKind::Legacy => Box::new(LegacySchema::new()),
        SchemaKind::Api => Box::new(ApiSchema::new()),
    }
}

/// Fetches the detail document of `talk_id`, mapping transport failures.
async fn fetch_document(
    talk_id: &str,
    url: &str,
    fetcher: &dyn Fetcher,
) -> Result<Vec<u8>, ResolveError> {
    fetcher
        .fetch(url)
        .await
        .map_err(|error| ResolveError::from_fetch(talk_id, url, &error))
}
