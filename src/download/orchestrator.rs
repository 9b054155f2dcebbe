//! Per-talk download pipeline.
//!
//! For every id, in order: idempotence check, id validation, pacing,
//! resolve, select, stream the video, fetch attachments, write metadata. Any error inside one talk
//! becomes a failed [`DownloadResult`]; the run always continues with the
//! next id.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::filename::claim_unique_filename;
use super::layout::TalkLayout;
use super::metadata::render_metadata;
use super::pacer::TalkPacer;
use super::result::{AttachmentFailure, DownloadResult, FailureKind};
use crate::event::EventConfig;
use crate::fetch::Fetcher;
use crate::schema::{SchemaAdapter, TalkRecord, adapter_for};
use crate::selector::{QualityPreference, select};

/// Default pause between two network-bound talks.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_secs(3);

/// Run-wide settings for [`DownloadOrchestrator`].
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Root below which `<event>/<talk>/` directories are created.
    pub output_root: PathBuf,
    /// Format and quality preference.
    pub preference: QualityPreference,
    /// Minimum delay between talks that touch the network.
    pub min_delay: Duration,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            preference: QualityPreference::default(),
            min_delay: DEFAULT_MIN_DELAY,
        }
    }
}

/// Drives the download of a list of talk ids for one event.
pub struct DownloadOrchestrator<'a> {
    event: &'a EventConfig,
    adapter: Box<dyn SchemaAdapter>,
    fetcher: &'a dyn Fetcher,
    options: OrchestratorOptions,
}

impl std::fmt::Debug for DownloadOrchestrator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadOrchestrator")
            .field("event", &self.event.name)
            .field("schema", &self.adapter.kind())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a> DownloadOrchestrator<'a> {
    /// Creates an orchestrator using the adapter for `event.schema`.
    #[must_use]
    pub fn new(
        event: &'a EventConfig,
        fetcher: &'a dyn Fetcher,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            event,
            adapter: adapter_for(event.schema),
            fetcher,
            options,
        }
    }

    /// Output layout for `talk_id` under the current event and format.
    #[must_use]
    pub fn layout_for(&self, talk_id: &str) -> TalkLayout {
        TalkLayout::new(
            &self.options.output_root,
            &self.event.name,
            talk_id,
            &self.options.preference.format,
        )
    }

    /// Processes `talk_ids` in order and returns one result per id.
    pub async fn run(&self, talk_ids: &[String]) -> Vec<DownloadResult> {
        self.run_with(talk_ids, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `on_result` after each talk.
    pub async fn run_with<F>(&self, talk_ids: &[String], mut on_result: F) -> Vec<DownloadResult>
    where
        F: FnMut(&DownloadResult),
    {
        let mut pacer = TalkPacer::new(self.options.min_delay);
        let mut results = Vec::with_capacity(talk_ids.len());
        for talk_id in talk_ids {
            let result = self.process_talk(talk_id, &mut pacer).await;
            on_result(&result);
            results.push(result);
        }
        results
    }

    #[instrument(skip(self, pacer), fields(event = %self.event.name))]
    async fn process_talk(&self, talk_id: &str, pacer: &mut TalkPacer) -> DownloadResult {
        let layout = self.layout_for(talk_id);
        if layout.is_complete() {
            info!(dir = %layout.dir().display(), "already downloaded, skipping");
            return DownloadResult::skipped(talk_id);
        }

        if let Err(error) = self.adapter.detail_url(talk_id, self.event) {
            warn!(error = %error, "invalid talk id");
            return DownloadResult::failed(talk_id, FailureKind::from(&error), error.to_string());
        }

        pacer.wait_turn().await;
        pacer.mark();

        let talk = match self.adapter.resolve(talk_id, self.event, self.fetcher).await {
            Ok(talk) => talk,
            Err(error) => {
                warn!(error = %error, "could not resolve talk");
                return DownloadResult::failed(
                    talk_id,
                    FailureKind::from(&error),
                    error.to_string(),
                );
            }
        };

        let variant = match select(&talk.media_variants, &self.options.preference) {
            Ok(variant) => variant,
            Err(error) => {
                warn!(error = %error, "no usable recording");
                return DownloadResult::failed(
                    talk_id,
                    FailureKind::from(&error),
                    format!("talk '{talk_id}': {error}"),
                );
            }
        };
        debug!(url = %variant.url, quality = %variant.quality_label, "selected recording");

        if let Err(error) = tokio::fs::create_dir_all(layout.dir()).await {
            return DownloadResult::failed(
                talk_id,
                FailureKind::Filesystem,
                format!(
                    "talk '{talk_id}': cannot create {}: {error}",
                    layout.dir().display()
                ),
            );
        }

        let video_path = layout.video_path();
        match self.fetcher.fetch_to_file(&variant.url, &video_path).await {
            Ok(bytes) => info!(path = %video_path.display(), bytes, "video saved"),
            Err(error) => {
                warn!(error = %error, "video download failed");
                let kind = if error.is_local() {
                    FailureKind::Filesystem
                } else {
                    FailureKind::NetworkError
                };
                return DownloadResult::failed(
                    talk_id,
                    kind,
                    format!("talk '{talk_id}': video download failed: {error}"),
                );
            }
        }

        let attachment_failures = self.download_attachments(&talk, &layout).await;

        let metadata_path = layout.metadata_path();
        if let Err(error) = tokio::fs::write(&metadata_path, render_metadata(&talk)).await {
            return DownloadResult::failed(
                talk_id,
                FailureKind::Filesystem,
                format!(
                    "talk '{talk_id}': cannot write {}: {error}",
                    metadata_path.display()
                ),
            );
        }

        info!(
            title = %talk.title,
            attachment_failures = attachment_failures.len(),
            "talk downloaded"
        );
        DownloadResult::downloaded(talk_id, attachment_failures)
    }

    /// Fetches every attachment independently; failures are collected, not propagated.
    async fn download_attachments(
        &self,
        talk: &TalkRecord,
        layout: &TalkLayout,
    ) -> Vec<AttachmentFailure> {
        if talk.attachments.is_empty() {
            return Vec::new();
        }

        let dir = layout.attachments_dir();
        if let Err(error) = tokio::fs::create_dir_all(&dir).await {
            warn!(dir = %dir.display(), error = %error, "cannot create attachment directory");
            return talk
                .attachments
                .iter()
                .map(|attachment| AttachmentFailure {
                    filename: attachment.filename.clone(),
                    reason: format!("cannot create {}: {error}", dir.display()),
                })
                .collect();
        }

        let mut taken = HashSet::new();
        let mut failures = Vec::new();
        for attachment in &talk.attachments {
            let filename = claim_unique_filename(&attachment.filename, &mut taken);
            let path = layout.attachment_path(&filename);
            match self.fetcher.fetch_to_file(&attachment.url, &path).await {
                Ok(bytes) => debug!(path = %path.display(), bytes, "attachment saved"),
                Err(error) => {
                    warn!(filename = %filename, error = %error, "attachment download failed");
                    failures.push(AttachmentFailure {
                        filename,
                        reason: error.to_string(),
                    });
                }
            }
        }
        failures
    }
}
