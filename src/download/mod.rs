//! Download orchestration: turn an ordered id list into files on disk.
//!
//! # Features
//!
//! - Sequential per-talk pipeline with per-talk failure isolation
//! - Idempotent re-runs (completed talks are skipped before any request)
//! - Videos streamed through a `.part` file
//! - Attachment failures recorded without failing the talk
//! - Plain-text metadata and a re-feedable failure log
//!
//! # Example
//!
//! ```no_run
//! use fahrplan_core::download::{DownloadOrchestrator, OrchestratorOptions, RunSummary};
//! use fahrplan_core::event::EventRegistry;
//! use fahrplan_core::fetch::{FetchTimeouts, HttpFetcher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = EventRegistry::builtin();
//! let event = registry.resolve("36c3")?;
//! let fetcher = HttpFetcher::new(FetchTimeouts::default())?;
//!
//! let orchestrator = DownloadOrchestrator::new(event, &fetcher, OrchestratorOptions::default());
//! let results = orchestrator.run(&["10500".to_string()]).await;
//! println!("{}", RunSummary::from_results(&results));
//! # Ok(())
//! # }
//! ```

mod failure_log;
pub mod filename;
mod layout;
mod metadata;
mod orchestrator;
mod pacer;
mod result;

pub use failure_log::{append_failures, failure_log_path, render_failure_block};
pub use layout::{ATTACHMENTS_DIR, METADATA_FILE, TalkLayout};
pub use metadata::{render_metadata, wrap_text};
pub use orchestrator::{DEFAULT_MIN_DELAY, DownloadOrchestrator, OrchestratorOptions};
pub use pacer::TalkPacer;
pub use result::{AttachmentFailure, DownloadResult, DownloadStatus, FailureKind, RunSummary};
