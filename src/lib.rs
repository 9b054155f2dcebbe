//! Fahrplan Core Library
//!
//! Downloads conference talk recordings together with their attachments and
//! a plain-text summary, driven by talk ids from an event schedule.
//!
//! # Architecture
//!
//! - [`event`] - Event registry: name, schedule backend, base URL
//! - [`schema`] - Schema adapters turning a talk id into a [`schema::TalkRecord`]
//! - [`selector`] - Picks one media variant by format and quality preference
//! - [`download`] - Per-talk pipeline, output layout, metadata, failure log
//! - [`fetch`] - HTTP access behind the [`fetch::Fetcher`] trait
//! - [`talk_ids`] - Id lists from arguments, files and favourites exports
//! - [`config`] - Config file loading and settings resolution

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod download;
pub mod event;
pub mod fetch;
pub mod schema;
pub mod selector;
pub mod talk_ids;
mod user_agent;

// Re-export commonly used types
pub use config::{ConfigError, FileConfig, Settings};
pub use download::{DownloadOrchestrator, DownloadResult, DownloadStatus, FailureKind, RunSummary};
pub use event::{EventConfig, EventError, EventRegistry, SchemaKind};
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use schema::{ResolveError, SchemaAdapter, TalkRecord};
pub use selector::{QualityPreference, SelectError, select};
