//! Fetch capability: retrieve documents and stream large bodies to disk.
//!
//! The schema adapters and the download orchestrator only ever talk to the
//! network through the [`Fetcher`] trait, so tests can substitute an
//! in-memory implementation and count the requests made.
//!
//! # Example
//!
//! ```no_run
//! use fahrplan_core::fetch::{FetchTimeouts, Fetcher, HttpFetcher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = HttpFetcher::new(FetchTimeouts::default())?;
//! let body = fetcher.fetch("https://example.com/events/6258.html").await?;
//! println!("fetched {} bytes", body.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
#[cfg(test)]
pub(crate) mod memory;

pub use client::{FetchTimeouts, HttpFetcher};
pub use error::FetchError;

use std::path::Path;

use async_trait::async_trait;

/// Anonymous, read-only access to remote resources.
///
/// # Object Safety
///
/// Uses `async_trait` so the orchestrator can hold a `&dyn Fetcher`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches the full body of `url` into memory.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    /// Streams the body of `url` into `dest`, returning the bytes written.
    ///
    /// Implementations must not leave a partially written `dest` behind on
    /// failure.
    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64, FetchError>;
}
