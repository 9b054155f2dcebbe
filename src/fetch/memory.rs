//! In-memory [`Fetcher`] for unit tests: canned responses and a request log.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{FetchError, Fetcher};

#[derive(Debug, Clone)]
enum Canned {
    Body(Vec<u8>),
    Status(u16),
    Timeout,
}

/// Serves canned bodies by exact URL; unknown URLs answer 404.
#[derive(Debug, Default)]
pub(crate) struct MemoryFetcher {
    responses: HashMap<String, Canned>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_body(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.responses
            .insert(url.to_string(), Canned::Body(body.into()));
        self
    }

    pub(crate) fn with_status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(url.to_string(), Canned::Status(status));
        self
    }

    pub(crate) fn with_timeout(mut self, url: &str) -> Self {
        self.responses.insert(url.to_string(), Canned::Timeout);
        self
    }

    /// URLs requested so far, in order.
    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests().len()
    }

    fn respond(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        match self.responses.get(url) {
            Some(Canned::Body(body)) => Ok(body.clone()),
            Some(Canned::Status(status)) => Err(FetchError::from_status(url, *status)),
            Some(Canned::Timeout) => Err(FetchError::timeout(url)),
            None => Err(FetchError::from_status(url, 404)),
        }
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.respond(url)
    }

    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let body = self.respond(url)?;
        tokio::fs::write(dest, &body)
            .await
            .map_err(|e| FetchError::io(dest.to_path_buf(), e))?;
        Ok(body.len() as u64)
    }
}
