//! reqwest-backed [`Fetcher`] implementation.
//!
//! One client is built per run and reused for every request, taking
//! advantage of connection pooling against the schedule and media hosts.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::{FetchError, Fetcher};
use crate::user_agent;

/// Default HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default per-read timeout (5 minutes, generous for slow media mirrors).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Connect and read timeouts for [`HttpFetcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTimeouts {
    /// Seconds allowed to establish a connection.
    pub connect_secs: u64,
    /// Seconds allowed between two successful reads of a response body.
    pub read_secs: u64,
}

impl Default for FetchTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: CONNECT_TIMEOUT_SECS,
            read_secs: READ_TIMEOUT_SECS,
        }
    }
}

/// HTTP fetcher with streaming support.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher with the given timeouts and the tool User-Agent.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the TLS backend or client
    /// configuration cannot be initialized.
    pub fn new(timeouts: FetchTimeouts) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .read_timeout(Duration::from_secs(timeouts.read_secs))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .map_err(|source| FetchError::ClientBuild { source })?;
        Ok(Self { client })
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "non-success response");
            return Err(FetchError::from_status(url, status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.send(url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| map_transport_error(url, e))?;
        debug!(bytes = body.len(), "fetched document");
        Ok(body.to_vec())
    }

    #[instrument(skip(self), fields(url = %url, dest = %dest.display()))]
    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let response = self.send(url).await?;

        let part_path = partial_path(dest);
        let mut file = File::create(&part_path)
            .await
            .map_err(|e| FetchError::io(part_path.clone(), e))?;

        let stream_result = stream_to_file(&mut file, response, url, &part_path).await;
        drop(file);

        let bytes_written = match stream_result {
            Ok(bytes) => bytes,
            Err(error) => {
                debug!(path = %part_path.display(), "cleaning up partial file after error");
                let _ = tokio::fs::remove_file(&part_path).await;
                return Err(error);
            }
        };

        tokio::fs::rename(&part_path, dest)
            .await
            .map_err(|e| FetchError::io(dest.to_path_buf(), e))?;

        info!(path = %dest.display(), bytes = bytes_written, "download complete");
        Ok(bytes_written)
    }
}

/// Sibling path used while a body is still streaming: `<dest>.part`.
#[must_use]
pub(crate) fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("download"));
    name.push(".part");
    dest.with_file_name(name)
}

fn map_transport_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::timeout(url)
    } else {
        FetchError::network(url, error)
    }
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, FetchError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| map_transport_error(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| FetchError::io(file_path.to_path_buf(), e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| FetchError::io(file_path.to_path_buf(), e))?;

    Ok(bytes_written)
}
