//! Error types for the fetch capability.
//!
//! The core only distinguishes "not found" from other transport failures, so
//! status codes are kept but not interpreted beyond [`FetchError::is_not_found`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching a document or streaming a file.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Server answered 404 or 410.
    #[error("not found: {url} (HTTP {status})")]
    NotFound {
        /// The URL that does not exist.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Any other non-success HTTP response.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// File system error while writing a streamed body.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Maps a non-success status to `NotFound` or `HttpStatus`.
    pub fn from_status(url: impl Into<String>, status: u16) -> Self {
        let url = url.into();
        if matches!(status, 404 | 410) {
            Self::NotFound { url, status }
        } else {
            Self::HttpStatus { url, status }
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// True when the server reported the resource as missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True when the failure happened on the local filesystem, not the network.
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
