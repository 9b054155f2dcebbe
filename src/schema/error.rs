//! Error types for talk resolution.
//!
//! Every variant carries the talk id so a per-talk failure can be reported
//! without extra context from the caller.

use thiserror::Error;

use crate::fetch::FetchError;

/// Errors that can occur while resolving a talk id into a [`TalkRecord`](super::TalkRecord).
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The schedule server has no such talk.
    #[error("talk '{talk_id}' not found at {url}\n  Suggestion: check the talk id and the selected event")]
    NotFound {
        /// The talk id that was requested.
        talk_id: String,
        /// The detail URL that returned "not found".
        url: String,
    },

    /// The id was malformed or the fetched document had an unexpected shape.
    #[error("could not parse talk '{talk_id}': {reason}")]
    Parse {
        /// The talk id being resolved.
        talk_id: String,
        /// What was missing or malformed.
        reason: String,
    },

    /// The detail document could not be fetched.
    #[error("network error resolving talk '{talk_id}': {reason}\n  Suggestion: check connectivity and retry")]
    Network {
        /// The talk id being resolved.
        talk_id: String,
        /// The underlying transport failure.
        reason: String,
    },
}

impl ResolveError {
    /// Creates a `Parse` error.
    #[must_use]
    pub fn parse(talk_id: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            talk_id: talk_id.to_string(),
            reason: reason.into(),
        }
    }

    /// Maps a fetch failure of the detail document for `talk_id`.
    ///
    /// "Not found" responses become [`ResolveError::NotFound`]; everything
    /// else is a [`ResolveError::Network`] failure.
    #[must_use]
    pub fn from_fetch(talk_id: &str, url: &str, error: &FetchError) -> Self {
        if error.is_not_found() {
            Self::NotFound {
                talk_id: talk_id.to_string(),
                url: url.to_string(),
            }
        } else {
            Self::Network {
                talk_id: talk_id.to_string(),
                reason: error.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fetch_not_found() {
        let fetch = FetchError::from_status("https://example.com/events/1.html", 404);
        let err = ResolveError::from_fetch("1", "https://example.com/events/1.html", &fetch);
        assert!(matches!(err, ResolveError::NotFound { .. }));
        assert!(err.to_string().contains("'1'"));
    }

    #[test]
    fn test_from_fetch_other_status_is_network() {
        let fetch = FetchError::from_status("https://example.com/events/1.html", 503);
        let err = ResolveError::from_fetch("1", "https://example.com/events/1.html", &fetch);
        assert!(matches!(err, ResolveError::Network { .. }));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_parse_error_names_talk_id() {
        let err = ResolveError::parse("6258", "missing title node");
        let msg = err.to_string();
        assert!(msg.contains("6258"), "should contain id: {msg}");
        assert!(msg.contains("missing title node"), "should contain reason: {msg}");
    }
}
