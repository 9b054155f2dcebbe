//! Error types for event selection.
//!
//! Event errors are global: they abort a run before any talk is processed,
//! since no output directory or schema can be determined without an event.

use thiserror::Error;

/// Errors raised while selecting or validating an event.
#[derive(Debug, Clone, Error)]
pub enum EventError {
    /// The requested event name is not in the registry.
    #[error("unknown event '{name}'\n  Suggestion: use one of: {known}")]
    UnknownEvent {
        /// The event name that was requested.
        name: String,
        /// Comma-separated list of configured event names.
        known: String,
    },

    /// The registry holds no events, so there is no default to fall back to.
    #[error("no events configured\n  Suggestion: add an [[events]] entry to the config file")]
    EmptyRegistry,

    /// An event entry carries a base URL that is not an absolute http(s) URL.
    #[error("event '{name}' has an invalid base URL '{base_url}'")]
    InvalidBaseUrl {
        /// The offending event.
        name: String,
        /// The rejected base URL.
        base_url: String,
    },
}

impl EventError {
    /// Creates an `UnknownEvent` error listing the known event names.
    #[must_use]
    pub fn unknown_event<'a>(name: &str, known: impl IntoIterator<Item = &'a str>) -> Self {
        Self::UnknownEvent {
            name: name.to_string(),
            known: known.into_iter().collect::<Vec<_>>().join(", "),
        }
    }

    /// Creates an `InvalidBaseUrl` error.
    #[must_use]
    pub fn invalid_base_url(name: &str, base_url: &str) -> Self {
        Self::InvalidBaseUrl {
            name: name.to_string(),
            base_url: base_url.to_string(),
        }
    }
}
