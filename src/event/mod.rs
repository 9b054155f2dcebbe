//! Event registry: which schedule backend an event uses and where it lives.
//!
//! The registry starts from a built-in table and may be overridden by user
//! configuration. Entries are ordered by recency, so the default event is
//! always the last entry.
//!
//! # Example
//!
//! ```
//! use fahrplan_core::event::{EventRegistry, SchemaKind};
//!
//! let registry = EventRegistry::builtin();
//! let event = registry.resolve("36c3").unwrap();
//! assert_eq!(event.schema, SchemaKind::Legacy);
//! ```

mod builtin;
mod error;

pub use error::EventError;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Which schedule backend an event is served by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    /// Older schedule system with per-talk HTML detail pages.
    Legacy,
    /// Newer schedule system with per-talk JSON endpoints.
    Api,
}

impl SchemaKind {
    /// Returns the stable lowercase label used in config files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Api => "api",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "api" => Ok(Self::Api),
            other => Err(format!("unknown schema '{other}': expected 'legacy' or 'api'")),
        }
    }
}

/// A single configured event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventConfig {
    /// Event name, also used as the output sub-directory.
    pub name: String,
    /// Backend schema the event's schedule uses.
    pub schema: SchemaKind,
    /// Schedule root URL; detail URLs are built below it.
    pub base_url: String,
    /// First day of the event, for listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts: Option<NaiveDate>,
}

impl EventConfig {
    /// Creates an event without a start date.
    #[must_use]
    pub fn new(name: impl Into<String>, schema: SchemaKind, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema,
            base_url: base_url.into(),
            starts: None,
        }
    }

    /// Checks that the base URL is an absolute http(s) URL.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidBaseUrl`] otherwise.
    pub fn validate(&self) -> Result<(), EventError> {
        match Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {
                Ok(())
            }
            _ => Err(EventError::invalid_base_url(&self.name, &self.base_url)),
        }
    }

    /// Base URL without trailing slashes, ready for path concatenation.
    #[must_use]
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Ordered, read-only collection of events.
#[derive(Debug, Clone)]
pub struct EventRegistry {
    events: Vec<EventConfig>,
}

impl EventRegistry {
    /// Creates the registry from the built-in event table.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            events: builtin::builtin_events(),
        }
    }

    /// Creates a registry from an explicit, recency-ordered list.
    #[must_use]
    pub fn from_events(events: Vec<EventConfig>) -> Self {
        Self { events }
    }

    /// Applies user-configured events on top of this registry.
    ///
    /// An override with the name of an existing entry replaces it in place;
    /// any other override is appended and therefore becomes the newest entry.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidBaseUrl`] if an override has a bad base URL.
    pub fn with_overrides(mut self, overrides: Vec<EventConfig>) -> Result<Self, EventError> {
        for event in overrides {
            event.validate()?;
            if let Some(existing) = self.events.iter_mut().find(|e| e.name == event.name) {
                debug!(event = %event.name, "replacing built-in event");
                *existing = event;
            } else {
                debug!(event = %event.name, "adding configured event");
                self.events.push(event);
            }
        }
        Ok(self)
    }

    /// Looks up an event by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::UnknownEvent`] if no event has that name.
    pub fn resolve(&self, name: &str) -> Result<&EventConfig, EventError> {
        self.events
            .iter()
            .find(|event| event.name == name)
            .ok_or_else(|| EventError::unknown_event(name, self.names()))
    }

    /// All events in registry order (oldest first).
    #[must_use]
    pub fn list_events(&self) -> &[EventConfig] {
        &self.events
    }

    /// The most recently added event.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::EmptyRegistry`] if the registry is empty.
    pub fn default_event(&self) -> Result<&EventConfig, EventError> {
        self.events.last().ok_or(EventError::EmptyRegistry)
    }

    /// Resolves `name` if given, otherwise falls back to the default event.
    ///
    /// # Errors
    ///
    /// See [`resolve`](Self::resolve) and [`default_event`](Self::default_event).
    pub fn select(&self, name: Option<&str>) -> Result<&EventConfig, EventError> {
        match name {
            Some(name) => self.resolve(name),
            None => self.default_event(),
        }
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|event| event.name.as_str())
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_registry() -> EventRegistry {
        EventRegistry::from_events(vec![
            EventConfig::new("old", SchemaKind::Legacy, "https://old.example/Fahrplan"),
            EventConfig::new("new", SchemaKind::Api, "https://new.example/fahrplan"),
        ])
    }

    #[test]
    fn test_resolve_known_event() {
        let registry = sample_registry();
        let event = registry.resolve("old").unwrap();
        assert_eq!(event.schema, SchemaKind::Legacy);
        assert_eq!(event.base_url, "https://old.example/Fahrplan");
    }

    #[test]
    fn test_resolve_unknown_event_fails() {
        let registry = sample_registry();
        let err = registry.resolve("missing").unwrap_err();
        assert!(matches!(err, EventError::UnknownEvent { .. }));
        assert!(err.to_string().contains("old, new"));
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let registry = sample_registry();
        assert!(registry.resolve("OLD").is_err());
    }

    #[test]
    fn test_default_event_is_last_entry() {
        let registry = sample_registry();
        assert_eq!(registry.default_event().unwrap().name, "new");
    }

    #[test]
    fn test_builtin_default_event_is_last_builtin() {
        let registry = EventRegistry::builtin();
        let last = registry.list_events().last().unwrap().name.clone();
        assert_eq!(registry.default_event().unwrap().name, last);
    }

    #[test]
    fn test_default_event_on_empty_registry_fails() {
        let registry = EventRegistry::from_events(Vec::new());
        assert!(matches!(
            registry.default_event(),
            Err(EventError::EmptyRegistry)
        ));
    }

    #[test]
    fn test_select_without_name_uses_default() {
        let registry = sample_registry();
        assert_eq!(registry.select(None).unwrap().name, "new");
        assert_eq!(registry.select(Some("old")).unwrap().name, "old");
    }

    #[test]
    fn test_override_replaces_in_place() {
        let registry = sample_registry()
            .with_overrides(vec![EventConfig::new(
                "old",
                SchemaKind::Api,
                "https://mirror.example/old",
            )])
            .unwrap();
        let names: Vec<_> = registry.list_events().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["old", "new"]);
        assert_eq!(registry.resolve("old").unwrap().schema, SchemaKind::Api);
        assert_eq!(registry.default_event().unwrap().name, "new");
    }

    #[test]
    fn test_override_appends_new_event_as_default() {
        let registry = sample_registry()
            .with_overrides(vec![EventConfig::new(
                "newest",
                SchemaKind::Legacy,
                "https://newest.example/Fahrplan",
            )])
            .unwrap();
        assert_eq!(registry.list_events().len(), 3);
        assert_eq!(registry.default_event().unwrap().name, "newest");
    }

    #[test]
    fn test_override_with_invalid_base_url_rejected() {
        let result = sample_registry().with_overrides(vec![EventConfig::new(
            "broken",
            SchemaKind::Legacy,
            "not a url",
        )]);
        assert!(matches!(result, Err(EventError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_schema_kind_from_str() {
        assert_eq!("legacy".parse::<SchemaKind>().unwrap(), SchemaKind::Legacy);
        assert_eq!(" API ".parse::<SchemaKind>().unwrap(), SchemaKind::Api);
        assert!("frab".parse::<SchemaKind>().is_err());
    }

    #[test]
    fn test_base_url_trimmed() {
        let event = EventConfig::new("x", SchemaKind::Legacy, "https://x.example/Fahrplan//");
        assert_eq!(event.base_url_trimmed(), "https://x.example/Fahrplan");
    }
}
