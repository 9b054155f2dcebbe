//! Shared User-Agent string for schedule and media requests.
//!
//! Schedule servers and media mirrors are community infrastructure, so every
//! request identifies the tool and where to report problems.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/mfherbst/fahrplan-dl";

/// Default User-Agent for every request issued by the fetcher.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("fahrplan-dl/{version} (+{PROJECT_UA_URL})")
}
