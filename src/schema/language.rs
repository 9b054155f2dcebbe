//! Language code normalization (ISO 639-1 / 639-3 code to display name).
//!
//! Schedules tag talks with whatever code their organizers typed in, so both
//! two- and three-letter codes are accepted. Unknown codes pass through
//! verbatim.

use std::collections::HashMap;
use std::sync::LazyLock;

/// `(display name, codes...)`
const LANGUAGES: &[(&str, &[&str])] = &[
    ("Arabic", &["ar", "ara"]),
    ("Chinese", &["zh", "zho", "chi", "zhn"]),
    ("Czech", &["cs", "ces", "cze"]),
    ("Danish", &["da", "dan"]),
    ("Dutch", &["nl", "nld", "dut"]),
    ("English", &["en", "eng"]),
    ("Finnish", &["fi", "fin"]),
    ("French", &["fr", "fra", "fre"]),
    ("German", &["de", "deu", "ger"]),
    ("Greek", &["el", "ell", "gre"]),
    ("Hebrew", &["he", "heb"]),
    ("Hindi", &["hi", "hin"]),
    ("Hungarian", &["hu", "hun"]),
    ("Italian", &["it", "ita"]),
    ("Japanese", &["ja", "jpn"]),
    ("Korean", &["ko", "kor"]),
    ("Norwegian", &["no", "nor"]),
    ("Persian", &["fa", "fas", "per"]),
    ("Polish", &["pl", "pol"]),
    ("Portuguese", &["pt", "por"]),
    ("Romanian", &["ro", "ron", "rum"]),
    ("Russian", &["ru", "rus"]),
    ("Spanish", &["es", "spa"]),
    ("Swedish", &["sv", "swe"]),
    ("Turkish", &["tr", "tur"]),
    ("Ukrainian", &["uk", "ukr"]),
];

static LANGUAGE_NAMES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    LANGUAGES
        .iter()
        .flat_map(|&(name, codes)| codes.iter().map(move |&code| (code, name)))
        .collect()
});

/// Maps a language code to its display name.
///
/// Lookup is case-insensitive and ignores a region suffix (`en-US`, `pt_BR`).
/// Unknown values are returned trimmed but otherwise unchanged.
#[must_use]
pub fn language_display_name(code: &str) -> String {
    let trimmed = code.trim();
    let primary = trimmed
        .split(['-', '_'])
        .next()
        .unwrap_or(trimmed)
        .to_ascii_lowercase();
    LANGUAGE_NAMES
        .get(primary.as_str())
        .map_or_else(|| trimmed.to_string(), |name| (*name).to_string())
}

/// Normalizes an optional raw language value, dropping blank values.
#[must_use]
pub fn normalize_language(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(language_display_name)
}
