//! Asset selection: pick one media variant under a format/quality preference.
//!
//! Format is a hard filter; quality is a preference. When the format
//! matches but no quality label does, the first variant of that format is
//! chosen so a talk is never failed over a label mismatch.

use thiserror::Error;
use tracing::debug;

use crate::schema::MediaVariant;

/// Default container format.
pub const DEFAULT_FORMAT: &str = "webm";

/// Default quality order, best first.
pub const DEFAULT_QUALITY_ORDER: [&str; 4] = ["hd", "hq", "sd", "lq"];

/// Errors raised by [`select`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// No variant has the requested format.
    #[error("no media variant in format '{format}' (available: {})", format_available(.available))]
    NoMatchingAsset {
        /// The requested format.
        format: String,
        /// `format/quality` labels that were offered.
        available: Vec<String>,
    },
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    }
}

/// Format and ordered quality preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityPreference {
    /// Required container format, compared case-insensitively.
    pub format: String,
    /// Quality labels, most preferred first.
    pub quality_order: Vec<String>,
}

impl QualityPreference {
    /// Creates a preference.
    #[must_use]
    pub fn new(format: impl Into<String>, quality_order: Vec<String>) -> Self {
        Self {
            format: format.into(),
            quality_order,
        }
    }
}

impl Default for QualityPreference {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            quality_order: DEFAULT_QUALITY_ORDER.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Selects the best variant for `preference`.
///
/// # Errors
///
/// Returns [`SelectError::NoMatchingAsset`] only when no variant has the
/// requested format.
pub fn select<'a>(
    variants: &'a [MediaVariant],
    preference: &QualityPreference,
) -> Result<&'a MediaVariant, SelectError> {
    let candidates: Vec<&MediaVariant> = variants
        .iter()
        .filter(|variant| variant.format.eq_ignore_ascii_case(&preference.format))
        .collect();

    let Some(first) = candidates.first().copied() else {
        return Err(SelectError::NoMatchingAsset {
            format: preference.format.clone(),
            available: variants
                .iter()
                .map(|v| format!("{}/{}", v.format, v.quality_label))
                .collect(),
        });
    };

    let preferred = preference.quality_order.iter().find_map(|quality| {
        candidates
            .iter()
            .copied()
            .find(|variant| variant.quality_label.eq_ignore_ascii_case(quality))
    });

    match preferred {
        Some(variant) => {
            debug!(format = %variant.format, quality = %variant.quality_label, "selected preferred variant");
            Ok(variant)
        }
        None => {
            debug!(
                format = %first.format,
                quality = %first.quality_label,
                "no preferred quality available, using first variant of format"
            );
            Ok(first)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn variant(format: &str, quality: &str) -> MediaVariant {
        MediaVariant::new(format, quality, format!("https://cdn.example/{quality}.{format}"))
    }

    #[test]
    fn test_select_follows_quality_order() {
        let variants = [variant("webm", "sd"), variant("webm", "hd"), variant("mp4", "hd")];
        let chosen = select(&variants, &QualityPreference::default()).unwrap();
        assert_eq!(chosen.format, "webm");
        assert_eq!(chosen.quality_label, "hd");
    }

    #[test]
    fn test_select_falls_back_through_order() {
        let variants = [variant("webm", "lq"), variant("webm", "sd")];
        let chosen = select(&variants, &QualityPreference::default()).unwrap();
        assert_eq!(chosen.quality_label, "sd");
    }

    #[test]
    fn test_select_format_is_case_insensitive() {
        let variants = [variant("webm", "hd")];
        let preference = QualityPreference::new("WEBM", vec!["hd".to_string()]);
        assert!(select(&variants, &preference).is_ok());
    }

    #[test]
    fn test_select_unmatched_quality_picks_first_of_format() {
        let variants = [variant("mp4", "hd"), variant("webm", "unknown"), variant("webm", "4k")];
        let chosen = select(&variants, &QualityPreference::default()).unwrap();
        assert_eq!(chosen.quality_label, "unknown");
    }

    #[test]
    fn test_select_empty_quality_order_picks_first_of_format() {
        let variants = [variant("webm", "sd"), variant("webm", "hd")];
        let preference = QualityPreference::new("webm", Vec::new());
        assert_eq!(select(&variants, &preference).unwrap().quality_label, "sd");
    }

    #[test]
    fn test_select_no_matching_format_fails() {
        let variants = [variant("mp4", "hd")];
        let err = select(&variants, &QualityPreference::default()).unwrap_err();
        assert_eq!(
            err,
            SelectError::NoMatchingAsset {
                format: "webm".to_string(),
                available: vec!["mp4/hd".to_string()],
            }
        );
        assert!(err.to_string().contains("mp4/hd"));
    }

    #[test]
    fn test_select_empty_variants_fails() {
        let err = select(&[], &QualityPreference::default()).unwrap_err();
        assert!(err.to_string().contains("available: none"));
    }

    #[test]
    fn test_select_never_fails_when_format_present() {
        let qualities = ["hd", "sd", "hq", "lq", "unknown", "uhd"];
        for (i, quality) in qualities.iter().enumerate() {
            let mut variants: Vec<_> = qualities[..i].iter().map(|q| variant("mp4", q)).collect();
            variants.push(variant("webm", quality));
            assert!(select(&variants, &QualityPreference::default()).is_ok());
        }
    }
}
