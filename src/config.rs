//! Configuration file loading and resolution into run settings.
//!
//! Precedence: command-line flags, then the TOML config file, then built-in
//! defaults. A missing file is not an error; a malformed one is.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::download::{DEFAULT_MIN_DELAY, OrchestratorOptions};
use crate::event::{EventConfig, EventRegistry};
use crate::fetch::FetchTimeouts;
use crate::selector::{DEFAULT_FORMAT, DEFAULT_QUALITY_ORDER, QualityPreference};

/// Directory below the config home holding `config.toml`.
pub const CONFIG_DIR_NAME: &str = "fahrplan-dl";

/// Config file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Upper bound for `min_delay_secs`.
pub const MAX_MIN_DELAY_SECS: u64 = 600;

/// Errors while loading, validating or writing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("cannot read config file {path}: {source}")]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has unknown keys.
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A value is out of range.
    #[error("invalid config value for `{field}`: {value}. Expected {expected}")]
    InvalidValue {
        /// Config key.
        field: &'static str,
        /// Offending value.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },

    /// No config location could be determined.
    #[error("cannot determine config path: neither XDG_CONFIG_HOME nor HOME is set\n  Suggestion: pass --config <path>")]
    NoConfigPath,

    /// The dump target already exists.
    #[error("config file {path} already exists; remove it first to dump the defaults")]
    AlreadyExists {
        /// Existing config file.
        path: PathBuf,
    },

    /// The default config could not be written.
    #[error("cannot write config file {path}: {source}")]
    Write {
        /// Target path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Serializing the defaults failed.
    #[error("cannot serialize default config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    fn invalid(field: &'static str, value: impl ToString, expected: &'static str) -> Self {
        Self::InvalidValue {
            field,
            value: value.to_string(),
            expected,
        }
    }
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Event selected when `--event` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// Preferred container format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Quality labels, best first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_order: Option<Vec<String>>,
    /// Root directory for downloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_root: Option<PathBuf>,
    /// Seconds between two network-bound talks (0..=600).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_delay_secs: Option<u64>,
    /// HTTP connect timeout in seconds (1..=3600).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,
    /// HTTP read timeout in seconds (1..=3600).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_timeout_secs: Option<u64>,
    /// Events replacing or extending the built-in table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<EventConfig>,
}

impl FileConfig {
    /// Parses TOML text; `path` is only used for error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys, or
    /// [`ConfigError::InvalidValue`] for out-of-range values.
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates values against runtime constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(format) = &self.format {
            validate_format(format)?;
        }
        if let Some(order) = &self.quality_order {
            validate_quality_order(order)?;
        }
        if let Some(delay) = self.min_delay_secs {
            validate_min_delay(delay)?;
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        for event in &self.events {
            event
                .validate()
                .map_err(|e| ConfigError::invalid("events", e, "an absolute http(s) base_url"))?;
        }
        Ok(())
    }
}

fn validate_format(format: &str) -> Result<(), ConfigError> {
    let valid = !format.is_empty() && format.chars().all(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            "format",
            format,
            "a file extension such as \"webm\"",
        ))
    }
}

fn validate_quality_order(order: &[String]) -> Result<(), ConfigError> {
    if order.is_empty() || order.iter().any(|q| q.trim().is_empty()) {
        return Err(ConfigError::invalid(
            "quality_order",
            format!("{order:?}"),
            "a non-empty list of labels",
        ));
    }
    Ok(())
}

fn validate_min_delay(value: u64) -> Result<(), ConfigError> {
    if value > MAX_MIN_DELAY_SECS {
        return Err(ConfigError::invalid("min_delay_secs", value, "range 0..=600"));
    }
    Ok(())
}

fn validate_timeout_secs(field: &'static str, value: Option<u64>) -> Result<(), ConfigError> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        return Err(ConfigError::invalid(field, value, "range 1..=3600"));
    }
    Ok(())
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/fahrplan-dl/config.toml`
/// 2. `$HOME/.config/fahrplan-dl/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    config_path_from(env_var_non_empty_os("XDG_CONFIG_HOME"), env_var_non_empty_os("HOME"))
}

fn config_path_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    if let Some(xdg_config_home) = xdg_config_home {
        return Some(
            PathBuf::from(xdg_config_home)
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        );
    }
    let home = home?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loaded config plus where it came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// Path that was consulted, if one could be determined.
    pub path: Option<PathBuf>,
    /// Parsed config when the file existed.
    pub config: Option<FileConfig>,
}

/// Loads the config at `explicit` or the default location.
///
/// A missing file yields `config: None`.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] or [`ConfigError::Parse`] for an existing
/// but unusable file.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(resolve_default_config_path);
    let Some(path_ref) = path.as_deref() else {
        debug!("no config path available, using defaults");
        return Ok(LoadedConfig::default());
    };
    if !path_ref.exists() {
        debug!(path = %path_ref.display(), "config file not found, using defaults");
        return Ok(LoadedConfig { path, config: None });
    }

    let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
        path: path_ref.to_path_buf(),
        source,
    })?;
    let config = FileConfig::from_toml_str(&content, path_ref)?;
    debug!(path = %path_ref.display(), "config file loaded");
    Ok(LoadedConfig {
        path,
        config: Some(config),
    })
}

/// The defaults as a config file: key descriptions as comments, then every
/// setting with its default value and the built-in event table.
///
/// # Errors
///
/// Returns [`ConfigError::Serialize`] if serialization fails.
pub fn default_config_toml() -> Result<String, ConfigError> {
    let defaults = FileConfig {
        event: None,
        format: Some(DEFAULT_FORMAT.to_string()),
        quality_order: Some(DEFAULT_QUALITY_ORDER.iter().map(ToString::to_string).collect()),
        output_root: Some(PathBuf::from(".")),
        min_delay_secs: Some(DEFAULT_MIN_DELAY.as_secs()),
        connect_timeout_secs: Some(FetchTimeouts::default().connect_secs),
        read_timeout_secs: Some(FetchTimeouts::default().read_secs),
        events: EventRegistry::builtin().list_events().to_vec(),
    };
    let body = toml::to_string_pretty(&defaults)?;
    Ok(format!("{DEFAULT_CONFIG_HEADER}\n{body}"))
}

const DEFAULT_CONFIG_HEADER: &str = "\
# Config file for fahrplan-dl
#
# The keys have the following meanings:
#   event                 Event used when --event is not given
#                         (default: the last entry of [[events]])
#   format                Container format to download, e.g. \"webm\" or \"mp4\"
#   quality_order         Quality labels in order of preference
#   output_root           Directory below which <event>/<talk>/ is created
#   min_delay_secs        Minimum pause between two downloaded talks (0..=600)
#   connect_timeout_secs  HTTP connect timeout (1..=3600)
#   read_timeout_secs     HTTP read timeout (1..=3600)
#
#   [[events]]            One table per event, oldest first
#     name                Event name, also the output sub-directory
#     schema              \"legacy\" (HTML detail pages) or \"api\" (JSON talks)
#     base_url            Schedule root; talk pages are looked up below it
#     starts              First day of the event, \"yyyy-mm-dd\"
#
# Entries with the name of a built-in event replace it; others are added.
";

/// Writes [`default_config_toml`] to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`ConfigError::AlreadyExists`] if `path` exists, or
/// [`ConfigError::Write`] on IO failure.
pub fn dump_default_config(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    let content = default_config_toml()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "wrote default config");
    Ok(())
}

/// Values given on the command line; `None`/empty means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// `--event`.
    pub event: Option<String>,
    /// `--format`.
    pub format: Option<String>,
    /// `--quality`, repeated.
    pub quality_order: Vec<String>,
    /// `--output-root`.
    pub output_root: Option<PathBuf>,
    /// `--min-delay`.
    pub min_delay_secs: Option<u64>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Requested event name; `None` selects the registry default.
    pub event: Option<String>,
    /// Format and quality preference.
    pub preference: QualityPreference,
    /// Root directory for downloads.
    pub output_root: PathBuf,
    /// Minimum pause between network-bound talks.
    pub min_delay: Duration,
    /// HTTP timeouts.
    pub timeouts: FetchTimeouts,
    /// Event overrides from the config file.
    pub events: Vec<EventConfig>,
}

impl Settings {
    /// Merges CLI overrides over the file config over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for out-of-range CLI values.
    pub fn resolve(file: Option<&FileConfig>, cli: &CliOverrides) -> Result<Self, ConfigError> {
        let file = file.cloned().unwrap_or_default();

        let format = cli
            .format
            .clone()
            .or(file.format)
            .unwrap_or_else(|| DEFAULT_FORMAT.to_string());
        validate_format(&format)?;

        let quality_order = if cli.quality_order.is_empty() {
            file.quality_order
                .unwrap_or_else(|| DEFAULT_QUALITY_ORDER.iter().map(ToString::to_string).collect())
        } else {
            cli.quality_order.clone()
        };
        validate_quality_order(&quality_order)?;

        let min_delay_secs = cli
            .min_delay_secs
            .or(file.min_delay_secs)
            .unwrap_or(DEFAULT_MIN_DELAY.as_secs());
        validate_min_delay(min_delay_secs)?;

        let defaults = FetchTimeouts::default();
        Ok(Self {
            event: cli.event.clone().or(file.event),
            preference: QualityPreference::new(format.to_ascii_lowercase(), quality_order),
            output_root: cli
                .output_root
                .clone()
                .or(file.output_root)
                .unwrap_or_else(|| PathBuf::from(".")),
            min_delay: Duration::from_secs(min_delay_secs),
            timeouts: FetchTimeouts {
                connect_secs: file.connect_timeout_secs.unwrap_or(defaults.connect_secs),
                read_secs: file.read_timeout_secs.unwrap_or(defaults.read_secs),
            },
            events: file.events,
        })
    }

    /// Orchestrator options derived from these settings.
    #[must_use]
    pub fn orchestrator_options(&self) -> OrchestratorOptions {
        OrchestratorOptions {
            output_root: self.output_root.clone(),
            preference: self.preference.clone(),
            min_delay: self.min_delay,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::event::SchemaKind;
    use tempfile::TempDir;

    #[test]
    fn test_config_path_prefers_xdg() {
        let path = config_path_from(Some("/xdg".into()), Some("/home/u".into())).unwrap();
        assert_eq!(path, PathBuf::from("/xdg/fahrplan-dl/config.toml"));
        let path = config_path_from(None, Some("/home/u".into())).unwrap();
        assert_eq!(path, PathBuf::from("/home/u/.config/fahrplan-dl/config.toml"));
        assert!(config_path_from(None, None).is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let content = r#"
            event = "36c3"
            format = "mp4"
            quality_order = ["sd", "hd"]
            output_root = "/media/talks"
            min_delay_secs = 0
            read_timeout_secs = 60

            [[events]]
            name = "local"
            schema = "api"
            base_url = "https://pretalx.local/conf"
            starts = "2024-05-01"
        "#;
        let config = FileConfig::from_toml_str(content, Path::new("c.toml")).unwrap();
        assert_eq!(config.event.as_deref(), Some("36c3"));
        assert_eq!(config.quality_order.unwrap(), ["sd", "hd"]);
        assert_eq!(config.events.len(), 1);
        assert_eq!(config.events[0].schema, SchemaKind::Api);
        assert_eq!(
            config.events[0].starts,
            chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
        );
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = FileConfig::from_toml_str("colour = \"red\"\n", Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let err = FileConfig::from_toml_str("min_delay_secs = 601\n", Path::new("c.toml")).unwrap_err();
        assert!(err.to_string().contains("min_delay_secs"));
        let err = FileConfig::from_toml_str("read_timeout_secs = 0\n", Path::new("c.toml")).unwrap_err();
        assert!(err.to_string().contains("read_timeout_secs"));
        let err = FileConfig::from_toml_str("quality_order = []\n", Path::new("c.toml")).unwrap_err();
        assert!(err.to_string().contains("quality_order"));
    }

    #[test]
    fn test_event_with_bad_base_url_rejected() {
        let content = "[[events]]\nname = \"x\"\nschema = \"legacy\"\nbase_url = \"ftp://x\"\n";
        let err = FileConfig::from_toml_str(content, Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "events", .. }));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = load_config(Some(&dir.path().join("none.toml"))).unwrap();
        assert!(loaded.config.is_none());
        assert_eq!(loaded.path.unwrap(), dir.path().join("none.toml"));
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "format = [unclosed").unwrap();
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::resolve(None, &CliOverrides::default()).unwrap();
        assert_eq!(settings.event, None);
        assert_eq!(settings.preference, QualityPreference::default());
        assert_eq!(settings.output_root, PathBuf::from("."));
        assert_eq!(settings.min_delay, Duration::from_secs(3));
        assert_eq!(settings.timeouts, FetchTimeouts::default());
    }

    #[test]
    fn test_cli_overrides_file_overrides_defaults() {
        let file = FileConfig {
            event: Some("35c3".to_string()),
            format: Some("mp4".to_string()),
            min_delay_secs: Some(10),
            ..FileConfig::default()
        };
        let cli = CliOverrides {
            event: Some("36c3".to_string()),
            quality_order: vec!["sd".to_string()],
            ..CliOverrides::default()
        };
        let settings = Settings::resolve(Some(&file), &cli).unwrap();
        assert_eq!(settings.event.as_deref(), Some("36c3"));
        assert_eq!(settings.preference.format, "mp4");
        assert_eq!(settings.preference.quality_order, ["sd"]);
        assert_eq!(settings.min_delay, Duration::from_secs(10));
    }

    #[test]
    fn test_cli_min_delay_out_of_range() {
        let cli = CliOverrides {
            min_delay_secs: Some(1000),
            ..CliOverrides::default()
        };
        assert!(Settings::resolve(None, &cli).is_err());
    }

    #[test]
    fn test_default_config_round_trips() {
        let content = default_config_toml().unwrap();
        assert!(content.starts_with("# Config file for fahrplan-dl"));
        let config = FileConfig::from_toml_str(&content, Path::new("dump.toml")).unwrap();
        assert_eq!(config.format.as_deref(), Some("webm"));
        assert_eq!(config.events, EventRegistry::builtin().list_events());
        let settings = Settings::resolve(Some(&config), &CliOverrides::default()).unwrap();
        assert_eq!(settings, Settings {
            events: config.events.clone(),
            ..Settings::resolve(None, &CliOverrides::default()).unwrap()
        });
    }

    #[test]
    fn test_dump_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        dump_default_config(&path).unwrap();
        assert!(path.is_file());
        assert!(matches!(
            dump_default_config(&path),
            Err(ConfigError::AlreadyExists { .. })
        ));
    }
}
