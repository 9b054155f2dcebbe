//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use fahrplan_core::config::CliOverrides;

/// Download talk recordings, attachments and abstracts from event schedules.
///
/// Talk ids are taken from the positional arguments and from `--input-file`,
/// which accepts plain id lists as well as favourites exports (`*.fav.list`).
#[derive(Parser, Debug)]
#[command(name = "fahrplan-dl")]
#[command(author, version, about)]
pub struct Args {
    /// Talk ids to download
    #[arg(value_name = "IDS")]
    pub ids: Vec<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Config file (default: $XDG_CONFIG_HOME/fahrplan-dl/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Event to download from (default: the most recent configured event)
    #[arg(short, long)]
    pub event: Option<String>,

    /// Preferred container format, e.g. webm or mp4
    #[arg(short, long)]
    pub format: Option<String>,

    /// Quality label in order of preference; repeat for fallbacks
    #[arg(long = "quality", value_name = "LABEL")]
    pub quality: Vec<String>,

    /// File with talk ids, one per line, or a favourites list
    #[arg(short, long, value_name = "PATH")]
    pub input_file: Option<PathBuf>,

    /// Directory below which <event>/<talk>/ is created
    #[arg(short, long, value_name = "DIR")]
    pub output_root: Option<PathBuf>,

    /// Minimum seconds between two downloaded talks (0-600)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(0..=600))]
    pub min_delay: Option<u64>,

    /// List configured events and exit
    #[arg(long, conflicts_with = "dump_config")]
    pub list_events: bool,

    /// Write the default config file and exit
    #[arg(long)]
    pub dump_config: bool,
}

impl Args {
    /// True if a mode flag replaces the download run.
    #[must_use]
    pub fn has_mode_flag(&self) -> bool {
        self.list_events || self.dump_config
    }

    /// Settings given on the command line.
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            event: self.event.clone(),
            format: self.format.clone(),
            quality_order: self.quality.clone(),
            output_root: self.output_root.clone(),
            min_delay_secs: self.min_delay,
        }
    }
}
