//! Failed-id log that can be fed back as an id file.
//!
//! Written next to the input list (`<list>.errors`) or to `errors` in the
//! working directory. Each run appends a commented, timestamped header
//! followed by one failed id per line.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;

use super::result::DownloadResult;

/// File name used when ids came from the command line only.
pub const DEFAULT_FAILURE_LOG: &str = "errors";

/// Suffix appended to an input list path.
pub const FAILURE_LOG_SUFFIX: &str = ".errors";

/// Where the failure log goes for a run reading ids from `input_file`.
#[must_use]
pub fn failure_log_path(input_file: Option<&Path>) -> PathBuf {
    match input_file {
        Some(path) => {
            let mut name = path.as_os_str().to_os_string();
            name.push(FAILURE_LOG_SUFFIX);
            PathBuf::from(name)
        }
        None => PathBuf::from(DEFAULT_FAILURE_LOG),
    }
}

/// Renders one log block: banner with `timestamp`, usage hint, failed ids.
#[must_use]
pub fn render_failure_block(
    log_path: &Path,
    failed_ids: &[&str],
    timestamp: DateTime<Local>,
) -> String {
    let stamp = timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
    let rule = "#".repeat(stamp.len() + 8);
    let mut block = format!(
        "{rule}\n#-- {stamp} --#\n{rule}\n\
         # List of talks not properly downloaded last run:\n\
         #    (use this file as input file via\n\
         #     --input-file \"{}\"\n\
         #    to rerun the download process with only the failed talks.)\n",
        log_path.display()
    );
    for id in failed_ids {
        block.push_str(id);
        block.push('\n');
    }
    block
}

/// Appends the failed ids of `results` to `log_path`.
///
/// Returns the number of ids written; nothing is written (and no file is
/// created) when no talk failed.
///
/// # Errors
///
/// Returns the IO error if the file cannot be opened or written.
pub fn append_failures(log_path: &Path, results: &[DownloadResult]) -> io::Result<usize> {
    let failed: Vec<&str> = results
        .iter()
        .filter(|result| result.is_failed())
        .map(|result| result.talk_id.as_str())
        .collect();
    if failed.is_empty() {
        return Ok(0);
    }

    let block = render_failure_block(log_path, &failed, Local::now());
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    file.write_all(block.as_bytes())?;
    debug!(path = %log_path.display(), count = failed.len(), "failure log written");
    Ok(failed.len())
}
