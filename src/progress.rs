//! Progress bar for download runs.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress is drawn only on an interactive stderr and never with `--quiet`.
pub(crate) fn should_show_progress(stderr_is_terminal: bool, quiet: bool) -> bool {
    stderr_is_terminal && !quiet
}

/// A bar counting processed talks; hidden when `visible` is false.
pub(crate) fn talk_progress_bar(total: usize, visible: bool) -> ProgressBar {
    let bar = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
    if !visible {
        bar.set_draw_target(ProgressDrawTarget::hidden());
        return bar;
    }
    bar.set_style(
        ProgressStyle::with_template("[{pos}/{len}] {bar:30} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
