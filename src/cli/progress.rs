//! Progress bar fed from a session's progress stream

use crate::session::{ProgressStream, ScanStatus};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::LazyLock;
use std::time::Duration;

static TREE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg} [{elapsed_precise}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
});

static SCANNING_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
});

/// Whether a progress bar should be drawn at all
pub fn progress_enabled(requested: bool) -> bool {
    requested && atty::is(atty::Stream::Stderr)
}

/// Drive a progress bar until the stream ends
pub async fn follow(mut stream: ProgressStream, visible: bool) {
    let bar = ProgressBar::new_spinner();
    if visible {
        bar.set_draw_target(ProgressDrawTarget::stderr());
    } else {
        bar.set_draw_target(ProgressDrawTarget::hidden());
    }
    bar.set_style(TREE_STYLE.clone());
    bar.set_message("Fetching repository tree");
    bar.enable_steady_tick(Duration::from_millis(100));

    let mut scanning = false;
    while let Some(progress) = stream.next().await {
        if progress.status == ScanStatus::Scanning && !scanning {
            scanning = true;
            bar.set_style(SCANNING_STYLE.clone());
            bar.set_length(progress.files_total as u64);
            bar.set_message("Scanning files");
        }
        bar.set_position(progress.files_scanned as u64);

        match progress.status {
            ScanStatus::Complete => bar.finish_with_message("Scan complete"),
            ScanStatus::Error => bar.abandon_with_message("Scan failed"),
            ScanStatus::Cancelled => bar.abandon_with_message("Scan cancelled"),
            _ => {}
        }
    }
    if !bar.is_finished() {
        bar.finish_and_clear();
    }
}
