//! Progress indicators
//!
//! Progress bars for directory scans.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a progress bar for image processing.
///
/// Hidden when `hidden` is set, so JSON output stays clean.
pub fn image_progress(total: u64, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} images ({eta}) {msg}")
    {
        pb.set_style(style.progress_chars("█▓░"));
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Finish a progress bar with a success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {message}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_progress_creation() {
        let pb = image_progress(10, false);
        pb.inc(5);
        assert_eq!(pb.position(), 5);

        // finishing snaps the bar to its length
        finish_success(&pb, "done");
        assert!(pb.is_finished());
        assert_eq!(pb.position(), 10);
    }

    #[test]
    fn test_hidden_progress() {
        let pb = image_progress(10, true);
        assert!(pb.is_hidden());
    }
}
