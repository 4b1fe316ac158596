//! Progress indicators

use indicatif::{ProgressBar, ProgressStyle};

/// Per-file progress bar drawn on stderr; hidden when `hidden` is set
pub fn create_progress_bar(len: u64, msg: &str, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(msg.to_string());
    pb
}
