//! Progress reporting for downloads.
//!
//! A thin wrapper around `indicatif` so the fetcher does not need to know
//! about styles. Bars draw to stderr and disappear automatically when the
//! output is not a terminal.

use indicatif::{ProgressBar, ProgressStyle};

/// Build a progress bar for a download of `total` bytes.
///
/// When the server does not report a content length the bar degrades to a
/// byte-counting spinner.
#[must_use]
pub fn download_bar(total: Option<u64>) -> ProgressBar {
    match total {
        Some(len) => {
            let bar = ProgressBar::new(len);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .expect("valid progress template")
                    .progress_chars("=> "),
            );
            bar.set_prefix("Downloading");
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{prefix:.bold.cyan} {spinner:.cyan} {bytes}")
                    .expect("valid progress template"),
            );
            bar.set_prefix("Downloading");
            bar
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_bar_with_known_length() {
        let bar = download_bar(Some(2048));
        assert_eq!(bar.length(), Some(2048));
        bar.finish_and_clear();
    }

    #[test]
    fn test_download_bar_with_unknown_length() {
        let bar = download_bar(None);
        bar.inc(512);
        assert_eq!(bar.position(), 512);
        bar.finish_and_clear();
    }
}
