//! Progress spinner for CLI operations.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use std::time::Duration;
use zipvault_core::ProgressCallback;

/// CLI spinner implementing `ProgressCallback`.
///
/// Compression walks the tree lazily, so the entry total is unknown and a
/// spinner is used instead of a bar. Cleared on drop.
pub struct CliProgress {
    bar: ProgressBar,
    bytes_written: u64,
    entries_done: usize,
    current: String,
}

impl CliProgress {
    /// Creates a new spinner prefixed with `message` (e.g. "Compressing").
    #[must_use]
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();

        // Template: "⠋ Compressing 42 files (15.2 MB) src/main.rs"
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {prefix} {pos} files {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self {
            bar,
            bytes_written: 0,
            entries_done: 0,
            current: String::new(),
        }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stdout().is_term()
    }

    fn refresh(&self) {
        self.bar.set_message(format!(
            "({}) {}",
            humanize_bytes(self.bytes_written),
            self.current
        ));
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for CliProgress {
    fn on_entry_start(&mut self, name: &str, _current: usize, _total: Option<usize>) {
        name.clone_into(&mut self.current);
        self.refresh();
    }

    fn on_bytes_written(&mut self, bytes: u64) {
        self.bytes_written += bytes;
        self.refresh();
    }

    fn on_entry_complete(&mut self, _name: &str) {
        self.entries_done += 1;
        self.bar.set_position(self.entries_done as u64);
    }

    fn on_complete(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// Converts bytes to human-readable format (KB, MB, GB, TB).
fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
