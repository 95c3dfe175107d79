//! Terminal status line for search runs.
//!
//! On a terminal one spinner line counts fetched pages; elsewhere the line
//! is hidden and log output is the only progress signal.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Owns the `MultiProgress` shared by status lines and the log bridge.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    /// Detect whether stderr is a terminal.
    pub fn new() -> Self {
        Self::with_tty(std::io::stderr().is_terminal())
    }

    pub fn with_tty(is_tty: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty,
        }
    }

    /// Spinner labelled `source` whose position is the number of pages
    /// fetched so far. Hidden when not on a terminal.
    pub fn search_line(&self, source: &str) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} {prefix:.cyan.bold} {pos} pages {elapsed:>4} {wide_msg}",
            )
            .expect("invalid template"),
        );
        pb.set_prefix(source.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// For the log bridge, see [`crate::init_logging`].
    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedProgress = Arc<ProgressContext>;

/// Message shown next to the page counter.
pub fn search_status(found: usize, wanted: usize, offset: usize) -> String {
    format!("{found}/{wanted} new, next offset {offset}")
}
