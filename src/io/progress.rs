//! Per-pass progress display for extraction runs

use crate::fragments::fragment::FragmentKind;
use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::LazyLock;

static PASS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{prefix:>12}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Shows one bar per extraction pass, advanced once per candidate fragment
pub struct ProgressManager {
    multi_progress: MultiProgress,
    current: Option<ProgressBar>,
    passes_started: usize,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a progress manager drawing to stderr
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            current: None,
            passes_started: 0,
        }
    }

    /// Create a progress manager that tracks state but draws nothing
    pub fn hidden() -> Self {
        Self {
            multi_progress: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            current: None,
            passes_started: 0,
        }
    }

    /// Begin a pass expecting `candidates` fragments
    pub fn start_pass(&mut self, kind: FragmentKind, candidates: usize) {
        self.finish_pass();
        let bar = ProgressBar::new(candidates as u64);
        bar.set_style(PASS_STYLE.clone());
        bar.set_prefix(kind.as_str());
        self.current = Some(self.multi_progress.add(bar));
        self.passes_started += 1;
    }

    /// Record one processed candidate, noting whether it was deduplicated
    pub fn advance(&self, deduplicated: bool) {
        if let Some(ref bar) = self.current {
            bar.inc(1);
            if deduplicated {
                bar.set_message("reused");
            } else {
                bar.set_message("saved");
            }
        }
    }

    /// Position of the active pass, if any
    pub fn position(&self) -> Option<u64> {
        self.current.as_ref().map(ProgressBar::position)
    }

    /// Number of passes started so far
    pub const fn passes_started(&self) -> usize {
        self.passes_started
    }

    /// Complete the active pass, leaving its bar on screen
    pub fn finish_pass(&mut self) {
        if let Some(bar) = self.current.take() {
            bar.finish_with_message("done");
        }
    }

    /// Clean up all progress displays
    pub fn finish(&mut self) {
        self.finish_pass();
        let _ = self.multi_progress.clear();
    }
}
