//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// Progress reporter for a reconciliation run.
///
/// One spinner per stage, created lazily when the stage starts.
#[derive(Debug)]
pub struct ProgressReporter {
    pub load_pb: Option<ProgressBar>,
    pub reconcile_pb: Option<ProgressBar>,
    pub report_pb: Option<ProgressBar>,
    show_progress: bool,
    start_time: Instant,
}

impl ProgressReporter {
    /// Create progress reporter for a run
    pub fn new_for_run() -> Self {
        Self {
            load_pb: None,
            reconcile_pb: None,
            report_pb: None,
            show_progress: true,
            start_time: Instant::now(),
        }
    }

    /// Create minimal progress reporter (no progress bars)
    pub fn new_minimal() -> Self {
        let mut reporter = Self::new_for_run();
        reporter.show_progress = false;
        reporter
    }

    /// Whether spinners are drawn at all
    pub fn is_enabled(&self) -> bool {
        self.show_progress
    }

    /// Time since the reporter was created
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Start (or relabel) the loading spinner
    pub fn start_load(&mut self, message: &str) {
        start_or_update(&mut self.load_pb, self.show_progress, message);
    }

    /// Finish loading
    pub fn finish_load(&mut self, message: &str) {
        finish(&mut self.load_pb, message);
    }

    /// Start the reconciliation spinner
    pub fn start_reconcile(&mut self) {
        start_or_update(&mut self.reconcile_pb, self.show_progress, "Reconciling tables...");
    }

    /// Finish reconciliation
    pub fn finish_reconcile(&mut self, message: &str) {
        finish(&mut self.reconcile_pb, message);
    }

    /// Start the report spinner
    pub fn start_report(&mut self, message: &str) {
        start_or_update(&mut self.report_pb, self.show_progress, message);
    }

    /// Finish report writing
    pub fn finish_report(&mut self, message: &str) {
        finish(&mut self.report_pb, message);
    }

    /// Clear every spinner without leaving a message behind
    pub fn clear(&mut self) {
        for pb in [&mut self.load_pb, &mut self.reconcile_pb, &mut self.report_pb] {
            if let Some(pb) = pb.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.clear();
    }
}

fn start_or_update(slot: &mut Option<ProgressBar>, enabled: bool, message: &str) {
    if !enabled {
        return;
    }
    match slot {
        Some(pb) => pb.set_message(message.to_string()),
        None => *slot = Some(create_spinner(message)),
    }
}

fn finish(slot: &mut Option<ProgressBar>, message: &str) {
    if let Some(pb) = slot.take() {
        pb.finish_with_message(message.to_string());
    }
}

/// Create a spinner progress bar
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
