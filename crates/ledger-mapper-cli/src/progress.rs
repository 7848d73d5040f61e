use indicatif::{ProgressBar, ProgressStyle};
use ledger_mapper_core::ProgressReporter;
use std::sync::Mutex;
use std::time::Duration;

/// Spinner on stderr while the tree is walked and the plan is built.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn spinner(message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self, root: &str) {
        self.set_bar(Self::spinner(&format!("Scanning {}...", root)));
    }

    fn on_scan_progress(&self, files_found: usize, _current_path: &str) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_message(format!("Scanning... {} files found", files_found));
            }
        }
    }

    fn on_scan_complete(&self, total_files: usize, skipped: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} files ({} skipped) in {:.2}s",
            total_files, skipped, duration_secs
        );
    }

    fn on_plan_start(&self, total_files: usize) {
        self.set_bar(Self::spinner(&format!("Planning {} files...", total_files)));
    }

    fn on_plan_complete(&self, planned_files: usize, diagnostics: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Plan complete: {} destinations, {} diagnostics in {:.2}s",
            planned_files, diagnostics, duration_secs
        );
    }
}
