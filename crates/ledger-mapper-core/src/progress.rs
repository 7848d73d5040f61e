/// Trait for reporting planning progress.
///
/// The CLI implements it with an indicatif spinner. All methods have default
/// no-op implementations.
pub trait ProgressReporter {
    fn on_scan_start(&self, _root: &str) {}
    fn on_scan_progress(&self, _files_found: usize, _current_path: &str) {}
    fn on_scan_complete(&self, _total_files: usize, _skipped: usize, _duration_secs: f64) {}
    fn on_plan_start(&self, _total_files: usize) {}
    fn on_plan_complete(&self, _planned_files: usize, _diagnostics: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
