use colored::*;
use dir_squeeze_core::{CycleObserver, CycleReport, Verdict};
use std::path::Path;
use tracing::{debug, info};

/// Logs cycle boundaries and a one-line summary per cycle.
pub struct LogObserver;

impl CycleObserver for LogObserver {
    fn on_cycle_start(&self, cycle: u64, target_dir: &Path) {
        info!("Starting directory scan {} of {}", cycle, target_dir.display());
    }

    fn on_file(&self, path: &Path, verdict: Verdict) {
        debug!("{}: {:?}", path.display(), verdict);
    }

    fn on_cycle_complete(&self, cycle: u64, report: &CycleReport, duration_secs: f64) {
        info!(
            "Scan {} done in {}: {} compressed, {} skipped, {} deferred, {} bytes saved",
            cycle,
            format!("{:.2}s", duration_secs).green(),
            format!("{}", report.compressed.len()).green(),
            format!("{}", report.skipped.len()).yellow(),
            format!("{}", report.deferred.len()).cyan(),
            format!("{}", report.bytes_saved).green(),
        );
    }
}
