use crate::filter::Verdict;
use crate::report::CycleReport;
use std::path::Path;
use std::time::Duration;

/// Trait for observing daemon cycles.
///
/// The CLI implements it with tracing output; tests use it to watch the loop.
/// All methods have default no-op implementations.
pub trait CycleObserver: Send + Sync {
    fn on_cycle_start(&self, _cycle: u64, _target_dir: &Path) {}
    fn on_file(&self, _path: &Path, _verdict: Verdict) {}
    fn on_cycle_complete(&self, _cycle: u64, _report: &CycleReport, _duration_secs: f64) {}
    fn on_sleep(&self, _interval: Duration) {}
}

/// No-op observer for silent operation.
pub struct SilentObserver;

impl CycleObserver for SilentObserver {}
