use crate::config::{DeliveryConfig, ErrorPolicy, ScanConfig, ScanPolicy};
use crate::error::Error;
use crate::probe::OpenFileProbe;
use crate::progress::CycleObserver;
use crate::report::{self, CycleReport, ReportSender};
use crate::scanner::Scanner;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Runs one cycle: a full scan followed by report dispatch.
pub struct CycleEngine {
    scanner: Scanner,
    delivery: DeliveryConfig,
    sender: Box<dyn ReportSender>,
    error_policy: ErrorPolicy,
}

#[derive(Debug)]
pub struct CycleResult {
    pub report: CycleReport,
    pub delivered: bool,
    pub duration: Duration,
}

impl CycleEngine {
    pub fn new(
        config: ScanConfig,
        policy: ScanPolicy,
        delivery: DeliveryConfig,
        sender: Box<dyn ReportSender>,
        probe: Box<dyn OpenFileProbe>,
    ) -> Self {
        Self {
            scanner: Scanner::new(config, &policy, probe),
            delivery,
            sender,
            error_policy: policy.error_policy,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        self.scanner.config()
    }

    /// Scan, then report. A compression or deletion error is returned as-is
    /// under `ErrorPolicy::Exit` (nothing is sent); under
    /// `ErrorPolicy::AbortCycle` the partial report is marked aborted and sent.
    pub fn run_cycle(&self, cycle: u64, observer: &dyn CycleObserver) -> Result<CycleResult, Error> {
        let start = Instant::now();
        observer.on_cycle_start(cycle, &self.config().target_dir);

        let mut report = CycleReport::new(self.config().dry_run);
        if let Err(err) = self.scanner.scan(&mut report, observer) {
            error!("{}", err);
            match self.error_policy {
                ErrorPolicy::Exit => return Err(err),
                ErrorPolicy::AbortCycle => report.aborted = Some(err.to_string()),
            }
        }

        let delivered = report::dispatch_report(&report, &self.delivery, self.sender.as_ref());
        let duration = start.elapsed();
        debug!(
            "Cycle {} completed in {:.2}s: {} compressed, {} skipped, {} deferred",
            cycle,
            duration.as_secs_f64(),
            report.compressed.len(),
            report.skipped.len(),
            report.deferred.len(),
        );
        observer.on_cycle_complete(cycle, &report, duration.as_secs_f64());

        Ok(CycleResult {
            report,
            delivered,
            duration,
        })
    }
}
