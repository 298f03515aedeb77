use crate::config::SleepMode;
use crate::engine::{CycleEngine, CycleResult};
use crate::error::Error;
use crate::progress::CycleObserver;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonPhase {
    Running,
    /// A stop was requested; the in-flight cycle is finishing.
    Draining,
    Stopped,
}

/// Process-wide stop flag.
///
/// `request_stop` is the only method meant for the signal path. The daemon
/// loop reads the flag between cycles and never mid-scan.
#[derive(Debug, Default)]
pub struct DaemonState {
    stop: AtomicBool,
    stopped: AtomicBool,
    wake_lock: Mutex<()>,
    wake: Condvar,
}

impl DaemonState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        // Taking the lock orders this store before any sleeper's predicate check.
        drop(self.wake_lock.lock().unwrap_or_else(|e| e.into_inner()));
        self.wake.notify_all();
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> DaemonPhase {
        if self.stopped.load(Ordering::SeqCst) {
            DaemonPhase::Stopped
        } else if self.stop_requested() {
            DaemonPhase::Draining
        } else {
            DaemonPhase::Running
        }
    }

    fn mark_stopped(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Wait out the inter-cycle interval. Returns early on a stop request
    /// unless `mode` is `SleepMode::Legacy`.
    pub fn sleep(&self, interval: Duration, mode: SleepMode) {
        match mode {
            SleepMode::Legacy => thread::sleep(interval),
            SleepMode::Interruptible => {
                let guard = self.wake_lock.lock().unwrap_or_else(|e| e.into_inner());
                let _ = self
                    .wake
                    .wait_timeout_while(guard, interval, |_| !self.stop_requested())
                    .unwrap_or_else(|e| e.into_inner());
            }
        }
    }
}

/// Totals over a daemon run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DaemonSummary {
    pub cycles: u64,
    pub files_compressed: usize,
    pub bytes_saved: i64,
    pub reports_undelivered: u64,
}

impl DaemonSummary {
    fn absorb(&mut self, result: &CycleResult) {
        self.cycles += 1;
        self.files_compressed += result.report.compressed.len();
        self.bytes_saved += result.report.bytes_saved;
        if !result.delivered {
            self.reports_undelivered += 1;
        }
    }
}

/// Repeats cycles separated by the configured sleep until a stop is requested.
pub struct Daemon {
    engine: CycleEngine,
    state: Arc<DaemonState>,
    sleep_mode: SleepMode,
}

impl Daemon {
    pub fn new(engine: CycleEngine, state: Arc<DaemonState>) -> Self {
        Self {
            engine,
            state,
            sleep_mode: SleepMode::Interruptible,
        }
    }

    pub fn with_sleep_mode(mut self, mode: SleepMode) -> Self {
        self.sleep_mode = mode;
        self
    }

    pub fn state(&self) -> &Arc<DaemonState> {
        &self.state
    }

    /// Run a single cycle and stop.
    pub fn run_once(&self, observer: &dyn CycleObserver) -> Result<CycleResult, Error> {
        let result = self.engine.run_cycle(1, observer);
        self.state.mark_stopped();
        result
    }

    /// Run until stopped. A stop request is honored at the top of the loop
    /// and again right after a cycle's report, so the loop never sleeps once
    /// it knows it should exit.
    pub fn run(&self, observer: &dyn CycleObserver) -> Result<DaemonSummary, Error> {
        let interval = self.engine.config().sleep_interval;
        let mut summary = DaemonSummary::default();

        let outcome = loop {
            if self.state.stop_requested() {
                break Ok(());
            }

            let result = match self.engine.run_cycle(summary.cycles + 1, observer) {
                Ok(result) => result,
                Err(err) => break Err(err),
            };
            summary.absorb(&result);

            if self.state.stop_requested() {
                info!("Stop requested, not starting another directory scan");
                break Ok(());
            }

            info!(
                "Sleeping {} seconds between directory scans...",
                interval.as_secs()
            );
            observer.on_sleep(interval);
            self.state.sleep(interval, self.sleep_mode);
        };

        self.state.mark_stopped();
        outcome.map(|()| summary)
    }
}
