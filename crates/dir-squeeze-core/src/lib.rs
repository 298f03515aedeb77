pub mod compress;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod lifecycle;
pub mod probe;
pub mod progress;
pub mod report;
pub mod scanner;

pub use config::{DaemonSettings, DeliveryConfig, ErrorPolicy, ScanConfig, ScanPolicy, SleepMode};
pub use engine::{CycleEngine, CycleResult};
pub use error::Error;
pub use filter::{EligibilityFilter, FileRecord, Verdict};
pub use lifecycle::{Daemon, DaemonPhase, DaemonState, DaemonSummary};
pub use probe::{NoopProbe, OpenFileProbe};
pub use progress::{CycleObserver, SilentObserver};
pub use report::{CycleReport, ReportMessage, ReportSender};
