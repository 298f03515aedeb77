use crate::config::DeliveryConfig;
use crate::error::Error;
use chrono::{DateTime, Local};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const SENDER_DISPLAY_NAME: &str = "Directory Compression Daemon";

/// Accumulated results of one scan pass. A fresh one is built per cycle.
///
/// Files skipped because another process holds them open go to `deferred`,
/// never to `skipped`: they were not declined, only postponed.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Local>,
    pub dry_run: bool,
    pub compressed: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub deferred: Vec<PathBuf>,
    pub bytes_saved: i64,
    pub found_any: bool,
    /// Set when the cycle stopped early on a transition error.
    pub aborted: Option<String>,
}

impl CycleReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Local::now(),
            dry_run,
            compressed: Vec::new(),
            skipped: Vec::new(),
            deferred: Vec::new(),
            bytes_saved: 0,
            found_any: false,
            aborted: None,
        }
    }

    pub fn mark_found(&mut self) {
        self.found_any = true;
    }

    pub fn record_compressed(&mut self, path: &Path, size_delta: i64) {
        self.compressed.push(path.to_path_buf());
        if !self.dry_run {
            self.bytes_saved += size_delta;
        }
    }

    pub fn record_skipped(&mut self, path: &Path) {
        self.skipped.push(path.to_path_buf());
    }

    pub fn record_deferred(&mut self, path: &Path) {
        self.deferred.push(path.to_path_buf());
    }

    pub fn subject(&self, target_label: &str) -> String {
        format!("Directory Compression Report for {}", target_label)
    }

    pub fn render_body(&self) -> String {
        let mut body = String::new();
        let _ = writeln!(body, "---Begin report---");
        let _ = writeln!(
            body,
            "Scan started: {}",
            self.started_at.format("%Y-%m-%d %H:%M:%S")
        );
        if self.dry_run {
            let _ = writeln!(body, "Dry run: no files were modified");
        }
        if let Some(reason) = &self.aborted {
            let _ = writeln!(body, "Scan aborted: {}", reason);
        }
        let _ = writeln!(body, "Disk space total savings: {} bytes", self.bytes_saved);
        write_list(&mut body, "Compressed files list:", &self.compressed);
        write_list(&mut body, "Skipped files list:", &self.skipped);
        write_list(&mut body, "Deferred (in use) files list:", &self.deferred);
        let _ = writeln!(body, "---End report---");
        body
    }
}

fn write_list(body: &mut String, heading: &str, paths: &[PathBuf]) {
    let _ = writeln!(body, "{}", heading);
    if paths.is_empty() {
        let _ = writeln!(body, "  (none)");
    }
    for path in paths {
        let _ = writeln!(body, "  {}", path.display());
    }
}

/// A plain-text message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMessage {
    pub from_name: String,
    pub from: String,
    pub to: String,
    pub relay_host: String,
    pub subject: String,
    pub body: String,
}

impl ReportMessage {
    pub fn build(report: &CycleReport, delivery: &DeliveryConfig) -> Self {
        Self {
            from_name: SENDER_DISPLAY_NAME.to_string(),
            from: delivery.sender.clone(),
            to: delivery.recipient.clone(),
            relay_host: delivery.relay_host.clone(),
            subject: report.subject(&delivery.target_label),
            body: report.render_body(),
        }
    }
}

/// Delivers a finished report. Fails with `Error::Delivery` when the relay
/// is unreachable or refuses the message.
pub trait ReportSender: Send + Sync {
    fn send(&self, message: &ReportMessage) -> Result<(), Error>;
}

/// Hand the report to `sender`. Delivery failures are logged, never raised.
pub fn dispatch_report(
    report: &CycleReport,
    delivery: &DeliveryConfig,
    sender: &dyn ReportSender,
) -> bool {
    let message = ReportMessage::build(report, delivery);
    let delivered = match sender.send(&message) {
        Ok(()) => {
            info!("Successfully sent report to {}", delivery.recipient);
            true
        }
        Err(err) => {
            error!("{}", err);
            false
        }
    };

    if !report.found_any {
        info!("No files were found to compress");
    }

    delivered
}
