pub mod walk;

use crate::compress;
use crate::config::{ScanConfig, ScanPolicy};
use crate::error::Error;
use crate::filter::{EligibilityFilter, FileRecord, Verdict};
use crate::probe::OpenFileProbe;
use crate::progress::CycleObserver;
use crate::report::CycleReport;
use glob::Pattern;
use tracing::{info, warn};

/// Walks the target tree once per call and feeds every regular file through
/// the eligibility filter and, when eligible, the compression transition.
pub struct Scanner {
    config: ScanConfig,
    filter: EligibilityFilter,
    ignore_patterns: Vec<Pattern>,
}

impl Scanner {
    pub fn new(config: ScanConfig, policy: &ScanPolicy, probe: Box<dyn OpenFileProbe>) -> Self {
        let filter = EligibilityFilter::new(&policy.skip_extensions, config.size_threshold, probe);
        Self {
            ignore_patterns: walk::compile_patterns(&policy.ignore_patterns),
            config,
            filter,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// One full traversal. Files are handled one at a time, to completion.
    ///
    /// Returns early only on a compression or deletion error; whatever was
    /// accumulated up to that point stays in `report`.
    pub fn scan(&self, report: &mut CycleReport, observer: &dyn CycleObserver) -> Result<(), Error> {
        for path in walk::regular_files(&self.config.target_dir, &self.ignore_patterns) {
            info!("Working on file: {}", path.display());

            // The file may have vanished between listing and now.
            let record = match FileRecord::from_path(&path) {
                Ok(record) => record,
                Err(err) => {
                    warn!("Unable to read metadata for {}: {}", path.display(), err);
                    continue;
                }
            };

            let verdict = self.filter.classify(&record);
            observer.on_file(&record.path, verdict);

            match verdict {
                Verdict::SkipFormat => {
                    info!(
                        "Skipping already compressed file format .{}: {}",
                        record.extension.as_deref().unwrap_or_default(),
                        record.path.display()
                    );
                    report.record_skipped(&record.path);
                }
                Verdict::SkipTooSmall => {
                    info!(
                        "Skipping file {} since file size {} is below specified threshold of {}",
                        record.path.display(),
                        record.size,
                        self.config.size_threshold
                    );
                    report.record_skipped(&record.path);
                }
                Verdict::SkipInUse => {
                    info!(
                        "Skipping file {} since it is currently in use by another process",
                        record.path.display()
                    );
                    report.record_deferred(&record.path);
                }
                Verdict::Proceed => {
                    report.mark_found();
                    let outcome = compress::compress_file(&record, self.config.dry_run)?;
                    report.record_compressed(&record.path, outcome.size_delta);
                }
            }
        }
        Ok(())
    }
}
