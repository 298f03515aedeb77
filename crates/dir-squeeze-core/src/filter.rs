use crate::probe::OpenFileProbe;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Outcome of checking one file. Checks run in declaration order and the
/// first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    SkipFormat,
    SkipTooSmall,
    SkipInUse,
    Proceed,
}

/// A file as seen during a single visit.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size: u64,
    pub extension: Option<String>,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let extension = file_extension(&path);
        Self {
            path,
            size,
            extension,
        }
    }

    pub fn from_path(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        Ok(Self::new(path, metadata.len()))
    }
}

/// Last dot-suffix of the file name. Dotfiles like `.bashrc` have none.
pub fn file_extension(path: &Path) -> Option<String> {
    path.extension().map(|ext| ext.to_string_lossy().into_owned())
}

pub struct EligibilityFilter {
    skip_extensions: HashSet<String>,
    size_threshold: u64,
    probe: Box<dyn OpenFileProbe>,
}

impl EligibilityFilter {
    pub fn new(
        skip_extensions: &[String],
        size_threshold: u64,
        probe: Box<dyn OpenFileProbe>,
    ) -> Self {
        Self {
            skip_extensions: skip_extensions.iter().cloned().collect(),
            size_threshold,
            probe,
        }
    }

    pub fn classify(&self, file: &FileRecord) -> Verdict {
        if let Some(ext) = &file.extension {
            if self.skip_extensions.contains(ext) {
                return Verdict::SkipFormat;
            }
        }

        if file.size < self.size_threshold {
            return Verdict::SkipTooSmall;
        }

        match self.probe.is_open(&file.path) {
            Ok(true) => return Verdict::SkipInUse,
            Ok(false) => {}
            // Inspection failures count as "not in use".
            Err(err) => debug!("{} for {}", err, file.path.display()),
        }

        Verdict::Proceed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SKIP_EXTENSIONS;
    use crate::error::Error;
    use crate::probe::NoopProbe;

    struct AlwaysOpen;

    impl OpenFileProbe for AlwaysOpen {
        fn is_open(&self, _path: &Path) -> Result<bool, Error> {
            Ok(true)
        }
    }

    struct BrokenProbe;

    impl OpenFileProbe for BrokenProbe {
        fn is_open(&self, _path: &Path) -> Result<bool, Error> {
            Err(Error::ProcessInspection("permission denied".into()))
        }
    }

    fn defaults() -> Vec<String> {
        DEFAULT_SKIP_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    }

    fn filter(threshold: u64, probe: Box<dyn OpenFileProbe>) -> EligibilityFilter {
        EligibilityFilter::new(&defaults(), threshold, probe)
    }

    #[test]
    fn test_denylisted_extensions_never_proceed() {
        let f = filter(0, Box::new(NoopProbe));
        for ext in DEFAULT_SKIP_EXTENSIONS {
            for size in [0, 1, 10_000_000] {
                let record = FileRecord::new(format!("/data/file.{}", ext), size);
                assert_eq!(f.classify(&record), Verdict::SkipFormat, "{}", ext);
            }
        }
    }

    #[test]
    fn test_format_check_wins_over_size_and_use() {
        let f = filter(1000, Box::new(AlwaysOpen));
        let record = FileRecord::new("/data/tiny.zip", 3);
        assert_eq!(f.classify(&record), Verdict::SkipFormat);
    }

    #[test]
    fn test_too_small_wins_over_in_use() {
        let f = filter(1000, Box::new(AlwaysOpen));
        assert_eq!(
            f.classify(&FileRecord::new("/data/a.txt", 500)),
            Verdict::SkipTooSmall
        );
    }

    #[test]
    fn test_threshold_is_strict() {
        let f = filter(100, Box::new(NoopProbe));
        assert_eq!(
            f.classify(&FileRecord::new("/data/a.txt", 99)),
            Verdict::SkipTooSmall
        );
        assert_eq!(
            f.classify(&FileRecord::new("/data/a.txt", 100)),
            Verdict::Proceed
        );
    }

    #[test]
    fn test_in_use_file_is_deferred() {
        let f = filter(10, Box::new(AlwaysOpen));
        assert_eq!(
            f.classify(&FileRecord::new("/data/app.log", 500)),
            Verdict::SkipInUse
        );
    }

    #[test]
    fn test_probe_failure_means_not_in_use() {
        let f = filter(10, Box::new(BrokenProbe));
        assert_eq!(
            f.classify(&FileRecord::new("/data/app.log", 500)),
            Verdict::Proceed
        );
    }

    #[test]
    fn test_extension_match_is_case_sensitive() {
        let f = filter(0, Box::new(NoopProbe));
        assert_eq!(
            f.classify(&FileRecord::new("/data/PHOTO.JPG", 10)),
            Verdict::Proceed
        );
    }

    #[test]
    fn test_extension_semantics() {
        assert_eq!(file_extension(Path::new("/a/b.tar.gz")), Some("gz".into()));
        assert_eq!(file_extension(Path::new("/a/.bashrc")), None);
        assert_eq!(file_extension(Path::new("/a/README")), None);
        // A dotfile named after a skipped format is still eligible.
        let f = filter(0, Box::new(NoopProbe));
        assert_eq!(f.classify(&FileRecord::new("/a/.gz", 10)), Verdict::Proceed);
    }
}
