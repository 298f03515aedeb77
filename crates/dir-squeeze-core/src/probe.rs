use crate::error::Error;
use std::path::Path;

/// Answers whether some process on the host holds a file open.
///
/// The answer is advisory: a file may be opened right after the check.
pub trait OpenFileProbe: Send + Sync {
    fn is_open(&self, path: &Path) -> Result<bool, Error>;
}

/// Probe that never reports a file as open.
pub struct NoopProbe;

impl OpenFileProbe for NoopProbe {
    fn is_open(&self, _path: &Path) -> Result<bool, Error> {
        Ok(false)
    }
}

/// Walks `/proc/<pid>/fd` of every visible process.
/// Processes we are not allowed to inspect are skipped.
#[cfg(target_os = "linux")]
pub struct ProcfsProbe;

#[cfg(target_os = "linux")]
impl OpenFileProbe for ProcfsProbe {
    fn is_open(&self, path: &Path) -> Result<bool, Error> {
        use procfs::process::{all_processes, FDTarget};

        let wanted = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let processes = all_processes().map_err(|e| Error::ProcessInspection(e.to_string()))?;

        for process in processes.flatten() {
            let fds = match process.fd() {
                Ok(fds) => fds,
                Err(_) => continue,
            };
            for fd in fds.flatten() {
                if let FDTarget::Path(target) = fd.target {
                    if target == wanted {
                        return Ok(true);
                    }
                }
            }
        }
        Ok(false)
    }
}

/// The best probe available on this platform.
pub fn system_probe() -> Box<dyn OpenFileProbe> {
    #[cfg(target_os = "linux")]
    {
        Box::new(ProcfsProbe)
    }
    #[cfg(not(target_os = "linux"))]
    {
        Box::new(NoopProbe)
    }
}
