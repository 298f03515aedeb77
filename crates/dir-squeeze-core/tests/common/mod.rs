#![allow(dead_code)]

use dir_squeeze_core::{DeliveryConfig, Error, OpenFileProbe, ReportMessage, ReportSender};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Captures every message instead of sending it.
#[derive(Clone, Default)]
pub struct RecordingSender {
    pub sent: Arc<Mutex<Vec<ReportMessage>>>,
}

impl RecordingSender {
    pub fn messages(&self) -> Vec<ReportMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl ReportSender for RecordingSender {
    fn send(&self, message: &ReportMessage) -> Result<(), Error> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Relay that always refuses.
pub struct RefusingSender;

impl ReportSender for RefusingSender {
    fn send(&self, _message: &ReportMessage) -> Result<(), Error> {
        Err(Error::Delivery("554 relay rejected".into()))
    }
}

/// Reports the listed paths as held open by another process.
#[derive(Default)]
pub struct ScriptedProbe {
    pub open: HashSet<PathBuf>,
}

impl ScriptedProbe {
    pub fn with_open(paths: &[PathBuf]) -> Self {
        Self {
            open: paths.iter().cloned().collect(),
        }
    }
}

impl OpenFileProbe for ScriptedProbe {
    fn is_open(&self, path: &Path) -> Result<bool, Error> {
        Ok(self.open.contains(path))
    }
}

pub fn delivery(label: &Path) -> DeliveryConfig {
    DeliveryConfig {
        sender: "daemon@localhost".into(),
        recipient: "ops@example.com".into(),
        relay_host: "localhost".into(),
        target_label: label.display().to_string(),
    }
}

pub fn write_file(path: &Path, size: usize) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, "a".repeat(size)).unwrap();
}

/// Every file under `root` with its size, sorted by path.
pub fn snapshot(root: &Path) -> Vec<(PathBuf, u64)> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).unwrap().flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let size = fs::metadata(&path).unwrap().len();
                out.push((path, size));
            }
        }
    }
    out.sort();
    out
}
