use crate::error::Error;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Extensions treated as already compressed. Matched case-sensitively.
pub const DEFAULT_SKIP_EXTENSIONS: [&str; 6] = ["tgz", "gzip", "gz", "jpg", "jpeg", "zip"];

pub const DEFAULT_SLEEP_SECS: u64 = 300;
pub const DEFAULT_SMTP_HOST: &str = "localhost";
pub const ENV_PREFIX: &str = "DIR_SQUEEZE";

/// What to do when the compress-then-delete sequence fails for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Stop the daemon; the process exits with the error's code.
    #[default]
    Exit,
    /// Abandon the rest of the current cycle and carry on with the next one.
    AbortCycle,
}

/// How the daemon waits between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SleepMode {
    /// Wake immediately when a stop is requested.
    #[default]
    Interruptible,
    /// Always sleep the full interval, even after a stop request.
    Legacy,
}

/// Immutable per-run scan settings.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub target_dir: PathBuf,
    pub size_threshold: u64,
    pub dry_run: bool,
    pub sleep_interval: Duration,
}

impl ScanConfig {
    /// Build a config, checking that the target directory can be read.
    pub fn new(
        target_dir: impl Into<PathBuf>,
        size_threshold: u64,
        dry_run: bool,
        sleep_interval: Duration,
    ) -> Result<Self, Error> {
        let target_dir = target_dir.into();
        check_readable_dir(&target_dir)?;
        Ok(Self {
            target_dir,
            size_threshold,
            dry_run,
            sleep_interval,
        })
    }
}

fn check_readable_dir(dir: &Path) -> Result<(), Error> {
    if !dir.is_dir() {
        return Err(Error::Validation(format!(
            "Unable to access specified directory: {}",
            dir.display()
        )));
    }
    fs::read_dir(dir).map_err(|err| {
        Error::Validation(format!(
            "Unable to access specified directory {}: {}",
            dir.display(),
            err
        ))
    })?;
    Ok(())
}

/// Which files a scan considers and how it reacts to transition failures.
#[derive(Debug, Clone)]
pub struct ScanPolicy {
    pub skip_extensions: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub error_policy: ErrorPolicy,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            skip_extensions: DEFAULT_SKIP_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            ignore_patterns: Vec::new(),
            error_policy: ErrorPolicy::Exit,
        }
    }
}

/// Addressing for the cycle report.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub sender: String,
    pub recipient: String,
    pub relay_host: String,
    pub target_label: String,
}

/// Settings layered from `dir-squeeze.toml` and `DIR_SQUEEZE_*` variables.
/// Command-line flags override these.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DaemonSettings {
    pub sleep_secs: u64,
    pub sender: Option<String>,
    pub smtp_host: String,
    pub skip_extensions: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub error_policy: ErrorPolicy,
    pub legacy_sleep: bool,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        let policy = ScanPolicy::default();
        Self {
            sleep_secs: DEFAULT_SLEEP_SECS,
            sender: None,
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            skip_extensions: policy.skip_extensions,
            ignore_patterns: policy.ignore_patterns,
            error_policy: policy.error_policy,
            legacy_sleep: false,
        }
    }
}

impl DaemonSettings {
    pub fn scan_policy(&self) -> ScanPolicy {
        ScanPolicy {
            skip_extensions: self.skip_extensions.clone(),
            ignore_patterns: self.ignore_patterns.clone(),
            error_policy: self.error_policy,
        }
    }

    pub fn sleep_mode(&self) -> SleepMode {
        if self.legacy_sleep {
            SleepMode::Legacy
        } else {
            SleepMode::Interruptible
        }
    }
}

pub fn load_configuration() -> Result<DaemonSettings, ConfigError> {
    load_configuration_from("dir-squeeze")
}

/// Load settings from an optional config file (any extension `config`
/// understands) and the environment.
pub fn load_configuration_from(file_stem: &str) -> Result<DaemonSettings, ConfigError> {
    load_settings(file_stem, ENV_PREFIX)
}

/// List keys take comma-separated values in the environment,
/// e.g. `DIR_SQUEEZE_IGNORE_PATTERNS="**/.git,*.tmp"`.
fn load_settings(file_stem: &str, env_prefix: &str) -> Result<DaemonSettings, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name(file_stem).required(false))
        .add_source(
            Environment::with_prefix(env_prefix)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("skip_extensions")
                .with_list_parse_key("ignore_patterns"),
        )
        .build()?;
    builder.try_deserialize::<DaemonSettings>()
}
