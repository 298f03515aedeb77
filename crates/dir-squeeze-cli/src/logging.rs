use std::env;
use std::path::Path;
use tracing::info;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const TIMESTAMP_FORMAT: &str = "%y-%m-%d-%H-%M-%S";

pub fn init_logger() -> impl Drop {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter_layer = EnvFilter::new(filter);

    let log_file_path =
        env::var("LOG_FILE_PATH").unwrap_or_else(|_| "./logs/dir-squeeze.log".to_string());
    let (non_blocking, guard) = file_writer(Path::new(&log_file_path));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(false)
                .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
                .with_ansi(false),
        )
        .with(filter_layer)
        .init();

    info!("Tracing is configured for stdout and file logging.");

    guard
}

/// Non-blocking writer for the log file. Lines reach the file at the latest
/// when the guard is dropped, so the guard must outlive the last event.
fn file_writer(log_file_path: &Path) -> (NonBlocking, WorkerGuard) {
    let log_dir = log_file_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let log_file_name = log_file_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "dir-squeeze.log".into());

    let file_appender = tracing_appender::rolling::never(log_dir, log_file_name);
    tracing_appender::non_blocking(file_appender)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_dropping_guard_flushes_last_line() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("logs").join("daemon.log");
        fs::create_dir_all(path.parent().unwrap()).unwrap();

        let (mut writer, guard) = file_writer(&path);
        writer
            .write_all(b"ERROR: Error creating compressed file /srv/a.txt.gz\n")
            .unwrap();
        drop(guard);

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Error creating compressed file /srv/a.txt.gz"));
    }
}
