mod commands;
mod logging;
mod mailer;
mod progress;
mod signals;
mod validate;

use std::process;
use std::time::Duration;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use colored::*;
use commands::Cli;
use dir_squeeze_core::probe::system_probe;
use dir_squeeze_core::{
    config, CycleEngine, Daemon, DaemonSettings, DaemonState, DeliveryConfig, Error, ScanConfig,
};
use dotenv::dotenv;
use mailer::SmtpReportSender;
use progress::LogObserver;
use tracing::{error, info, warn};

fn main() {
    dotenv().ok();

    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            process::exit(code);
        }
    };

    let guard = logging::init_logger();

    if let Err(err) = run(args) {
        error!("{:#}", err);
        let code = err.downcast_ref::<Error>().map(Error::exit_code).unwrap_or(1);
        // process::exit skips destructors; flush the log file first.
        drop(guard);
        process::exit(code);
    }
}

fn run(args: Cli) -> anyhow::Result<()> {
    let mut settings = config::load_configuration().map_err(Error::from)?;
    args.apply_overrides(&mut settings);

    let sender = settings.sender.clone().unwrap_or_else(default_sender);
    validate::check_address("Recipient", &args.email_address)?;
    validate::check_address("Sender", &sender)?;
    validate::check_hostname(&settings.smtp_host)?;

    let scan_config = ScanConfig::new(
        &args.target_dir,
        args.file_size_threshold,
        args.dry_run,
        Duration::from_secs(settings.sleep_secs),
    )?;
    let delivery = DeliveryConfig {
        sender,
        recipient: args.email_address.clone(),
        relay_host: settings.smtp_host.clone(),
        target_label: args.target_dir.display().to_string(),
    };

    if args.print_config {
        println!("Settings: {:#?}", settings);
        println!("Scan: {:#?}", scan_config);
        println!("Delivery: {:#?}", delivery);
        return Ok(());
    }

    info!(
        "Watching {} (threshold {} bytes, every {}s{})",
        scan_config.target_dir.display(),
        scan_config.size_threshold,
        settings.sleep_secs,
        if scan_config.dry_run { ", dry run" } else { "" }
    );

    let daemon = build_daemon(scan_config, &settings, delivery);
    signals::install_stop_handler(daemon.state().clone())
        .context("Unable to install signal handler")?;

    if args.once {
        let result = daemon.run_once(&LogObserver)?;
        if !result.delivered {
            warn!("Report for this scan was not delivered");
        }
        return Ok(());
    }

    let summary = daemon.run(&LogObserver)?;
    info!(
        "Stopped after {} scans: {} files compressed, {} bytes saved, {} reports undelivered",
        format!("{}", summary.cycles).green(),
        format!("{}", summary.files_compressed).green(),
        format!("{}", summary.bytes_saved).green(),
        format!("{}", summary.reports_undelivered).red(),
    );
    Ok(())
}

fn build_daemon(scan_config: ScanConfig, settings: &DaemonSettings, delivery: DeliveryConfig) -> Daemon {
    let engine = CycleEngine::new(
        scan_config,
        settings.scan_policy(),
        delivery,
        Box::new(SmtpReportSender),
        system_probe(),
    );
    Daemon::new(engine, DaemonState::new()).with_sleep_mode(settings.sleep_mode())
}

/// `<login user>@<hostname>`.
#[cfg(unix)]
fn default_sender() -> String {
    use nix::unistd::{gethostname, getuid, User};

    let user = User::from_uid(getuid())
        .ok()
        .flatten()
        .map(|user| user.name)
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "root".to_string());
    let host = gethostname()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "localhost".to_string());
    format!("{}@{}", user, host)
}

#[cfg(not(unix))]
fn default_sender() -> String {
    let user = std::env::var("USERNAME").unwrap_or_else(|_| "daemon".to_string());
    let host = std::env::var("COMPUTERNAME").unwrap_or_else(|_| "localhost".to_string());
    format!("{}@{}", user, host)
}
