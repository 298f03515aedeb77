use clap::Parser;
use dir_squeeze_core::DaemonSettings;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "dir-squeeze")]
#[command(
    about = "Periodically gzip large files under a directory and email a report",
    long_about = None
)]
pub struct Cli {
    /// Directory to crawl
    pub target_dir: PathBuf,
    /// Address that receives the compression report
    pub email_address: String,
    /// Minimum file size in bytes to attempt compression
    pub file_size_threshold: u64,
    /// Only report what would be done; never create or delete files
    #[arg(short = 'r', long)]
    pub dry_run: bool,
    /// Seconds to sleep between directory scans [default: 300]
    #[arg(short = 's', long = "sleep", value_name = "SECONDS")]
    pub sleep_secs: Option<u64>,
    /// Address the report is sent from [default: <user>@<hostname>]
    #[arg(short = 'm', long, value_name = "ADDRESS")]
    pub sender: Option<String>,
    /// SMTP relay host [default: localhost]
    #[arg(short = 'e', long = "smtp-host", value_name = "HOST")]
    pub smtp_host: Option<String>,
    /// Run a single scan, send its report and exit
    #[arg(long)]
    pub once: bool,
    /// Print the effective settings and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Flags win over file and environment settings.
    pub fn apply_overrides(&self, settings: &mut DaemonSettings) {
        if let Some(secs) = self.sleep_secs {
            settings.sleep_secs = secs;
        }
        if let Some(sender) = &self.sender {
            settings.sender = Some(sender.clone());
        }
        if let Some(host) = &self.smtp_host {
            settings.smtp_host = host.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_parses_positionals_and_short_flags() {
        let cli = Cli::try_parse_from([
            "dir-squeeze",
            "-r",
            "-s",
            "60",
            "-m",
            "me@example.com",
            "-e",
            "mail.example.com",
            "/srv/data",
            "ops@example.com",
            "1024",
        ])
        .unwrap();
        assert!(cli.dry_run);
        assert_eq!(cli.sleep_secs, Some(60));
        assert_eq!(cli.sender.as_deref(), Some("me@example.com"));
        assert_eq!(cli.smtp_host.as_deref(), Some("mail.example.com"));
        assert_eq!(cli.target_dir, PathBuf::from("/srv/data"));
        assert_eq!(cli.email_address, "ops@example.com");
        assert_eq!(cli.file_size_threshold, 1024);
    }

    #[test]
    fn test_missing_positionals_is_an_error() {
        let err = Cli::try_parse_from(["dir-squeeze", "/srv/data"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_help_is_reported_as_display_help() {
        let err = Cli::try_parse_from(["dir-squeeze", "-h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_rejects_bad_numbers() {
        assert!(Cli::try_parse_from(["dir-squeeze", "/d", "a@b.c", "-5"]).is_err());
        assert!(Cli::try_parse_from(["dir-squeeze", "-s", "soon", "/d", "a@b.c", "5"]).is_err());
    }

    #[test]
    fn test_flags_override_settings() {
        let cli = Cli::try_parse_from(["dir-squeeze", "-s", "0", "/d", "a@b.c", "5"]).unwrap();
        let mut settings = DaemonSettings::default();
        settings.smtp_host = "relay.internal".to_string();
        cli.apply_overrides(&mut settings);
        assert_eq!(settings.sleep_secs, 0);
        assert_eq!(settings.smtp_host, "relay.internal");
        assert!(settings.sender.is_none());
    }
}
