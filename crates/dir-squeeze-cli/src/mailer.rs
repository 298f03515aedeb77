use dir_squeeze_core::{Error, ReportMessage, ReportSender};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{Address, Message, SmtpTransport, Transport};

/// Sends reports over plain SMTP (port 25) to the relay named in the message.
pub struct SmtpReportSender;

impl SmtpReportSender {
    fn build(message: &ReportMessage) -> Result<Message, Error> {
        let from: Address = message
            .from
            .parse()
            .map_err(|e| Error::Delivery(format!("bad sender address {}: {}", message.from, e)))?;
        let to: Address = message
            .to
            .parse()
            .map_err(|e| Error::Delivery(format!("bad recipient address {}: {}", message.to, e)))?;

        Message::builder()
            .from(Mailbox::new(Some(message.from_name.clone()), from))
            .to(Mailbox::new(None, to))
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| Error::Delivery(e.to_string()))
    }
}

impl ReportSender for SmtpReportSender {
    fn send(&self, message: &ReportMessage) -> Result<(), Error> {
        let email = Self::build(message)?;
        let transport = SmtpTransport::builder_dangerous(message.relay_host.as_str()).build();
        transport
            .send(&email)
            .map(|_| ())
            .map_err(|e| Error::Delivery(format!("{} via {}", e, message.relay_host)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> ReportMessage {
        ReportMessage {
            from_name: "Directory Compression Daemon".into(),
            from: "daemon@example.com".into(),
            to: "ops@example.com".into(),
            relay_host: "localhost".into(),
            subject: "Directory Compression Report for /srv/data".into(),
            body: "---Begin report---\n---End report---\n".into(),
        }
    }

    #[test]
    fn test_builds_plain_text_message() {
        let email = SmtpReportSender::build(&message()).unwrap();
        let raw = String::from_utf8(email.formatted()).unwrap();
        assert!(raw.contains("From: \"Directory Compression Daemon\" <daemon@example.com>")
            || raw.contains("From: Directory Compression Daemon <daemon@example.com>"));
        assert!(raw.contains("To: ops@example.com"));
        assert!(raw.contains("Subject: Directory Compression Report for /srv/data"));
        assert!(raw.contains("Content-Type: text/plain"));
        assert!(raw.contains("---Begin report---"));
    }

    #[test]
    fn test_bad_address_is_delivery_error() {
        let mut bad = message();
        bad.to = "nobody".into();
        assert!(matches!(
            SmtpReportSender::build(&bad),
            Err(Error::Delivery(_))
        ));
    }
}
