//! Email notifier for the remote backend.
//!
//! Composes a multi-part message: an alternative part carrying the
//! plain-text and HTML renditions of the report, plus one binary part per
//! embedded image selected by the budgeter. Urgent reports get priority
//! headers. A delivery failure never rolls back storage — the report is
//! already persisted by the time this runs.

use std::error::Error as StdError;
use std::sync::Arc;

use lettre::message::header::{ContentType, Header, HeaderName, HeaderValue};
use lettre::message::{Attachment, Body, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use fieldpost_core::Config;

/// `X-Priority: 1` marks the message highest-priority in most clients.
#[derive(Debug, Clone)]
struct XPriority;

impl Header for XPriority {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Priority")
    }

    fn parse(_s: &str) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        Ok(XPriority)
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), "1 (Highest)".to_string())
    }
}

/// `Importance: high`, the companion header understood by the rest.
#[derive(Debug, Clone)]
struct Importance;

impl Header for Importance {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Importance")
    }

    fn parse(_s: &str) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        Ok(Importance)
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), "high".to_string())
    }
}

/// One image inlined into the notification.
#[derive(Debug, Clone)]
pub struct EmbeddedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Email notifier. Remote mode only; `from_config` returns `None` when
/// SMTP or the report addresses are not configured.
#[derive(Clone)]
pub struct EmailNotifier {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
    to: String,
}

impl EmailNotifier {
    pub fn from_config(config: &Config) -> Option<Self> {
        let host = config.smtp_host.as_deref()?;
        let from = config.email_from.clone()?;
        let to = config.email_to.clone()?;
        let port = config.smtp_port;

        let mailer = if config.smtp_tls {
            let b = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host).ok()?;
            let b = b.port(port);
            let b = if let (Some(u), Some(p)) = (&config.smtp_user, &config.smtp_password) {
                b.credentials(Credentials::new(u.clone(), p.clone()))
            } else {
                b
            };
            tracing::info!(
                host = %host,
                port = port,
                "Email notifier initialized (SMTP with STARTTLS)"
            );
            b.build()
        } else {
            let b = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(port);
            let b = if let (Some(u), Some(p)) = (&config.smtp_user, &config.smtp_password) {
                b.credentials(Credentials::new(u.clone(), p.clone()))
            } else {
                b
            };
            tracing::info!(host = %host, port = port, "Email notifier initialized (SMTP)");
            b.build()
        };

        Some(Self {
            mailer: Arc::new(mailer),
            from,
            to,
        })
    }

    /// Send one report notification.
    ///
    /// A multi-part message is composed whenever attachments or urgent
    /// headers are present; the single-part path cannot carry either.
    pub async fn send(
        &self,
        subject: &str,
        text_body: &str,
        html_body: &str,
        embedded: &[EmbeddedFile],
        urgent: bool,
    ) -> Result<(), String> {
        let from_addr: Mailbox = self
            .from
            .parse()
            .map_err(|e| format!("Invalid REPORT_EMAIL_FROM: {}", e))?;
        let to_addr: Mailbox = self
            .to
            .parse()
            .map_err(|e| format!("Invalid REPORT_EMAIL_TO: {}", e))?;

        let mut builder = Message::builder()
            .from(from_addr)
            .to(to_addr)
            .subject(subject);

        if urgent {
            builder = builder.header(XPriority).header(Importance);
        }

        let alternative =
            MultiPart::alternative_plain_html(text_body.to_string(), html_body.to_string());

        let email = if embedded.is_empty() {
            builder.multipart(alternative).map_err(|e| e.to_string())?
        } else {
            let mut mixed = MultiPart::mixed().multipart(alternative);
            for file in embedded {
                let content_type = ContentType::parse(&file.content_type)
                    .map_err(|e| format!("Invalid content type {}: {}", file.content_type, e))?;
                mixed = mixed.singlepart(
                    Attachment::new(file.filename.clone())
                        .body(Body::new(file.data.clone()), content_type),
                );
            }
            builder.multipart(mixed).map_err(|e| e.to_string())?
        };

        self.mailer.send(email).await.map_err(|e| e.to_string())?;
        info!(
            attachments = embedded.len(),
            urgent = urgent,
            "Report notification sent"
        );
        Ok(())
    }
}

/// MIME type for an embedded attachment, from its extension.
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_returns_none_without_smtp() {
        // Local-mode config carries no SMTP settings at all.
        let config = Config::for_local_folder("/tmp/fieldpost-test");
        assert!(EmailNotifier::from_config(&config).is_none());
    }

    #[test]
    fn from_config_builds_when_remote_settings_present() {
        let mut config = Config::for_local_folder("/tmp/fieldpost-test");
        config.smtp_host = Some("smtp.example.com".to_string());
        config.email_from = Some("reports@example.com".to_string());
        config.email_to = Some("human@example.com".to_string());
        assert!(EmailNotifier::from_config(&config).is_some());
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for("shot.png"), "image/png");
        assert_eq!(content_type_for("photo.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("blob.bin"), "application/octet-stream");
    }

    #[test]
    fn priority_headers_render() {
        assert_eq!(XPriority::name().to_string(), "X-Priority");
        assert_eq!(Importance::name().to_string(), "Importance");
    }
}
