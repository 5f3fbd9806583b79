//! SMTP delivery for low-stock notifications.
//!
//! [`EmailNotifier`] turns a due batch into one plain-text message and hands
//! it to the `lettre` async transport. All settings come from the environment
//! at startup; when `SMTP_HOST` is absent, [`EmailConfig::from_env`] yields
//! `None` and the caller should wire up the
//! [`LogNotifier`](crate::LogNotifier) instead.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use homestock_db::models::alert::AlertWithItem;

use crate::format;
use crate::notifier::{Notifier, NotifyError};

/// STARTTLS submission port, used when `SMTP_PORT` is absent.
const DEFAULT_SMTP_PORT: u16 = 587;

/// Sender used when `SMTP_FROM` is absent.
const DEFAULT_FROM_ADDRESS: &str = "noreply@homestock.local";

/// Upper bound on a single SMTP send. A send that exceeds this counts as a
/// failure, so the batch stays uncommitted and is retried next evaluation.
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Connection and addressing settings for the SMTP channel.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Hostname of the relay to submit through.
    pub smtp_host: String,
    /// Relay port, 587 unless overridden.
    pub smtp_port: u16,
    /// Address the notification is sent from.
    pub from_address: String,
    /// Address the notification is sent to.
    pub to_address: String,
    /// Username, when the relay wants authentication.
    pub smtp_user: Option<String>,
    /// Password, when the relay wants authentication.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Read the channel settings from the environment.
    ///
    /// `SMTP_HOST` decides whether email is configured at all: without it
    /// this returns `None` and the caller falls back to log-only delivery.
    ///
    /// | Variable         | Required | Default                    |
    /// |------------------|----------|----------------------------|
    /// | `SMTP_HOST`      | yes      | --                         |
    /// | `SMTP_PORT`      | no       | `587`                      |
    /// | `SMTP_FROM`      | no       | `noreply@homestock.local`  |
    /// | `ALERT_EMAIL_TO` | no       | same as the from address   |
    /// | `SMTP_USER`      | no       | --                         |
    /// | `SMTP_PASSWORD`  | no       | --                         |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;

        let smtp_port = match std::env::var("SMTP_PORT") {
            Ok(raw) => raw.parse().unwrap_or(DEFAULT_SMTP_PORT),
            Err(_) => DEFAULT_SMTP_PORT,
        };
        let from_address =
            std::env::var("SMTP_FROM").unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string());
        let to_address =
            std::env::var("ALERT_EMAIL_TO").unwrap_or_else(|_| from_address.clone());

        Some(Self {
            smtp_host,
            smtp_port,
            from_address,
            to_address,
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// EmailNotifier
// ---------------------------------------------------------------------------

/// Delivers one summary email per due batch through an SMTP relay.
pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    /// Wrap the given settings; nothing connects until the first send.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// STARTTLS transport to the configured relay. Credentials are attached
    /// only when both user and password were provided.
    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifyError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);
        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        Ok(builder.build())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, batch: &[AlertWithItem]) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(self.config.to_address.parse()?)
            .subject(format::subject(batch))
            .header(ContentType::TEXT_PLAIN)
            .body(format::body(batch))
            .map_err(|e| NotifyError::Build(e.to_string()))?;

        let mailer = self.transport()?;
        match tokio::time::timeout(SEND_TIMEOUT, mailer.send(message)).await {
            Ok(sent) => {
                sent?;
            }
            Err(_) => return Err(NotifyError::Timeout(SEND_TIMEOUT.as_secs())),
        }

        tracing::info!(
            to = %self.config.to_address,
            alerts = batch.len(),
            "Low-stock notification email sent"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
