//! The notification channel contract.

use async_trait::async_trait;
use homestock_db::models::alert::AlertWithItem;

use crate::format;

/// Failure modes for sending a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The relay refused the connection, the credentials, or the message.
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// A configured from/to address is not a valid mailbox.
    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The message could not be assembled.
    #[error("Notification build error: {0}")]
    Build(String),

    /// The send did not complete within the allowed time.
    #[error("Notification send timed out after {0} seconds")]
    Timeout(u64),
}

/// Delivers one notification covering a whole batch of due alerts.
///
/// The contract is all-or-nothing: `Ok(())` means the entire batch was
/// delivered, any error means none of it should be considered sent. There
/// is no partial-batch result, and the engine relies on that to decide
/// whether to advance `last_sent`.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, batch: &[AlertWithItem]) -> Result<(), NotifyError>;
}

/// Fallback notifier that writes the notification to the log instead of
/// sending it anywhere. Used when SMTP is not configured so evaluation
/// stays functional and observable in development.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, batch: &[AlertWithItem]) -> Result<(), NotifyError> {
        tracing::info!(
            alerts = batch.len(),
            subject = %format::subject(batch),
            "low-stock notification (email not configured, logging only)"
        );
        tracing::debug!("{}", format::body(batch));
        Ok(())
    }
}
