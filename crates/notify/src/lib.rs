//! Outbound notification channel for low-stock alerts.
//!
//! The evaluation engine hands a batch of due alerts to a [`Notifier`] and
//! commits the send only after the notifier reports success. Two
//! implementations exist: [`EmailNotifier`] (SMTP via `lettre`) and
//! [`LogNotifier`] (tracing only, used when SMTP is not configured).

pub mod email;
pub mod format;
pub mod notifier;

pub use email::{EmailConfig, EmailNotifier};
pub use notifier::{LogNotifier, Notifier, NotifyError};
