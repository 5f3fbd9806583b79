//! Low-stock alert evaluation.
//!
//! Pure logic with no database access. The caller is responsible for fetching
//! alert rows (with their item quantities) from the DB and passing them in
//! as [`AlertCandidate`] snapshots; [`select_due`] decides which alerts are
//! triggered and which of those are due for a notification.

use std::time::Duration;

use crate::types::{DbId, Timestamp};

/// Minimum interval between two notifications for the same alert.
pub const NOTIFY_COOLDOWN: Duration = Duration::from_secs(24 * 60 * 60);

/// A single alert snapshot used by the evaluator.
///
/// Carries exactly the fields the triggered/due decision needs; the full
/// alert and item rows stay with the caller.
#[derive(Debug, Clone)]
pub struct AlertCandidate {
    pub alert_id: DbId,
    /// Current stock quantity of the alert's item.
    pub quantity: i32,
    /// The alert fires when `quantity <= threshold`.
    pub threshold: i32,
    pub is_active: bool,
    /// When this alert last produced a notification; `None` means never.
    pub last_sent: Option<Timestamp>,
}

/// Result of evaluating a batch of candidates at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationOutcome {
    /// How many candidates were examined.
    pub checked: usize,
    /// How many were triggered (at or below threshold).
    pub triggered: usize,
    /// Ids of the triggered alerts whose cooldown window has elapsed, in
    /// input order.
    pub due: Vec<DbId>,
}

/// Whether an item quantity violates an alert threshold.
pub fn is_triggered(quantity: i32, threshold: i32) -> bool {
    quantity <= threshold
}

/// Whether an alert's notification cooldown has elapsed at `now`.
///
/// A never-notified alert (`last_sent = None`) is always due.
pub fn is_due(last_sent: Option<Timestamp>, now: Timestamp) -> bool {
    match last_sent {
        None => true,
        Some(sent) => {
            let cooldown = chrono::Duration::from_std(NOTIFY_COOLDOWN).expect("valid duration");
            now.signed_duration_since(sent) >= cooldown
        }
    }
}

/// Evaluate a batch of alert candidates at `now`.
///
/// Inactive candidates are skipped entirely: they count as checked but are
/// never triggered, regardless of quantity. A triggered alert whose item has
/// since recovered above the threshold is simply absent from the result; it
/// is not reset and will re-trigger naturally on a later drop.
pub fn select_due(candidates: &[AlertCandidate], now: Timestamp) -> EvaluationOutcome {
    let mut triggered = 0;
    let mut due = Vec::new();

    for candidate in candidates {
        if !candidate.is_active {
            continue;
        }
        if !is_triggered(candidate.quantity, candidate.threshold) {
            continue;
        }
        triggered += 1;

        if is_due(candidate.last_sent, now) {
            due.push(candidate.alert_id);
        }
    }

    EvaluationOutcome {
        checked: candidates.len(),
        triggered,
        due,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
