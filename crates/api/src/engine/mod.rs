//! Low-stock alert evaluation and notification dispatch.
//!
//! [`AlertEngine::evaluate`] is the single entry point: resolve the candidate
//! alerts for a scope, decide which are triggered and due (pure logic in
//! `homestock_core::lowstock`), send exactly one notification covering the
//! whole due batch, then commit `last_sent`. The engine keeps no state
//! between invocations and runs no timer of its own; callers schedule it via
//! the sweep endpoint or the per-item mutation hook.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use homestock_core::lowstock::{self, AlertCandidate};
use homestock_core::types::DbId;
use homestock_db::models::alert::AlertWithItem;
use homestock_db::repositories::AlertRepo;
use homestock_db::DbPool;
use homestock_notify::{Notifier, NotifyError};

/// Which alerts an evaluation pass considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationScope {
    /// Active alerts belonging to a single item (per-item hook).
    ForItem(DbId),
    /// Every active alert (scheduled sweep).
    AllActive,
}

/// Outcome counts for one evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSummary {
    /// Active alerts considered.
    pub checked_alerts: usize,
    /// Alerts whose item quantity was at or below the threshold.
    pub triggered_alerts: usize,
    /// Alerts covered by a successfully dispatched notification.
    pub sent_alerts: usize,
}

/// Error type for evaluation failures.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Candidate query or commit write failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The notifier failed or timed out; nothing was committed.
    #[error("Notification dispatch failed: {0}")]
    Dispatch(#[from] NotifyError),
}

/// Evaluates alerts and dispatches low-stock notifications.
pub struct AlertEngine {
    pool: DbPool,
    notifier: Arc<dyn Notifier>,
}

impl AlertEngine {
    /// Create a new engine over the given pool and notification channel.
    pub fn new(pool: DbPool, notifier: Arc<dyn Notifier>) -> Self {
        Self { pool, notifier }
    }

    /// Run one evaluation pass over the given scope.
    ///
    /// At most one notification is sent per pass, covering every due alert.
    /// `last_sent` is committed only after the notifier reports success, so
    /// a failed or timed-out send leaves the whole batch eligible for the
    /// next pass. A pass with no due alerts has no side effects at all.
    pub async fn evaluate(
        &self,
        scope: EvaluationScope,
    ) -> Result<EvaluationSummary, EngineError> {
        let candidates = match scope {
            EvaluationScope::ForItem(item_id) => {
                AlertRepo::find_active_for_item(&self.pool, item_id).await?
            }
            EvaluationScope::AllActive => AlertRepo::find_all_active(&self.pool).await?,
        };

        // One clock reading drives the due decision, the commit timestamp,
        // and the commit cutoff.
        let now = Utc::now();
        let outcome = lowstock::select_due(&as_candidates(&candidates), now);

        if outcome.due.is_empty() {
            return Ok(EvaluationSummary {
                checked_alerts: outcome.checked,
                triggered_alerts: outcome.triggered,
                sent_alerts: 0,
            });
        }

        // The batch keeps repository order; `due` is a subset of the
        // candidate ids.
        let due: HashSet<DbId> = outcome.due.iter().copied().collect();
        let batch: Vec<AlertWithItem> = candidates
            .into_iter()
            .filter(|row| due.contains(&row.id))
            .collect();

        self.notifier.notify(&batch).await?;

        let ids: Vec<DbId> = batch.iter().map(|row| row.id).collect();
        let cutoff =
            now - chrono::Duration::from_std(lowstock::NOTIFY_COOLDOWN).expect("valid duration");
        let advanced = AlertRepo::mark_sent(&self.pool, &ids, now, cutoff).await?;
        if (advanced as usize) < ids.len() {
            tracing::warn!(
                requested = ids.len(),
                advanced,
                "Concurrent evaluation already recorded part of this batch"
            );
        }

        tracing::info!(
            scope = ?scope,
            checked = outcome.checked,
            triggered = outcome.triggered,
            sent = ids.len(),
            "Low-stock notification dispatched"
        );

        Ok(EvaluationSummary {
            checked_alerts: outcome.checked,
            triggered_alerts: outcome.triggered,
            sent_alerts: ids.len(),
        })
    }

    /// Fire-and-forget evaluation for one item, used after quantity
    /// mutations. Failures are logged and swallowed so the mutation that
    /// triggered the hook never fails on its notification side effect.
    pub fn spawn_for_item(self: Arc<Self>, item_id: DbId) {
        tokio::spawn(async move {
            if let Err(e) = self.evaluate(EvaluationScope::ForItem(item_id)).await {
                tracing::error!(error = %e, item_id, "Per-item alert evaluation failed");
            }
        });
    }
}

fn as_candidates(rows: &[AlertWithItem]) -> Vec<AlertCandidate> {
    rows.iter()
        .map(|row| AlertCandidate {
            alert_id: row.id,
            quantity: row.quantity,
            threshold: row.threshold,
            is_active: row.is_active,
            last_sent: row.last_sent,
        })
        .collect()
}
