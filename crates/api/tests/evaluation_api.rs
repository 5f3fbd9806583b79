//! Integration tests for the evaluation engine behind `POST /alerts/check`
//! and the quantity-update hook on `PATCH /items/{id}`.
//!
//! Notifier doubles stand in for SMTP so tests can observe exactly what
//! would have been sent, and when nothing should be.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{body_json, get, patch_json, post, post_json};
use homestock_db::models::alert::AlertWithItem;
use homestock_notify::{Notifier, NotifyError};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Notifier doubles
// ---------------------------------------------------------------------------

/// Records every batch it is asked to deliver.
#[derive(Default)]
struct RecordingNotifier {
    batches: Mutex<Vec<Vec<AlertWithItem>>>,
}

impl RecordingNotifier {
    fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    fn batch(&self, index: usize) -> Vec<AlertWithItem> {
        self.batches.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, batch: &[AlertWithItem]) -> Result<(), NotifyError> {
        self.batches.lock().unwrap().push(batch.to_vec());
        Ok(())
    }
}

/// Always refuses to deliver.
struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _batch: &[AlertWithItem]) -> Result<(), NotifyError> {
        Err(NotifyError::Build("refused by test".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Create an item through the API and return its id.
async fn seed_item(pool: &PgPool, name: &str, quantity: i32) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/items",
        json!({"name": name, "quantity": quantity}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Create an alert through the API and return its id.
async fn seed_alert(pool: &PgPool, item_id: i64, threshold: i32) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/alerts",
        json!({"itemId": item_id, "threshold": threshold}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

/// Rewind an alert's `last_sent` by the given number of hours.
async fn backdate_last_sent(pool: &PgPool, alert_id: i64, hours: i32) {
    sqlx::query("UPDATE alerts SET last_sent = NOW() - make_interval(hours => $2) WHERE id = $1")
        .bind(alert_id)
        .bind(hours)
        .execute(pool)
        .await
        .unwrap();
}

/// Fetch an alert's `lastSent` field as JSON.
async fn fetch_last_sent(pool: &PgPool, alert_id: i64) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/alerts/{alert_id}")).await;
    body_json(response).await["lastSent"].clone()
}

/// Wait until the recorder has seen at least `n` batches, or panic.
///
/// The quantity-update hook runs on a spawned task, so tests that exercise
/// it have to poll rather than assert immediately.
async fn wait_for_batches(recorder: &RecordingNotifier, n: usize) {
    for _ in 0..50 {
        if recorder.batch_count() >= n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("notifier did not receive {n} batch(es) in time");
}

/// Wait until an alert's `lastSent` is stamped, or panic.
///
/// The spawned evaluation stamps the row after the notifier call returns,
/// so observing the batch does not yet guarantee the stamp is committed.
async fn wait_for_last_sent(pool: &PgPool, alert_id: i64) {
    for _ in 0..50 {
        if fetch_last_sent(pool, alert_id).await.is_string() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("alert {alert_id} was never stamped");
}

// ---------------------------------------------------------------------------
// Test: a triggered alert is sent once and stamped
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_check_sends_and_stamps_last_sent(pool: PgPool) {
    // Quantity exactly at the threshold counts as triggered.
    let item_id = seed_item(&pool, "Rice", 3).await;
    let alert_id = seed_alert(&pool, item_id, 3).await;

    let recorder = Arc::new(RecordingNotifier::default());
    let app = common::build_test_app_with_notifier(pool.clone(), recorder.clone());
    let response = post(app, "/api/v1/alerts/check").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["checkedAlerts"], 1);
    assert_eq!(json["triggeredAlerts"], 1);
    assert_eq!(json["sentAlerts"], 1);

    assert_eq!(recorder.batch_count(), 1);
    let batch = recorder.batch(0);
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].item_name, "Rice");
    assert_eq!(batch[0].quantity, 3);

    assert!(fetch_last_sent(&pool, alert_id).await.is_string());
}

// ---------------------------------------------------------------------------
// Test: an immediate rerun sends nothing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_check_rerun_within_window_sends_nothing(pool: PgPool) {
    let item_id = seed_item(&pool, "Rice", 1).await;
    seed_alert(&pool, item_id, 3).await;

    let recorder = Arc::new(RecordingNotifier::default());
    let app = common::build_test_app_with_notifier(pool.clone(), recorder.clone());
    post(app, "/api/v1/alerts/check").await;

    let app = common::build_test_app_with_notifier(pool, recorder.clone());
    let response = post(app, "/api/v1/alerts/check").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    // Still triggered, but inside the dedup window.
    assert_eq!(json["triggeredAlerts"], 1);
    assert_eq!(json["sentAlerts"], 0);
    assert_eq!(recorder.batch_count(), 1);
}

// ---------------------------------------------------------------------------
// Test: a recovered item is not triggered
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_check_recovered_item_not_triggered(pool: PgPool) {
    let item_id = seed_item(&pool, "Rice", 10).await;
    seed_alert(&pool, item_id, 3).await;

    let recorder = Arc::new(RecordingNotifier::default());
    let app = common::build_test_app_with_notifier(pool, recorder.clone());
    let response = post(app, "/api/v1/alerts/check").await;

    let json = body_json(response).await;
    assert_eq!(json["checkedAlerts"], 1);
    assert_eq!(json["triggeredAlerts"], 0);
    assert_eq!(json["sentAlerts"], 0);
    assert_eq!(recorder.batch_count(), 0);
}

// ---------------------------------------------------------------------------
// Test: multiple low items are batched into one send
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_check_batches_multiple_items_into_one_send(pool: PgPool) {
    let rice = seed_item(&pool, "Rice", 1).await;
    let beans = seed_item(&pool, "Beans", 0).await;
    seed_alert(&pool, rice, 3).await;
    seed_alert(&pool, beans, 2).await;

    let recorder = Arc::new(RecordingNotifier::default());
    let app = common::build_test_app_with_notifier(pool, recorder.clone());
    let response = post(app, "/api/v1/alerts/check").await;

    let json = body_json(response).await;
    assert_eq!(json["sentAlerts"], 2);

    // One notifier call carrying both entries, not one call per alert.
    assert_eq!(recorder.batch_count(), 1);
    let batch = recorder.batch(0);
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0].item_name, "Rice");
    assert_eq!(batch[1].item_name, "Beans");
}

// ---------------------------------------------------------------------------
// Test: several alerts on one item each get an entry
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_check_multiple_alerts_per_item(pool: PgPool) {
    let item_id = seed_item(&pool, "Rice", 2).await;
    seed_alert(&pool, item_id, 3).await;
    seed_alert(&pool, item_id, 10).await;

    let recorder = Arc::new(RecordingNotifier::default());
    let app = common::build_test_app_with_notifier(pool, recorder.clone());
    let response = post(app, "/api/v1/alerts/check").await;

    let json = body_json(response).await;
    assert_eq!(json["checkedAlerts"], 2);
    assert_eq!(json["sentAlerts"], 2);

    let batch = recorder.batch(0);
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0].threshold, 3);
    assert_eq!(batch[1].threshold, 10);
}

// ---------------------------------------------------------------------------
// Test: dispatch failure maps to 502 and leaves no stamp
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_check_dispatch_failure_maps_to_502(pool: PgPool) {
    let item_id = seed_item(&pool, "Rice", 1).await;
    let alert_id = seed_alert(&pool, item_id, 3).await;

    let app = common::build_test_app_with_notifier(pool.clone(), Arc::new(FailingNotifier));
    let response = post(app, "/api/v1/alerts/check").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "DISPATCH_FAILED");

    // The failed send must not be recorded, so the next sweep retries.
    assert!(fetch_last_sent(&pool, alert_id).await.is_null());
}

// ---------------------------------------------------------------------------
// Test: inactive alerts are invisible to the sweep
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_check_skips_inactive_alerts(pool: PgPool) {
    let rice = seed_item(&pool, "Rice", 1).await;
    let beans = seed_item(&pool, "Beans", 1).await;
    seed_alert(&pool, rice, 3).await;
    let muted = seed_alert(&pool, beans, 3).await;

    let app = common::build_test_app(pool.clone());
    patch_json(
        app,
        &format!("/api/v1/alerts/{muted}"),
        json!({"isActive": false}),
    )
    .await;

    let recorder = Arc::new(RecordingNotifier::default());
    let app = common::build_test_app_with_notifier(pool, recorder.clone());
    let response = post(app, "/api/v1/alerts/check").await;

    let json = body_json(response).await;
    // The muted alert is not even counted as checked.
    assert_eq!(json["checkedAlerts"], 1);
    assert_eq!(json["sentAlerts"], 1);

    let batch = recorder.batch(0);
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].item_name, "Rice");
}

// ---------------------------------------------------------------------------
// Test: the dedup window expires after 24 hours
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_check_resends_after_window_expires(pool: PgPool) {
    let item_id = seed_item(&pool, "Rice", 1).await;
    let alert_id = seed_alert(&pool, item_id, 3).await;

    let recorder = Arc::new(RecordingNotifier::default());
    let app = common::build_test_app_with_notifier(pool.clone(), recorder.clone());
    post(app, "/api/v1/alerts/check").await;
    assert_eq!(recorder.batch_count(), 1);

    backdate_last_sent(&pool, alert_id, 25).await;

    let app = common::build_test_app_with_notifier(pool, recorder.clone());
    let response = post(app, "/api/v1/alerts/check").await;

    let json = body_json(response).await;
    assert_eq!(json["sentAlerts"], 1);
    assert_eq!(recorder.batch_count(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_check_respects_dedup_window(pool: PgPool) {
    let item_id = seed_item(&pool, "Rice", 1).await;
    let alert_id = seed_alert(&pool, item_id, 3).await;

    let recorder = Arc::new(RecordingNotifier::default());
    let app = common::build_test_app_with_notifier(pool.clone(), recorder.clone());
    post(app, "/api/v1/alerts/check").await;

    // 23 hours ago is still inside the 24-hour window.
    backdate_last_sent(&pool, alert_id, 23).await;

    let app = common::build_test_app_with_notifier(pool, recorder.clone());
    let response = post(app, "/api/v1/alerts/check").await;

    let json = body_json(response).await;
    assert_eq!(json["sentAlerts"], 0);
    assert_eq!(recorder.batch_count(), 1);
}

// ---------------------------------------------------------------------------
// Test: an empty database sweeps cleanly
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_check_empty_database(pool: PgPool) {
    let recorder = Arc::new(RecordingNotifier::default());
    let app = common::build_test_app_with_notifier(pool, recorder.clone());
    let response = post(app, "/api/v1/alerts/check").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["checkedAlerts"], 0);
    assert_eq!(json["triggeredAlerts"], 0);
    assert_eq!(json["sentAlerts"], 0);
    assert_eq!(recorder.batch_count(), 0);
}

// ---------------------------------------------------------------------------
// Test: updating quantity spawns a per-item evaluation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_quantity_update_spawns_evaluation(pool: PgPool) {
    let item_id = seed_item(&pool, "Rice", 10).await;
    let alert_id = seed_alert(&pool, item_id, 5).await;

    let recorder = Arc::new(RecordingNotifier::default());
    let app = common::build_test_app_with_notifier(pool.clone(), recorder.clone());
    let response = patch_json(
        app,
        &format!("/api/v1/items/{item_id}"),
        json!({"quantity": 2}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    wait_for_batches(&recorder, 1).await;
    let batch = recorder.batch(0);
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].quantity, 2);

    wait_for_last_sent(&pool, alert_id).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_rename_without_quantity_change_does_not_evaluate(pool: PgPool) {
    // The item is already below threshold, but a rename leaves quantity
    // untouched and must not re-evaluate.
    let item_id = seed_item(&pool, "Rice", 2).await;
    seed_alert(&pool, item_id, 5).await;

    let recorder = Arc::new(RecordingNotifier::default());
    let app = common::build_test_app_with_notifier(pool, recorder.clone());
    let response = patch_json(
        app,
        &format!("/api/v1/items/{item_id}"),
        json!({"name": "Brown Rice"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(recorder.batch_count(), 0);
}
