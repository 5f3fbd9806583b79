use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::AlertEngine;

/// State shared across every handler, cloned per request by Axum.
///
/// All fields are cheap to clone; the pool is internally reference-counted
/// and the rest sit behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: homestock_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Low-stock evaluation engine, shared by the sweep endpoint and the
    /// per-item hooks spawned after quantity mutations.
    pub engine: Arc<AlertEngine>,
}
