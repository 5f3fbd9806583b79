//! Server configuration.

use std::env;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
/// The Vite dev server, so a fresh checkout works without any env setup.
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Runtime settings for the HTTP server, read once at startup.
///
/// SMTP settings live separately in [`homestock_notify::EmailConfig`]
/// because their absence is meaningful (it selects the log-only notifier).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Origins the CORS layer will admit.
    pub cors_origins: Vec<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Read configuration from the environment.
    ///
    /// | Variable               | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `3000`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    ///
    /// # Panics
    ///
    /// Panics when `PORT` or `REQUEST_TIMEOUT_SECS` is set but does not
    /// parse as a number.
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.into());

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().expect("PORT must be a valid u16"),
            Err(_) => DEFAULT_PORT,
        };

        let cors_origins = match env::var("CORS_ORIGINS") {
            Ok(raw) => parse_origins(&raw),
            Err(_) => vec![DEFAULT_CORS_ORIGIN.to_string()],
        };

        let request_timeout_secs = match env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .expect("REQUEST_TIMEOUT_SECS must be a valid u64"),
            Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
        }
    }
}

/// Split a comma-separated origin list, trimming whitespace and dropping
/// blank entries.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
