//! Aliases shared by every model and repository.

/// Row identifier. The schema uses BIGSERIAL keys throughout.
pub type DbId = i64;

/// Instant stored as `timestamptz`, always surfaced in UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
