//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod alert_repo;
pub mod item_repo;

pub use alert_repo::AlertRepo;
pub use item_repo::ItemRepo;
