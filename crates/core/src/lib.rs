//! Domain types and pure logic for the homestock inventory platform.
//!
//! This crate holds everything the rest of the workspace shares without
//! touching a database or the network:
//!
//! - [`types`]: primary-key and timestamp aliases.
//! - [`error`]: the domain error taxonomy ([`error::CoreError`]).
//! - [`lowstock`]: the pure low-stock alert evaluator (triggered/due
//!   selection with the 24-hour notification cooldown).

pub mod error;
pub mod lowstock;
pub mod types;
