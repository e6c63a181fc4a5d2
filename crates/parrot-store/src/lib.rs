//! # parrot-store
//!
//! Durable storage for the Parrot relay (SQLite-backed): trigger→reply
//! rules, the contact allow-list, and recurring schedules.

pub mod store;

pub use store::{schedule_id, Schedule, Store};
