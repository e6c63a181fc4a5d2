//! # parrot-core
//!
//! Core types, traits, configuration, and error handling for the Parrot relay.

pub mod config;
pub mod error;
pub mod matcher;
pub mod message;
pub mod phone;
pub mod traits;

pub use config::shellexpand;
