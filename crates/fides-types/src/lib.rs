//! Shared types, adapter traits, and core utilities for the Fides consent engine.
//!
//! This crate contains the data model (consent record, notices, experiences)
//! and the traits the engine uses to reach its host: durable cookie storage,
//! browser signals, and the pluggable remote fetch/save functions. Adapter
//! crates depend only on this crate.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod api_adapter;
pub mod consent;
pub mod cookie_adapter;
pub mod error;
pub mod experience;
pub mod prelude;
pub mod signal;
pub mod types;
pub mod utils;

// vim: ts=4
