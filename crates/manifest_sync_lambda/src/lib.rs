//! AWS-oriented adapters and handler for manifest-driven DataSync transfers.
//!
//! This crate owns runtime integration details (configuration, the Lambda
//! handler, logging, and the storage/transfer adapter seams). Manifest parsing
//! and include-pattern rules live in `manifest_sync_core`.

pub mod adapters;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
