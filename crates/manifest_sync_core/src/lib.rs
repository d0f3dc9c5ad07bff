//! Shared manifest-sync domain primitives.
//!
//! This crate owns the deterministic part of a manifest-driven transfer: the
//! notification contract, manifest decoding, key partitioning, include-pattern
//! construction, and error-log naming. It intentionally excludes AWS SDK and
//! Lambda runtime concerns.

pub mod contract;
pub mod manifest;
pub mod storage_keys;
