//! Test utilities for the repair desk service.
//!
//! Import from `[dev-dependencies]` only; never in production code.

pub mod auth;
