//! Session credential types shared by the repair desk crates.
//!
//! Provides the HS256 session issuer/validator and the `BearerSession` extractor.

pub mod identity;
pub mod token;
