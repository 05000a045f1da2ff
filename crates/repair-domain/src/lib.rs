//! Domain types shared across the repair desk crates.
//!
//! Pure types with no framework dependencies.

pub mod pagination;
pub mod repair;
pub mod user;
