//! Cross-cutting service plumbing: health probes, request-id/trace layers,
//! tracing bootstrap, and shared serde helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
