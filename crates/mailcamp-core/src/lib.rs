//! Service plumbing shared by Mailcamp binaries: configuration, tracing,
//! HTTP middleware and serialization helpers.

pub mod config;
pub mod middleware;
pub mod serde;
pub mod tracing;
