//! Test utilities for Mailcamp services.
//!
//! Use from `dev-dependencies` only.

pub mod auth;
