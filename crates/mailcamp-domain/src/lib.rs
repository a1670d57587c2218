//! Domain types shared across Mailcamp crates.
//!
//! Pure types with no framework dependencies: identifiers, pagination and the
//! mailing lifecycle (status engine and schedule rules).

pub mod id;
pub mod mailing;
pub mod pagination;
