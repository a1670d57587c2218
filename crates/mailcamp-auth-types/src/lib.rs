//! Identity types shared across Mailcamp services.
//!
//! Authentication happens upstream; services only read the identity the
//! gateway forwards.

pub mod identity;
