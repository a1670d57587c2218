//! sea-orm entities for the mailings service.

pub mod clients;
pub mod mailing_attempts;
pub mod mailing_recipients;
pub mod mailings;
pub mod messages;
