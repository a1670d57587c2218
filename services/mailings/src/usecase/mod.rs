pub mod attempt;
pub mod client;
pub mod dispatch;
pub mod mailing;
pub mod message;
pub mod report;
pub mod status;
