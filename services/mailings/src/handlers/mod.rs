pub mod attempt;
pub mod client;
pub mod health;
pub mod mailing;
pub mod message;
pub mod report;
