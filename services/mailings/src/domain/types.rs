use chrono::{DateTime, Utc};

use mailcamp_domain::id::{AttemptId, ClientId, MailingId, MessageId, UserId};
use mailcamp_domain::mailing::{AttemptStatus, MailingStatus, Schedule};

/// Longest transport error kept in an attempt's server response.
pub const MAX_ERROR_LEN: usize = 200;

/// Which rows a repository may see.
///
/// Request handling always works in [`Scope::Owner`]. [`Scope::System`] is
/// reserved for the scheduled dispatch entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Owner(UserId),
    System,
}

impl Scope {
    pub fn owner(self) -> Option<UserId> {
        match self {
            Self::Owner(owner) => Some(owner),
            Self::System => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: ClientId,
    pub owner_id: UserId,
    pub email: String,
    pub full_name: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub owner_id: UserId,
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailing {
    pub id: MailingId,
    pub owner_id: UserId,
    pub message_id: MessageId,
    pub recipient_ids: Vec<ClientId>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Last persisted status. May lag behind the clock until re-evaluated.
    pub status: MailingStatus,
    pub created_at: DateTime<Utc>,
}

impl Mailing {
    pub fn schedule(&self) -> Schedule {
        Schedule::new(self.start_time, self.end_time)
    }
}

/// A mailing with its message and recipients loaded, ready to dispatch.
#[derive(Debug, Clone)]
pub struct MailingEnvelope {
    pub mailing: Mailing,
    pub message: Message,
    /// Ordered by email.
    pub recipients: Vec<Client>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailingAttempt {
    pub id: AttemptId,
    pub mailing_id: MailingId,
    pub status: AttemptStatus,
    pub server_response: String,
    pub attempted_at: DateTime<Utc>,
}

impl MailingAttempt {
    pub fn record(
        mailing_id: MailingId,
        status: AttemptStatus,
        server_response: String,
        attempted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AttemptId::generate(),
            mailing_id,
            status,
            server_response,
            attempted_at,
        }
    }
}

/// Attempt counts for one mailing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptTally {
    pub mailing_id: MailingId,
    pub succeeded: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Send only while the mailing is `started`.
    #[default]
    Normal,
    /// Send regardless of status (operator override).
    Forced,
}

/// Result of one dispatch run. Never an error: failures are reported here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// `true` when the recipient loop ran to completion.
    pub ok: bool,
    pub summary: String,
    /// Status after re-evaluation, when it got that far.
    pub status: Option<MailingStatus>,
    pub succeeded: u32,
    pub failed: u32,
}

impl DispatchOutcome {
    pub fn rejected(summary: impl Into<String>, status: Option<MailingStatus>) -> Self {
        Self {
            ok: false,
            summary: summary.into(),
            status,
            succeeded: 0,
            failed: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportRow {
    pub mailing: Mailing,
    pub recipient_count: usize,
    pub succeeded: u64,
    pub failed: u64,
}

/// Per-user statistics over mailings, clients and attempts.
#[derive(Debug, Clone)]
pub struct Report {
    pub total_mailings: u64,
    pub total_clients: u64,
    pub active_mailings: u64,
    pub success_attempts: u64,
    pub failed_attempts: u64,
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<ReportRow>,
}

/// Validate an email address: `local@domain.tld`, no whitespace, max 254 chars.
pub fn validate_email(email: &str) -> bool {
    if email.is_empty() || email.len() > 254 || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

/// Trim `s` to at most `max` characters on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
