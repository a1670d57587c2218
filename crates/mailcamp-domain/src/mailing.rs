//! Mailing lifecycle: the status engine and schedule rules.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a mailing, derived from its time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailingStatus {
    Created,
    Started,
    Completed,
}

impl MailingStatus {
    /// Classify `now` against the window `[start_time, end_time]`.
    ///
    /// Both boundary instants belong to `Started`.
    pub fn evaluate(
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        if now < start_time {
            Self::Created
        } else if now <= end_time {
            Self::Started
        } else {
            Self::Completed
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for MailingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for MailingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "started" => Ok(Self::Started),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// Outcome of one recipient-level delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Success,
    Failed,
}

impl AttemptStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttemptStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// Violations of the mailing date rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("start time is in the past")]
    PastStart,
    #[error("start time must be before end time")]
    Ordering,
}

/// The send window of a mailing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Schedule {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time,
        }
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> MailingStatus {
        MailingStatus::evaluate(self.start_time, self.end_time, now)
    }

    /// Rules for a brand-new mailing: start not in the past, start before end.
    pub fn validate_new(&self, now: DateTime<Utc>) -> Result<(), ScheduleError> {
        if self.start_time < now {
            return Err(ScheduleError::PastStart);
        }
        self.validate_ordering()
    }

    /// Rules for an edit of an existing mailing.
    ///
    /// Unchanged dates are accepted as-is, so an existing mailing may keep a
    /// start time that has since passed.
    pub fn validate_change(&self, previous: &Schedule) -> Result<(), ScheduleError> {
        if self == previous {
            return Ok(());
        }
        self.validate_ordering()
    }

    fn validate_ordering(&self) -> Result<(), ScheduleError> {
        if self.start_time >= self.end_time {
            return Err(ScheduleError::Ordering);
        }
        Ok(())
    }
}
