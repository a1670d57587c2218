use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use mailcamp_domain::mailing::ScheduleError;

/// Mailings service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum MailingsServiceError {
    #[error("client not found")]
    ClientNotFound,
    #[error("message not found")]
    MessageNotFound,
    #[error("mailing not found")]
    MailingNotFound,
    #[error("client already exists")]
    ClientAlreadyExists,
    #[error(transparent)]
    InvalidSchedule(#[from] ScheduleError),
    #[error("invalid email")]
    InvalidEmail,
    #[error("invalid field: {0}")]
    InvalidField(&'static str),
    #[error("missing data")]
    MissingData,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl MailingsServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ClientNotFound => "CLIENT_NOT_FOUND",
            Self::MessageNotFound => "MESSAGE_NOT_FOUND",
            Self::MailingNotFound => "MAILING_NOT_FOUND",
            Self::ClientAlreadyExists => "CLIENT_ALREADY_EXISTS",
            Self::InvalidSchedule(ScheduleError::PastStart) => "PAST_START",
            Self::InvalidSchedule(ScheduleError::Ordering) => "INVALID_SCHEDULE",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidField(_) => "INVALID_FIELD",
            Self::MissingData => "MISSING_DATA",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Full error chain, for logs and operator-facing summaries.
    pub fn detail(&self) -> String {
        match self {
            Self::Internal(e) => format!("{e:#}"),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for MailingsServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::ClientNotFound | Self::MessageNotFound | Self::MailingNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::ClientAlreadyExists => StatusCode::CONFLICT,
            Self::InvalidSchedule(_)
            | Self::InvalidEmail
            | Self::InvalidField(_)
            | Self::MissingData => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

/// Delivery failures reported by a mail transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid address {0:?}")]
    InvalidAddress(String),
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}
