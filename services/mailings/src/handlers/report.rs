use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use mailcamp_auth_types::identity::IdentityHeaders;
use mailcamp_domain::id::MailingId;
use mailcamp_domain::mailing::MailingStatus;

use crate::domain::types::{Report, ReportRow};
use crate::error::MailingsServiceError;
use crate::state::AppState;
use crate::usecase::report::GetReportUseCase;

#[derive(Serialize)]
pub struct ReportRowResponse {
    pub mailing_id: MailingId,
    pub status: MailingStatus,
    #[serde(serialize_with = "mailcamp_core::serde::to_rfc3339_ms")]
    pub start_time: DateTime<Utc>,
    #[serde(serialize_with = "mailcamp_core::serde::to_rfc3339_ms")]
    pub end_time: DateTime<Utc>,
    pub recipient_count: usize,
    pub succeeded: u64,
    pub failed: u64,
}

impl From<ReportRow> for ReportRowResponse {
    fn from(row: ReportRow) -> Self {
        Self {
            mailing_id: row.mailing.id,
            status: row.mailing.status,
            start_time: row.mailing.start_time,
            end_time: row.mailing.end_time,
            recipient_count: row.recipient_count,
            succeeded: row.succeeded,
            failed: row.failed,
        }
    }
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub total_mailings: u64,
    pub total_clients: u64,
    pub active_mailings: u64,
    pub success_attempts: u64,
    pub failed_attempts: u64,
    #[serde(serialize_with = "mailcamp_core::serde::to_rfc3339_ms")]
    pub generated_at: DateTime<Utc>,
    pub mailings: Vec<ReportRowResponse>,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            total_mailings: report.total_mailings,
            total_clients: report.total_clients,
            active_mailings: report.active_mailings,
            success_attempts: report.success_attempts,
            failed_attempts: report.failed_attempts,
            generated_at: report.generated_at,
            mailings: report.rows.into_iter().map(ReportRowResponse::from).collect(),
        }
    }
}

// ── GET /report ──────────────────────────────────────────────────────────────

pub async fn get_report(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<ReportResponse>, MailingsServiceError> {
    let scope = state.for_user(identity.user_id);
    let usecase = GetReportUseCase {
        mailings: scope.mailings(),
        clients: scope.clients(),
        attempts: scope.attempts(),
        clock: state.clock.clone(),
    };
    Ok(Json(usecase.execute().await?.into()))
}
