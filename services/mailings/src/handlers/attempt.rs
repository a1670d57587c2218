use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Serialize;

use mailcamp_auth_types::identity::IdentityHeaders;
use mailcamp_domain::id::{AttemptId, MailingId};
use mailcamp_domain::mailing::AttemptStatus;
use mailcamp_domain::pagination::PageRequest;

use crate::domain::types::MailingAttempt;
use crate::error::MailingsServiceError;
use crate::state::AppState;
use crate::usecase::attempt::{ListAttemptsUseCase, ListMailingAttemptsUseCase};

#[derive(Serialize)]
pub struct AttemptResponse {
    pub id: AttemptId,
    pub mailing_id: MailingId,
    pub status: AttemptStatus,
    pub server_response: String,
    #[serde(serialize_with = "mailcamp_core::serde::to_rfc3339_ms")]
    pub attempted_at: chrono::DateTime<chrono::Utc>,
}

impl From<MailingAttempt> for AttemptResponse {
    fn from(attempt: MailingAttempt) -> Self {
        Self {
            id: attempt.id,
            mailing_id: attempt.mailing_id,
            status: attempt.status,
            server_response: attempt.server_response,
            attempted_at: attempt.attempted_at,
        }
    }
}

// ── GET /attempts ────────────────────────────────────────────────────────────

pub async fn list_attempts(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<AttemptResponse>>, MailingsServiceError> {
    let usecase = ListAttemptsUseCase {
        attempts: state.for_user(identity.user_id).attempts(),
    };
    let attempts = usecase.execute(page).await?;
    Ok(Json(attempts.into_iter().map(AttemptResponse::from).collect()))
}

// ── GET /mailings/{id}/attempts ──────────────────────────────────────────────

pub async fn list_mailing_attempts(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<MailingId>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<AttemptResponse>>, MailingsServiceError> {
    let scope = state.for_user(identity.user_id);
    let usecase = ListMailingAttemptsUseCase {
        mailings: scope.mailings(),
        attempts: scope.attempts(),
    };
    let attempts = usecase.execute(id, page).await?;
    Ok(Json(attempts.into_iter().map(AttemptResponse::from).collect()))
}
