use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mailcamp_auth_types::identity::IdentityHeaders;
use mailcamp_domain::id::{ClientId, MailingId, MessageId};
use mailcamp_domain::mailing::MailingStatus;
use mailcamp_domain::pagination::PageRequest;

use crate::domain::types::{DispatchMode, DispatchOutcome, Mailing};
use crate::error::MailingsServiceError;
use crate::state::AppState;
use crate::usecase::dispatch::DispatchMailingUseCase;
use crate::usecase::mailing::{
    CreateMailingInput, CreateMailingUseCase, DeleteMailingUseCase, GetMailingUseCase,
    ListMailingsUseCase, UpdateMailingInput, UpdateMailingUseCase,
};

#[derive(Serialize)]
pub struct MailingResponse {
    pub id: MailingId,
    pub message_id: MessageId,
    pub recipient_ids: Vec<ClientId>,
    #[serde(serialize_with = "mailcamp_core::serde::to_rfc3339_ms")]
    pub start_time: DateTime<Utc>,
    #[serde(serialize_with = "mailcamp_core::serde::to_rfc3339_ms")]
    pub end_time: DateTime<Utc>,
    pub status: MailingStatus,
    #[serde(serialize_with = "mailcamp_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<Mailing> for MailingResponse {
    fn from(mailing: Mailing) -> Self {
        Self {
            id: mailing.id,
            message_id: mailing.message_id,
            recipient_ids: mailing.recipient_ids,
            start_time: mailing.start_time,
            end_time: mailing.end_time,
            status: mailing.status,
            created_at: mailing.created_at,
        }
    }
}

// ── GET /mailings ────────────────────────────────────────────────────────────

pub async fn list_mailings(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<MailingResponse>>, MailingsServiceError> {
    let usecase = ListMailingsUseCase {
        mailings: state.for_user(identity.user_id).mailings(),
        clock: state.clock.clone(),
    };
    let mailings = usecase.execute(page).await?;
    Ok(Json(mailings.into_iter().map(MailingResponse::from).collect()))
}

// ── POST /mailings ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateMailingRequest {
    pub message_id: MessageId,
    #[serde(default)]
    pub recipient_ids: Vec<ClientId>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

pub async fn create_mailing(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateMailingRequest>,
) -> Result<(StatusCode, Json<MailingResponse>), MailingsServiceError> {
    let scope = state.for_user(identity.user_id);
    let usecase = CreateMailingUseCase {
        mailings: scope.mailings(),
        messages: scope.messages(),
        clients: scope.clients(),
        clock: state.clock.clone(),
    };
    let mailing = usecase
        .execute(
            scope.owner(),
            CreateMailingInput {
                message_id: body.message_id,
                recipient_ids: body.recipient_ids,
                start_time: body.start_time,
                end_time: body.end_time,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(mailing.into())))
}

// ── GET /mailings/{id} ───────────────────────────────────────────────────────

pub async fn get_mailing(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<MailingId>,
) -> Result<Json<MailingResponse>, MailingsServiceError> {
    let usecase = GetMailingUseCase {
        mailings: state.for_user(identity.user_id).mailings(),
        clock: state.clock.clone(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── PATCH /mailings/{id} ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateMailingRequest {
    pub message_id: Option<MessageId>,
    pub recipient_ids: Option<Vec<ClientId>>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

pub async fn update_mailing(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<MailingId>,
    Json(body): Json<UpdateMailingRequest>,
) -> Result<StatusCode, MailingsServiceError> {
    let scope = state.for_user(identity.user_id);
    let usecase = UpdateMailingUseCase {
        mailings: scope.mailings(),
        messages: scope.messages(),
        clients: scope.clients(),
        clock: state.clock.clone(),
    };
    usecase
        .execute(
            id,
            UpdateMailingInput {
                message_id: body.message_id,
                recipient_ids: body.recipient_ids,
                start_time: body.start_time,
                end_time: body.end_time,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /mailings/{id} ────────────────────────────────────────────────────

pub async fn delete_mailing(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<MailingId>,
) -> Result<StatusCode, MailingsServiceError> {
    let usecase = DeleteMailingUseCase {
        mailings: state.for_user(identity.user_id).mailings(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /mailings/{id}/send ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DispatchResponse {
    pub ok: bool,
    pub summary: String,
    pub status: Option<MailingStatus>,
    pub succeeded: u32,
    pub failed: u32,
}

impl From<DispatchOutcome> for DispatchResponse {
    fn from(outcome: DispatchOutcome) -> Self {
        Self {
            ok: outcome.ok,
            summary: outcome.summary,
            status: outcome.status,
            succeeded: outcome.succeeded,
            failed: outcome.failed,
        }
    }
}

pub async fn send_mailing(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<MailingId>,
) -> Result<Json<DispatchResponse>, MailingsServiceError> {
    let scope = state.for_user(identity.user_id);
    let usecase = DispatchMailingUseCase {
        mailings: scope.mailings(),
        attempts: scope.attempts(),
        transport: state.transport.clone(),
        clock: state.clock.clone(),
    };
    let outcome = usecase.execute_by_id(id, DispatchMode::Normal).await?;
    Ok(Json(outcome.into()))
}
