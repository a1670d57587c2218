use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use mailcamp_auth_types::identity::IdentityHeaders;
use mailcamp_domain::id::MessageId;
use mailcamp_domain::pagination::PageRequest;

use crate::domain::types::Message;
use crate::error::MailingsServiceError;
use crate::state::AppState;
use crate::usecase::message::{
    CreateMessageInput, CreateMessageUseCase, DeleteMessageUseCase, GetMessageUseCase,
    ListMessagesUseCase, UpdateMessageInput, UpdateMessageUseCase,
};

#[derive(Serialize)]
pub struct MessageResponse {
    pub id: MessageId,
    pub subject: String,
    pub body: String,
    #[serde(serialize_with = "mailcamp_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            subject: message.subject,
            body: message.body,
            created_at: message.created_at,
        }
    }
}

// ── GET /messages ────────────────────────────────────────────────────────────

pub async fn list_messages(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<MessageResponse>>, MailingsServiceError> {
    let usecase = ListMessagesUseCase {
        repo: state.for_user(identity.user_id).messages(),
    };
    let messages = usecase.execute(page).await?;
    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}

// ── POST /messages ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateMessageRequest {
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

pub async fn create_message(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), MailingsServiceError> {
    let usecase = CreateMessageUseCase {
        repo: state.for_user(identity.user_id).messages(),
        clock: state.clock.clone(),
    };
    let message = usecase
        .execute(
            identity.user_id,
            CreateMessageInput {
                subject: body.subject,
                body: body.body,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(message.into())))
}

// ── GET /messages/{id} ───────────────────────────────────────────────────────

pub async fn get_message(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<MessageId>,
) -> Result<Json<MessageResponse>, MailingsServiceError> {
    let usecase = GetMessageUseCase {
        repo: state.for_user(identity.user_id).messages(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── PATCH /messages/{id} ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateMessageRequest {
    pub subject: Option<String>,
    pub body: Option<String>,
}

pub async fn update_message(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<MessageId>,
    Json(body): Json<UpdateMessageRequest>,
) -> Result<StatusCode, MailingsServiceError> {
    let usecase = UpdateMessageUseCase {
        repo: state.for_user(identity.user_id).messages(),
    };
    usecase
        .execute(
            id,
            UpdateMessageInput {
                subject: body.subject,
                body: body.body,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /messages/{id} ────────────────────────────────────────────────────

pub async fn delete_message(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<MessageId>,
) -> Result<StatusCode, MailingsServiceError> {
    let usecase = DeleteMessageUseCase {
        repo: state.for_user(identity.user_id).messages(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
