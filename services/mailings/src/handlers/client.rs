use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use mailcamp_auth_types::identity::IdentityHeaders;
use mailcamp_domain::id::ClientId;
use mailcamp_domain::pagination::PageRequest;

use crate::domain::types::Client;
use crate::error::MailingsServiceError;
use crate::state::AppState;
use crate::usecase::client::{
    CreateClientInput, CreateClientUseCase, DeleteClientUseCase, GetClientUseCase,
    ListClientsUseCase, UpdateClientInput, UpdateClientUseCase,
};

#[derive(Serialize)]
pub struct ClientResponse {
    pub id: ClientId,
    pub email: String,
    pub full_name: String,
    pub comment: String,
    #[serde(serialize_with = "mailcamp_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            email: client.email,
            full_name: client.full_name,
            comment: client.comment,
            created_at: client.created_at,
        }
    }
}

// ── GET /clients ─────────────────────────────────────────────────────────────

pub async fn list_clients(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<ClientResponse>>, MailingsServiceError> {
    let usecase = ListClientsUseCase {
        repo: state.for_user(identity.user_id).clients(),
    };
    let clients = usecase.execute(page).await?;
    Ok(Json(clients.into_iter().map(ClientResponse::from).collect()))
}

// ── POST /clients ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateClientRequest {
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub comment: String,
}

pub async fn create_client(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientResponse>), MailingsServiceError> {
    let usecase = CreateClientUseCase {
        repo: state.for_user(identity.user_id).clients(),
        clock: state.clock.clone(),
    };
    let client = usecase
        .execute(
            identity.user_id,
            CreateClientInput {
                email: body.email,
                full_name: body.full_name,
                comment: body.comment,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(client.into())))
}

// ── GET /clients/{id} ────────────────────────────────────────────────────────

pub async fn get_client(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<ClientId>,
) -> Result<Json<ClientResponse>, MailingsServiceError> {
    let usecase = GetClientUseCase {
        repo: state.for_user(identity.user_id).clients(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

// ── PATCH /clients/{id} ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateClientRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub comment: Option<String>,
}

pub async fn update_client(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<ClientId>,
    Json(body): Json<UpdateClientRequest>,
) -> Result<StatusCode, MailingsServiceError> {
    let usecase = UpdateClientUseCase {
        repo: state.for_user(identity.user_id).clients(),
    };
    usecase
        .execute(
            id,
            UpdateClientInput {
                email: body.email,
                full_name: body.full_name,
                comment: body.comment,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /clients/{id} ─────────────────────────────────────────────────────

pub async fn delete_client(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<ClientId>,
) -> Result<StatusCode, MailingsServiceError> {
    let usecase = DeleteClientUseCase {
        repo: state.for_user(identity.user_id).clients(),
    };
    usecase.execute(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
