use axum::{
    Router,
    routing::{get, post},
};

use mailcamp_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    attempt::{list_attempts, list_mailing_attempts},
    client::{create_client, delete_client, get_client, list_clients, update_client},
    health::{healthz, readyz},
    mailing::{
        create_mailing, delete_mailing, get_mailing, list_mailings, send_mailing, update_mailing,
    },
    message::{create_message, delete_message, get_message, list_messages, update_message},
    report::get_report,
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Clients
        .route("/clients", get(list_clients).post(create_client))
        .route(
            "/clients/{id}",
            get(get_client).patch(update_client).delete(delete_client),
        )
        // Messages
        .route("/messages", get(list_messages).post(create_message))
        .route(
            "/messages/{id}",
            get(get_message).patch(update_message).delete(delete_message),
        )
        // Mailings
        .route("/mailings", get(list_mailings).post(create_mailing))
        .route(
            "/mailings/{id}",
            get(get_mailing).patch(update_mailing).delete(delete_mailing),
        )
        .route("/mailings/{id}/send", post(send_mailing))
        .route("/mailings/{id}/attempts", get(list_mailing_attempts))
        // Attempts and report
        .route("/attempts", get(list_attempts))
        .route("/report", get(get_report))
        .with_state(state)
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
}
