use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::{Value, json};

use mailcamp_mailings::infra::db::{DbAttemptRepository, DbMailingRepository};
use mailcamp_mailings::infra::mail::{ConfiguredTransport, LogMailTransport};
use mailcamp_mailings::router::build_router;
use mailcamp_mailings::state::AppState;
use mailcamp_mailings::usecase::dispatch::{
    DispatchActiveMailingsUseCase, DispatchMailingUseCase,
};
use mailcamp_mailings_migration::{Migrator, MigratorTrait};
use mailcamp_testing::auth::MockAuth;

use crate::helpers::{FixedClock, at};

async fn migrated_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

async fn test_app(clock: Arc<FixedClock>) -> (TestServer, DatabaseConnection) {
    let db = migrated_db().await;
    let state = AppState {
        db: db.clone(),
        transport: ConfiguredTransport::Log(LogMailTransport),
        clock,
    };
    (TestServer::new(build_router(state)).unwrap(), db)
}

async fn test_server(clock: Arc<FixedClock>) -> TestServer {
    test_app(clock).await.0
}

async fn create_client(server: &TestServer, auth: &MockAuth, email: &str) -> Value {
    let (name, value) = auth.header();
    let response = server
        .post("/clients")
        .add_header(name, value)
        .json(&json!({ "email": email, "full_name": "Test Client" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

async fn create_message(server: &TestServer, auth: &MockAuth) -> Value {
    let (name, value) = auth.header();
    let response = server
        .post("/messages")
        .add_header(name, value)
        .json(&json!({ "subject": "Spring sale", "body": "Everything must go" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

async fn create_mailing(
    server: &TestServer,
    auth: &MockAuth,
    message: &Value,
    recipients: &[&Value],
    start_time: &str,
    end_time: &str,
) -> Value {
    let (name, value) = auth.header();
    let recipient_ids: Vec<&Value> = recipients.iter().map(|c| &c["id"]).collect();
    let response = server
        .post("/mailings")
        .add_header(name, value)
        .json(&json!({
            "message_id": message["id"],
            "recipient_ids": recipient_ids,
            "start_time": start_time,
            "end_time": end_time,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn health_endpoints_answer_without_identity() {
    let server = test_server(FixedClock::at(at(9, 0))).await;
    server.get("/healthz").await.assert_status_ok();
    server.get("/readyz").await.assert_status_ok();
}

#[tokio::test]
async fn should_require_identity_header() {
    let server = test_server(FixedClock::at(at(9, 0))).await;
    server
        .get("/clients")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_tag_responses_with_request_id() {
    let server = test_server(FixedClock::at(at(9, 0))).await;
    let response = server.get("/healthz").await;
    let request_id = response.header("x-request-id");
    assert!(!request_id.is_empty());
}

#[tokio::test]
async fn should_reject_duplicate_client_email() {
    let server = test_server(FixedClock::at(at(9, 0))).await;
    let alice = MockAuth::random();
    let bob = MockAuth::random();
    create_client(&server, &alice, "shared@example.com").await;

    let (name, value) = bob.header();
    let response = server
        .post("/clients")
        .add_header(name, value)
        .json(&json!({ "email": "shared@example.com", "full_name": "Again" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(response.json::<Value>()["kind"], "CLIENT_ALREADY_EXISTS");
}

#[tokio::test]
async fn should_validate_client_email() {
    let server = test_server(FixedClock::at(at(9, 0))).await;
    let auth = MockAuth::random();
    let (name, value) = auth.header();
    let response = server
        .post("/clients")
        .add_header(name, value)
        .json(&json!({ "email": "nope", "full_name": "Nope" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "INVALID_EMAIL");
}

#[tokio::test]
async fn should_keep_each_owners_clients_private() {
    let server = test_server(FixedClock::at(at(9, 0))).await;
    let alice = MockAuth::random();
    let bob = MockAuth::random();
    let client = create_client(&server, &alice, "a@example.com").await;
    let path = format!("/clients/{}", client["id"].as_str().unwrap());

    let (name, value) = bob.header();
    server
        .get(&path)
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete(&path)
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    let listed = server
        .get("/clients")
        .add_header(name, value)
        .await
        .json::<Vec<Value>>();
    assert!(listed.is_empty());

    let (name, value) = alice.header();
    let own = server.get(&path).add_header(name, value).await;
    own.assert_status_ok();
    assert_eq!(own.json::<Value>()["email"], "a@example.com");
}

#[tokio::test]
async fn should_update_and_delete_message() {
    let server = test_server(FixedClock::at(at(9, 0))).await;
    let auth = MockAuth::random();
    let message = create_message(&server, &auth).await;
    let path = format!("/messages/{}", message["id"].as_str().unwrap());

    let (name, value) = auth.header();
    server
        .patch(&path)
        .add_header(name.clone(), value.clone())
        .json(&json!({ "subject": "Summer sale" }))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let fetched = server
        .get(&path)
        .add_header(name.clone(), value.clone())
        .await
        .json::<Value>();
    assert_eq!(fetched["subject"], "Summer sale");
    assert_eq!(fetched["body"], "Everything must go");

    server
        .delete(&path)
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&path)
        .add_header(name, value)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_reject_mailing_starting_in_the_past() {
    let server = test_server(FixedClock::at(at(11, 0))).await;
    let auth = MockAuth::random();
    let message = create_message(&server, &auth).await;

    let (name, value) = auth.header();
    let response = server
        .post("/mailings")
        .add_header(name, value)
        .json(&json!({
            "message_id": message["id"],
            "recipient_ids": [],
            "start_time": "2025-01-01T10:00:00Z",
            "end_time": "2025-01-01T12:00:00Z",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["kind"], "PAST_START");
}

#[tokio::test]
async fn should_run_mailing_lifecycle_end_to_end() {
    let clock = FixedClock::at(at(9, 0));
    let server = test_server(clock.clone()).await;
    let auth = MockAuth::random();
    let a = create_client(&server, &auth, "a@example.com").await;
    let b = create_client(&server, &auth, "b@example.com").await;
    let message = create_message(&server, &auth).await;
    let (name, value) = auth.header();

    let created = server
        .post("/mailings")
        .add_header(name.clone(), value.clone())
        .json(&json!({
            "message_id": message["id"],
            "recipient_ids": [a["id"], b["id"]],
            "start_time": "2025-01-01T10:00:00Z",
            "end_time": "2025-01-01T12:00:00Z",
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let mailing = created.json::<Value>();
    assert_eq!(mailing["status"], "created");
    assert_eq!(mailing["start_time"], "2025-01-01T10:00:00.000Z");
    assert_eq!(mailing["recipient_ids"].as_array().unwrap().len(), 2);
    let id = mailing["id"].as_str().unwrap().to_owned();

    // Too early: nothing is sent.
    let early = server
        .post(&format!("/mailings/{id}/send"))
        .add_header(name.clone(), value.clone())
        .await;
    early.assert_status_ok();
    let early = early.json::<Value>();
    assert_eq!(early["ok"], false);
    assert_eq!(early["summary"], "not active: created");

    // Inside the window.
    clock.set(at(11, 0));
    let fetched = server
        .get(&format!("/mailings/{id}"))
        .add_header(name.clone(), value.clone())
        .await
        .json::<Value>();
    assert_eq!(fetched["status"], "started");

    let sent = server
        .post(&format!("/mailings/{id}/send"))
        .add_header(name.clone(), value.clone())
        .await
        .json::<Value>();
    assert_eq!(sent["ok"], true);
    assert_eq!(sent["summary"], "sent: 2, failed: 0");

    let attempts = server
        .get(&format!("/mailings/{id}/attempts"))
        .add_header(name.clone(), value.clone())
        .await
        .json::<Vec<Value>>();
    assert_eq!(attempts.len(), 2);
    assert!(attempts.iter().all(|a| a["status"] == "success"));
    let mut responses: Vec<&str> = attempts
        .iter()
        .map(|a| a["server_response"].as_str().unwrap())
        .collect();
    responses.sort();
    assert_eq!(
        responses,
        vec!["delivered to a@example.com", "delivered to b@example.com"]
    );

    let report = server
        .get("/report")
        .add_header(name.clone(), value.clone())
        .await
        .json::<Value>();
    assert_eq!(report["total_mailings"], 1);
    assert_eq!(report["total_clients"], 2);
    assert_eq!(report["active_mailings"], 1);
    assert_eq!(report["success_attempts"], 2);
    assert_eq!(report["failed_attempts"], 0);
    assert_eq!(report["mailings"][0]["recipient_count"], 2);

    // Window closed.
    clock.set(at(13, 0));
    let late = server
        .post(&format!("/mailings/{id}/send"))
        .add_header(name.clone(), value.clone())
        .await
        .json::<Value>();
    assert_eq!(late["summary"], "not active: completed");

    // Another owner sees none of it.
    let (other_name, other_value) = MockAuth::random().header();
    server
        .post(&format!("/mailings/{id}/send"))
        .add_header(other_name.clone(), other_value.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    let other_attempts = server
        .get("/attempts")
        .add_header(other_name, other_value)
        .await
        .json::<Vec<Value>>();
    assert!(other_attempts.is_empty());

    // Deleting the message takes the mailing and its attempts with it.
    server
        .delete(&format!("/messages/{}", message["id"].as_str().unwrap()))
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/mailings/{id}"))
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    let remaining = server
        .get("/attempts")
        .add_header(name, value)
        .await
        .json::<Vec<Value>>();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn should_update_mailing_recipients_and_window() {
    let clock = FixedClock::at(at(9, 0));
    let server = test_server(clock.clone()).await;
    let auth = MockAuth::random();
    let a = create_client(&server, &auth, "a@example.com").await;
    let b = create_client(&server, &auth, "b@example.com").await;
    let message = create_message(&server, &auth).await;
    let (name, value) = auth.header();

    let mailing = server
        .post("/mailings")
        .add_header(name.clone(), value.clone())
        .json(&json!({
            "message_id": message["id"],
            "recipient_ids": [a["id"]],
            "start_time": "2025-01-01T10:00:00Z",
            "end_time": "2025-01-01T12:00:00Z",
        }))
        .await
        .json::<Value>();
    let path = format!("/mailings/{}", mailing["id"].as_str().unwrap());

    server
        .patch(&path)
        .add_header(name.clone(), value.clone())
        .json(&json!({ "recipient_ids": [b["id"]], "end_time": "2025-01-01T09:30:00Z" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .patch(&path)
        .add_header(name.clone(), value.clone())
        .json(&json!({ "recipient_ids": [b["id"]], "start_time": "2025-01-01T08:00:00Z" }))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let fetched = server
        .get(&path)
        .add_header(name, value)
        .await
        .json::<Value>();
    assert_eq!(fetched["recipient_ids"], json!([b["id"]]));
    assert_eq!(fetched["status"], "started");
    assert_eq!(fetched["start_time"], "2025-01-01T08:00:00.000Z");
}

#[tokio::test]
async fn should_hide_messages_and_mailings_from_other_owners() {
    let server = test_server(FixedClock::at(at(9, 0))).await;
    let alice = MockAuth::random();
    let client = create_client(&server, &alice, "a@example.com").await;
    let message = create_message(&server, &alice).await;
    let mailing = create_mailing(
        &server,
        &alice,
        &message,
        &[&client],
        "2025-01-01T10:00:00Z",
        "2025-01-01T12:00:00Z",
    )
    .await;
    let message_path = format!("/messages/{}", message["id"].as_str().unwrap());
    let mailing_path = format!("/mailings/{}", mailing["id"].as_str().unwrap());

    let (name, value) = MockAuth::random().header();
    server
        .get(&message_path)
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .patch(&message_path)
        .add_header(name.clone(), value.clone())
        .json(&json!({ "subject": "Hijacked" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete(&message_path)
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get(&mailing_path)
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .patch(&mailing_path)
        .add_header(name.clone(), value.clone())
        .json(&json!({ "end_time": "2025-01-01T13:00:00Z" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete(&mailing_path)
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let messages = server
        .get("/messages")
        .add_header(name.clone(), value.clone())
        .await
        .json::<Vec<Value>>();
    assert!(messages.is_empty());
    let mailings = server
        .get("/mailings")
        .add_header(name.clone(), value.clone())
        .await
        .json::<Vec<Value>>();
    assert!(mailings.is_empty());
    let report = server
        .get("/report")
        .add_header(name, value)
        .await
        .json::<Value>();
    assert_eq!(report["total_mailings"], 0);
    assert_eq!(report["total_clients"], 0);
    assert_eq!(report["mailings"], json!([]));

    // The owner's rows are untouched.
    let (name, value) = alice.header();
    let own_message = server
        .get(&message_path)
        .add_header(name.clone(), value.clone())
        .await
        .json::<Value>();
    assert_eq!(own_message["subject"], "Spring sale");
    let own_mailing = server
        .get(&mailing_path)
        .add_header(name, value)
        .await
        .json::<Value>();
    assert_eq!(own_mailing["end_time"], "2025-01-01T12:00:00.000Z");
}

#[tokio::test]
async fn should_dispatch_only_mailings_inside_their_window() {
    let clock = FixedClock::at(at(9, 0));
    let (server, db) = test_app(clock.clone()).await;
    let alice = MockAuth::random();
    let bob = MockAuth::random();

    let a = create_client(&server, &alice, "a@example.com").await;
    let alice_message = create_message(&server, &alice).await;
    let active = create_mailing(
        &server,
        &alice,
        &alice_message,
        &[&a],
        "2025-01-01T10:00:00.250Z",
        "2025-01-01T12:00:00Z",
    )
    .await;
    let later = create_mailing(
        &server,
        &alice,
        &alice_message,
        &[&a],
        "2025-01-01T14:00:00Z",
        "2025-01-01T15:00:00Z",
    )
    .await;

    let b = create_client(&server, &bob, "b@example.com").await;
    let bob_message = create_message(&server, &bob).await;
    let bob_active = create_mailing(
        &server,
        &bob,
        &bob_message,
        &[&b],
        "2025-01-01T10:30:00Z",
        "2025-01-01T11:30:00Z",
    )
    .await;

    clock.set(at(11, 0));
    let batch = DispatchActiveMailingsUseCase {
        dispatch: DispatchMailingUseCase {
            mailings: DbMailingRepository::system(db.clone()),
            attempts: DbAttemptRepository::system(db),
            transport: ConfiguredTransport::Log(LogMailTransport),
            clock: clock.clone(),
        },
    };
    let report = batch.execute().await.unwrap();

    let dispatched: Vec<String> = report.outcomes.iter().map(|(id, _)| id.to_string()).collect();
    assert_eq!(
        dispatched,
        vec![
            active["id"].as_str().unwrap().to_owned(),
            bob_active["id"].as_str().unwrap().to_owned(),
        ]
    );
    assert!(report.outcomes.iter().all(|(_, outcome)| outcome.ok));
    assert_eq!((report.delivered, report.failed), (2, 0));

    let (name, value) = alice.header();
    let summary = server
        .get("/report")
        .add_header(name.clone(), value.clone())
        .await
        .json::<Value>();
    assert_eq!(summary["total_mailings"], 2);
    assert_eq!(summary["active_mailings"], 1);
    assert_eq!(summary["success_attempts"], 1);
    assert_eq!(summary["failed_attempts"], 0);

    let untouched = server
        .get(&format!("/mailings/{}/attempts", later["id"].as_str().unwrap()))
        .add_header(name, value)
        .await
        .json::<Vec<Value>>();
    assert!(untouched.is_empty());
}
