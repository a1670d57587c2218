use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use mailcamp_core::config::Config;
use mailcamp_core::tracing::init_tracing;
use mailcamp_mailings::config::MailingsConfig;
use mailcamp_mailings::infra::clock::SystemClock;
use mailcamp_mailings::infra::mail::ConfiguredTransport;
use mailcamp_mailings::router::build_router;
use mailcamp_mailings::state::AppState;

#[tokio::main]
async fn main() {
    let config = MailingsConfig::from_env();
    init_tracing(config.log_format);

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let transport =
        ConfiguredTransport::from_config(&config).expect("invalid mail transport configuration");
    info!(transport = transport.name(), "mail transport configured");

    let state = AppState {
        db,
        transport,
        clock: Arc::new(SystemClock),
    };

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.mailings_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("mailings service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
