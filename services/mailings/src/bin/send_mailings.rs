//! Operational entry point: dispatch one mailing, or every active one.
//!
//! Always exits 0; errors are printed for the operator.

use anyhow::Context as _;
use clap::Parser;
use sea_orm::Database;

use mailcamp_core::config::Config;
use mailcamp_core::tracing::init_tracing;
use mailcamp_domain::id::MailingId;
use mailcamp_domain::mailing::MailingStatus;
use mailcamp_mailings::config::MailingsConfig;
use mailcamp_mailings::domain::repository::{Clock, MailingRepository};
use mailcamp_mailings::domain::types::DispatchMode;
use mailcamp_mailings::infra::clock::SystemClock;
use mailcamp_mailings::infra::db::{DbAttemptRepository, DbMailingRepository};
use mailcamp_mailings::infra::mail::ConfiguredTransport;
use mailcamp_mailings::usecase::dispatch::{
    DispatchActiveMailingsUseCase, DispatchMailingUseCase,
};

type Dispatcher =
    DispatchMailingUseCase<DbMailingRepository, DbAttemptRepository, ConfiguredTransport, SystemClock>;

#[derive(Debug, Parser)]
#[command(name = "send-mailings", about = "Send scheduled mailings")]
struct Args {
    /// Send only this mailing.
    #[arg(long)]
    mailing_id: Option<MailingId>,
    /// Send even when the mailing is outside its window.
    #[arg(long, requires = "mailing_id")]
    force: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = match MailingsConfig::try_from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return;
        }
    };
    init_tracing(config.log_format);

    if let Err(e) = run(args, config).await {
        eprintln!("error: {e:#}");
    }
}

async fn run(args: Args, config: MailingsConfig) -> anyhow::Result<()> {
    let db = Database::connect(&config.database_url)
        .await
        .context("connect to database")?;
    let dispatch = DispatchMailingUseCase {
        mailings: DbMailingRepository::system(db.clone()),
        attempts: DbAttemptRepository::system(db),
        transport: ConfiguredTransport::from_config(&config)?,
        clock: SystemClock,
    };
    println!("starting mailing dispatch");
    match args.mailing_id {
        Some(id) => send_one(&dispatch, id, args.force).await,
        None => send_active(dispatch).await,
    }
}

async fn send_one(dispatch: &Dispatcher, id: MailingId, force: bool) -> anyhow::Result<()> {
    let Some(envelope) = dispatch.mailings.get_envelope(id).await? else {
        println!("mailing {id} not found");
        return Ok(());
    };
    let stored = envelope.mailing.status;
    let evaluated = envelope.mailing.schedule().status_at(dispatch.clock.now());
    println!("mailing {id}");
    println!("  subject:    {}", envelope.message.subject);
    println!("  status:     {stored}");
    println!("  recipients: {}", envelope.recipients.len());
    if evaluated != stored {
        println!("  status changes: {stored} -> {evaluated}");
    }

    let mode = if force {
        if evaluated != MailingStatus::Started {
            println!("  warning: forcing dispatch of a {evaluated} mailing");
        }
        DispatchMode::Forced
    } else {
        DispatchMode::Normal
    };
    let outcome = dispatch.execute(envelope, mode).await;
    if outcome.ok {
        println!("done: {}", outcome.summary);
    } else {
        println!("skipped: {}", outcome.summary);
        if !force && evaluated != MailingStatus::Started {
            println!("  use --force to send anyway");
        }
    }
    Ok(())
}

async fn send_active(dispatch: Dispatcher) -> anyhow::Result<()> {
    let batch = DispatchActiveMailingsUseCase { dispatch };
    let report = batch.execute().await?;
    if report.outcomes.is_empty() {
        println!("no active mailings");
    }
    for (id, outcome) in &report.outcomes {
        let marker = if outcome.ok { "sent" } else { "skipped" };
        println!("{marker} {id}: {}", outcome.summary);
    }
    println!(
        "total: {} mailings, {} delivered, {} failed",
        report.outcomes.len(),
        report.delivered,
        report.failed
    );
    Ok(())
}
