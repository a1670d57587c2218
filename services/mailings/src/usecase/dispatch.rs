use tracing::{debug, error, info, warn};

use mailcamp_domain::id::MailingId;
use mailcamp_domain::mailing::{AttemptStatus, MailingStatus};

use crate::domain::repository::{
    AttemptRepository, Clock, MailTransport, MailingRepository, MailingStatusWriter,
};
use crate::domain::types::{
    DispatchMode, DispatchOutcome, MAX_ERROR_LEN, MailingAttempt, MailingEnvelope,
    truncate_chars,
};
use crate::error::MailingsServiceError;
use crate::usecase::status::refresh_status;

// ── DispatchMailing ──────────────────────────────────────────────────────────

/// Sends one mailing to each of its recipients and records every attempt.
pub struct DispatchMailingUseCase<M, A, T, C>
where
    M: MailingStatusWriter,
    A: AttemptRepository,
    T: MailTransport,
    C: Clock,
{
    pub mailings: M,
    pub attempts: A,
    pub transport: T,
    pub clock: C,
}

impl<M, A, T, C> DispatchMailingUseCase<M, A, T, C>
where
    M: MailingStatusWriter,
    A: AttemptRepository,
    T: MailTransport,
    C: Clock,
{
    /// Never fails: errors surface as `ok = false` with the error text.
    pub async fn execute(&self, envelope: MailingEnvelope, mode: DispatchMode) -> DispatchOutcome {
        let mailing_id = envelope.mailing.id;
        match self.run(envelope, mode).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let detail = e.detail();
                error!(mailing_id = %mailing_id, error = %detail, "mailing dispatch aborted");
                DispatchOutcome::rejected(detail, None)
            }
        }
    }

    async fn run(
        &self,
        envelope: MailingEnvelope,
        mode: DispatchMode,
    ) -> Result<DispatchOutcome, MailingsServiceError> {
        let MailingEnvelope {
            mut mailing,
            message,
            recipients,
        } = envelope;

        let status = refresh_status(&self.mailings, &mut mailing, self.clock.now()).await?;
        if status != MailingStatus::Started {
            match mode {
                DispatchMode::Normal => {
                    warn!(mailing_id = %mailing.id, %status, "mailing is not active");
                    return Ok(DispatchOutcome::rejected(
                        format!("not active: {status}"),
                        Some(status),
                    ));
                }
                DispatchMode::Forced => {
                    warn!(mailing_id = %mailing.id, %status, "forcing dispatch of inactive mailing");
                }
            }
        }

        if recipients.is_empty() {
            warn!(mailing_id = %mailing.id, "mailing has no recipients");
            return Ok(DispatchOutcome::rejected("no recipients", Some(status)));
        }

        let mut succeeded = 0u32;
        let mut failed = 0u32;
        for recipient in &recipients {
            let sent = self
                .transport
                .send_mail(&message.subject, &message.body, &recipient.email)
                .await;
            let (attempt_status, response) = match sent {
                Ok(()) => {
                    debug!(mailing_id = %mailing.id, recipient = %recipient.email, "mail delivered");
                    succeeded += 1;
                    (AttemptStatus::Success, format!("delivered to {}", recipient.email))
                }
                Err(e) => {
                    let reason = e.to_string();
                    warn!(
                        mailing_id = %mailing.id,
                        recipient = %recipient.email,
                        error = %reason,
                        "mail delivery failed"
                    );
                    failed += 1;
                    let reason = truncate_chars(&reason, MAX_ERROR_LEN);
                    (AttemptStatus::Failed, format!("{reason} for {}", recipient.email))
                }
            };
            let attempt =
                MailingAttempt::record(mailing.id, attempt_status, response, self.clock.now());
            if let Err(e) = self.attempts.append(&attempt).await {
                let detail = e.detail();
                error!(
                    mailing_id = %mailing.id,
                    succeeded,
                    failed,
                    error = %detail,
                    "mailing dispatch aborted"
                );
                return Ok(DispatchOutcome {
                    ok: false,
                    summary: format!("{detail} (sent: {succeeded}, failed: {failed})"),
                    status: Some(status),
                    succeeded,
                    failed,
                });
            }
        }

        info!(mailing_id = %mailing.id, succeeded, failed, "mailing dispatched");
        Ok(DispatchOutcome {
            ok: true,
            summary: format!("sent: {succeeded}, failed: {failed}"),
            status: Some(status),
            succeeded,
            failed,
        })
    }
}

impl<M, A, T, C> DispatchMailingUseCase<M, A, T, C>
where
    M: MailingRepository,
    A: AttemptRepository,
    T: MailTransport,
    C: Clock,
{
    /// Load the mailing visible to this repository and dispatch it.
    pub async fn execute_by_id(
        &self,
        id: MailingId,
        mode: DispatchMode,
    ) -> Result<DispatchOutcome, MailingsServiceError> {
        let envelope = self
            .mailings
            .get_envelope(id)
            .await?
            .ok_or(MailingsServiceError::MailingNotFound)?;
        Ok(self.execute(envelope, mode).await)
    }
}

// ── DispatchActiveMailings ───────────────────────────────────────────────────

/// Totals of a batch run across every active mailing.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<(MailingId, DispatchOutcome)>,
    pub delivered: u32,
    pub failed: u32,
}

impl BatchReport {
    fn record(&mut self, id: MailingId, outcome: DispatchOutcome) {
        // An aborted run still reports the mails it got out.
        self.delivered += outcome.succeeded;
        self.failed += outcome.failed;
        if !outcome.ok {
            self.failed += 1;
        }
        self.outcomes.push((id, outcome));
    }
}

pub struct DispatchActiveMailingsUseCase<M, A, T, C>
where
    M: MailingRepository,
    A: AttemptRepository,
    T: MailTransport,
    C: Clock,
{
    pub dispatch: DispatchMailingUseCase<M, A, T, C>,
}

impl<M, A, T, C> DispatchActiveMailingsUseCase<M, A, T, C>
where
    M: MailingRepository,
    A: AttemptRepository,
    T: MailTransport,
    C: Clock,
{
    /// Dispatch, one after another, every mailing whose window contains now.
    pub async fn execute(&self) -> Result<BatchReport, MailingsServiceError> {
        let now = self.dispatch.clock.now();
        let ids = self.dispatch.mailings.list_active_ids(now).await?;
        info!(count = ids.len(), "dispatching active mailings");

        let mut report = BatchReport::default();
        for id in ids {
            let outcome = match self.dispatch.execute_by_id(id, DispatchMode::Normal).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(mailing_id = %id, error = %e.detail(), "failed to load mailing");
                    DispatchOutcome::rejected(e.detail(), None)
                }
            };
            report.record(id, outcome);
        }
        info!(
            mailings = report.outcomes.len(),
            delivered = report.delivered,
            failed = report.failed,
            "batch dispatch finished"
        );
        Ok(report)
    }
}
