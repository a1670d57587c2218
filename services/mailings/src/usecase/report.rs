use std::collections::HashMap;

use mailcamp_domain::mailing::MailingStatus;

use crate::domain::repository::{AttemptRepository, ClientRepository, Clock, MailingRepository};
use crate::domain::types::{Report, ReportRow};
use crate::error::MailingsServiceError;
use crate::usecase::status::refresh_status;

pub struct GetReportUseCase<M, K, A, C>
where
    M: MailingRepository,
    K: ClientRepository,
    A: AttemptRepository,
    C: Clock,
{
    pub mailings: M,
    pub clients: K,
    pub attempts: A,
    pub clock: C,
}

impl<M, K, A, C> GetReportUseCase<M, K, A, C>
where
    M: MailingRepository,
    K: ClientRepository,
    A: AttemptRepository,
    C: Clock,
{
    pub async fn execute(&self) -> Result<Report, MailingsServiceError> {
        let now = self.clock.now();
        let mut mailings = self.mailings.list_all().await?;
        for mailing in &mut mailings {
            refresh_status(&self.mailings, mailing, now).await?;
        }
        mailings.sort_by(|a, b| b.start_time.cmp(&a.start_time));

        let tallies: HashMap<_, _> = self
            .attempts
            .tally()
            .await?
            .into_iter()
            .map(|t| (t.mailing_id, t))
            .collect();
        let total_clients = self.clients.count().await?;

        let active_mailings = mailings
            .iter()
            .filter(|m| m.status == MailingStatus::Started)
            .count() as u64;
        let rows: Vec<ReportRow> = mailings
            .into_iter()
            .map(|mailing| {
                let (succeeded, failed) = tallies
                    .get(&mailing.id)
                    .map(|t| (t.succeeded, t.failed))
                    .unwrap_or_default();
                ReportRow {
                    recipient_count: mailing.recipient_ids.len(),
                    succeeded,
                    failed,
                    mailing,
                }
            })
            .collect();

        Ok(Report {
            total_mailings: rows.len() as u64,
            total_clients,
            active_mailings,
            success_attempts: rows.iter().map(|r| r.succeeded).sum(),
            failed_attempts: rows.iter().map(|r| r.failed).sum(),
            generated_at: now,
            rows,
        })
    }
}
