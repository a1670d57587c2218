use mailcamp_domain::id::MailingId;
use mailcamp_domain::pagination::PageRequest;

use crate::domain::repository::{AttemptRepository, MailingRepository};
use crate::domain::types::MailingAttempt;
use crate::error::MailingsServiceError;

// ── ListAttempts ─────────────────────────────────────────────────────────────

pub struct ListAttemptsUseCase<A: AttemptRepository> {
    pub attempts: A,
}

impl<A: AttemptRepository> ListAttemptsUseCase<A> {
    pub async fn execute(
        &self,
        page: PageRequest,
    ) -> Result<Vec<MailingAttempt>, MailingsServiceError> {
        self.attempts.list(page).await
    }
}

// ── ListMailingAttempts ──────────────────────────────────────────────────────

pub struct ListMailingAttemptsUseCase<M: MailingRepository, A: AttemptRepository> {
    pub mailings: M,
    pub attempts: A,
}

impl<M: MailingRepository, A: AttemptRepository> ListMailingAttemptsUseCase<M, A> {
    pub async fn execute(
        &self,
        mailing_id: MailingId,
        page: PageRequest,
    ) -> Result<Vec<MailingAttempt>, MailingsServiceError> {
        if self.mailings.get(mailing_id).await?.is_none() {
            return Err(MailingsServiceError::MailingNotFound);
        }
        self.attempts.list_for_mailing(mailing_id, page).await
    }
}
