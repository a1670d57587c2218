use chrono::{DateTime, Utc};

use mailcamp_domain::id::{ClientId, MailingId, MessageId, UserId};
use mailcamp_domain::mailing::Schedule;
use mailcamp_domain::pagination::PageRequest;

use crate::domain::repository::{ClientRepository, Clock, MailingRepository, MessageRepository};
use crate::domain::types::Mailing;
use crate::error::MailingsServiceError;
use crate::usecase::status::refresh_status;

/// Sorted and deduplicated, then checked to belong to the requester.
async fn resolve_recipients<K: ClientRepository>(
    clients: &K,
    mut ids: Vec<ClientId>,
) -> Result<Vec<ClientId>, MailingsServiceError> {
    ids.sort();
    ids.dedup();
    let found = clients.get_many(&ids).await?;
    if found.len() != ids.len() {
        return Err(MailingsServiceError::ClientNotFound);
    }
    Ok(ids)
}

async fn ensure_message<G: MessageRepository>(
    messages: &G,
    id: MessageId,
) -> Result<(), MailingsServiceError> {
    messages
        .get(id)
        .await?
        .map(|_| ())
        .ok_or(MailingsServiceError::MessageNotFound)
}

// ── CreateMailing ────────────────────────────────────────────────────────────

pub struct CreateMailingInput {
    pub message_id: MessageId,
    pub recipient_ids: Vec<ClientId>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

pub struct CreateMailingUseCase<M, G, K, C>
where
    M: MailingRepository,
    G: MessageRepository,
    K: ClientRepository,
    C: Clock,
{
    pub mailings: M,
    pub messages: G,
    pub clients: K,
    pub clock: C,
}

impl<M, G, K, C> CreateMailingUseCase<M, G, K, C>
where
    M: MailingRepository,
    G: MessageRepository,
    K: ClientRepository,
    C: Clock,
{
    pub async fn execute(
        &self,
        owner: UserId,
        input: CreateMailingInput,
    ) -> Result<Mailing, MailingsServiceError> {
        let now = self.clock.now();
        let schedule = Schedule::new(input.start_time, input.end_time);
        schedule.validate_new(now)?;
        ensure_message(&self.messages, input.message_id).await?;
        let recipient_ids = resolve_recipients(&self.clients, input.recipient_ids).await?;

        let mailing = Mailing {
            id: MailingId::generate(),
            owner_id: owner,
            message_id: input.message_id,
            recipient_ids,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
            status: schedule.status_at(now),
            created_at: now,
        };
        self.mailings.create(&mailing).await?;
        Ok(mailing)
    }
}

// ── GetMailing ───────────────────────────────────────────────────────────────

pub struct GetMailingUseCase<M: MailingRepository, C: Clock> {
    pub mailings: M,
    pub clock: C,
}

impl<M: MailingRepository, C: Clock> GetMailingUseCase<M, C> {
    pub async fn execute(&self, id: MailingId) -> Result<Mailing, MailingsServiceError> {
        let mut mailing = self
            .mailings
            .get(id)
            .await?
            .ok_or(MailingsServiceError::MailingNotFound)?;
        refresh_status(&self.mailings, &mut mailing, self.clock.now()).await?;
        Ok(mailing)
    }
}

// ── ListMailings ─────────────────────────────────────────────────────────────

pub struct ListMailingsUseCase<M: MailingRepository, C: Clock> {
    pub mailings: M,
    pub clock: C,
}

impl<M: MailingRepository, C: Clock> ListMailingsUseCase<M, C> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<Mailing>, MailingsServiceError> {
        let now = self.clock.now();
        let mut mailings = self.mailings.list(page).await?;
        for mailing in &mut mailings {
            refresh_status(&self.mailings, mailing, now).await?;
        }
        Ok(mailings)
    }
}

// ── UpdateMailing ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateMailingInput {
    pub message_id: Option<MessageId>,
    pub recipient_ids: Option<Vec<ClientId>>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl UpdateMailingInput {
    fn is_empty(&self) -> bool {
        self.message_id.is_none()
            && self.recipient_ids.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
    }
}

pub struct UpdateMailingUseCase<M, G, K, C>
where
    M: MailingRepository,
    G: MessageRepository,
    K: ClientRepository,
    C: Clock,
{
    pub mailings: M,
    pub messages: G,
    pub clients: K,
    pub clock: C,
}

impl<M, G, K, C> UpdateMailingUseCase<M, G, K, C>
where
    M: MailingRepository,
    G: MessageRepository,
    K: ClientRepository,
    C: Clock,
{
    pub async fn execute(
        &self,
        id: MailingId,
        input: UpdateMailingInput,
    ) -> Result<Mailing, MailingsServiceError> {
        if input.is_empty() {
            return Err(MailingsServiceError::MissingData);
        }
        let mut mailing = self
            .mailings
            .get(id)
            .await?
            .ok_or(MailingsServiceError::MailingNotFound)?;

        let schedule = Schedule::new(
            input.start_time.unwrap_or(mailing.start_time),
            input.end_time.unwrap_or(mailing.end_time),
        );
        schedule.validate_change(&mailing.schedule())?;

        if let Some(message_id) = input.message_id {
            ensure_message(&self.messages, message_id).await?;
            mailing.message_id = message_id;
        }
        if let Some(recipient_ids) = input.recipient_ids {
            mailing.recipient_ids = resolve_recipients(&self.clients, recipient_ids).await?;
        }
        mailing.start_time = schedule.start_time;
        mailing.end_time = schedule.end_time;
        mailing.status = schedule.status_at(self.clock.now());

        if !self.mailings.update(&mailing).await? {
            return Err(MailingsServiceError::MailingNotFound);
        }
        Ok(mailing)
    }
}

// ── DeleteMailing ────────────────────────────────────────────────────────────

pub struct DeleteMailingUseCase<M: MailingRepository> {
    pub mailings: M,
}

impl<M: MailingRepository> DeleteMailingUseCase<M> {
    pub async fn execute(&self, id: MailingId) -> Result<(), MailingsServiceError> {
        if !self.mailings.delete(id).await? {
            return Err(MailingsServiceError::MailingNotFound);
        }
        Ok(())
    }
}
