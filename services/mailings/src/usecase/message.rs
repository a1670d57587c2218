use mailcamp_domain::id::{MessageId, UserId};
use mailcamp_domain::pagination::PageRequest;

use crate::domain::repository::{Clock, MessageRepository};
use crate::domain::types::Message;
use crate::error::MailingsServiceError;

const MAX_SUBJECT_LEN: usize = 255;

fn check_subject(subject: &str) -> Result<(), MailingsServiceError> {
    if subject.trim().is_empty() || subject.chars().count() > MAX_SUBJECT_LEN {
        return Err(MailingsServiceError::InvalidField("subject"));
    }
    Ok(())
}

// ── CreateMessage ────────────────────────────────────────────────────────────

pub struct CreateMessageInput {
    pub subject: String,
    pub body: String,
}

pub struct CreateMessageUseCase<R: MessageRepository, C: Clock> {
    pub repo: R,
    pub clock: C,
}

impl<R: MessageRepository, C: Clock> CreateMessageUseCase<R, C> {
    pub async fn execute(
        &self,
        owner: UserId,
        input: CreateMessageInput,
    ) -> Result<Message, MailingsServiceError> {
        check_subject(&input.subject)?;
        let message = Message {
            id: MessageId::generate(),
            owner_id: owner,
            subject: input.subject,
            body: input.body,
            created_at: self.clock.now(),
        };
        self.repo.create(&message).await?;
        Ok(message)
    }
}

// ── GetMessage ───────────────────────────────────────────────────────────────

pub struct GetMessageUseCase<R: MessageRepository> {
    pub repo: R,
}

impl<R: MessageRepository> GetMessageUseCase<R> {
    pub async fn execute(&self, id: MessageId) -> Result<Message, MailingsServiceError> {
        self.repo
            .get(id)
            .await?
            .ok_or(MailingsServiceError::MessageNotFound)
    }
}

// ── ListMessages ─────────────────────────────────────────────────────────────

pub struct ListMessagesUseCase<R: MessageRepository> {
    pub repo: R,
}

impl<R: MessageRepository> ListMessagesUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<Message>, MailingsServiceError> {
        self.repo.list(page).await
    }
}

// ── UpdateMessage ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateMessageInput {
    pub subject: Option<String>,
    pub body: Option<String>,
}

pub struct UpdateMessageUseCase<R: MessageRepository> {
    pub repo: R,
}

impl<R: MessageRepository> UpdateMessageUseCase<R> {
    pub async fn execute(
        &self,
        id: MessageId,
        input: UpdateMessageInput,
    ) -> Result<Message, MailingsServiceError> {
        if input.subject.is_none() && input.body.is_none() {
            return Err(MailingsServiceError::MissingData);
        }
        if let Some(ref subject) = input.subject {
            check_subject(subject)?;
        }
        let mut message = self
            .repo
            .get(id)
            .await?
            .ok_or(MailingsServiceError::MessageNotFound)?;
        if let Some(subject) = input.subject {
            message.subject = subject;
        }
        if let Some(body) = input.body {
            message.body = body;
        }
        if !self.repo.update(&message).await? {
            return Err(MailingsServiceError::MessageNotFound);
        }
        Ok(message)
    }
}

// ── DeleteMessage ────────────────────────────────────────────────────────────

pub struct DeleteMessageUseCase<R: MessageRepository> {
    pub repo: R,
}

impl<R: MessageRepository> DeleteMessageUseCase<R> {
    pub async fn execute(&self, id: MessageId) -> Result<(), MailingsServiceError> {
        if !self.repo.delete(id).await? {
            return Err(MailingsServiceError::MessageNotFound);
        }
        Ok(())
    }
}
