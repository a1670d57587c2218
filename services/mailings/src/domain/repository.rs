#![allow(async_fn_in_trait)]

use std::sync::Arc;

use chrono::{DateTime, Utc};

use mailcamp_domain::id::{ClientId, MailingId, MessageId};
use mailcamp_domain::mailing::MailingStatus;
use mailcamp_domain::pagination::PageRequest;

use crate::domain::types::{
    AttemptTally, Client, Mailing, MailingAttempt, MailingEnvelope, Message,
};
use crate::error::{MailingsServiceError, TransportError};

/// Address book of one owner.
pub trait ClientRepository: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Vec<Client>, MailingsServiceError>;

    async fn get(&self, id: ClientId) -> Result<Option<Client>, MailingsServiceError>;

    /// The subset of `ids` visible to this owner.
    async fn get_many(&self, ids: &[ClientId]) -> Result<Vec<Client>, MailingsServiceError>;

    async fn count(&self) -> Result<u64, MailingsServiceError>;

    /// Fails with `ClientAlreadyExists` when the email is taken.
    async fn create(&self, client: &Client) -> Result<(), MailingsServiceError>;

    /// Returns `false` if no visible client has this id.
    async fn update(&self, client: &Client) -> Result<bool, MailingsServiceError>;

    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: ClientId) -> Result<bool, MailingsServiceError>;
}

pub trait MessageRepository: Send + Sync {
    async fn list(&self, page: PageRequest) -> Result<Vec<Message>, MailingsServiceError>;

    async fn get(&self, id: MessageId) -> Result<Option<Message>, MailingsServiceError>;

    async fn create(&self, message: &Message) -> Result<(), MailingsServiceError>;

    async fn update(&self, message: &Message) -> Result<bool, MailingsServiceError>;

    /// Deleting a message also deletes the mailings that use it.
    async fn delete(&self, id: MessageId) -> Result<bool, MailingsServiceError>;
}

/// The only way a mailing's status is written.
///
/// No validation happens here: the caller has already evaluated the status.
pub trait MailingStatusWriter: Send + Sync {
    async fn set_status(
        &self,
        id: MailingId,
        status: MailingStatus,
    ) -> Result<(), MailingsServiceError>;
}

pub trait MailingRepository: MailingStatusWriter {
    /// Newest start time first.
    async fn list(&self, page: PageRequest) -> Result<Vec<Mailing>, MailingsServiceError>;

    async fn list_all(&self) -> Result<Vec<Mailing>, MailingsServiceError>;

    async fn get(&self, id: MailingId) -> Result<Option<Mailing>, MailingsServiceError>;

    async fn get_envelope(
        &self,
        id: MailingId,
    ) -> Result<Option<MailingEnvelope>, MailingsServiceError>;

    async fn create(&self, mailing: &Mailing) -> Result<(), MailingsServiceError>;

    /// Replaces schedule, message, status and recipient set.
    async fn update(&self, mailing: &Mailing) -> Result<bool, MailingsServiceError>;

    async fn delete(&self, id: MailingId) -> Result<bool, MailingsServiceError>;

    /// Mailings whose window contains `now`, regardless of stored status.
    async fn list_active_ids(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<MailingId>, MailingsServiceError>;
}

/// Append-only delivery log.
pub trait AttemptRepository: Send + Sync {
    async fn append(&self, attempt: &MailingAttempt) -> Result<(), MailingsServiceError>;

    /// Most recent first.
    async fn list(&self, page: PageRequest) -> Result<Vec<MailingAttempt>, MailingsServiceError>;

    async fn list_for_mailing(
        &self,
        mailing_id: MailingId,
        page: PageRequest,
    ) -> Result<Vec<MailingAttempt>, MailingsServiceError>;

    /// Success/failure counts per mailing. Mailings without attempts are absent.
    async fn tally(&self) -> Result<Vec<AttemptTally>, MailingsServiceError>;
}

/// Outbound mail delivery.
pub trait MailTransport: Send + Sync {
    async fn send_mail(
        &self,
        subject: &str,
        body: &str,
        recipient: &str,
    ) -> Result<(), TransportError>;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
