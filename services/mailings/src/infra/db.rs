use std::collections::HashMap;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, SqlErr,
    TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use mailcamp_domain::id::{AttemptId, ClientId, MailingId, MessageId, UserId};
use mailcamp_domain::mailing::{AttemptStatus, MailingStatus};
use mailcamp_domain::pagination::PageRequest;
use mailcamp_mailings_schema::{
    clients, mailing_attempts, mailing_recipients, mailings, messages,
};

use crate::domain::repository::{
    AttemptRepository, ClientRepository, MailingRepository, MailingStatusWriter,
    MessageRepository,
};
use crate::domain::types::{
    AttemptTally, Client, Mailing, MailingAttempt, MailingEnvelope, Message, Scope,
};
use crate::error::MailingsServiceError;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

// ── Client repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbClientRepository {
    pub db: DatabaseConnection,
    pub owner: UserId,
}

impl ClientRepository for DbClientRepository {
    async fn list(&self, page: PageRequest) -> Result<Vec<Client>, MailingsServiceError> {
        let models = clients::Entity::find()
            .filter(clients::Column::OwnerId.eq(self.owner.0))
            .order_by_asc(clients::Column::Email)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list clients")?;
        Ok(models.into_iter().map(client_from_model).collect())
    }

    async fn get(&self, id: ClientId) -> Result<Option<Client>, MailingsServiceError> {
        let model = clients::Entity::find_by_id(id.0)
            .filter(clients::Column::OwnerId.eq(self.owner.0))
            .one(&self.db)
            .await
            .context("find client by id")?;
        Ok(model.map(client_from_model))
    }

    async fn get_many(&self, ids: &[ClientId]) -> Result<Vec<Client>, MailingsServiceError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let models = clients::Entity::find()
            .filter(clients::Column::OwnerId.eq(self.owner.0))
            .filter(clients::Column::Id.is_in(ids.iter().map(|id| id.0)))
            .order_by_asc(clients::Column::Email)
            .all(&self.db)
            .await
            .context("find clients by ids")?;
        Ok(models.into_iter().map(client_from_model).collect())
    }

    async fn count(&self) -> Result<u64, MailingsServiceError> {
        let count = clients::Entity::find()
            .filter(clients::Column::OwnerId.eq(self.owner.0))
            .count(&self.db)
            .await
            .context("count clients")?;
        Ok(count)
    }

    async fn create(&self, client: &Client) -> Result<(), MailingsServiceError> {
        let result = clients::ActiveModel {
            id: Set(client.id.0),
            owner_id: Set(self.owner.0),
            email: Set(client.email.clone()),
            full_name: Set(client.full_name.clone()),
            comment: Set(client.comment.clone()),
            created_at: Set(client.created_at),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(MailingsServiceError::ClientAlreadyExists),
            Err(e) => Err(anyhow::Error::new(e).context("create client").into()),
        }
    }

    async fn update(&self, client: &Client) -> Result<bool, MailingsServiceError> {
        let result = clients::Entity::update_many()
            .col_expr(clients::Column::Email, Expr::value(client.email.clone()))
            .col_expr(clients::Column::FullName, Expr::value(client.full_name.clone()))
            .col_expr(clients::Column::Comment, Expr::value(client.comment.clone()))
            .filter(clients::Column::Id.eq(client.id.0))
            .filter(clients::Column::OwnerId.eq(self.owner.0))
            .exec(&self.db)
            .await;
        match result {
            Ok(r) => Ok(r.rows_affected > 0),
            Err(e) if is_unique_violation(&e) => Err(MailingsServiceError::ClientAlreadyExists),
            Err(e) => Err(anyhow::Error::new(e).context("update client").into()),
        }
    }

    async fn delete(&self, id: ClientId) -> Result<bool, MailingsServiceError> {
        let result = clients::Entity::delete_many()
            .filter(clients::Column::Id.eq(id.0))
            .filter(clients::Column::OwnerId.eq(self.owner.0))
            .exec(&self.db)
            .await
            .context("delete client")?;
        Ok(result.rows_affected > 0)
    }
}

fn client_from_model(model: clients::Model) -> Client {
    Client {
        id: ClientId(model.id),
        owner_id: UserId(model.owner_id),
        email: model.email,
        full_name: model.full_name,
        comment: model.comment,
        created_at: model.created_at,
    }
}

// ── Message repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMessageRepository {
    pub db: DatabaseConnection,
    pub owner: UserId,
}

impl MessageRepository for DbMessageRepository {
    async fn list(&self, page: PageRequest) -> Result<Vec<Message>, MailingsServiceError> {
        let models = messages::Entity::find()
            .filter(messages::Column::OwnerId.eq(self.owner.0))
            .order_by_desc(messages::Column::CreatedAt)
            .order_by_desc(messages::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list messages")?;
        Ok(models.into_iter().map(message_from_model).collect())
    }

    async fn get(&self, id: MessageId) -> Result<Option<Message>, MailingsServiceError> {
        let model = messages::Entity::find_by_id(id.0)
            .filter(messages::Column::OwnerId.eq(self.owner.0))
            .one(&self.db)
            .await
            .context("find message by id")?;
        Ok(model.map(message_from_model))
    }

    async fn create(&self, message: &Message) -> Result<(), MailingsServiceError> {
        messages::ActiveModel {
            id: Set(message.id.0),
            owner_id: Set(self.owner.0),
            subject: Set(message.subject.clone()),
            body: Set(message.body.clone()),
            created_at: Set(message.created_at),
        }
        .insert(&self.db)
        .await
        .context("create message")?;
        Ok(())
    }

    async fn update(&self, message: &Message) -> Result<bool, MailingsServiceError> {
        let result = messages::Entity::update_many()
            .col_expr(messages::Column::Subject, Expr::value(message.subject.clone()))
            .col_expr(messages::Column::Body, Expr::value(message.body.clone()))
            .filter(messages::Column::Id.eq(message.id.0))
            .filter(messages::Column::OwnerId.eq(self.owner.0))
            .exec(&self.db)
            .await
            .context("update message")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, id: MessageId) -> Result<bool, MailingsServiceError> {
        let owner = self.owner;
        let deleted = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    mailings::Entity::delete_many()
                        .filter(mailings::Column::MessageId.eq(id.0))
                        .filter(mailings::Column::OwnerId.eq(owner.0))
                        .exec(txn)
                        .await?;
                    let result = messages::Entity::delete_many()
                        .filter(messages::Column::Id.eq(id.0))
                        .filter(messages::Column::OwnerId.eq(owner.0))
                        .exec(txn)
                        .await?;
                    Ok(result.rows_affected > 0)
                })
            })
            .await
            .context("delete message")?;
        Ok(deleted)
    }
}

fn message_from_model(model: messages::Model) -> Message {
    Message {
        id: MessageId(model.id),
        owner_id: UserId(model.owner_id),
        subject: model.subject,
        body: model.body,
        created_at: model.created_at,
    }
}

// ── Mailing repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMailingRepository {
    pub db: DatabaseConnection,
    pub scope: Scope,
}

impl DbMailingRepository {
    /// Unscoped access for the scheduled dispatch job.
    pub fn system(db: DatabaseConnection) -> Self {
        Self {
            db,
            scope: Scope::System,
        }
    }

    fn find(&self) -> sea_orm::Select<mailings::Entity> {
        mailings::Entity::find().apply_if(self.scope.owner(), |query, owner| {
            query.filter(mailings::Column::OwnerId.eq(owner.0))
        })
    }

    async fn with_recipients(
        &self,
        models: Vec<mailings::Model>,
    ) -> Result<Vec<Mailing>, MailingsServiceError> {
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut recipients = load_recipient_ids(&self.db, &ids)
            .await
            .context("load mailing recipients")?;
        models
            .into_iter()
            .map(|model| {
                let recipient_ids = recipients.remove(&model.id).unwrap_or_default();
                mailing_from_model(model, recipient_ids)
            })
            .collect()
    }
}

async fn load_recipient_ids<C: ConnectionTrait>(
    db: &C,
    mailing_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<ClientId>>, DbErr> {
    if mailing_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = mailing_recipients::Entity::find()
        .filter(mailing_recipients::Column::MailingId.is_in(mailing_ids.iter().copied()))
        .order_by_asc(mailing_recipients::Column::ClientId)
        .all(db)
        .await?;
    let mut map: HashMap<Uuid, Vec<ClientId>> = HashMap::new();
    for row in rows {
        map.entry(row.mailing_id)
            .or_default()
            .push(ClientId(row.client_id));
    }
    Ok(map)
}

async fn insert_recipients<C: ConnectionTrait>(
    db: &C,
    mailing_id: Uuid,
    recipient_ids: &[ClientId],
) -> Result<(), DbErr> {
    if recipient_ids.is_empty() {
        return Ok(());
    }
    let rows = recipient_ids
        .iter()
        .map(|client_id| mailing_recipients::ActiveModel {
            mailing_id: Set(mailing_id),
            client_id: Set(client_id.0),
        });
    mailing_recipients::Entity::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

fn mailing_from_model(
    model: mailings::Model,
    recipient_ids: Vec<ClientId>,
) -> Result<Mailing, MailingsServiceError> {
    let status: MailingStatus = model.status.parse().context("decode mailing status")?;
    Ok(Mailing {
        id: MailingId(model.id),
        owner_id: UserId(model.owner_id),
        message_id: MessageId(model.message_id),
        recipient_ids,
        start_time: model.start_time,
        end_time: model.end_time,
        status,
        created_at: model.created_at,
    })
}

impl MailingStatusWriter for DbMailingRepository {
    async fn set_status(
        &self,
        id: MailingId,
        status: MailingStatus,
    ) -> Result<(), MailingsServiceError> {
        mailings::Entity::update_many()
            .col_expr(mailings::Column::Status, Expr::value(status.as_str()))
            .filter(mailings::Column::Id.eq(id.0))
            .apply_if(self.scope.owner(), |query, owner| {
                query.filter(mailings::Column::OwnerId.eq(owner.0))
            })
            .exec(&self.db)
            .await
            .context("set mailing status")?;
        Ok(())
    }
}

impl MailingRepository for DbMailingRepository {
    async fn list(&self, page: PageRequest) -> Result<Vec<Mailing>, MailingsServiceError> {
        let models = self
            .find()
            .order_by_desc(mailings::Column::StartTime)
            .order_by_desc(mailings::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list mailings")?;
        self.with_recipients(models).await
    }

    async fn list_all(&self) -> Result<Vec<Mailing>, MailingsServiceError> {
        let models = self
            .find()
            .order_by_desc(mailings::Column::StartTime)
            .order_by_desc(mailings::Column::Id)
            .all(&self.db)
            .await
            .context("list all mailings")?;
        self.with_recipients(models).await
    }

    async fn get(&self, id: MailingId) -> Result<Option<Mailing>, MailingsServiceError> {
        let model = self
            .find()
            .filter(mailings::Column::Id.eq(id.0))
            .one(&self.db)
            .await
            .context("find mailing by id")?;
        match model {
            Some(model) => Ok(self.with_recipients(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn get_envelope(
        &self,
        id: MailingId,
    ) -> Result<Option<MailingEnvelope>, MailingsServiceError> {
        let Some((model, message)) = self
            .find()
            .filter(mailings::Column::Id.eq(id.0))
            .find_also_related(messages::Entity)
            .one(&self.db)
            .await
            .context("find mailing with message")?
        else {
            return Ok(None);
        };
        let message = message.context("mailing references a missing message")?;
        let recipients: Vec<Client> = clients::Entity::find()
            .inner_join(mailing_recipients::Entity)
            .filter(mailing_recipients::Column::MailingId.eq(id.0))
            .order_by_asc(clients::Column::Email)
            .all(&self.db)
            .await
            .context("load mailing recipients")?
            .into_iter()
            .map(client_from_model)
            .collect();
        let recipient_ids = recipients.iter().map(|c| c.id).collect();
        Ok(Some(MailingEnvelope {
            mailing: mailing_from_model(model, recipient_ids)?,
            message: message_from_model(message),
            recipients,
        }))
    }

    async fn create(&self, mailing: &Mailing) -> Result<(), MailingsServiceError> {
        let mailing = mailing.clone();
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    mailings::ActiveModel {
                        id: Set(mailing.id.0),
                        owner_id: Set(mailing.owner_id.0),
                        message_id: Set(mailing.message_id.0),
                        start_time: Set(mailing.start_time),
                        end_time: Set(mailing.end_time),
                        status: Set(mailing.status.as_str().to_owned()),
                        created_at: Set(mailing.created_at),
                    }
                    .insert(txn)
                    .await?;
                    insert_recipients(txn, mailing.id.0, &mailing.recipient_ids).await
                })
            })
            .await
            .context("create mailing")?;
        Ok(())
    }

    async fn update(&self, mailing: &Mailing) -> Result<bool, MailingsServiceError> {
        let mailing = mailing.clone();
        let scope = self.scope;
        let updated = self
            .db
            .transaction::<_, bool, DbErr>(|txn| {
                Box::pin(async move {
                    let result = mailings::Entity::update_many()
                        .col_expr(mailings::Column::MessageId, Expr::value(mailing.message_id.0))
                        .col_expr(mailings::Column::StartTime, Expr::value(mailing.start_time))
                        .col_expr(mailings::Column::EndTime, Expr::value(mailing.end_time))
                        .col_expr(mailings::Column::Status, Expr::value(mailing.status.as_str()))
                        .filter(mailings::Column::Id.eq(mailing.id.0))
                        .apply_if(scope.owner(), |query, owner| {
                            query.filter(mailings::Column::OwnerId.eq(owner.0))
                        })
                        .exec(txn)
                        .await?;
                    if result.rows_affected == 0 {
                        return Ok(false);
                    }
                    mailing_recipients::Entity::delete_many()
                        .filter(mailing_recipients::Column::MailingId.eq(mailing.id.0))
                        .exec(txn)
                        .await?;
                    insert_recipients(txn, mailing.id.0, &mailing.recipient_ids).await?;
                    Ok(true)
                })
            })
            .await
            .context("update mailing")?;
        Ok(updated)
    }

    async fn delete(&self, id: MailingId) -> Result<bool, MailingsServiceError> {
        let result = mailings::Entity::delete_many()
            .filter(mailings::Column::Id.eq(id.0))
            .apply_if(self.scope.owner(), |query, owner| {
                query.filter(mailings::Column::OwnerId.eq(owner.0))
            })
            .exec(&self.db)
            .await
            .context("delete mailing")?;
        Ok(result.rows_affected > 0)
    }

    async fn list_active_ids(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<MailingId>, MailingsServiceError> {
        let ids: Vec<Uuid> = self
            .find()
            .filter(mailings::Column::StartTime.lte(now))
            .filter(mailings::Column::EndTime.gte(now))
            .order_by_asc(mailings::Column::StartTime)
            .select_only()
            .column(mailings::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await
            .context("list active mailings")?;
        Ok(ids.into_iter().map(MailingId).collect())
    }
}

// ── Attempt repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAttemptRepository {
    pub db: DatabaseConnection,
    pub scope: Scope,
}

impl DbAttemptRepository {
    pub fn system(db: DatabaseConnection) -> Self {
        Self {
            db,
            scope: Scope::System,
        }
    }

    fn find(&self) -> sea_orm::Select<mailing_attempts::Entity> {
        mailing_attempts::Entity::find()
            .inner_join(mailings::Entity)
            .apply_if(self.scope.owner(), |query, owner| {
                query.filter(mailings::Column::OwnerId.eq(owner.0))
            })
    }

    async fn list_page(
        &self,
        mailing_id: Option<MailingId>,
        page: PageRequest,
    ) -> Result<Vec<MailingAttempt>, MailingsServiceError> {
        let models = self
            .find()
            .apply_if(mailing_id, |query, id| {
                query.filter(mailing_attempts::Column::MailingId.eq(id.0))
            })
            .order_by_desc(mailing_attempts::Column::AttemptedAt)
            .order_by_desc(mailing_attempts::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list mailing attempts")?;
        models.into_iter().map(attempt_from_model).collect()
    }
}

fn attempt_from_model(
    model: mailing_attempts::Model,
) -> Result<MailingAttempt, MailingsServiceError> {
    Ok(MailingAttempt {
        id: AttemptId(model.id),
        mailing_id: MailingId(model.mailing_id),
        status: model.status.parse().context("decode attempt status")?,
        server_response: model.server_response,
        attempted_at: model.attempted_at,
    })
}

impl AttemptRepository for DbAttemptRepository {
    async fn append(&self, attempt: &MailingAttempt) -> Result<(), MailingsServiceError> {
        mailing_attempts::ActiveModel {
            id: Set(attempt.id.0),
            mailing_id: Set(attempt.mailing_id.0),
            status: Set(attempt.status.as_str().to_owned()),
            server_response: Set(attempt.server_response.clone()),
            attempted_at: Set(attempt.attempted_at),
        }
        .insert(&self.db)
        .await
        .context("append mailing attempt")?;
        Ok(())
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<MailingAttempt>, MailingsServiceError> {
        self.list_page(None, page).await
    }

    async fn list_for_mailing(
        &self,
        mailing_id: MailingId,
        page: PageRequest,
    ) -> Result<Vec<MailingAttempt>, MailingsServiceError> {
        self.list_page(Some(mailing_id), page).await
    }

    async fn tally(&self) -> Result<Vec<AttemptTally>, MailingsServiceError> {
        let rows: Vec<(Uuid, String, i64)> = self
            .find()
            .select_only()
            .column(mailing_attempts::Column::MailingId)
            .column(mailing_attempts::Column::Status)
            .column_as(
                Expr::col((mailing_attempts::Entity, mailing_attempts::Column::Id)).count(),
                "attempts",
            )
            .group_by(mailing_attempts::Column::MailingId)
            .group_by(mailing_attempts::Column::Status)
            .into_tuple()
            .all(&self.db)
            .await
            .context("tally mailing attempts")?;

        let mut tallies: Vec<AttemptTally> = Vec::new();
        for (mailing_id, status, count) in rows {
            let mailing_id = MailingId(mailing_id);
            let count = u64::try_from(count).unwrap_or_default();
            let index = match tallies.iter().position(|t| t.mailing_id == mailing_id) {
                Some(index) => index,
                None => {
                    tallies.push(AttemptTally {
                        mailing_id,
                        succeeded: 0,
                        failed: 0,
                    });
                    tallies.len() - 1
                }
            };
            let status: AttemptStatus = status.parse().context("decode attempt status")?;
            match status {
                AttemptStatus::Success => tallies[index].succeeded += count,
                AttemptStatus::Failed => tallies[index].failed += count,
            }
        }
        Ok(tallies)
    }
}
