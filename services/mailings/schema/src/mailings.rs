use sea_orm::entity::prelude::*;

/// Scheduled send of one message to a set of clients.
///
/// `status` caches the value derived from the time window
/// (`created` | `started` | `completed`).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "mailings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub message_id: Uuid,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::messages::Entity",
        from = "Column::MessageId",
        to = "super::messages::Column::Id"
    )]
    Message,
    #[sea_orm(has_many = "super::mailing_recipients::Entity")]
    MailingRecipients,
    #[sea_orm(has_many = "super::mailing_attempts::Entity")]
    MailingAttempts,
}

impl Related<super::messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Message.def()
    }
}

impl Related<super::mailing_recipients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MailingRecipients.def()
    }
}

impl Related<super::mailing_attempts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MailingAttempts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
