use sea_orm::entity::prelude::*;

/// Append-only record of one recipient-level send outcome.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "mailing_attempts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub mailing_id: Uuid,
    pub status: String,
    #[sea_orm(column_type = "Text")]
    pub server_response: String,
    pub attempted_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::mailings::Entity",
        from = "Column::MailingId",
        to = "super::mailings::Column::Id"
    )]
    Mailing,
}

impl Related<super::mailings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mailing.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
