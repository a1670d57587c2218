use sea_orm::entity::prelude::*;

/// Mailing recipient owned by a user. Email is unique across all owners.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub full_name: String,
    #[sea_orm(column_type = "Text")]
    pub comment: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::mailing_recipients::Entity")]
    MailingRecipients,
}

impl Related<super::mailing_recipients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MailingRecipients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
