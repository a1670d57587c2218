use sea_orm::entity::prelude::*;

/// Reusable message template.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub subject: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::mailings::Entity")]
    Mailings,
}

impl Related<super::mailings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mailings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
