use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Mailings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Mailings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Mailings::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Mailings::MessageId).uuid().not_null())
                    .col(
                        ColumnDef::new(Mailings::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Mailings::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Mailings::Status)
                            .string_len(20)
                            .not_null()
                            .default("created"),
                    )
                    .col(
                        ColumnDef::new(Mailings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Mailings::Table, Mailings::MessageId)
                            .to(Messages::Table, Messages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Mailings::Table)
                    .col(Mailings::OwnerId)
                    .col((Mailings::StartTime, IndexOrder::Desc))
                    .name("idx_mailings_owner_id_start_time")
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Mailings::Table)
                    .col(Mailings::StartTime)
                    .col(Mailings::EndTime)
                    .name("idx_mailings_window")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Mailings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Mailings {
    Table,
    Id,
    OwnerId,
    MessageId,
    StartTime,
    EndTime,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum Messages {
    Table,
    Id,
}
