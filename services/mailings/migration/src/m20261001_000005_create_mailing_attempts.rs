use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MailingAttempts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MailingAttempts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MailingAttempts::MailingId).uuid().not_null())
                    .col(ColumnDef::new(MailingAttempts::Status).string_len(20).not_null())
                    .col(
                        ColumnDef::new(MailingAttempts::ServerResponse)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(MailingAttempts::AttemptedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(MailingAttempts::Table, MailingAttempts::MailingId)
                            .to(Mailings::Table, Mailings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(MailingAttempts::Table)
                    .col(MailingAttempts::MailingId)
                    .col((MailingAttempts::AttemptedAt, IndexOrder::Desc))
                    .name("idx_mailing_attempts_mailing_id_attempted_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MailingAttempts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MailingAttempts {
    Table,
    Id,
    MailingId,
    Status,
    ServerResponse,
    AttemptedAt,
}

#[derive(Iden)]
enum Mailings {
    Table,
    Id,
}
