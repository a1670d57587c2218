use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MailingRecipients::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MailingRecipients::MailingId).uuid().not_null())
                    .col(ColumnDef::new(MailingRecipients::ClientId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(MailingRecipients::MailingId)
                            .col(MailingRecipients::ClientId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(MailingRecipients::Table, MailingRecipients::MailingId)
                            .to(Mailings::Table, Mailings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(MailingRecipients::Table, MailingRecipients::ClientId)
                            .to(Clients::Table, Clients::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(MailingRecipients::Table)
                    .col(MailingRecipients::ClientId)
                    .name("idx_mailing_recipients_client_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MailingRecipients::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MailingRecipients {
    Table,
    MailingId,
    ClientId,
}

#[derive(Iden)]
enum Mailings {
    Table,
    Id,
}

#[derive(Iden)]
enum Clients {
    Table,
    Id,
}
