pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_clients;
mod m20261001_000002_create_messages;
mod m20261001_000003_create_mailings;
mod m20261001_000004_create_mailing_recipients;
mod m20261001_000005_create_mailing_attempts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_clients::Migration),
            Box::new(m20261001_000002_create_messages::Migration),
            Box::new(m20261001_000003_create_mailings::Migration),
            Box::new(m20261001_000004_create_mailing_recipients::Migration),
            Box::new(m20261001_000005_create_mailing_attempts::Migration),
        ]
    }
}
