use sea_orm::DatabaseConnection;

use mailcamp_domain::id::UserId;

use crate::domain::types::Scope;
use crate::infra::clock::SharedClock;
use crate::infra::db::{
    DbAttemptRepository, DbClientRepository, DbMailingRepository, DbMessageRepository,
};
use crate::infra::mail::ConfiguredTransport;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub transport: ConfiguredTransport,
    pub clock: SharedClock,
}

impl AppState {
    /// Repositories restricted to the rows owned by `owner`.
    pub fn for_user(&self, owner: UserId) -> OwnerScope {
        OwnerScope {
            db: self.db.clone(),
            owner,
        }
    }
}

/// Hands out repositories that can only see one owner's data.
pub struct OwnerScope {
    db: DatabaseConnection,
    owner: UserId,
}

impl OwnerScope {
    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn clients(&self) -> DbClientRepository {
        DbClientRepository {
            db: self.db.clone(),
            owner: self.owner,
        }
    }

    pub fn messages(&self) -> DbMessageRepository {
        DbMessageRepository {
            db: self.db.clone(),
            owner: self.owner,
        }
    }

    pub fn mailings(&self) -> DbMailingRepository {
        DbMailingRepository {
            db: self.db.clone(),
            scope: Scope::Owner(self.owner),
        }
    }

    pub fn attempts(&self) -> DbAttemptRepository {
        DbAttemptRepository {
            db: self.db.clone(),
            scope: Scope::Owner(self.owner),
        }
    }
}
