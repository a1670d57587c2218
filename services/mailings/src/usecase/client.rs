use mailcamp_domain::id::{ClientId, UserId};
use mailcamp_domain::pagination::PageRequest;

use crate::domain::repository::{ClientRepository, Clock};
use crate::domain::types::{Client, validate_email};
use crate::error::MailingsServiceError;

const MAX_NAME_LEN: usize = 255;

fn check_full_name(full_name: &str) -> Result<(), MailingsServiceError> {
    let trimmed = full_name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_NAME_LEN {
        return Err(MailingsServiceError::InvalidField("full_name"));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), MailingsServiceError> {
    if !validate_email(email) {
        return Err(MailingsServiceError::InvalidEmail);
    }
    Ok(())
}

// ── CreateClient ─────────────────────────────────────────────────────────────

pub struct CreateClientInput {
    pub email: String,
    pub full_name: String,
    pub comment: String,
}

pub struct CreateClientUseCase<R: ClientRepository, C: Clock> {
    pub repo: R,
    pub clock: C,
}

impl<R: ClientRepository, C: Clock> CreateClientUseCase<R, C> {
    pub async fn execute(
        &self,
        owner: UserId,
        input: CreateClientInput,
    ) -> Result<Client, MailingsServiceError> {
        check_email(&input.email)?;
        check_full_name(&input.full_name)?;
        let client = Client {
            id: ClientId::generate(),
            owner_id: owner,
            email: input.email,
            full_name: input.full_name.trim().to_owned(),
            comment: input.comment,
            created_at: self.clock.now(),
        };
        self.repo.create(&client).await?;
        Ok(client)
    }
}

// ── GetClient ────────────────────────────────────────────────────────────────

pub struct GetClientUseCase<R: ClientRepository> {
    pub repo: R,
}

impl<R: ClientRepository> GetClientUseCase<R> {
    pub async fn execute(&self, id: ClientId) -> Result<Client, MailingsServiceError> {
        self.repo
            .get(id)
            .await?
            .ok_or(MailingsServiceError::ClientNotFound)
    }
}

// ── ListClients ──────────────────────────────────────────────────────────────

pub struct ListClientsUseCase<R: ClientRepository> {
    pub repo: R,
}

impl<R: ClientRepository> ListClientsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<Client>, MailingsServiceError> {
        self.repo.list(page).await
    }
}

// ── UpdateClient ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateClientInput {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub comment: Option<String>,
}

pub struct UpdateClientUseCase<R: ClientRepository> {
    pub repo: R,
}

impl<R: ClientRepository> UpdateClientUseCase<R> {
    pub async fn execute(
        &self,
        id: ClientId,
        input: UpdateClientInput,
    ) -> Result<Client, MailingsServiceError> {
        if input.email.is_none() && input.full_name.is_none() && input.comment.is_none() {
            return Err(MailingsServiceError::MissingData);
        }
        if let Some(ref email) = input.email {
            check_email(email)?;
        }
        if let Some(ref full_name) = input.full_name {
            check_full_name(full_name)?;
        }

        let mut client = self
            .repo
            .get(id)
            .await?
            .ok_or(MailingsServiceError::ClientNotFound)?;
        if let Some(email) = input.email {
            client.email = email;
        }
        if let Some(full_name) = input.full_name {
            client.full_name = full_name.trim().to_owned();
        }
        if let Some(comment) = input.comment {
            client.comment = comment;
        }
        if !self.repo.update(&client).await? {
            return Err(MailingsServiceError::ClientNotFound);
        }
        Ok(client)
    }
}

// ── DeleteClient ─────────────────────────────────────────────────────────────

pub struct DeleteClientUseCase<R: ClientRepository> {
    pub repo: R,
}

impl<R: ClientRepository> DeleteClientUseCase<R> {
    pub async fn execute(&self, id: ClientId) -> Result<(), MailingsServiceError> {
        if !self.repo.delete(id).await? {
            return Err(MailingsServiceError::ClientNotFound);
        }
        Ok(())
    }
}
