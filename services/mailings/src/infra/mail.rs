use std::sync::Arc;

use anyhow::Context as _;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::config::{MailingsConfig, SmtpTls, TransportKind};
use crate::domain::repository::MailTransport;
use crate::error::TransportError;

// ── SMTP ─────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SmtpMailTransport {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

impl SmtpMailTransport {
    pub fn new(
        host: &str,
        port: u16,
        tls: SmtpTls,
        credentials: Option<Credentials>,
        from: &str,
    ) -> anyhow::Result<Self> {
        let from: Mailbox = from.parse().context("parse MAIL_FROM")?;
        let mut builder = match tls {
            SmtpTls::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .context("configure STARTTLS relay")?,
            SmtpTls::Tls => {
                AsyncSmtpTransport::<Tokio1Executor>::relay(host).context("configure TLS relay")?
            }
            SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
        }
        .port(port);
        if let Some(credentials) = credentials {
            builder = builder.credentials(credentials);
        }
        Ok(Self {
            mailer: Arc::new(builder.build()),
            from,
        })
    }
}

impl MailTransport for SmtpMailTransport {
    async fn send_mail(
        &self,
        subject: &str,
        body: &str,
        recipient: &str,
    ) -> Result<(), TransportError> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|_| TransportError::InvalidAddress(recipient.to_owned()))?;
        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_owned())?;
        self.mailer.send(email).await?;
        Ok(())
    }
}

// ── Log ──────────────────────────────────────────────────────────────────────

/// Accepts every mail and records it in the log. For local runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailTransport;

impl MailTransport for LogMailTransport {
    async fn send_mail(
        &self,
        subject: &str,
        body: &str,
        recipient: &str,
    ) -> Result<(), TransportError> {
        info!(
            recipient,
            subject,
            body_len = body.len(),
            "mail accepted by log transport"
        );
        Ok(())
    }
}

// ── Configured ───────────────────────────────────────────────────────────────

/// The transport selected by `MAIL_TRANSPORT`.
#[derive(Clone)]
pub enum ConfiguredTransport {
    Log(LogMailTransport),
    Smtp(SmtpMailTransport),
}

impl ConfiguredTransport {
    pub fn from_config(config: &MailingsConfig) -> anyhow::Result<Self> {
        match config.mail_transport {
            TransportKind::Log => Ok(Self::Log(LogMailTransport)),
            TransportKind::Smtp => {
                let host = config
                    .smtp_host
                    .as_deref()
                    .context("SMTP_HOST is required when MAIL_TRANSPORT=smtp")?;
                let credentials = match (&config.smtp_username, &config.smtp_password) {
                    (Some(user), Some(password)) => {
                        Some(Credentials::new(user.clone(), password.clone()))
                    }
                    _ => None,
                };
                let transport = SmtpMailTransport::new(
                    host,
                    config.smtp_port,
                    config.smtp_tls,
                    credentials,
                    &config.mail_from,
                )?;
                Ok(Self::Smtp(transport))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Log(_) => "log",
            Self::Smtp(_) => "smtp",
        }
    }
}

impl MailTransport for ConfiguredTransport {
    async fn send_mail(
        &self,
        subject: &str,
        body: &str,
        recipient: &str,
    ) -> Result<(), TransportError> {
        match self {
            Self::Log(transport) => transport.send_mail(subject, body, recipient).await,
            Self::Smtp(transport) => transport.send_mail(subject, body, recipient).await,
        }
    }
}
