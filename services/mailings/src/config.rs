use serde::Deserialize;

use mailcamp_core::config::Config;
use mailcamp_core::tracing::LogFormat;

/// Which mail transport the service delivers through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Record deliveries in the log only.
    #[default]
    Log,
    Smtp,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
    #[default]
    Starttls,
    Tls,
    None,
}

/// Mailings service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct MailingsConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 3114). Env var: `MAILINGS_PORT`.
    #[serde(default = "default_port")]
    pub mailings_port: u16,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub mail_transport: TransportKind,
    /// Required when `MAIL_TRANSPORT=smtp`.
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    #[serde(default)]
    pub smtp_tls: SmtpTls,
    /// Sender address on every outgoing mail.
    #[serde(default = "default_mail_from")]
    pub mail_from: String,
}

impl Config for MailingsConfig {}

fn default_port() -> u16 {
    3114
}

fn default_smtp_port() -> u16 {
    587
}

fn default_mail_from() -> String {
    "no-reply@localhost".to_owned()
}
