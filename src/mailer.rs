use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

use crate::config::{ServerConfig, SmtpConfig};

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid mail address: {0}")]
    Address(String),

    #[error("Failed to build mail message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Outbound account notifications. Implementations decide the transport;
/// the services only know about these two messages.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sent when an admin creates an account, carrying the generated
    /// one-time password.
    async fn send_welcome(&self, to: &str, name: &str, temp_password: &str)
    -> Result<(), MailError>;

    /// Sent after an admin resets an account's password.
    async fn send_password_reset(
        &self,
        to: &str,
        name: &str,
        temp_password: &str,
    ) -> Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    public_url: String,
}

impl SmtpMailer {
    pub fn new(smtp: &SmtpConfig, server: &ServerConfig) -> Result<Self, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
            .port(smtp.port);

        if !smtp.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.clone(),
            ));
        }

        let sender = smtp
            .sender
            .parse::<Mailbox>()
            .map_err(|_| MailError::Address(smtp.sender.clone()))?;

        Ok(Self {
            transport: builder.build(),
            sender,
            public_url: server.public_url.clone(),
        })
    }

    async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), MailError> {
        let to = to
            .parse::<Mailbox>()
            .map_err(|_| MailError::Address(to.to_string()))?;

        let message = Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(subject)
            .body(body)?;

        self.transport.send(message).await?;
        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_welcome(
        &self,
        to: &str,
        name: &str,
        temp_password: &str,
    ) -> Result<(), MailError> {
        let body = format!(
            "Hi {name},\n\n\
             An account has been created for you on the scoreboard at {url}.\n\
             Your temporary password is: {temp_password}\n\n\
             You will be asked to choose a new password on first login.\n",
            url = self.public_url,
        );
        self.send(to, "Your scoreboard account", body).await
    }

    async fn send_password_reset(
        &self,
        to: &str,
        name: &str,
        temp_password: &str,
    ) -> Result<(), MailError> {
        let body = format!(
            "Hi {name},\n\n\
             Your scoreboard password at {url} has been reset.\n\
             Your temporary password is: {temp_password}\n\n\
             You will be asked to choose a new password on next login.\n",
            url = self.public_url,
        );
        self.send(to, "Your scoreboard password was reset", body)
            .await
    }
}

/// Development-mode mailer: logs instead of sending. The temporary
/// password is deliberately not logged.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send_welcome(&self, to: &str, name: &str, _: &str) -> Result<(), MailError> {
        info!("Skipping welcome mail to {name} <{to}> (development mode)");
        Ok(())
    }

    async fn send_password_reset(&self, to: &str, name: &str, _: &str) -> Result<(), MailError> {
        info!("Skipping password-reset mail to {name} <{to}> (development mode)");
        Ok(())
    }
}
