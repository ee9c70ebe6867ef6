//! Notification Module
//!
//! Sends the welcome email after a successful signup. Delivery happens on a
//! spawned task; a failure is logged and never affects the signup response.

use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use thiserror::Error;

use crate::backend::server::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build email: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("SMTP delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// SMTP mailer for account notifications
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    client_url: String,
}

impl Mailer {
    /// Build a mailer for a plain SMTP relay
    pub fn from_config(smtp: &SmtpConfig, client_url: impl Into<String>) -> Result<Self, MailError> {
        let from: Mailbox = smtp.from.parse()?;
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(smtp.host.as_str()).port(smtp.port);
        if let (Some(username), Some(password)) = (&smtp.username, &smtp.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            client_url: client_url.into(),
        })
    }

    pub async fn send_welcome(&self, email: &str, full_name: &str) -> Result<(), MailError> {
        let to = Mailbox::new(Some(full_name.to_string()), email.parse()?);
        let message = lettre::Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(welcome_subject())
            .header(ContentType::TEXT_PLAIN)
            .body(welcome_body(full_name, &self.client_url))?;

        self.transport.send(message).await?;
        Ok(())
    }

    /// Send the welcome email in the background
    pub fn spawn_welcome(&self, email: String, full_name: String) {
        let mailer = self.clone();
        tokio::spawn(async move {
            match mailer.send_welcome(&email, &full_name).await {
                Ok(()) => tracing::info!(%email, "welcome email sent"),
                Err(e) => tracing::warn!(%email, "failed to send welcome email: {}", e),
            }
        });
    }
}

pub fn welcome_subject() -> &'static str {
    "Welcome to Parley!"
}

pub fn welcome_body(full_name: &str, client_url: &str) -> String {
    format!(
        "Hi {full_name},\n\n\
         Your Parley account is ready. Pick a contact and start chatting:\n\
         {client_url}\n\n\
         See you soon,\nThe Parley team\n"
    )
}
