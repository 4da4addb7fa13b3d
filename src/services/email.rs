//! Email service for password reset messages.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::path::Path;
use thiserror::Error;

use crate::config::{EmailConfig, EmailTransportConfig};

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Invalid address {address}: {reason}")]
    Address { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Message(String),

    #[error("Failed to create transport: {0}")]
    Transport(String),

    #[error("Failed to send email: {0}")]
    Send(String),
}

/// A plain-text message addressed to one recipient
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError>;
}

pub struct EmailService {
    transport: EmailTransport,
    from_email: String,
    from_name: String,
}

enum EmailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

impl EmailService {
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let transport = match &config.transport {
            EmailTransportConfig::Smtp {
                host,
                port,
                username,
                password,
            } => {
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                    .map_err(|e| EmailError::Transport(e.to_string()))?
                    .port(*port);
                if let (Some(username), Some(password)) = (username, password) {
                    builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
                }
                EmailTransport::Smtp(builder.build())
            }
            EmailTransportConfig::File { path } => {
                let emails_dir = Path::new(path);
                if !emails_dir.exists() {
                    std::fs::create_dir_all(emails_dir).map_err(|e| EmailError::Transport(e.to_string()))?;
                }
                EmailTransport::File(AsyncFileTransport::<Tokio1Executor>::new(emails_dir))
            }
        };

        Ok(Self {
            transport,
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, EmailError> {
        let from = parse_mailbox(&format!("{} <{}>", self.from_name, self.from_email))?;
        let to = parse_mailbox(&email.to)?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| EmailError::Message(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, EmailError> {
    address.parse::<Mailbox>().map_err(|e| EmailError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl Mailer for EmailService {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        let message = self.build_message(&email)?;

        match &self.transport {
            EmailTransport::Smtp(smtp) => {
                smtp.send(message).await.map_err(|e| EmailError::Send(e.to_string()))?;
            }
            EmailTransport::File(file) => {
                file.send(message).await.map_err(|e| EmailError::Send(e.to_string()))?;
            }
        }

        tracing::info!("Sent '{}' to {}", email.subject, email.to);
        Ok(())
    }
}

/// Body of the password reset message
pub fn password_reset_message(reset_url: &str) -> String {
    format!(
        "You are receiving this email because you (or someone else) has requested the reset of a password. \
         Please make a PUT request to: \n\n {}",
        reset_url
    )
}
