use crate::config::MailCredentials;
use crate::core::MailTransport;
use crate::domain::model::MailMessage;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

const STARTTLS_PORT: u16 = 587;

fn mail_error(err: impl std::fmt::Display) -> SyncError {
    SyncError::MailError {
        message: err.to_string(),
    }
}

pub fn build_message(message: &MailMessage) -> Result<Message> {
    let from: Mailbox = message.from.parse().map_err(mail_error)?;
    let to: Mailbox = message.to.parse().map_err(mail_error)?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(message.html_body.clone())
        .map_err(mail_error)
}

/// SMTP relay authenticated as the sender. Port 587 uses STARTTLS, anything else
/// implicit TLS (465 when no port is configured).
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(host: &str, port: Option<u16>, credentials: &MailCredentials) -> Result<Self> {
        let relay = if port == Some(STARTTLS_PORT) {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        };

        let mut builder = relay.map_err(mail_error)?.credentials(Credentials::new(
            credentials.sender.clone(),
            credentials.password.clone(),
        ));
        if let Some(port) = port {
            builder = builder.port(port);
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        let email = build_message(message)?;
        let response = self.transport.send(email).await.map_err(mail_error)?;
        tracing::debug!("SMTP response code: {}", response.code());
        Ok(())
    }
}
