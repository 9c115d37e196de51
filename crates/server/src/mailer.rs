//! Certificate email delivery.
//!
//! [`MailDispatcher`] composes the messages; a [`Mailer`] moves them. The
//! production mailer talks SMTP through lettre's tokio transport.

use crate::metrics;
use crate::repository::CertificateRepository;
use anyhow::{Context, Result as AnyResult};
use async_trait::async_trait;
use certmail_common::config::{SmtpConfig, SmtpTls};
use certmail_common::entities::certificates;
use certmail_common::{BulkSendError, MailError, Result};
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use tracing::{info, warn};

pub const CERTIFICATE_BODY: &str = "Here is your certificate!";
pub const BULK_SUBJECT: &str = "Certificate";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: Mailbox,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    /// The single-certificate notice. The certificate content is not attached.
    pub fn certificate(certificate: &certificates::Model, to: Mailbox) -> Self {
        Self {
            to,
            subject: format!("Your Certificate: {}", certificate.name),
            body: CERTIFICATE_BODY.to_string(),
        }
    }

    pub fn bulk(to: Mailbox, content: &str) -> Self {
        Self {
            to,
            subject: BULK_SUBJECT.to_string(),
            body: content.to_string(),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> std::result::Result<(), MailError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> AnyResult<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .with_context(|| format!("SMTP_FROM is not a valid mailbox: {}", config.from))?;

        let builder = match config.tls {
            SmtpTls::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?,
            SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
            SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        };
        let mut builder = builder.port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> std::result::Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(mail.to.clone())
            .subject(mail.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone())
            .map_err(|err| MailError::Build(err.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|err| MailError::Smtp(err.to_string()))?;
        Ok(())
    }
}

pub fn parse_recipient(raw: &str) -> std::result::Result<Mailbox, MailError> {
    raw.trim()
        .parse::<Mailbox>()
        .map_err(|_| MailError::InvalidAddress(raw.to_string()))
}

#[derive(Clone)]
pub struct MailDispatcher {
    certificates: CertificateRepository,
    mailer: Arc<dyn Mailer>,
}

impl MailDispatcher {
    pub fn new(certificates: CertificateRepository, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            certificates,
            mailer,
        }
    }

    pub async fn send_certificate(&self, id: i64, recipient: &str) -> Result<()> {
        let to = parse_recipient(recipient)?;
        let certificate = self.certificates.get(id).await?;

        let outcome = self
            .mailer
            .send(&OutgoingMail::certificate(&certificate, to))
            .await;
        metrics::record_mail_delivery("single", outcome.is_ok());
        outcome?;

        info!(certificate_id = id, recipient = %recipient, "certificate sent");
        Ok(())
    }

    /// Sends `content` to each recipient in order and stops at the first
    /// failure. Returns the recipients that were mailed.
    pub async fn send_bulk(
        &self,
        recipients: &[String],
        content: &str,
    ) -> std::result::Result<Vec<String>, BulkSendError> {
        let mut delivered = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            let outcome = match parse_recipient(recipient) {
                Ok(to) => self.mailer.send(&OutgoingMail::bulk(to, content)).await,
                Err(err) => Err(err),
            };
            metrics::record_mail_delivery("bulk", outcome.is_ok());

            if let Err(source) = outcome {
                warn!(
                    recipient = %recipient,
                    delivered = delivered.len(),
                    "bulk send aborted"
                );
                return Err(BulkSendError {
                    recipient: recipient.clone(),
                    delivered,
                    source,
                });
            }
            delivered.push(recipient.clone());
        }

        info!(count = delivered.len(), "bulk send finished");
        Ok(delivered)
    }
}
