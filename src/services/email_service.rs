//! services/email_service.rs
//! Transporte de salida: trait para inyectar en la campaña + implementación SMTP.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::app_config::{SmtpConfig, SmtpTls};
use crate::models::message_model::OutgoingEmail;

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Envía un correo; el error describe la falla del transporte.
    async fn send(&self, email: &OutgoingEmail) -> Result<()>;
}

#[derive(Clone)]
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpTransport {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let from: Mailbox = config.from.parse().context("Invalid from address")?;

        let mut builder = match config.tls {
            SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
            SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
            SmtpTls::Starttls => {
                let tls_params = TlsParameters::new(config.host.clone())?;
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
                    .tls(Tls::Required(tls_params))
            }
        };

        builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(30)));

        if let (Some(user), Some(pass)) = (&config.user, &config.pass) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            mailer: builder.build(),
            from,
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message> {
        let to: Mailbox = email.to.parse().context("Invalid recipient address")?;

        // Texto plano + HTML como alternativa
        let body = MultiPart::alternative_plain_html(
            email.text_body.clone(),
            email.html_body.clone(),
        );

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject)
            .multipart(body)
            .context("Failed to build email message")
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let message = self.build_message(email)?;
        self.mailer
            .send(message)
            .await
            .with_context(|| format!("SMTP send to {} failed", email.to))?;
        Ok(())
    }
}
