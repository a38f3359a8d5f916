// src/services/mailer.rs
//
// Transporte de e-mail. O envio é síncrono no caminho da requisição:
// se o SMTP estiver lento, o pedido de OTP fica lento junto.

use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

// ---
// SMTP de verdade (lettre)
// ---
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let builder = match config.port {
            // 465 = TLS implícito; demais portas negociam STARTTLS
            465 => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
            _ if config.username.is_empty() => {
                // Servidor local de testes (MailHog, Mailpit) sem TLS nem login
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            }
            _ => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?,
        };

        let builder = builder.port(config.port);
        let builder = if config.username.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
        };

        Ok(Self {
            transport: builder.build(),
            sender: config.sender.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.sender.parse::<Mailbox>().context("SENDER_EMAIL inválido")?)
            .to(to.parse::<Mailbox>().with_context(|| format!("destinatário inválido: {to}"))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .context("falha ao montar a mensagem")?;

        self.transport
            .send(message)
            .await
            .with_context(|| format!("falha ao enviar e-mail para {to}"))?;

        tracing::info!(to = %to, subject = %subject, "📧 E-mail enviado");
        Ok(())
    }
}

// ---
// Dev: só registra no log
// ---
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        tracing::info!(to = %to, subject = %subject, body = %body, "📧 E-mail (somente log)");
        Ok(())
    }
}
