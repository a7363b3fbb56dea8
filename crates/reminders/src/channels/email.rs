use std::sync::Arc;

use async_trait::async_trait;
use eyre::{Result, WrapErr, eyre};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::{info, warn};
use vitalog_core::models::reminder::Reminder;

use super::{Channel, DispatchOutcome, SkipReason};
use crate::config::SmtpConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Hands a rendered message to a mail system.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// SMTP relay transport using STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| eyre!("Invalid EMAIL_FROM {:?}: {}", config.from, e))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .wrap_err("Failed to configure SMTP relay")?
            .port(config.port);

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
impl EmailTransport for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| eyre!("Invalid recipient {:?}: {}", message.to, e))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(message.html.clone())
            .wrap_err("Failed to build email")?;

        self.transport
            .send(email)
            .await
            .wrap_err("SMTP send failed")?;

        Ok(())
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Fixed reminder template carrying the medication name and time.
pub fn render_reminder_email(reminder: &Reminder, to: &str) -> EmailMessage {
    let name = escape_html(&reminder.name);
    EmailMessage {
        to: to.to_string(),
        subject: format!("Medication reminder: {}", reminder.name),
        html: format!(
            "<h2>Medication reminder</h2>\
             <p>It is time to take <strong>{}</strong>.</p>\
             <p>Scheduled time: {}</p>",
            name,
            reminder.time_label()
        ),
    }
}

pub struct EmailDispatcher {
    transport: Arc<dyn EmailTransport>,
}

impl EmailDispatcher {
    pub fn new(transport: Arc<dyn EmailTransport>) -> Self {
        Self { transport }
    }

    pub async fn dispatch(&self, reminder: &Reminder) -> DispatchOutcome {
        let Some(to) = reminder.target_email() else {
            return DispatchOutcome::Skipped(SkipReason::NoEmailAddress);
        };

        let message = render_reminder_email(reminder, to);
        match self.transport.send(&message).await {
            Ok(()) => {
                info!(reminder_id = %reminder.id, channel = %Channel::Email, "Reminder email sent");
                DispatchOutcome::Sent
            }
            Err(e) => {
                warn!(reminder_id = %reminder.id, channel = %Channel::Email, error = %e, "Reminder email failed");
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }
}
