use std::time::Duration;

use anyhow::Context as _;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::domain::repository::Notifier;

const VERIFICATION_SUBJECT: &str = "Your verification code";

/// Socket-level timeout on the SMTP session. The caller applies its own
/// overall bound on top of this.
const SMTP_IO_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends verification codes over an authenticated SMTP relay.
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build the pooled transport. No connection is opened until the first send.
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        }
        .with_context(|| format!("invalid SMTP relay {}", config.host))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(SMTP_IO_TIMEOUT))
            .build();

        let from = config
            .from
            .parse::<Mailbox>()
            .with_context(|| format!("invalid MAIL_FROM {}", config.from))?;

        Ok(Self { transport, from })
    }
}

impl Notifier for SmtpNotifier {
    async fn send(&self, address: &str, code: &str) -> anyhow::Result<()> {
        let message = verification_message(&self.from, address, code)?;
        self.transport
            .send(message)
            .await
            .context("smtp send failed")?;
        Ok(())
    }
}

fn verification_message(from: &Mailbox, address: &str, code: &str) -> anyhow::Result<Message> {
    let to = address
        .parse::<Mailbox>()
        .with_context(|| format!("invalid recipient {address}"))?;
    let body = format!(
        "Your verification code is: {code}\n\
         \n\
         Enter it to confirm your email address or reset your password.\n\
         If you did not request it, you can ignore this message.\n"
    );
    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(VERIFICATION_SUBJECT)
        .header(ContentType::TEXT_PLAIN)
        .body(body)
        .context("build verification email")
}
