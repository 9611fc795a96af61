//! Outbound delivery of freshly provisioned administrator credentials.
//!
//! The setup guard hands the plaintext credentials to a
//! [`CredentialNotifier`] once the record is durably written. Delivery is
//! best effort: the caller records the outcome but never fails setup over
//! it. The default notifier for deployments without an SMTP relay skips
//! delivery and reports so.

use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};
use url::Url;

/// Outcome of a notification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Skipped,
}

/// Credential delivery abstraction used by the setup guard.
pub trait CredentialNotifier: Send + Sync {
    /// Attempt to deliver the credentials, or return an error to record the
    /// attempt as failed.
    ///
    /// # Errors
    /// Returns an error when delivery was attempted and failed.
    fn notify(&self, email: &str, password: &str) -> Result<Delivery>;
}

/// Notifier used when no SMTP relay is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipNotifier;

impl CredentialNotifier for SkipNotifier {
    fn notify(&self, email: &str, _password: &str) -> Result<Delivery> {
        debug!(to_email = %email, "no SMTP relay configured, skipping credential email");
        Ok(Delivery::Skipped)
    }
}

/// SMTP relay settings collected by the CLI layer.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub from: String,
}

/// Delivers the credential email through an authenticated STARTTLS relay.
pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: String,
    public_url: Url,
}

impl SmtpNotifier {
    /// # Errors
    /// Returns an error if the relay transport cannot be configured.
    pub fn new(config: &SmtpConfig, public_url: Url) -> Result<Self> {
        let transport = SmtpTransport::starttls_relay(&config.host)
            .context("failed to configure SMTP relay")?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.expose_secret().to_string(),
            ))
            .port(config.port)
            .timeout(Some(std::time::Duration::from_secs(10)))
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
            public_url,
        })
    }
}

impl CredentialNotifier for SmtpNotifier {
    fn notify(&self, email: &str, password: &str) -> Result<Delivery> {
        let message = Message::builder()
            .from(self.from.parse().context("invalid sender address")?)
            .to(email.parse().context("invalid recipient address")?)
            .subject("Administrator credentials configured")
            .header(ContentType::TEXT_PLAIN)
            .body(credentials_body(email, password, &self.public_url))
            .context("failed to build credential email")?;

        self.transport
            .send(&message)
            .context("failed to send credential email")?;

        info!(to_email = %email, "credential email delivered");
        Ok(Delivery::Sent)
    }
}

fn credentials_body(email: &str, password: &str, public_url: &Url) -> String {
    format!(
        "Your administrator credentials were configured successfully.\n\
         \n\
         Email: {email}\n\
         Password: {password}\n\
         \n\
         Access: {public_url}\n\
         \n\
         Keep these credentials in a safe place and change the password\n\
         after your first login. This mailbox is not monitored.\n"
    )
}
