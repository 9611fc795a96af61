//! One-shot administrator provisioning.
//!
//! Flow Overview:
//! 1) Validate the submitted email and password.
//! 2) Re-check "configured" and write the record under the setup lock.
//! 3) Hand the plaintext credentials to the notifier, best effort.

use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::error::AuthError;
use super::store::{AdminRecord, CredentialStore};
use crate::email::{CredentialNotifier, Delivery};

/// bcrypt work factor; balances brute-force resistance against setup latency.
pub const HASH_COST: u32 = 10;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// What a successful setup reported back, beyond the record itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupOutcome {
    pub email_sent: bool,
}

pub struct SetupGuard {
    store: Arc<CredentialStore>,
    notifier: Arc<dyn CredentialNotifier>,
    // Serializes the configured-check and the write so two concurrent setup
    // calls cannot both observe "not configured".
    lock: Mutex<()>,
}

impl SetupGuard {
    #[must_use]
    pub fn new(store: Arc<CredentialStore>, notifier: Arc<dyn CredentialNotifier>) -> Self {
        Self {
            store,
            notifier,
            lock: Mutex::new(()),
        }
    }

    /// Provision the administrator account, at most once per deployment.
    ///
    /// Once the record is durably written the transition is irreversible:
    /// `is_configured()` stays true for every later call. Notifier failure
    /// is recovered locally; losing the notification is recoverable, losing
    /// the provisioned account is not.
    ///
    /// # Errors
    /// `Validation` for malformed input, `AlreadyConfigured` when a record
    /// exists, `Storage` when the write fails; nothing is written in any of
    /// those cases.
    pub async fn setup_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SetupOutcome, AuthError> {
        validate_email(email)?;
        validate_password(password)?;

        {
            let _guard = self.lock.lock().await;

            if self.store.is_configured().await? {
                return Err(AuthError::AlreadyConfigured);
            }

            let password_hash = hash_password(password.to_string()).await?;
            let record = AdminRecord {
                email: email.to_string(),
                password_hash,
                created_at: Utc::now(),
            };
            self.store.save(&record).await?;
        }

        info!("administrator account configured");

        let email_sent = self.send_credentials(email, password).await;
        Ok(SetupOutcome { email_sent })
    }

    async fn send_credentials(&self, email: &str, password: &str) -> bool {
        let notifier = Arc::clone(&self.notifier);
        let email = email.to_string();
        let password = password.to_string();

        let result =
            tokio::task::spawn_blocking(move || notifier.notify(&email, &password)).await;

        match result {
            Ok(Ok(Delivery::Sent)) => true,
            Ok(Ok(Delivery::Skipped)) => false,
            Ok(Err(err)) => {
                warn!("failed to deliver credential email: {err:#}");
                false
            }
            Err(err) => {
                warn!("credential email task failed: {err}");
                false
            }
        }
    }
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.is_empty() {
        return Err(AuthError::Validation("email is required".to_string()));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(AuthError::Validation(
            "email address is not well-formed".to_string(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::Validation("password is required".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

async fn hash_password(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, HASH_COST))
        .await
        .map_err(|err| AuthError::Internal(format!("hashing task failed: {err}")))?
        .map_err(|err| AuthError::Internal(format!("failed to hash password: {err}")))
}
