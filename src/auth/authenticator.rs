//! Credential verification and token grant.

use std::sync::Arc;

use tracing::warn;

use super::error::AuthError;
use super::store::CredentialStore;
use super::token::TokenSigner;

/// What a successful login hands back to the client.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub token: String,
    pub email: String,
}

pub struct Authenticator {
    store: Arc<CredentialStore>,
    signer: Arc<TokenSigner>,
}

impl Authenticator {
    #[must_use]
    pub fn new(store: Arc<CredentialStore>, signer: Arc<TokenSigner>) -> Self {
        Self { store, signer }
    }

    /// Verify the submitted credentials and mint a bearer token.
    ///
    /// Email comparison is exact and case-sensitive. The hash comparison
    /// runs even when the email already failed to match, so both mismatch
    /// kinds take comparable time and return the same generic error.
    ///
    /// # Errors
    /// `NotConfigured` before setup, `InvalidCredentials` on any mismatch,
    /// `Storage` when the record cannot be read back despite setup having
    /// completed.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginGrant, AuthError> {
        if !self.store.is_configured().await? {
            return Err(AuthError::NotConfigured);
        }

        let Some(record) = self.store.load().await? else {
            warn!("credential record missing although setup has completed");
            return Err(AuthError::Storage(
                "credential record missing after setup".to_string(),
            ));
        };

        let email_matches = record.email == email;
        let password_ok = verify_password(password.to_string(), record.password_hash).await?;
        if !email_matches || !password_ok {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.signer.issue(&record.email)?;
        Ok(LoginGrant {
            token,
            email: record.email,
        })
    }
}

async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|err| AuthError::Internal(format!("verification task failed: {err}")))?
        .map_err(|err| AuthError::Internal(format!("failed to verify password: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::AdminRecord;
    use anyhow::Result;
    use chrono::Utc;
    use secrecy::SecretString;
    use tempfile::TempDir;

    // Low cost keeps the test matrix fast; the guard owns the real cost.
    const TEST_HASH_COST: u32 = 4;

    async fn seeded(
        email: &str,
        password: &str,
    ) -> Result<(Authenticator, Arc<TokenSigner>, TempDir)> {
        let dir = tempfile::tempdir()?;
        let store = Arc::new(CredentialStore::new(dir.path().join("admin.json")));
        store
            .save(&AdminRecord {
                email: email.to_string(),
                password_hash: bcrypt::hash(password, TEST_HASH_COST)?,
                created_at: Utc::now(),
            })
            .await?;

        let signer = Arc::new(TokenSigner::new(&SecretString::from(
            "login-test-secret".to_string(),
        )));
        Ok((Authenticator::new(store, Arc::clone(&signer)), signer, dir))
    }

    #[tokio::test]
    async fn login_before_setup_is_refused() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = Arc::new(CredentialStore::new(dir.path().join("admin.json")));
        let signer = Arc::new(TokenSigner::new(&SecretString::from(
            "login-test-secret".to_string(),
        )));
        let authenticator = Authenticator::new(store, signer);

        let result = authenticator.login("a@b.com", "secret1").await;
        assert!(matches!(result, Err(AuthError::NotConfigured)));
        Ok(())
    }

    #[tokio::test]
    async fn matching_credentials_grant_a_verifiable_token() -> Result<()> {
        let (authenticator, signer, _dir) = seeded("a@b.com", "secret1").await?;

        let grant = authenticator.login("a@b.com", "secret1").await?;
        assert_eq!(grant.email, "a@b.com");

        let claims = signer.verify(&grant.token)?;
        assert_eq!(claims.sub, "a@b.com");
        Ok(())
    }

    #[tokio::test]
    async fn any_mismatch_is_the_same_generic_error() -> Result<()> {
        let (authenticator, _signer, _dir) = seeded("a@b.com", "secret1").await?;

        for (email, password) in [
            ("a@b.com", "wrong"),
            ("wrong@b.com", "secret1"),
            ("A@B.COM", "secret1"),
            ("wrong@b.com", "wrong"),
        ] {
            let result = authenticator.login(email, password).await;
            assert!(
                matches!(result, Err(AuthError::InvalidCredentials)),
                "expected invalid credentials for ({email:?}, {password:?})"
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_record_surfaces_as_storage_failure() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("admin.json");
        tokio::fs::write(&path, b"{not json").await?;

        let store = Arc::new(CredentialStore::new(path));
        let signer = Arc::new(TokenSigner::new(&SecretString::from(
            "login-test-secret".to_string(),
        )));
        let authenticator = Authenticator::new(store, signer);

        let result = authenticator.login("a@b.com", "secret1").await;
        assert!(matches!(result, Err(AuthError::Storage(_))));
        Ok(())
    }
}
