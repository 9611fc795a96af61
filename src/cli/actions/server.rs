use crate::api;
use crate::auth::{CredentialStore, TokenSigner};
use crate::email::{CredentialNotifier, SkipNotifier, SmtpConfig, SmtpNotifier};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub admin_file: PathBuf,
    pub token_secret: SecretString,
    pub public_url: Url,
    pub smtp: Option<SmtpConfig>,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if the SMTP relay cannot be configured or the server
/// fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let notifier: Arc<dyn CredentialNotifier> = match &args.smtp {
        Some(config) => Arc::new(
            SmtpNotifier::new(config, args.public_url.clone())
                .context("failed to configure SMTP notifier")?,
        ),
        None => Arc::new(SkipNotifier),
    };

    let store = CredentialStore::new(args.admin_file);
    let signer = TokenSigner::new(&args.token_secret);
    let state = api::AppState::new(store, signer, notifier);

    api::new(args.port, state).await
}

fn log_startup_args(args: &Args) {
    let smtp_relay = args
        .smtp
        .as_ref()
        .map_or_else(|| "none".to_string(), |smtp| format!("{}:{}", smtp.host, smtp.port));

    info!(
        listen = %format!("tcp:{}", args.port),
        admin_file = %args.admin_file.display(),
        public_url = %args.public_url,
        smtp_relay = %smtp_relay,
        token_secret_set = true,
        "Startup configuration"
    );
}
