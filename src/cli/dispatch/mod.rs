use crate::cli::actions::{server::Args, Action};
use crate::email::SmtpConfig;
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;
use url::Url;

/// Turn parsed matches into the action to execute.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let admin_file = matches
        .get_one::<String>("admin-file")
        .cloned()
        .context("missing required argument: --admin-file")?;

    let token_secret = matches
        .get_one::<String>("token-secret")
        .cloned()
        .context("missing required argument: --token-secret")?;

    let public_url = matches
        .get_one::<String>("public-url")
        .cloned()
        .context("missing required argument: --public-url")?;
    let public_url = Url::parse(&public_url).context("invalid PORDISTO_PUBLIC_URL")?;

    // Validate SMTP arguments as a group before assembling the relay config
    crate::cli::commands::validate(matches).map_err(|e| anyhow::anyhow!(e))?;

    let smtp = matches.get_one::<String>("smtp-host").map(|host| {
        let username = matches
            .get_one::<String>("smtp-username")
            .cloned()
            .unwrap_or_default();
        SmtpConfig {
            host: host.clone(),
            port: matches.get_one::<u16>("smtp-port").copied().unwrap_or(587),
            from: matches
                .get_one::<String>("smtp-from")
                .cloned()
                .unwrap_or_else(|| username.clone()),
            username,
            password: SecretString::from(
                matches
                    .get_one::<String>("smtp-password")
                    .cloned()
                    .unwrap_or_default(),
            ),
        }
    });

    Ok(Action::Server(Args {
        port,
        admin_file: PathBuf::from(admin_file),
        token_secret: SecretString::from(token_secret),
        public_url,
        smtp,
    }))
}
