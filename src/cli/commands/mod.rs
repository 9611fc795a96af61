use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

/// Check cross-argument consistency: SMTP settings are all-or-nothing.
///
/// # Errors
/// Returns an error string when a relay host is given without credentials,
/// or credentials are given without a relay host.
pub fn validate(matches: &clap::ArgMatches) -> Result<(), String> {
    if matches.contains_id("smtp-host") {
        if !matches.contains_id("smtp-username") {
            return Err(
                "Missing required argument: --smtp-username (required with --smtp-host)"
                    .to_string(),
            );
        }
        if !matches.contains_id("smtp-password") {
            return Err(
                "Missing required argument: --smtp-password (required with --smtp-host)"
                    .to_string(),
            );
        }
    } else {
        for arg in ["smtp-username", "smtp-password", "smtp-from"] {
            if matches.contains_id(arg) {
                return Err(format!("--{arg} requires --smtp-host"));
            }
        }
    }
    Ok(())
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    Command::new("pordisto")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("PORDISTO_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("admin-file")
                .short('f')
                .long("admin-file")
                .help("Path of the administrator credential record")
                .default_value("admin.json")
                .env("PORDISTO_ADMIN_FILE"),
        )
        .arg(
            Arg::new("token-secret")
                .long("token-secret")
                .help("Secret used to sign and verify session tokens; rotating it invalidates outstanding tokens")
                .env("PORDISTO_TOKEN_SECRET")
                .required(true),
        )
        .arg(
            Arg::new("public-url")
                .long("public-url")
                .help("Public URL of the login front-end, included in the credential email")
                .default_value("http://localhost:3000")
                .env("PORDISTO_PUBLIC_URL"),
        )
        .arg(
            Arg::new("smtp-host")
                .long("smtp-host")
                .help("SMTP relay host; when unset the credential email is skipped")
                .env("PORDISTO_SMTP_HOST"),
        )
        .arg(
            Arg::new("smtp-port")
                .long("smtp-port")
                .help("SMTP relay port")
                .default_value("587")
                .env("PORDISTO_SMTP_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("smtp-username")
                .long("smtp-username")
                .help("SMTP relay username")
                .env("PORDISTO_SMTP_USERNAME"),
        )
        .arg(
            Arg::new("smtp-password")
                .long("smtp-password")
                .help("SMTP relay password")
                .env("PORDISTO_SMTP_PASSWORD"),
        )
        .arg(
            Arg::new("smtp-from")
                .long("smtp-from")
                .help("Sender address for the credential email (defaults to the SMTP username)")
                .env("PORDISTO_SMTP_FROM"),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("PORDISTO_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
