//! # Pordisto (single-admin login gate)
//!
//! `pordisto` provisions exactly one administrator account on first use and
//! authenticates that administrator afterwards, issuing short-lived bearer
//! tokens a front-end presents on every protected check before redirecting
//! into the application proper.
//!
//! The server holds no session state: a token is a signed claim set and
//! verification is a pure signature/expiry check. The only durable state is
//! a single JSON credential record on disk, written once by the setup guard
//! and read back by the authenticator on every login.
//!
//! ## Module map
//!
//! - [`cli`]: command-line parsing, logging setup, and the server action.
//! - [`api`]: axum router, middleware layers, and the JSON handlers.
//! - [`auth`]: credential store, setup guard, authenticator, token signer.
//! - [`email`]: best-effort delivery of freshly provisioned credentials.

pub mod api;
pub mod auth;
pub mod cli;
pub mod email;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Commit hash recorded at build time, `unknown` outside a git checkout.
pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
