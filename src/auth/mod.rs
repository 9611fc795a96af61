//! Provisioning and authentication core.
//!
//! Flow Overview:
//! 1) The setup guard provisions the single administrator record, at most
//!    once per deployment.
//! 2) The authenticator verifies submitted credentials against that record
//!    and mints a 24 h bearer token on success.
//! 3) The token signer verifies presented tokens statelessly.
//!
//! Security boundaries:
//! - Plaintext passwords are hashed with bcrypt before they touch disk and
//!   are never logged.
//! - Email and password mismatches return the same generic error and cost
//!   one hash comparison each, so callers cannot tell which field was wrong.

pub mod authenticator;
pub mod error;
pub mod setup;
pub mod store;
pub mod token;

pub use self::authenticator::{Authenticator, LoginGrant};
pub use self::error::AuthError;
pub use self::setup::{SetupGuard, SetupOutcome};
pub use self::store::{AdminRecord, CredentialStore, StoreError};
pub use self::token::{Claims, TokenSigner};
