pub mod health;
pub use self::health::{health, live};

pub mod setup;
pub use self::setup::{setup_admin, setup_status};

pub mod login;
pub use self::login::login;

pub mod verify;
pub use self::verify::verify_token;
