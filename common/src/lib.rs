//! Shared plumbing for both marketplace interfaces: process setup, the
//! credential record, and the structured-document codec used for the XML
//! trading API and the HTML console alike.
pub mod document;

mod credentials;
mod error;

pub use credentials::Credentials;
pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;

use env_logger::{Builder, Env};

/// Sets up the environment for the application.
///
/// Initializes the logger with a default filter level of "info" and loads
/// environment variables from a `.env` file if present.
pub fn setup_env() {
    dotenvy::dotenv().ok();
    Builder::from_env(Env::default().default_filter_or("info")).init();
}
