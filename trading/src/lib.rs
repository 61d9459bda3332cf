//! Client for the XML trading API: one-shot authenticated POST requests with
//! the auth token injected into every request document.
mod call;
mod client;
mod error;

pub use call::TradingCall;
pub use client::Client;
pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;
