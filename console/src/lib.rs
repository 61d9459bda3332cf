//! Session-aware client for the HTML web console. The console signals an
//! expired session with a redirect to its sign-in page rather than an error
//! status, so every request runs through a state machine that re-logs-in at
//! most once and re-scrapes the anti-forgery tokens from every page it lands
//! on.
mod call;
mod error;
mod login;
mod ops;
mod page;
mod session;

pub use call::ConsoleCall;
pub use error::Error;
pub use session::Session;

pub type Result<T> = std::result::Result<T, Error>;
