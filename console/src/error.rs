use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from the console")]
    UnexpectedStatus { status: StatusCode, body: String },

    #[error("Unexpected redirect: {requested} landed on {landed}")]
    UnexpectedRedirect { requested: String, landed: String },

    #[error("Still redirected to sign-in immediately after logging in: {landed}")]
    RedirectAfterLogin { landed: String },

    #[error("Sign-in POST returned {status} instead of a redirect")]
    LoginFailed { status: StatusCode, body: String },

    #[error("Sign-in redirected to {actual}, expected a URL starting with {expected}")]
    RedirectTarget { expected: String, actual: String },
}
