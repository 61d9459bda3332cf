use crate::call::TradingCall;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse API response: {0}")]
    Document(#[from] common::Error),

    #[error("{call} was not acknowledged: {}", .message.as_deref().unwrap_or("no error message in response"))]
    ApiCallFailed {
        call: TradingCall,
        request: String,
        message: Option<String>,
    },
}
