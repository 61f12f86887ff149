//! Error types for the todo handler.
//!
//! # Design
//! Every failure ends the request. The response body is the error's display
//! text and the status comes from `HandlerError::status`, which consults the
//! configured `StatusPolicy` for the one case the deployed functions report
//! inconsistently (an undecodable create body).
//!
//! Failures inside `list` never reach this type: a missing listing or an
//! undecodable entry degrades to a shorter (possibly empty) array.

use crate::config::StatusPolicy;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The collection could not be opened.
    #[error("{0}")]
    Open(StoreError),

    /// The create body is not a decodable `Todo`.
    #[error("{0}")]
    MalformedBody(String),

    /// A required query parameter is absent or empty.
    #[error("missing required query parameter: {0}")]
    MissingParameter(&'static str),

    /// A put, get or delete failed, including a miss on read.
    #[error("{0}")]
    Store(StoreError),

    /// The decoded record could not be re-encoded.
    #[error("encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl HandlerError {
    pub fn status(&self, policy: StatusPolicy) -> u16 {
        match self {
            HandlerError::MissingParameter(_) => 400,
            HandlerError::MalformedBody(_) => match policy {
                StatusPolicy::Observed => 500,
                StatusPolicy::Strict => 400,
            },
            HandlerError::Open(_) | HandlerError::Store(_) | HandlerError::Encode(_) => 500,
        }
    }
}
