//! Client-side error types.
//!
//! Transport failures are surfaced to the caller unchanged; recognized
//! HTTP statuses map to domain errors, and unmapped statuses pass through
//! as plain responses without becoming errors. Cache and retry bookkeeping
//! is internal and never raises.

use strata_search_protocol::ProtocolError;
use thiserror::Error;

use crate::http::Response;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors raised by the transport client and repository.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// Network or transport layer failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The in-flight request was cancelled by a newer overlapping query.
    ///
    /// This is "no result", not a failure to retry: the newer request
    /// carries the answer the caller wants.
    #[error("request cancelled by a newer query")]
    Cancelled,

    /// Wire model error from the protocol layer.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The service answered 404.
    #[error("resource not available: {0}")]
    ResourceNotAvailable(String),

    /// The service answered 401.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The service answered 400.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The service answered 409.
    #[error("resource exists: {0}")]
    ResourceExists(String),

    /// The service answered 500.
    #[error("connection error: {0}")]
    Connection(String),
}

impl ClientError {
    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        ClientError::Transport(msg.into())
    }

    /// True when this error is the overlapping-query cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }

    /// Map a recognized HTTP status to its domain error.
    ///
    /// Returns `None` for unmapped statuses; those responses pass through
    /// to the caller untouched.
    pub fn from_response(response: &Response) -> Option<Self> {
        let message = response
            .body()
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or_default()
            .to_string();

        match response.code() {
            404 => Some(ClientError::ResourceNotAvailable(message)),
            401 => Some(ClientError::InvalidToken(message)),
            400 => Some(ClientError::MalformedRequest(message)),
            409 => Some(ClientError::ResourceExists(message)),
            500 => Some(ClientError::Connection(message)),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        ClientError::Transport(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_statuses_map_to_domain_errors() {
        let body = serde_json::json!({"message": "index gone"});
        let error = ClientError::from_response(&Response::new(404, body)).unwrap();
        assert_eq!(error, ClientError::ResourceNotAvailable("index gone".to_string()));
    }

    #[test]
    fn test_unmapped_status_passes_through() {
        let response = Response::new(202, serde_json::json!({}));
        assert!(ClientError::from_response(&response).is_none());
    }
}
