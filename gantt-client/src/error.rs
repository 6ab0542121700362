/// Client error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure: connection refused, timeout, undecodable body
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Rejected locally before reaching the server
    #[error("{0}")]
    Invalid(String),

    /// Local ownership pre-check failed
    #[error("You can only {action} your own tasks")]
    NotOwner { action: &'static str },

    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache contents are not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// HTTP status of a server rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the server could not be reached at all
    pub fn is_unreachable(&self) -> bool {
        match self {
            ClientError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status() {
        let err = ClientError::Api {
            status: 403,
            message: "You can only update your own tasks".to_string(),
        };
        assert_eq!(err.status(), Some(403));
        assert_eq!(
            err.to_string(),
            "Server returned 403: You can only update your own tasks"
        );
        assert_eq!(ClientError::Invalid("x".to_string()).status(), None);
    }

    #[test]
    fn test_not_owner_message() {
        let err = ClientError::NotOwner { action: "delete" };
        assert_eq!(err.to_string(), "You can only delete your own tasks");
        assert!(!err.is_unreachable());
    }
}
