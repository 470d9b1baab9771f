//! Error types for the authentication layer
//!
//! Failures are classified once, at the gateway boundary, into an
//! [`AuthError`]. The session store only ever branches on [`ErrorKind`].

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Fallback reason reported when a failed login carries no server message
pub const LOGIN_FAILED: &str = "Login failed";

/// Fallback reason reported when a failed registration carries no server message
pub const REGISTRATION_FAILED: &str = "Registration failed";

/// Coarse classification of an [`AuthError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure: connection refused, DNS, timeout
    Network,
    /// The server rejected the credentials or the token (HTTP 401)
    Unauthorized,
    /// The server rejected the request (other 4xx, or an unfollowed 3xx)
    Validation,
    /// The server failed to handle the request (5xx)
    Server,
    /// A success response whose body could not be decoded
    Decode,
    /// A success response that carried no token
    MissingToken,
    /// Durable token storage failed
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "network",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Validation => "validation",
            ErrorKind::Server => "server",
            ErrorKind::Decode => "decode",
            ErrorKind::MissingToken => "missing_token",
            ErrorKind::Storage => "storage",
        };
        f.write_str(name)
    }
}

/// Errors raised by durable token storage
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to read token from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write token to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove token at {}: {source}", .path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A classified authentication failure
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unauthorized: {}", .message.as_deref().unwrap_or("credentials rejected"))]
    Unauthorized { message: Option<String> },

    #[error("request rejected (HTTP {status}): {}", .message.as_deref().unwrap_or("no details"))]
    Validation { status: u16, message: Option<String> },

    #[error("server error (HTTP {status}): {}", .message.as_deref().unwrap_or("no details"))]
    Server { status: u16, message: Option<String> },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("No token received")]
    MissingToken,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Network(_) => ErrorKind::Network,
            AuthError::Unauthorized { .. } => ErrorKind::Unauthorized,
            AuthError::Validation { .. } => ErrorKind::Validation,
            AuthError::Server { .. } => ErrorKind::Server,
            AuthError::Decode(_) => ErrorKind::Decode,
            AuthError::MissingToken => ErrorKind::MissingToken,
            AuthError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Message supplied by the server, if the failure payload carried one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AuthError::Unauthorized { message }
            | AuthError::Validation { message, .. }
            | AuthError::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Human-readable reason for display to the user.
    ///
    /// Prefers the server-supplied message. A missing token has its own fixed
    /// wording; everything else falls back to `fallback`.
    pub fn reason(&self, fallback: &str) -> String {
        match self {
            AuthError::MissingToken => self.to_string(),
            _ => self.server_message().unwrap_or(fallback).to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AuthError::Decode(err.to_string())
        } else {
            AuthError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_prefers_server_message() {
        let err = AuthError::Unauthorized {
            message: Some("No active account found with the given credentials".to_string()),
        };
        assert_eq!(
            err.reason(LOGIN_FAILED),
            "No active account found with the given credentials"
        );
    }

    #[test]
    fn test_reason_falls_back_without_message() {
        let err = AuthError::Validation { status: 400, message: None };
        assert_eq!(err.reason(REGISTRATION_FAILED), "Registration failed");

        let err = AuthError::Network("connection refused".to_string());
        assert_eq!(err.reason(LOGIN_FAILED), "Login failed");
    }

    #[test]
    fn test_missing_token_reason() {
        assert_eq!(AuthError::MissingToken.reason(LOGIN_FAILED), "No token received");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(AuthError::Network(String::new()).kind(), ErrorKind::Network);
        assert!(AuthError::Unauthorized { message: None }.is_unauthorized());
        assert!(!AuthError::Server { status: 502, message: None }.is_unauthorized());
        assert_eq!(ErrorKind::MissingToken.to_string(), "missing_token");
    }
}
