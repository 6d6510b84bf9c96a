//! Error taxonomy shared by the collection controller and the mutation
//! coordinator.
//!
//! Fetch failures are stored in collection state and never escape a
//! controller method. Mutation failures are handed back to the caller as a
//! typed `Err` so the screen decides how to present them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Server,
    Validation,
    ConcurrencyRejected,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Server => "SERVER_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::ConcurrencyRejected => "CONCURRENCY_REJECTED",
        }
    }

    /// Whether re-invoking the same operation unchanged may succeed.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Server)
    }
}

pub const GENERIC_NETWORK_MESSAGE: &str =
    "Unable to connect. Please check your internet connection and try again.";
pub const GENERIC_SERVER_MESSAGE: &str = "Something went wrong on our side. Please try again.";

/// Failure of a page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server error{}: {message}", .status.map(|s| format!(" {s}")).unwrap_or_default())]
    Server { status: Option<u16>, message: String },
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            status: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::Server { .. } => ErrorKind::Server,
        }
    }

    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(_) => GENERIC_NETWORK_MESSAGE,
            Self::Server { .. } => GENERIC_SERVER_MESSAGE,
        }
    }

    /// Maps a non-success HTTP response onto the fetch taxonomy. Fetches have
    /// no user-correctable input, so a 4xx is still reported as a server error.
    #[must_use]
    pub fn from_http_status(status: u16, body: Option<&[u8]>) -> Self {
        if status == 408 {
            return Self::Network(format!("request timed out (HTTP {status})"));
        }
        Self::Server {
            status: Some(status),
            message: api_message(body).unwrap_or_else(|| format!("HTTP error: {status}")),
        }
    }
}

/// Failure of a remote state-changing action.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MutationError {
    /// User-correctable; the message is shown verbatim.
    #[error("{0}")]
    Validation(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("server error{}: {message}", .status.map(|s| format!(" {s}")).unwrap_or_default())]
    Server { status: Option<u16>, message: String },

    /// Another call for the same action and target is still in flight.
    #[error("'{action}' already in progress{}", .target.as_ref().map(|t| format!(" for {t}")).unwrap_or_default())]
    ConcurrencyRejected {
        action: String,
        target: Option<String>,
    },
}

impl MutationError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            status: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Network(_) => ErrorKind::Network,
            Self::Server { .. } => ErrorKind::Server,
            Self::ConcurrencyRejected { .. } => ErrorKind::ConcurrencyRejected,
        }
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// Text a screen should show for this failure, if any. A concurrency
    /// rejection is a silent no-op for the user.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Validation(message) => Some(message.clone()),
            Self::Network(_) => Some(GENERIC_NETWORK_MESSAGE.to_string()),
            Self::Server { .. } => Some(GENERIC_SERVER_MESSAGE.to_string()),
            Self::ConcurrencyRejected { .. } => None,
        }
    }

    #[must_use]
    pub fn from_http_status(status: u16, body: Option<&[u8]>) -> Self {
        let message = api_message(body);
        match status {
            400 | 422 => Self::Validation(
                message.unwrap_or_else(|| "The request could not be completed.".to_string()),
            ),
            408 => Self::Network(format!("request timed out (HTTP {status})")),
            _ => Self::Server {
                status: Some(status),
                message: message.unwrap_or_else(|| format!("HTTP error: {status}")),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn api_message(body: Option<&[u8]>) -> Option<String> {
    body.and_then(|b| serde_json::from_slice::<ApiErrorResponse>(b).ok())
        .and_then(|r| r.message.or(r.error))
        .filter(|m| !m.trim().is_empty())
}
