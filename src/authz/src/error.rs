//! Error types for the authorization core

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-readable reason attached to every rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// Credential absent, malformed, unknown or orphaned
    InvalidCredentials,

    /// A required scope is held neither blanket nor for the addressed resource
    InsufficientScope,

    /// The operation needs `server_management` and the principal is not a superuser
    SuperuserRequired,
}

impl RejectionReason {
    /// Wire form of the reason
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::InsufficientScope => "insufficient_scope",
            Self::SuperuserRequired => "superuser_required",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization core errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Credential could not be resolved to an active principal
    #[error("Could not validate credentials")]
    Authentication {
        /// Value for the transport challenge header
        challenge: String,
    },

    /// Principal resolved but the operation is not permitted
    #[error("Not enough permissions: {reason}")]
    Authorization {
        /// Either `insufficient_scope` or `superuser_required`
        reason: RejectionReason,
        /// Value for the transport challenge header
        challenge: String,
    },

    /// The persistence collaborator failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// A freshly generated credential id already exists
    #[error("Credential id collision, credential not created")]
    CredentialCollision,

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuthzError {
    /// Rejection reason for authentication and authorization failures
    pub fn reason(&self) -> Option<RejectionReason> {
        match self {
            Self::Authentication { .. } => Some(RejectionReason::InvalidCredentials),
            Self::Authorization { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// Challenge header value for authentication and authorization failures
    pub fn challenge(&self) -> Option<&str> {
        match self {
            Self::Authentication { challenge } | Self::Authorization { challenge, .. } => {
                Some(challenge)
            }
            _ => None,
        }
    }

    /// Whether this error is an access decision rather than an infrastructure failure
    pub fn is_rejection(&self) -> bool {
        self.reason().is_some()
    }
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;
