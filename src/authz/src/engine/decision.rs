//! Authorization decision types

use crate::error::{AuthzError, RejectionReason};
use crate::types::{Credential, Principal};

/// Outcome of authorizing one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// Credential is active and permits the operation
    Authorized(Principal, Credential),

    /// Credential could not be resolved (`invalid_credentials`)
    AuthenticationFailure(RejectionReason),

    /// Principal resolved but lacks scope or privilege
    AuthorizationFailure(RejectionReason),
}

impl AuthDecision {
    /// Unauthenticated decision
    pub fn unauthenticated() -> Self {
        Self::AuthenticationFailure(RejectionReason::InvalidCredentials)
    }

    /// Forbidden decision with the given reason
    pub fn forbidden(reason: RejectionReason) -> Self {
        Self::AuthorizationFailure(reason)
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized(..))
    }

    /// Rejection reason, `None` when authorized
    pub fn reason(&self) -> Option<RejectionReason> {
        match self {
            Self::Authorized(..) => None,
            Self::AuthenticationFailure(reason) | Self::AuthorizationFailure(reason) => {
                Some(*reason)
            }
        }
    }

    /// Convert into the error taxonomy, attaching the challenge to rejections
    pub fn into_result(self, challenge: impl Into<String>) -> Result<(Principal, Credential), AuthzError> {
        match self {
            Self::Authorized(principal, credential) => Ok((principal, credential)),
            Self::AuthenticationFailure(_) => Err(AuthzError::Authentication {
                challenge: challenge.into(),
            }),
            Self::AuthorizationFailure(reason) => Err(AuthzError::Authorization {
                reason,
                challenge: challenge.into(),
            }),
        }
    }
}
