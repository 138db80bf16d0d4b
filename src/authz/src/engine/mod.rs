//! Scoped-permission policy engine
//!
//! Pure, synchronous evaluation of a resolved credential against the scopes an
//! operation requires.

pub mod decision;

pub use decision::AuthDecision;

use crate::error::RejectionReason;
use crate::scope::catalog::{FULL_CONTROL, SERVER_MANAGEMENT};
use crate::scope::{selective_permission, ScopeRequirement};
use crate::types::{Credential, Principal};
use tracing::debug;

/// Policy engine
///
/// # Evaluation order
///
/// ```text
/// full_control? ──no──▶ every required scope held blanket or for resource_id? ──no──▶ insufficient_scope
///      │yes                                   │yes
///      └──────────────────┬───────────────────┘
///                         ▼
///   server_management required and principal not superuser? ──yes──▶ superuser_required
///                         │no
///                         ▼
///                     Authorized
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEngine;

impl PolicyEngine {
    pub const fn new() -> Self {
        Self
    }

    /// Evaluate a resolved credential
    ///
    /// Returns [`AuthDecision::Authorized`] or [`AuthDecision::AuthorizationFailure`].
    pub fn evaluate(
        &self,
        principal: Principal,
        credential: Credential,
        required: &ScopeRequirement,
        resource_id: Option<&str>,
    ) -> AuthDecision {
        match self.check(&principal, &credential, required, resource_id) {
            Some(reason) => AuthDecision::forbidden(reason),
            None => AuthDecision::Authorized(principal, credential),
        }
    }

    /// Rejection reason for the credential, `None` when it is permitted
    pub fn check(
        &self,
        principal: &Principal,
        credential: &Credential,
        required: &ScopeRequirement,
        resource_id: Option<&str>,
    ) -> Option<RejectionReason> {
        if credential.has_permission(FULL_CONTROL) {
            debug!("full_control held, skipping scope matching");
        } else if let Some(missing) = required
            .iter()
            .find(|scope| !Self::scope_satisfied(credential, scope, resource_id))
        {
            debug!("Required scope {} not satisfied (resource={:?})", missing, resource_id);
            return Some(RejectionReason::InsufficientScope);
        }

        // Not bypassed by full_control
        if required.contains(SERVER_MANAGEMENT) && !principal.is_superuser {
            debug!("Principal {} is not a superuser", principal.id);
            return Some(RejectionReason::SuperuserRequired);
        }

        None
    }

    fn scope_satisfied(credential: &Credential, scope: &str, resource_id: Option<&str>) -> bool {
        if credential.has_permission(scope) {
            return true;
        }
        match resource_id {
            Some(id) => credential.has_permission(&selective_permission(scope, id)),
            None => false,
        }
    }
}
