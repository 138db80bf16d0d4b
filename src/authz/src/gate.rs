//! Per-request authorization gate
//!
//! Combines credential resolution and policy evaluation for one inbound
//! operation. Shared between request handlers; holds no mutable state.

use crate::engine::{AuthDecision, PolicyEngine};
use crate::error::Result;
use crate::resolver::{CredentialResolver, Resolution};
use crate::scope::ScopeRequirement;
use crate::store::CredentialStore;
use crate::types::{Credential, Principal};
use std::sync::Arc;
use tracing::{debug, warn};

/// Successful gate result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Enforcement disabled, or an optional check was rejected
    Anonymous,
    /// Authorized principal
    Principal(Principal),
    /// Authorized principal with the credential it presented
    WithCredential(Principal, Credential),
}

impl GateOutcome {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Anonymous => None,
            Self::Principal(principal) | Self::WithCredential(principal, _) => Some(principal),
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        match self {
            Self::WithCredential(_, credential) => Some(credential),
            _ => None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

/// Authorization gate
///
/// # Example
///
/// ```
/// use merchant_authz::{AuthorizationGate, InMemoryCredentialStore, ScopeRequirement};
/// use std::sync::Arc;
///
/// # async fn example() -> merchant_authz::Result<()> {
/// let gate = AuthorizationGate::new(Arc::new(InMemoryCredentialStore::new()), false, None);
/// let outcome = gate
///     .authorize(None, &ScopeRequirement::new(["wallet_management"]), None, false)
///     .await?;
/// assert!(outcome.is_anonymous());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthorizationGate {
    enabled: bool,
    bound_credential: Option<String>,
    resolver: CredentialResolver,
    engine: PolicyEngine,
}

impl AuthorizationGate {
    /// Create a gate
    ///
    /// # Arguments
    ///
    /// * `store` - Credential store used for resolution
    /// * `enabled` - `false` turns every check into an anonymous pass
    /// * `bound_credential` - Credential used instead of the one on the request
    pub fn new(
        store: Arc<dyn CredentialStore>,
        enabled: bool,
        bound_credential: Option<String>,
    ) -> Self {
        Self {
            enabled,
            bound_credential,
            resolver: CredentialResolver::new(store),
            engine: PolicyEngine::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Resolve and evaluate without applying the enforcement mode
    ///
    /// Only infrastructure failures are returned as `Err`.
    pub async fn decide(
        &self,
        presented: Option<&str>,
        required: &ScopeRequirement,
        resource_id: Option<&str>,
    ) -> Result<AuthDecision> {
        let Some(credential_id) = self.bound_credential.as_deref().or(presented) else {
            debug!("No credential presented");
            return Ok(AuthDecision::unauthenticated());
        };

        match self.resolver.resolve(credential_id).await? {
            Resolution::NotFound => Ok(AuthDecision::unauthenticated()),
            Resolution::Found(principal, credential) => {
                Ok(self.engine.evaluate(principal, credential, required, resource_id))
            }
        }
    }

    /// Authorize one operation
    ///
    /// Rejections are returned as [`crate::AuthzError::Authentication`] or
    /// [`crate::AuthzError::Authorization`], both carrying the challenge built from
    /// `required`.
    pub async fn authorize(
        &self,
        presented: Option<&str>,
        required: &ScopeRequirement,
        resource_id: Option<&str>,
        return_credential: bool,
    ) -> Result<GateOutcome> {
        if !self.enabled {
            return Ok(GateOutcome::Anonymous);
        }

        let decision = self.decide(presented, required, resource_id).await?;
        if let Some(reason) = decision.reason() {
            warn!(
                "Rejected request: reason={}, scopes=[{}], resource={:?}",
                reason,
                required.scope_str(),
                resource_id
            );
        }

        let (principal, credential) = decision.into_result(required.challenge())?;
        debug!("Authorized principal {}", principal.id);

        Ok(if return_credential {
            GateOutcome::WithCredential(principal, credential)
        } else {
            GateOutcome::Principal(principal)
        })
    }

    /// Authorize, treating any rejection as an anonymous caller
    ///
    /// Infrastructure failures still propagate.
    pub async fn authorize_optional(
        &self,
        presented: Option<&str>,
        required: &ScopeRequirement,
        resource_id: Option<&str>,
        return_credential: bool,
    ) -> Result<GateOutcome> {
        match self
            .authorize(presented, required, resource_id, return_credential)
            .await
        {
            Err(err) if err.is_rejection() => Ok(GateOutcome::Anonymous),
            other => other,
        }
    }
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("enabled", &self.enabled)
            .field("bound_credential", &self.bound_credential.is_some())
            .finish()
    }
}
