//! Credential resolution against the persistence collaborator

use crate::credential::redact;
use crate::error::Result;
use crate::store::CredentialStore;
use crate::types::{Credential, Principal};
use std::sync::Arc;
use tracing::{debug, error};

/// Outcome of resolving a credential string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Active credential with its owning principal
    Found(Principal, Credential),

    /// Unknown, revoked or orphaned; callers cannot tell these apart
    NotFound,
}

/// Resolves credential strings to `(principal, credential)` pairs
///
/// Every call performs one fresh joined read; nothing is cached, so a revoked
/// credential stops resolving on the next request.
#[derive(Clone)]
pub struct CredentialResolver {
    store: Arc<dyn CredentialStore>,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Resolve a credential string
    ///
    /// Storage failures are returned as errors, never as [`Resolution::NotFound`].
    pub async fn resolve(&self, credential_id: &str) -> Result<Resolution> {
        if credential_id.is_empty() {
            debug!("Empty credential string");
            return Ok(Resolution::NotFound);
        }

        let row = self
            .store
            .lookup_credential_with_principal(credential_id)
            .await
            .map_err(|e| {
                error!("Credential lookup failed for {}: {}", redact(credential_id), e);
                e
            })?;

        match row {
            // A store that skips the join can still hand back an orphaned row
            Some((_, credential)) if credential.is_orphaned() => {
                debug!("Credential {} is orphaned", redact(credential_id));
                Ok(Resolution::NotFound)
            }
            Some((principal, credential)) => {
                debug!(
                    "Credential {} resolved to principal {}",
                    redact(credential_id),
                    principal.id
                );
                Ok(Resolution::Found(principal, credential))
            }
            None => {
                debug!("Credential {} not found", redact(credential_id));
                Ok(Resolution::NotFound)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryCredentialStore;
    use crate::types::NewCredential;

    #[tokio::test]
    async fn test_resolve_found_and_missing() {
        let store = Arc::new(InMemoryCredentialStore::new());
        store.insert_principal(Principal::new(1, "alice@example.com")).await;
        let credential = store.create_credential(NewCredential::for_owner(1)).await.unwrap();

        let resolver = CredentialResolver::new(store.clone());
        assert!(matches!(
            resolver.resolve(&credential.id).await.unwrap(),
            Resolution::Found(principal, _) if principal.id == 1
        ));
        assert_eq!(resolver.resolve("nope").await.unwrap(), Resolution::NotFound);
        assert_eq!(resolver.resolve("").await.unwrap(), Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_orphaned_resolves_as_not_found() {
        let store = Arc::new(InMemoryCredentialStore::new());
        store.insert_principal(Principal::new(1, "alice@example.com")).await;
        let credential = store
            .create_credential(NewCredential::for_owner(1).with_permission("full_control"))
            .await
            .unwrap();
        store.remove_principal(1).await.unwrap();

        let resolver = CredentialResolver::new(store);
        assert_eq!(resolver.resolve(&credential.id).await.unwrap(), Resolution::NotFound);
    }
}
