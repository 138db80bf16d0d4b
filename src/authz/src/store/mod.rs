//! Credential persistence collaborator

use crate::credential::generate_credential_id;
use crate::error::{AuthzError, Result};
use crate::types::{Credential, CredentialId, NewCredential, Principal, PrincipalId};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::PostgresCredentialStore;

/// Credential store trait
///
/// Implementations own principals and credentials. The authorization core only
/// reads through [`CredentialStore::lookup_credential_with_principal`].
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch a credential and its owning principal in one read
    ///
    /// Returns `None` when the credential does not exist or its owner has been
    /// removed.
    async fn lookup_credential_with_principal(
        &self,
        credential_id: &str,
    ) -> Result<Option<(Principal, Credential)>>;

    /// Store a new credential under a freshly generated id
    async fn create_credential(&self, request: NewCredential) -> Result<Credential>;

    /// Delete a credential; returns whether it existed
    async fn revoke_credential(&self, credential_id: &str) -> Result<bool>;

    /// Delete a principal, orphaning its credentials; returns whether it existed
    async fn remove_principal(&self, principal_id: PrincipalId) -> Result<bool>;
}

#[derive(Default)]
struct Tables {
    principals: HashMap<PrincipalId, Principal>,
    credentials: HashMap<CredentialId, Credential>,
}

/// In-memory credential store implementation
pub struct InMemoryCredentialStore {
    tables: Arc<RwLock<Tables>>,
    id_generator: fn() -> String,
}

impl InMemoryCredentialStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::with_id_generator(generate_credential_id)
    }

    /// Create a store that draws credential ids from `id_generator`
    pub fn with_id_generator(id_generator: fn() -> String) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            id_generator,
        }
    }

    /// Insert or replace a principal
    pub async fn insert_principal(&self, principal: Principal) {
        let mut tables = self.tables.write().await;
        tables.principals.insert(principal.id, principal);
    }

    /// Number of stored credentials, orphaned ones included
    pub async fn credential_count(&self) -> usize {
        self.tables.read().await.credentials.len()
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn lookup_credential_with_principal(
        &self,
        credential_id: &str,
    ) -> Result<Option<(Principal, Credential)>> {
        let tables = self.tables.read().await;

        let Some(credential) = tables.credentials.get(credential_id) else {
            return Ok(None);
        };
        let Some(owner) = credential.user_id else {
            return Ok(None);
        };

        Ok(tables
            .principals
            .get(&owner)
            .map(|principal| (principal.clone(), credential.clone())))
    }

    async fn create_credential(&self, request: NewCredential) -> Result<Credential> {
        let id = (self.id_generator)();
        let mut tables = self.tables.write().await;

        if !tables.principals.contains_key(&request.owner_id) {
            return Err(AuthzError::InvalidInput(format!(
                "Unknown principal: {}",
                request.owner_id
            )));
        }

        match tables.credentials.entry(id) {
            Entry::Occupied(_) => Err(AuthzError::CredentialCollision),
            Entry::Vacant(slot) => {
                let credential = Credential {
                    id: slot.key().clone(),
                    user_id: Some(request.owner_id),
                    app_id: request.app_id,
                    redirect_url: request.redirect_url,
                    permissions: request.permissions,
                    created: Utc::now(),
                };
                Ok(slot.insert(credential).clone())
            }
        }
    }

    async fn revoke_credential(&self, credential_id: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.credentials.remove(credential_id).is_some())
    }

    async fn remove_principal(&self, principal_id: PrincipalId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.principals.remove(&principal_id).is_none() {
            return Ok(false);
        }

        // ON DELETE SET NULL
        for credential in tables.credentials.values_mut() {
            if credential.user_id == Some(principal_id) {
                credential.user_id = None;
            }
        }
        Ok(true)
    }
}
