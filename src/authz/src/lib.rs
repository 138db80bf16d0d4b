//! # Merchant Authorization Core
//!
//! Scoped-permission authorization for the merchant resource API.
//!
//! ## Features
//!
//! - **Blanket and selective scopes**: `invoice_management` grants every
//!   invoice, `invoice_management:42` grants invoice 42 only
//! - **`full_control`** satisfies every scope check
//! - **Superuser gate**: `server_management` operations additionally require
//!   the principal's superuser flag, whatever the credential holds
//! - **Fresh lookups**: every request resolves its credential against the store;
//!   revoked and orphaned credentials fail immediately
//! - **PostgreSQL store** behind the `postgres` feature
//!
//! ## Example
//!
//! ```rust
//! use merchant_authz::{
//!     AuthorizationGate, CredentialStore, InMemoryCredentialStore, NewCredential, Principal,
//!     ScopeRequirement,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryCredentialStore::new());
//!     store.insert_principal(Principal::new(1, "alice@example.com")).await;
//!
//!     let credential = store
//!         .create_credential(NewCredential::for_owner(1).with_permission("invoice_management:42"))
//!         .await?;
//!
//!     let gate = AuthorizationGate::new(store, true, None);
//!     let required = ScopeRequirement::new(["invoice_management"]);
//!
//!     let outcome = gate.authorize(Some(credential.id.as_str()), &required, Some("42"), false).await?;
//!     assert_eq!(outcome.principal().map(|p| p.id), Some(1));
//!
//!     assert!(gate.authorize(Some(credential.id.as_str()), &required, Some("43"), false).await.is_err());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod credential;
pub mod engine;
pub mod error;
pub mod gate;
pub mod http;
pub mod operations;
pub mod resolver;
pub mod scope;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::AuthzConfig;
pub use credential::{generate_credential_id, issue_credential};
pub use engine::{AuthDecision, PolicyEngine};
pub use error::{AuthzError, RejectionReason, Result};
pub use gate::{AuthorizationGate, GateOutcome};
pub use operations::{AuthMode, OperationSpec, OperationTable};
pub use resolver::{CredentialResolver, Resolution};
pub use scope::{ScopeCatalog, ScopeGrant, ScopeRequirement};
pub use store::{CredentialStore, InMemoryCredentialStore};
pub use types::{Credential, CredentialId, NewCredential, Principal, PrincipalId};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
