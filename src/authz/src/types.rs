//! Core identity and credential types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Unique principal identifier
pub type PrincipalId = i64;

/// Opaque credential identifier
pub type CredentialId = String;

/// Principal (user account) as owned by the persistence layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Principal identifier
    pub id: PrincipalId,

    /// Unique email address
    pub email: String,

    /// Password hash, never leaves the process
    #[serde(skip_serializing, default)]
    pub hashed_password: String,

    /// Privilege flag checked by the superuser gate
    #[serde(default)]
    pub is_superuser: bool,

    /// Creation timestamp
    pub created: DateTime<Utc>,
}

impl Principal {
    /// Create a regular principal
    pub fn new(id: PrincipalId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            hashed_password: String::new(),
            is_superuser: false,
            created: Utc::now(),
        }
    }

    /// Mark the principal as superuser
    pub fn superuser(mut self) -> Self {
        self.is_superuser = true;
        self
    }

    /// Attach a password hash
    pub fn with_hashed_password(mut self, hash: impl Into<String>) -> Self {
        self.hashed_password = hash.into();
        self
    }
}

/// Access credential (token)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Opaque, globally unique identifier
    pub id: CredentialId,

    /// Owning principal, `None` once the owner has been removed
    pub user_id: Option<PrincipalId>,

    /// Application the credential was issued to
    #[serde(default)]
    pub app_id: String,

    /// Redirect URL registered at issuance
    #[serde(default)]
    pub redirect_url: String,

    /// Blanket (`scope`) and selective (`scope:resource_id`) permissions
    #[serde(default)]
    pub permissions: HashSet<String>,

    /// Creation timestamp
    pub created: DateTime<Utc>,
}

impl Credential {
    /// Whether the permission string is held verbatim
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Whether the owning principal has been removed
    pub fn is_orphaned(&self) -> bool {
        self.user_id.is_none()
    }
}

/// Parameters for issuing a new credential
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCredential {
    /// Owning principal
    pub owner_id: PrincipalId,

    /// Application identifier
    #[serde(default)]
    pub app_id: String,

    /// Redirect URL
    #[serde(default)]
    pub redirect_url: String,

    /// Requested permissions
    #[serde(default)]
    pub permissions: HashSet<String>,
}

impl NewCredential {
    /// Start a request for the given owner
    pub fn for_owner(owner_id: PrincipalId) -> Self {
        Self {
            owner_id,
            ..Default::default()
        }
    }

    /// Add a permission string
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    /// Set the application identifier
    pub fn with_app(mut self, app_id: impl Into<String>, redirect_url: impl Into<String>) -> Self {
        self.app_id = app_id.into();
        self.redirect_url = redirect_url.into();
        self
    }
}
