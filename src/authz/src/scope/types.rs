//! Permission grant and scope requirement types
//!
//! A permission string is either a blanket grant (`store_management`) or a
//! selective grant bound to one resource (`store_management:42`).

use std::fmt;
use std::str::FromStr;

use super::catalog::ScopeCatalog;

/// Result type for scope operations
pub type ScopeResult<T> = Result<T, ScopeError>;

/// Errors raised while parsing permission strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// Empty permission string provided
    EmptyScope,
    /// Scope name is not in the catalog
    UnknownScope(String),
    /// Selective grant with an empty resource id
    EmptyResourceId,
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyScope => write!(f, "Scope cannot be empty"),
            Self::UnknownScope(name) => write!(f, "Unknown scope: {}", name),
            Self::EmptyResourceId => write!(f, "Selective scope requires a resource id"),
        }
    }
}

impl std::error::Error for ScopeError {}

/// Parsed form of one permission string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScopeGrant {
    /// Capability across all instances of the resource type
    Blanket(String),
    /// Capability on exactly one instance
    Selective {
        scope: String,
        resource_id: String,
    },
}

impl ScopeGrant {
    /// Parses a permission string and checks its scope name against the catalog
    pub fn parse(permission: &str, catalog: &ScopeCatalog) -> ScopeResult<Self> {
        if permission.is_empty() {
            return Err(ScopeError::EmptyScope);
        }

        let grant = match permission.split_once(':') {
            None => Self::Blanket(permission.to_string()),
            Some((scope, resource_id)) => {
                if resource_id.is_empty() {
                    return Err(ScopeError::EmptyResourceId);
                }
                Self::Selective {
                    scope: scope.to_string(),
                    resource_id: resource_id.to_string(),
                }
            }
        };

        if !catalog.contains(grant.scope()) {
            return Err(ScopeError::UnknownScope(grant.scope().to_string()));
        }

        Ok(grant)
    }

    /// Selective grant for one resource
    pub fn selective(scope: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self::Selective {
            scope: scope.into(),
            resource_id: resource_id.into(),
        }
    }

    /// Scope name without the resource suffix
    pub fn scope(&self) -> &str {
        match self {
            Self::Blanket(scope) | Self::Selective { scope, .. } => scope,
        }
    }

    /// Resource id for selective grants
    pub fn resource_id(&self) -> Option<&str> {
        match self {
            Self::Blanket(_) => None,
            Self::Selective { resource_id, .. } => Some(resource_id),
        }
    }
}

impl FromStr for ScopeGrant {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, &ScopeCatalog::new())
    }
}

impl fmt::Display for ScopeGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blanket(scope) => write!(f, "{}", scope),
            Self::Selective { scope, resource_id } => write!(f, "{}:{}", scope, resource_id),
        }
    }
}

/// Selective permission string for a scope and resource id
pub fn selective_permission(scope: &str, resource_id: &str) -> String {
    format!("{}:{}", scope, resource_id)
}

/// Fixed set of scopes one operation requires
///
/// Deduplicated, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeRequirement {
    scopes: Vec<String>,
}

impl ScopeRequirement {
    /// Requirement from a list of scope names
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut deduped: Vec<String> = Vec::new();
        for scope in scopes {
            let scope = scope.into();
            if !deduped.contains(&scope) {
                deduped.push(scope);
            }
        }
        Self { scopes: deduped }
    }

    /// Requirement of no scopes (authentication only)
    pub fn none() -> Self {
        Self::default()
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Space-separated scope list
    pub fn scope_str(&self) -> String {
        self.scopes.join(" ")
    }

    /// Challenge value for `WWW-Authenticate`
    pub fn challenge(&self) -> String {
        if self.scopes.is_empty() {
            "Bearer".to_string()
        } else {
            format!("Bearer scope=\"{}\"", self.scope_str())
        }
    }
}

impl<S: Into<String>> FromIterator<S> for ScopeRequirement {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
