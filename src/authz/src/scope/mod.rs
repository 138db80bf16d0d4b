//! Permission scope vocabulary and grant parsing
//!
//! # Examples
//!
//! ```
//! use merchant_authz::scope::{ScopeCatalog, ScopeGrant, ScopeRequirement};
//!
//! let grant: ScopeGrant = "invoice_management:42".parse().unwrap();
//! assert_eq!(grant.resource_id(), Some("42"));
//!
//! let required = ScopeRequirement::new(["invoice_management"]);
//! assert_eq!(required.challenge(), "Bearer scope=\"invoice_management\"");
//! assert!(ScopeCatalog::new().contains("full_control"));
//! ```

pub mod catalog;
mod types;

pub use catalog::ScopeCatalog;
pub use types::{selective_permission, ScopeError, ScopeGrant, ScopeRequirement, ScopeResult};

/// Validates every permission of a credential about to be issued
pub fn validate_permissions<'a, I>(permissions: I) -> ScopeResult<()>
where
    I: IntoIterator<Item = &'a String>,
{
    let catalog = ScopeCatalog::new();
    for permission in permissions {
        ScopeGrant::parse(permission, &catalog)?;
    }
    Ok(())
}
