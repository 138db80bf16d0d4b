//! Static table of protected operations and the scopes they require

use crate::scope::catalog::{
    DISCOUNT_MANAGEMENT, FULL_CONTROL, INVOICE_MANAGEMENT, NOTIFICATION_MANAGEMENT,
    PRODUCT_MANAGEMENT, SERVER_MANAGEMENT, STORE_MANAGEMENT, TEMPLATE_MANAGEMENT,
    TOKEN_MANAGEMENT, WALLET_MANAGEMENT,
};
use crate::scope::ScopeRequirement;
use std::collections::HashMap;

/// Resource collections and the scope managing each
pub const RESOURCE_SCOPES: &[(&str, &str)] = &[
    ("users", SERVER_MANAGEMENT),
    ("wallets", WALLET_MANAGEMENT),
    ("stores", STORE_MANAGEMENT),
    ("discounts", DISCOUNT_MANAGEMENT),
    ("products", PRODUCT_MANAGEMENT),
    ("invoices", INVOICE_MANAGEMENT),
    ("notifications", NOTIFICATION_MANAGEMENT),
    ("templates", TEMPLATE_MANAGEMENT),
    ("tokens", TOKEN_MANAGEMENT),
];

/// CRUD methods generated for every resource collection
pub const CRUD_METHODS: &[&str] = &["get_all", "get_count", "get_one", "post", "patch", "put", "delete"];

/// How an operation treats the presented credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Rejections are returned to the caller
    Required,
    /// Rejections degrade to an anonymous caller
    Optional,
    /// No credential is consulted
    Open,
}

/// Declaration of one protected operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSpec {
    pub scopes: ScopeRequirement,
    pub auth: AuthMode,
}

/// Operation id → required scopes, built once at startup
#[derive(Debug, Clone, Default)]
pub struct OperationTable {
    operations: HashMap<String, OperationSpec>,
}

/// Operation id for a resource method, e.g. `wallets.get_one`
pub fn operation_id(resource: &str, method: &str) -> String {
    format!("{}.{}", resource, method)
}

impl OperationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an operation that requires authentication and the given scopes
    pub fn register<I, S>(mut self, id: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(id, ScopeRequirement::new(scopes), AuthMode::Required);
        self
    }

    /// Declare an operation that serves anonymous callers on rejection
    pub fn register_optional<I, S>(mut self, id: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(id, ScopeRequirement::new(scopes), AuthMode::Optional);
        self
    }

    /// Declare an unauthenticated operation
    pub fn register_open(mut self, id: impl Into<String>) -> Self {
        self.insert(id, ScopeRequirement::none(), AuthMode::Open);
        self
    }

    fn insert(&mut self, id: impl Into<String>, scopes: ScopeRequirement, auth: AuthMode) {
        self.operations.insert(id.into(), OperationSpec { scopes, auth });
    }

    /// Declaration for an operation
    pub fn get(&self, id: &str) -> Option<&OperationSpec> {
        self.operations.get(id)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Operation ids in sorted order
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Table for the merchant API
    ///
    /// Every collection gets the CRUD methods guarded by its management scope.
    /// User registration is open; `users.stats` needs `full_control`, `users.me`
    /// any valid credential, and `tor.services` is served to everyone with extra
    /// data for superusers.
    pub fn merchant_api() -> Self {
        let mut table = Self::new();

        for (resource, scope) in RESOURCE_SCOPES {
            for method in CRUD_METHODS {
                table.insert(
                    operation_id(resource, method),
                    ScopeRequirement::new([*scope]),
                    AuthMode::Required,
                );
            }
        }

        table
            .register_open(operation_id("users", "post"))
            .register(operation_id("users", "stats"), [FULL_CONTROL])
            .register(operation_id("users", "me"), Vec::<String>::new())
            .register_optional(operation_id("tor", "services"), [SERVER_MANAGEMENT])
    }
}
