//! Static vocabulary of permission scopes

/// Edit server settings; also gated on the principal's superuser flag
pub const SERVER_MANAGEMENT: &str = "server_management";
pub const TOKEN_MANAGEMENT: &str = "token_management";
pub const WALLET_MANAGEMENT: &str = "wallet_management";
pub const STORE_MANAGEMENT: &str = "store_management";
pub const DISCOUNT_MANAGEMENT: &str = "discount_management";
pub const PRODUCT_MANAGEMENT: &str = "product_management";
pub const INVOICE_MANAGEMENT: &str = "invoice_management";
pub const NOTIFICATION_MANAGEMENT: &str = "notification_management";
pub const TEMPLATE_MANAGEMENT: &str = "template_management";
/// Satisfies every blanket scope check, never the superuser gate
pub const FULL_CONTROL: &str = "full_control";

const ENTRIES: &[(&str, &str)] = &[
    (SERVER_MANAGEMENT, "Edit server settings"),
    (TOKEN_MANAGEMENT, "Create, list or edit tokens"),
    (WALLET_MANAGEMENT, "Create, list or edit wallets"),
    (STORE_MANAGEMENT, "Create, list or edit stores"),
    (DISCOUNT_MANAGEMENT, "Create, list or edit discounts"),
    (PRODUCT_MANAGEMENT, "Create, list or edit products"),
    (INVOICE_MANAGEMENT, "Create, list or edit invoices"),
    (NOTIFICATION_MANAGEMENT, "Create, list or edit notification providers"),
    (TEMPLATE_MANAGEMENT, "Create, list or edit templates"),
    (FULL_CONTROL, "Full control over what current user has"),
];

/// Recognized scope names and their descriptions
///
/// Documentation and issuance-time validation only. Evaluation compares
/// permission strings directly and never consults the catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeCatalog;

impl ScopeCatalog {
    /// The catalog
    pub const fn new() -> Self {
        Self
    }

    /// Description of a scope
    pub fn get(&self, name: &str) -> Option<&'static str> {
        ENTRIES
            .iter()
            .find(|(scope, _)| *scope == name)
            .map(|(_, description)| *description)
    }

    /// Whether the name is a recognized scope
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All `(name, description)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        ENTRIES.iter().copied()
    }

    /// Number of recognized scopes
    pub fn len(&self) -> usize {
        ENTRIES.len()
    }

    pub fn is_empty(&self) -> bool {
        ENTRIES.is_empty()
    }
}
