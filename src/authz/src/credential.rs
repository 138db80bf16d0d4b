//! Credential id generation and issuance

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::info;

use crate::error::{AuthzError, Result};
use crate::scope::validate_permissions;
use crate::store::CredentialStore;
use crate::types::{Credential, NewCredential};

/// Random bytes per credential id (256 bits)
pub const CREDENTIAL_ID_BYTES: usize = 32;

/// Generates a fresh credential id from the OS CSPRNG
///
/// The id is the unpadded URL-safe base64 encoding of
/// [`CREDENTIAL_ID_BYTES`] random bytes (43 characters). Ids are not checked
/// for uniqueness here; stores reject a colliding insert instead.
pub fn generate_credential_id() -> String {
    let mut bytes = [0u8; CREDENTIAL_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Issues a credential after checking its permissions against the scope catalog
pub async fn issue_credential(
    store: &dyn CredentialStore,
    request: NewCredential,
) -> Result<Credential> {
    validate_permissions(&request.permissions)
        .map_err(|e| AuthzError::InvalidInput(format!("Invalid permission: {}", e)))?;

    let credential = store.create_credential(request).await?;
    info!(
        "Issued credential {} for principal {:?} with {} permissions",
        redact(&credential.id),
        credential.user_id,
        credential.permissions.len()
    );
    Ok(credential)
}

/// Shortened form of a credential id for log lines
pub fn redact(credential_id: &str) -> String {
    let prefix: String = credential_id.chars().take(6).collect();
    format!("{}…", prefix)
}
