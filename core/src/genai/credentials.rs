//! Boundary to the host's API-key picker.

use async_trait::async_trait;
use log::Level;

use crate::errors::GenError;
use crate::logging::log_event;

#[async_trait]
pub trait CredentialGate: Send + Sync {
    /// Key the host has selected, if any. `None` means requests fall back to
    /// the configured key.
    async fn active_key(&self) -> Option<String>;

    async fn has_active_credential(&self) -> bool {
        self.active_key().await.is_some()
    }

    /// Ask the user to pick a key. Resolves once the picker closes.
    async fn request_credential_selection(&self) -> Result<(), GenError>;
}

/// Used when the host has no key picker: the configured key is always active.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysActive;

#[async_trait]
impl CredentialGate for AlwaysActive {
    async fn active_key(&self) -> Option<String> {
        None
    }

    async fn has_active_credential(&self) -> bool {
        true
    }

    async fn request_credential_selection(&self) -> Result<(), GenError> {
        Ok(())
    }
}

/// Prompt for a paid key when none is active. The picker is trusted to have
/// installed one when it returns; a bad key surfaces later as
/// [`GenError::CredentialMissing`] from the gateway.
pub async fn ensure_paid_credential(gate: &dyn CredentialGate) -> Result<(), GenError> {
    if gate.has_active_credential().await {
        return Ok(());
    }
    log_event(
        Level::Info,
        Some("GEN-0102"),
        "genai.credentials",
        "Requesting paid API key selection",
        None,
        None,
    );
    gate.request_credential_selection().await
}
