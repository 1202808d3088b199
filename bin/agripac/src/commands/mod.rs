//! Command implementations, one module per CLI section.

pub mod admin;
pub mod domande;
pub mod fascicolo;
pub mod login;
pub mod overview;
pub mod particelle;
pub mod sistema;

use std::path::Path;

use anyhow::Result;

use agripac_client::session::has_permission;
use agripac_client::{Api, ApiClient, Capability, ClientConfig};

use crate::progress;

/// Build the typed API client from the persisted config, with the busy
/// indicator attached. Fails when no server or session is configured.
pub fn api(config: &ClientConfig) -> Result<Api> {
    if config.token().is_none() {
        anyhow::bail!("Nessuna sessione attiva. Esegui `agripac login`.");
    }
    let mut client = ApiClient::from_config(config)?;
    client.set_busy_hook(progress::stderr_busy_hook());
    tracing::debug!(server = %config.server, "client pronto");
    Ok(Api::new(client))
}

/// Client-side capability gate. The backend re-checks every call; this
/// only gives a clearer message than a 403.
pub fn require(config: &ClientConfig, capability: Capability) -> Result<()> {
    if !has_permission(config.role(), capability) {
        anyhow::bail!(
            "Operazione non consentita per il ruolo {}.",
            config
                .role()
                .map(|r| r.as_str())
                .unwrap_or("(nessuna sessione)")
        );
    }
    Ok(())
}

/// Like [`require`], satisfied by any one of the listed capabilities.
/// Used where a role sees its own records and another sees all of them.
pub fn require_any(config: &ClientConfig, capabilities: &[Capability]) -> Result<()> {
    if capabilities
        .iter()
        .any(|c| has_permission(config.role(), *c))
    {
        return Ok(());
    }
    anyhow::bail!(
        "Operazione non consentita per il ruolo {}.",
        config
            .role()
            .map(|r| r.as_str())
            .unwrap_or("(nessuna sessione)")
    );
}

pub fn load(config_path: &Path) -> Result<ClientConfig> {
    Ok(ClientConfig::load(config_path)?)
}
