//! Session commands: server, login, logout, whoami, refresh.

use std::path::Path;

use anyhow::Result;

use agripac_client::session::{self, visible_tabs};
use agripac_client::ClientConfig;

/// Persist the server base URL. Any stored session is kept: tokens from a
/// different server will simply be rejected on first use.
pub fn set_server(url: &str, config_path: &Path) -> Result<()> {
    let url = url.trim_end_matches('/');
    if url.is_empty() {
        anyhow::bail!("URL del server vuoto.");
    }
    let mut config = ClientConfig::load(config_path)?;
    config.server = url.to_string();
    config.save(config_path)?;
    println!("Server impostato: {}", url);
    Ok(())
}

pub fn login(username: &str, password: &str, config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(config_path)?;
    let user = session::login(&mut config, config_path, username, password)?;
    println!("Accesso eseguito: {} ({})", user.username, user.role);
    Ok(())
}

pub fn logout(config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(config_path)?;
    session::logout(&mut config, config_path)?;
    println!("Sessione terminata.");
    Ok(())
}

/// Print the stored identity and the sections the role can reach.
pub fn whoami(config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(config_path)?;
    let session = config
        .session
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Nessuna sessione attiva. Esegui `agripac login`."))?;

    println!("Utente:   {}", session.user.username);
    println!("Ruolo:    {}", session.user.role);
    println!(
        "Server:   {}",
        if config.server.is_empty() { "-" } else { &config.server }
    );

    let tabs: Vec<&str> = visible_tabs(session.user.role)
        .into_iter()
        .map(|t| t.label(session.user.role))
        .collect();
    println!("Sezioni:  {}", tabs.join(", "));
    Ok(())
}

pub fn refresh(config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(config_path)?;
    session::refresh(&mut config, config_path)?;
    println!("Token rinnovato.");
    Ok(())
}
