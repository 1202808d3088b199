//! Session lifecycle and role-based gating.
//!
//! Login/logout mutate the persisted [`ClientConfig`]; permission and tab
//! lookups are pure functions over the fixed role table. The table is
//! advisory, presentation-layer gating only — the backend independently
//! enforces every rule and its word is final.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::endpoints;
use crate::config::{ClientConfig, StoredSession, StoredUser};
use crate::error::ApiError;
use crate::http::ApiClient;

/// User roles, as returned by the auth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Beneficiario,
    Istruttore,
    Amministratore,
    Sistemista,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Beneficiario,
        Role::Istruttore,
        Role::Amministratore,
        Role::Sistemista,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Beneficiario => "BENEFICIARIO",
            Role::Istruttore => "ISTRUTTORE",
            Role::Amministratore => "AMMINISTRATORE",
            Role::Sistemista => "SISTEMISTA",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BENEFICIARIO" => Ok(Role::Beneficiario),
            "ISTRUTTORE" => Ok(Role::Istruttore),
            "AMMINISTRATORE" => Ok(Role::Amministratore),
            "SISTEMISTA" => Ok(Role::Sistemista),
            other => Err(ApiError::Invalid(format!("ruolo sconosciuto: {}", other))),
        }
    }
}

/// Capabilities gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Read/write one's own fascicolo.
    FascicoloOwn,
    /// Read every fascicolo.
    FascicoloAll,
    /// Read/write one's own domande.
    DomandaOwn,
    /// Read and process every domanda.
    DomandaAll,
    /// Run contribution calculations.
    Calcolo,
    /// Manage reference data (colture, contributi, campagne).
    Admin,
    /// Service health monitoring.
    System,
    /// Platform-wide statistics.
    Stats,
}

impl Capability {
    pub const ALL: [Capability; 8] = [
        Capability::FascicoloOwn,
        Capability::FascicoloAll,
        Capability::DomandaOwn,
        Capability::DomandaAll,
        Capability::Calcolo,
        Capability::Admin,
        Capability::System,
        Capability::Stats,
    ];
}

/// Fixed role → capability table. Pure: no session state is consulted.
pub fn has_permission(role: Option<Role>, capability: Capability) -> bool {
    use Capability::*;
    let caps: &[Capability] = match role {
        Some(Role::Beneficiario) => &[FascicoloOwn, DomandaOwn],
        Some(Role::Istruttore) => &[FascicoloAll, DomandaAll, Calcolo],
        Some(Role::Amministratore) => &[Admin, FascicoloAll, DomandaAll],
        Some(Role::Sistemista) => &[System, Stats],
        None => &[],
    };
    caps.contains(&capability)
}

/// Dashboard sections of the platform, the unit of role-conditioned
/// visibility. `whoami` lists the ones the logged-in role can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Fascicolo,
    Domande,
    Admin,
    Sistema,
}

impl Tab {
    pub fn label(&self, role: Role) -> &'static str {
        match self {
            Tab::Overview => "Panoramica",
            Tab::Fascicolo => "Fascicolo",
            // Istruttori see the processing queue, not their own domande.
            Tab::Domande if role == Role::Istruttore => "Istruttoria Domande",
            Tab::Domande => "Domande",
            Tab::Admin => "Amministrazione",
            Tab::Sistema => "Sistema",
        }
    }
}

/// Tabs visible for a role. Everyone gets the base three; Admin and
/// Sistema are reserved.
pub fn visible_tabs(role: Role) -> Vec<Tab> {
    let mut tabs = vec![Tab::Overview, Tab::Fascicolo, Tab::Domande];
    if role == Role::Amministratore {
        tabs.push(Tab::Admin);
    }
    if role == Role::Sistemista {
        tabs.push(Tab::Sistema);
    }
    tabs
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: String,
    user_id: i64,
    username: String,
    role: Role,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
}

/// Login against the auth service and persist the session.
///
/// On any rejected attempt the server detail is suppressed: the caller
/// gets the generic [`ApiError::Auth`] and nothing is written to disk.
pub fn login(
    config: &mut ClientConfig,
    path: &Path,
    username: &str,
    password: &str,
) -> Result<StoredUser, ApiError> {
    let client = ApiClient::from_config(config)?;
    let body = serde_json::json!({ "username": username, "password": password });

    let value = client
        .post(endpoints::LOGIN, &body, false)
        .map_err(|e| match e {
            ApiError::Server { .. } => ApiError::Auth,
            other => other,
        })?;

    let resp: LoginResponse = serde_json::from_value(value)
        .map_err(|e| ApiError::Decode(format!("risposta login: {}", e)))?;

    let user = StoredUser {
        id: resp.user_id,
        username: resp.username,
        role: resp.role,
    };
    config.session = Some(StoredSession {
        access_token: resp.access_token,
        refresh_token: resp.refresh_token,
        user: user.clone(),
    });
    config.save(path)?;
    debug!(username = %user.username, role = %user.role, "login ok");
    Ok(user)
}

/// Exchange the stored refresh token for a new access token.
pub fn refresh(config: &mut ClientConfig, path: &Path) -> Result<(), ApiError> {
    let session = config.session.as_ref().ok_or(ApiError::NoSession)?;
    if session.refresh_token.is_empty() {
        return Err(ApiError::NoSession);
    }

    let client = ApiClient::from_config(config)?;
    let body = serde_json::json!({ "refresh_token": session.refresh_token });
    let value = client.post(endpoints::REFRESH, &body, false)?;

    let resp: RefreshResponse = serde_json::from_value(value)
        .map_err(|e| ApiError::Decode(format!("risposta refresh: {}", e)))?;

    if let Some(session) = config.session.as_mut() {
        session.access_token = resp.access_token;
    }
    config.save(path)?;
    debug!("access token rinnovato");
    Ok(())
}

/// Stateless logout: clear the persisted session, no revocation call.
pub fn logout(config: &mut ClientConfig, path: &Path) -> Result<(), ApiError> {
    config.clear_session();
    config.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_login_persists_nothing() {
        // Unreachable server: the attempt fails before any session exists,
        // and no config file may appear on disk.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = ClientConfig::default();
        config.server = "http://127.0.0.1:1".to_string();

        let result = login(&mut config, &path, "mario", "segreta");
        assert!(matches!(result, Err(ApiError::Network(_))));
        assert!(config.session.is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_permission_table_exact() {
        use Capability::*;

        // The full role table, checked cell by cell.
        let expected: &[(Role, &[Capability])] = &[
            (Role::Beneficiario, &[FascicoloOwn, DomandaOwn]),
            (Role::Istruttore, &[FascicoloAll, DomandaAll, Calcolo]),
            (Role::Amministratore, &[Admin, FascicoloAll, DomandaAll]),
            (Role::Sistemista, &[System, Stats]),
        ];

        for &(role, caps) in expected {
            for cap in Capability::ALL {
                assert_eq!(
                    has_permission(Some(role), cap),
                    caps.contains(&cap),
                    "{:?} / {:?}",
                    role,
                    cap
                );
            }
        }
    }

    #[test]
    fn test_no_session_has_no_permissions() {
        for cap in Capability::ALL {
            assert!(!has_permission(None, cap));
        }
    }

    #[test]
    fn test_visible_tabs_per_role() {
        assert_eq!(
            visible_tabs(Role::Beneficiario),
            vec![Tab::Overview, Tab::Fascicolo, Tab::Domande]
        );
        assert!(visible_tabs(Role::Amministratore).contains(&Tab::Admin));
        assert!(!visible_tabs(Role::Amministratore).contains(&Tab::Sistema));
        assert!(visible_tabs(Role::Sistemista).contains(&Tab::Sistema));
        assert!(!visible_tabs(Role::Istruttore).contains(&Tab::Admin));
    }

    #[test]
    fn test_istruttore_domande_label() {
        assert_eq!(Tab::Domande.label(Role::Istruttore), "Istruttoria Domande");
        assert_eq!(Tab::Domande.label(Role::Beneficiario), "Domande");
    }

    #[test]
    fn test_role_roundtrip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("CONTADINO".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Istruttore).unwrap(), "\"ISTRUTTORE\"");
        let r: Role = serde_json::from_str("\"SISTEMISTA\"").unwrap();
        assert_eq!(r, Role::Sistemista);
    }

    #[test]
    fn test_logout_clears_persisted_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = ClientConfig {
            server: "http://localhost:8000".to_string(),
            session: Some(crate::config::StoredSession {
                access_token: "tok".to_string(),
                refresh_token: "ref".to_string(),
                user: StoredUser {
                    id: 1,
                    username: "mario".to_string(),
                    role: Role::Beneficiario,
                },
            }),
        };
        config.save(&path).unwrap();

        logout(&mut config, &path).unwrap();
        assert!(config.session.is_none());

        let back = ClientConfig::load(&path).unwrap();
        assert!(back.token().is_none());
    }
}
