use thiserror::Error;

/// Client-side API error.
///
/// `Auth` deliberately carries no server detail: invalid credentials are
/// reported with a generic message so the login endpoint can't be used as
/// an account oracle.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Credenziali non valide. Riprova.")]
    Auth,

    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("Nessuna sessione attiva. Esegui `agripac login`.")]
    NoSession,

    #[error("Nessun server configurato. Esegui `agripac server <url>`.")]
    NoServer,

    /// Rejected client-side, before any request is built.
    #[error("{0}")]
    Invalid(String),
}
