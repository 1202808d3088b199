//! AgriPAC client library.
//!
//! Session persistence, HTTP plumbing and typed calls against the AgriPAC
//! REST backend (fascicoli, particelle catastali, domande di contributo).
//! The `agripac` binary is a thin view layer on top; everything that touches
//! the network or the config file lives here.

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod types;

pub use api::Api;
pub use config::{ClientConfig, StoredSession, StoredUser};
pub use error::ApiError;
pub use http::ApiClient;
pub use session::{Capability, Role, Tab};
