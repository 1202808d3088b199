//! Generic JSON request plumbing shared by every typed call.
//!
//! One attempt per call: no retry, no backoff, no timeout override.
//! Transient network failures propagate to the caller as
//! [`ApiError::Network`].

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
pub use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ApiError;

/// Hook toggled around every request, for a UI busy indicator.
pub type BusyHook = Box<dyn Fn(bool) + Send + Sync>;

/// Toggles the busy hook on, and back off when dropped. Guarantees the
/// indicator is released on every exit path, errors included.
struct BusyGuard<'a> {
    hook: Option<&'a (dyn Fn(bool) + Send + Sync)>,
}

impl<'a> BusyGuard<'a> {
    fn new(hook: Option<&'a (dyn Fn(bool) + Send + Sync)>) -> Self {
        if let Some(hook) = hook {
            hook(true);
        }
        Self { hook }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if let Some(hook) = self.hook {
            hook(false);
        }
    }
}

/// Extract the server-supplied message from an error body.
///
/// The services report either `detail` (FastAPI-style) or `error`; anything
/// else falls back to a generic message.
pub fn error_message(body: &Value) -> String {
    body.get("detail")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
        .unwrap_or("Errore nella richiesta")
        .to_string()
}

/// Blocking JSON client for one AgriPAC backend.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    busy_hook: Option<BusyHook>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            busy_hook: None,
        }
    }

    /// Build a client from the persisted config: base URL plus the session
    /// token, when present. A stored token is attached as-is — validity is
    /// only ever established by the backend's answer.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        if config.server.is_empty() {
            return Err(ApiError::NoServer);
        }
        let mut client = Self::new(config.server.clone());
        client.token = config.token().map(str::to_string);
        Ok(client)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_busy_hook(&mut self, hook: BusyHook) {
        self.busy_hook = Some(hook);
    }

    /// Issue one request and unwrap the JSON body.
    ///
    /// Non-success statuses become [`ApiError::Server`] carrying the
    /// server-supplied message where available.
    pub fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
        requires_auth: bool,
    ) -> Result<Value, ApiError> {
        let _busy = BusyGuard::new(self.busy_hook.as_deref());

        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%method, %url, "richiesta");

        let mut req = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json");
        if !query.is_empty() {
            req = req.query(query);
        }
        if requires_auth {
            if let Some(token) = &self.token {
                req = req.bearer_auth(token);
            }
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send()?;
        let status = resp.status();

        if !status.is_success() {
            let body: Value = resp.json().unwrap_or(Value::Null);
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        resp.json()
            .map_err(|e| ApiError::Decode(format!("corpo risposta: {}", e)))
    }

    pub fn get(&self, endpoint: &str, requires_auth: bool) -> Result<Value, ApiError> {
        self.request(Method::GET, endpoint, &[], None, requires_auth)
    }

    pub fn post(
        &self,
        endpoint: &str,
        body: &Value,
        requires_auth: bool,
    ) -> Result<Value, ApiError> {
        self.request(Method::POST, endpoint, &[], Some(body), requires_auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_error_message_priority() {
        let detail = serde_json::json!({ "detail": "Domanda non trovata", "error": "x" });
        assert_eq!(error_message(&detail), "Domanda non trovata");

        let error = serde_json::json!({ "error": "unknown resource" });
        assert_eq!(error_message(&error), "unknown resource");

        assert_eq!(error_message(&Value::Null), "Errore nella richiesta");
        assert_eq!(error_message(&serde_json::json!({})), "Errore nella richiesta");
    }

    #[test]
    fn test_busy_guard_balances_on_drop() {
        // +1 on enter, -1 on release: a balanced hook ends at zero even
        // when the request path unwinds early.
        let counter = Arc::new(AtomicI32::new(0));
        let c = counter.clone();
        let hook: BusyHook = Box::new(move |busy| {
            c.fetch_add(if busy { 1 } else { -1 }, Ordering::SeqCst);
        });

        {
            let _guard = BusyGuard::new(Some(hook.as_ref()));
            assert_eq!(counter.load(Ordering::SeqCst), 1);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_busy_released_on_network_error() {
        // Unroutable address: the send fails, the guard must still fire.
        let counter = Arc::new(AtomicI32::new(0));
        let c = counter.clone();

        let mut client = ApiClient::new("http://127.0.0.1:1");
        client.set_busy_hook(Box::new(move |busy| {
            c.fetch_add(if busy { 1 } else { -1 }, Ordering::SeqCst);
        }));

        let result = client.get("/api/v1/system/health", false);
        assert!(matches!(result, Err(ApiError::Network(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8000/");
        assert_eq!(client.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_from_config_requires_server() {
        let config = ClientConfig::default();
        assert!(matches!(
            ApiClient::from_config(&config),
            Err(ApiError::NoServer)
        ));
    }
}
