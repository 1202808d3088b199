//! Typed convenience calls over the generic HTTP client, one group per
//! AgriPAC resource. Translates domain operations to REST paths and
//! unwraps the `{success, data}` envelope the services answer with.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::http::{ApiClient, Method};
use crate::types::*;

/// REST paths consumed by the client, relative to the server base URL.
pub mod endpoints {
    pub const LOGIN: &str = "/api/v1/auth/login";
    pub const REFRESH: &str = "/api/v1/auth/refresh";

    pub const FASCICOLO: &str = "/api/v1/beneficiaries/fascicolo";
    pub const PARTICELLE: &str = "/api/v1/beneficiaries/particelle";

    pub const DOMANDE: &str = "/api/v1/requests/domande";

    pub const CALCOLA: &str = "/api/v1/calculations/calcola";
    pub const CALCOLI: &str = "/api/v1/calculations/calcoli";

    pub const COLTURE: &str = "/api/v1/admin/colture";
    pub const CONTRIBUTI: &str = "/api/v1/admin/contributi";
    pub const CAMPAGNE: &str = "/api/v1/admin/campagne";

    pub const HEALTH: &str = "/api/v1/system/health";
    pub const STATS: &str = "/api/v1/system/stats";
}

/// Unwrap the `data` field where the envelope is present, then decode.
fn decode_data<T: DeserializeOwned>(mut value: Value) -> Result<T, ApiError> {
    let inner = match value.get_mut("data") {
        Some(data) => data.take(),
        None => value,
    };
    serde_json::from_value(inner).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Typed workflow client. The sole path to the network for every command.
pub struct Api {
    client: ApiClient,
}

impl Api {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    // ── Fascicolo ───────────────────────────────────────────────────

    pub fn get_fascicoli(&self) -> Result<Vec<Fascicolo>, ApiError> {
        decode_data(self.client.get(endpoints::FASCICOLO, true)?)
    }

    pub fn create_fascicolo(&self, fascicolo: &FascicoloCreate) -> Result<Fascicolo, ApiError> {
        let body = serde_json::to_value(fascicolo).map_err(|e| ApiError::Decode(e.to_string()))?;
        decode_data(self.client.post(endpoints::FASCICOLO, &body, true)?)
    }

    // ── Particelle ──────────────────────────────────────────────────

    pub fn get_particelle(&self, fascicolo_id: i64) -> Result<Vec<Particella>, ApiError> {
        let value = self.client.request(
            Method::GET,
            endpoints::PARTICELLE,
            &[("fascicolo_id", fascicolo_id.to_string())],
            None,
            true,
        )?;
        decode_data(value)
    }

    pub fn create_particella(
        &self,
        particella: &ParticellaCreate,
        fascicolo_id: i64,
    ) -> Result<Particella, ApiError> {
        let body = serde_json::to_value(particella).map_err(|e| ApiError::Decode(e.to_string()))?;
        let value = self.client.request(
            Method::POST,
            endpoints::PARTICELLE,
            &[("fascicolo_id", fascicolo_id.to_string())],
            Some(&body),
            true,
        )?;
        decode_data(value)
    }

    // ── Domande ─────────────────────────────────────────────────────

    pub fn get_domande(&self) -> Result<Vec<Domanda>, ApiError> {
        decode_data(self.client.get(endpoints::DOMANDE, true)?)
    }

    pub fn get_domanda(&self, id: i64) -> Result<Value, ApiError> {
        // Detail payload bundles domanda + colture + note istruttoria.
        decode_data(self.client.get(&format!("{}/{}", endpoints::DOMANDE, id), true)?)
    }

    pub fn create_domanda(
        &self,
        domanda: &DomandaCreate,
        fascicolo_id: i64,
    ) -> Result<Value, ApiError> {
        let body = serde_json::to_value(domanda).map_err(|e| ApiError::Decode(e.to_string()))?;
        let value = self.client.request(
            Method::POST,
            endpoints::DOMANDE,
            &[("fascicolo_id", fascicolo_id.to_string())],
            Some(&body),
            true,
        )?;
        decode_data(value)
    }

    /// BOZZA → PRESENTATA.
    pub fn presenta_domanda(&self, id: i64) -> Result<(), ApiError> {
        self.transizione(id, "presenta")
    }

    /// PRESENTATA → IN_ISTRUTTORIA.
    pub fn avvia_istruttoria(&self, id: i64) -> Result<(), ApiError> {
        self.transizione(id, "istruttoria")
    }

    /// IN_ISTRUTTORIA → APPROVATA.
    pub fn approva_domanda(&self, id: i64) -> Result<(), ApiError> {
        self.transizione(id, "approva")
    }

    /// IN_ISTRUTTORIA → RESPINTA. The motivo is mandatory and checked here,
    /// before any request is built; it travels URL-escaped as a query
    /// parameter.
    pub fn respingi_domanda(&self, id: i64, motivo: &str) -> Result<(), ApiError> {
        let motivo = motivo.trim();
        if motivo.is_empty() {
            return Err(ApiError::Invalid(
                "Il motivo del respingimento è obbligatorio".to_string(),
            ));
        }
        self.client.request(
            Method::POST,
            &format!("{}/{}/respingi", endpoints::DOMANDE, id),
            &[("motivo", motivo.to_string())],
            Some(&json!({})),
            true,
        )?;
        Ok(())
    }

    fn transizione(&self, id: i64, azione: &str) -> Result<(), ApiError> {
        self.client.post(
            &format!("{}/{}/{}", endpoints::DOMANDE, id, azione),
            &json!({}),
            true,
        )?;
        Ok(())
    }

    // ── Calcoli ─────────────────────────────────────────────────────

    /// Compute the contribution for a domanda. Side-effect only: the
    /// stato is left untouched.
    pub fn calcola_contributo(&self, domanda_id: i64) -> Result<Calcolo, ApiError> {
        let value = self.client.post(
            &format!("{}/{}", endpoints::CALCOLA, domanda_id),
            &json!({}),
            true,
        )?;
        decode_data(value)
    }

    pub fn get_calcolo(&self, domanda_id: i64) -> Result<Calcolo, ApiError> {
        decode_data(
            self.client
                .get(&format!("{}/{}", endpoints::CALCOLI, domanda_id), true)?,
        )
    }

    // ── Reference data ──────────────────────────────────────────────

    pub fn get_colture(&self) -> Result<Vec<Coltura>, ApiError> {
        decode_data(self.client.get(endpoints::COLTURE, true)?)
    }

    pub fn create_coltura(&self, coltura: &ColturaCreate) -> Result<Coltura, ApiError> {
        let body = serde_json::to_value(coltura).map_err(|e| ApiError::Decode(e.to_string()))?;
        decode_data(self.client.post(endpoints::COLTURE, &body, true)?)
    }

    pub fn get_contributi(&self, campagna_id: Option<i64>) -> Result<Vec<Contributo>, ApiError> {
        let query: Vec<(&str, String)> = campagna_id
            .map(|id| vec![("campagna_id", id.to_string())])
            .unwrap_or_default();
        decode_data(
            self.client
                .request(Method::GET, endpoints::CONTRIBUTI, &query, None, true)?,
        )
    }

    pub fn create_contributo(&self, contributo: &ContributoCreate) -> Result<Contributo, ApiError> {
        let body =
            serde_json::to_value(contributo).map_err(|e| ApiError::Decode(e.to_string()))?;
        decode_data(self.client.post(endpoints::CONTRIBUTI, &body, true)?)
    }

    pub fn get_campagne(&self) -> Result<Vec<Campagna>, ApiError> {
        decode_data(self.client.get(endpoints::CAMPAGNE, true)?)
    }

    // ── System ──────────────────────────────────────────────────────

    /// Health has no `{success, data}` envelope: the report is the body.
    pub fn get_health(&self) -> Result<HealthReport, ApiError> {
        decode_data(self.client.get(endpoints::HEALTH, true)?)
    }

    pub fn get_stats(&self) -> Result<SystemStats, ApiError> {
        decode_data(self.client.get(endpoints::STATS, true)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_data_unwraps_envelope() {
        let value = json!({ "success": true, "data": [ { "id": 1, "codice": "GRANO",
            "descrizione": "Grano duro", "attiva": true } ] });
        let colture: Vec<Coltura> = decode_data(value).unwrap();
        assert_eq!(colture.len(), 1);
        assert_eq!(colture[0].codice, "GRANO");
    }

    #[test]
    fn test_decode_data_without_envelope() {
        let value = json!({
            "overall_status": "healthy",
            "services": {
                "auth": { "status": "healthy", "response_time_ms": 12.5, "http_status": 200 }
            }
        });
        let report: HealthReport = decode_data(value).unwrap();
        assert_eq!(report.overall_status, "healthy");
        assert_eq!(report.services["auth"].http_status, Some(200));
    }

    #[test]
    fn test_respingi_empty_motivo_never_dispatched() {
        // Unroutable server: if the client tried to send, we'd see a
        // network error instead of the validation error.
        let api = Api::new(ApiClient::new("http://127.0.0.1:1"));
        let result = api.respingi_domanda(1, "   ");
        assert!(matches!(result, Err(ApiError::Invalid(_))));
    }
}
