//! Domain payloads exchanged with the AgriPAC services, plus the domanda
//! state machine.
//!
//! Every struct here is an ephemeral, non-authoritative copy of backend
//! state: the services own the records, the client only renders them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::session::Role;

// ── Fascicolo ───────────────────────────────────────────────────────

/// Beneficiary registration dossier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fascicolo {
    pub id: i64,
    pub ragione_sociale: String,
    pub cf_piva: String,
    pub indirizzo: String,
    pub cap: String,
    pub comune: String,
    pub provincia: String,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FascicoloCreate {
    pub ragione_sociale: String,
    pub cf_piva: String,
    pub indirizzo: String,
    pub cap: String,
    pub comune: String,
    pub provincia: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// ── Particella ──────────────────────────────────────────────────────

/// Cadastral land parcel. `superficie_calcolata_mq` and the centroid are
/// derived from the drawn geometry, never edited independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particella {
    pub id: i64,
    pub comune: String,
    pub foglio: String,
    pub particella: String,
    #[serde(default)]
    pub subalterno: Option<String>,
    pub superficie_mq: f64,
    #[serde(default)]
    pub superficie_calcolata_mq: Option<f64>,
    #[serde(default)]
    pub coordinate_geojson: Option<String>,
    #[serde(default)]
    pub centroid_lat: Option<f64>,
    #[serde(default)]
    pub centroid_lng: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticellaCreate {
    pub comune: String,
    pub foglio: String,
    pub particella: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subalterno: Option<String>,
    pub superficie_mq: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superficie_calcolata_mq: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate_geojson: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centroid_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centroid_lng: Option<f64>,
}

// ── Domanda ─────────────────────────────────────────────────────────

/// Approval workflow states.
///
/// BOZZA → PRESENTATA → IN_ISTRUTTORIA → {APPROVATA | RESPINTA};
/// APPROVATA → LIQUIDATA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomandaStato {
    Bozza,
    Presentata,
    InIstruttoria,
    Approvata,
    Respinta,
    Liquidata,
}

impl DomandaStato {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomandaStato::Bozza => "BOZZA",
            DomandaStato::Presentata => "PRESENTATA",
            DomandaStato::InIstruttoria => "IN_ISTRUTTORIA",
            DomandaStato::Approvata => "APPROVATA",
            DomandaStato::Respinta => "RESPINTA",
            DomandaStato::Liquidata => "LIQUIDATA",
        }
    }
}

impl fmt::Display for DomandaStato {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomandaStato {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BOZZA" => Ok(DomandaStato::Bozza),
            "PRESENTATA" => Ok(DomandaStato::Presentata),
            "IN_ISTRUTTORIA" => Ok(DomandaStato::InIstruttoria),
            "APPROVATA" => Ok(DomandaStato::Approvata),
            "RESPINTA" => Ok(DomandaStato::Respinta),
            "LIQUIDATA" => Ok(DomandaStato::Liquidata),
            other => Err(ApiError::Invalid(format!("stato sconosciuto: {}", other))),
        }
    }
}

/// Subsidy application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domanda {
    pub id: i64,
    pub anno_campagna: i32,
    pub stato: DomandaStato,
    #[serde(default)]
    pub data_presentazione: Option<String>,
    #[serde(default)]
    pub importo_calcolato: Option<f64>,
}

impl Domanda {
    /// Submission timestamp, when present and parseable. The raw string is
    /// kept as-is for rendering fallbacks: the services emit ISO 8601
    /// without an offset.
    pub fn presentata_il(&self) -> Option<chrono::NaiveDateTime> {
        let raw = self.data_presentazione.as_deref()?;
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }
}

/// Crop declared on a parcel within a domanda.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColturaDichiarata {
    pub particella_id: i64,
    pub coltura_id: i64,
    pub superficie_mq: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DomandaCreate {
    pub anno_campagna: i32,
    pub colture: Vec<ColturaDichiarata>,
}

/// Workflow actions a user can trigger on a domanda.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Azione {
    Presenta,
    PrendiInCarico,
    Calcola,
    Approva,
    Respingi,
}

impl Azione {
    pub fn label(&self) -> &'static str {
        match self {
            Azione::Presenta => "presenta",
            Azione::PrendiInCarico => "istruttoria",
            Azione::Calcola => "calcola",
            Azione::Approva => "approva",
            Azione::Respingi => "respingi",
        }
    }
}

/// Actions offered for a (role, stato) pair. Pure presentation gating:
/// the backend re-checks every transition, and a forced command on a
/// non-offered pair simply surfaces the backend's rejection.
///
/// Calcola is side-effect-only: it computes an amount without changing
/// the stato.
pub fn azioni_for(role: Role, stato: DomandaStato) -> Vec<Azione> {
    match (role, stato) {
        (Role::Beneficiario, DomandaStato::Bozza) => vec![Azione::Presenta],
        (Role::Istruttore, DomandaStato::Presentata) => vec![Azione::PrendiInCarico],
        (Role::Istruttore, DomandaStato::InIstruttoria) => {
            vec![Azione::Calcola, Azione::Approva, Azione::Respingi]
        }
        _ => Vec::new(),
    }
}

// ── Calcolo ─────────────────────────────────────────────────────────

/// One crop line of a contribution calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DettaglioCalcolo {
    pub coltura_id: i64,
    pub superficie_mq: f64,
    #[serde(default)]
    pub superficie_calcolata: Option<f64>,
    pub importo_unitario: f64,
    pub importo: f64,
    #[serde(default)]
    pub massimale_applicato: bool,
}

/// Contribution calculation result for a domanda.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calcolo {
    #[serde(default)]
    pub domanda_id: Option<i64>,
    pub importo_totale: f64,
    #[serde(default)]
    pub dettagli: Vec<DettaglioCalcolo>,
}

// ── Reference data (read-only for the client) ───────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coltura {
    pub id: i64,
    pub codice: String,
    pub descrizione: String,
    pub attiva: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColturaCreate {
    pub codice: String,
    pub descrizione: String,
    pub attiva: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contributo {
    pub id: i64,
    pub campagna_id: i64,
    pub coltura_id: i64,
    #[serde(default)]
    pub coltura_descrizione: String,
    pub importo_per_mq: f64,
    #[serde(default)]
    pub massimale_superficie: Option<f64>,
    #[serde(default)]
    pub massimale_importo: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContributoCreate {
    pub campagna_id: i64,
    pub coltura_id: i64,
    pub importo_per_mq: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub massimale_superficie: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub massimale_importo: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campagna {
    pub id: i64,
    pub anno: i32,
    pub descrizione: String,
    #[serde(default)]
    pub data_inizio: Option<String>,
    #[serde(default)]
    pub data_fine: Option<String>,
    pub attiva: bool,
}

// ── System ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemStats {
    #[serde(default)]
    pub total_users: i64,
    #[serde(default)]
    pub total_fascicoli: i64,
    #[serde(default)]
    pub total_particelle: i64,
    #[serde(default)]
    pub total_domande: i64,
    #[serde(default)]
    pub total_colture_attive: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub response_time_ms: f64,
    #[serde(default)]
    pub http_status: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Health report across all backend services. BTreeMap keeps the table
/// ordering stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall_status: String,
    pub services: std::collections::BTreeMap<String, ServiceHealth>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stato_serde_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&DomandaStato::InIstruttoria).unwrap(),
            "\"IN_ISTRUTTORIA\""
        );
        let s: DomandaStato = serde_json::from_str("\"BOZZA\"").unwrap();
        assert_eq!(s, DomandaStato::Bozza);
    }

    #[test]
    fn test_azioni_beneficiario() {
        assert_eq!(
            azioni_for(Role::Beneficiario, DomandaStato::Bozza),
            vec![Azione::Presenta]
        );
        // Once presentata, the beneficiario can only wait.
        assert!(azioni_for(Role::Beneficiario, DomandaStato::Presentata).is_empty());
        assert!(azioni_for(Role::Beneficiario, DomandaStato::InIstruttoria).is_empty());
    }

    #[test]
    fn test_azioni_istruttore_workflow() {
        // PRESENTATA: take charge only.
        assert_eq!(
            azioni_for(Role::Istruttore, DomandaStato::Presentata),
            vec![Azione::PrendiInCarico]
        );
        // IN_ISTRUTTORIA: calcola (no state change), approva, respingi.
        let azioni = azioni_for(Role::Istruttore, DomandaStato::InIstruttoria);
        assert_eq!(
            azioni,
            vec![Azione::Calcola, Azione::Approva, Azione::Respingi]
        );
        // Terminal states offer nothing.
        assert!(azioni_for(Role::Istruttore, DomandaStato::Approvata).is_empty());
        assert!(azioni_for(Role::Istruttore, DomandaStato::Respinta).is_empty());
        assert!(azioni_for(Role::Istruttore, DomandaStato::Liquidata).is_empty());
    }

    #[test]
    fn test_azioni_other_roles_none() {
        for stato in [
            DomandaStato::Bozza,
            DomandaStato::Presentata,
            DomandaStato::InIstruttoria,
        ] {
            assert!(azioni_for(Role::Sistemista, stato).is_empty());
            assert!(azioni_for(Role::Amministratore, stato).is_empty());
        }
        // An istruttore never presents a bozza.
        assert!(azioni_for(Role::Istruttore, DomandaStato::Bozza).is_empty());
    }

    #[test]
    fn test_domanda_decode_with_nulls() {
        let row = serde_json::json!({
            "id": 3,
            "fascicolo_id": 1,
            "anno_campagna": 2025,
            "stato": "BOZZA",
            "data_presentazione": null,
            "importo_calcolato": null
        });
        let d: Domanda = serde_json::from_value(row).unwrap();
        assert_eq!(d.stato, DomandaStato::Bozza);
        assert!(d.data_presentazione.is_none());
        assert!(d.importo_calcolato.is_none());
        assert!(d.presentata_il().is_none());
    }

    #[test]
    fn test_presentata_il_parses_iso_without_offset() {
        let row = serde_json::json!({
            "id": 3,
            "anno_campagna": 2025,
            "stato": "PRESENTATA",
            "data_presentazione": "2025-03-12T09:41:07.123456"
        });
        let d: Domanda = serde_json::from_value(row).unwrap();
        let ts = d.presentata_il().unwrap();
        assert_eq!(ts.format("%Y-%m-%d").to_string(), "2025-03-12");

        // Seconds without fraction are accepted too.
        let row = serde_json::json!({
            "id": 4,
            "anno_campagna": 2025,
            "stato": "PRESENTATA",
            "data_presentazione": "2025-03-12T09:41:07"
        });
        let d: Domanda = serde_json::from_value(row).unwrap();
        assert!(d.presentata_il().is_some());
    }
}
