//! Domande commands: listing, detail, creation and the workflow
//! transitions. Gating mirrors the backend's rules per (role, stato);
//! the backend remains the authority and re-checks every transition.

use std::path::Path;

use anyhow::Result;

use agripac_client::types::{
    azioni_for, ColturaDichiarata, Domanda, DomandaCreate, DomandaStato,
};
use agripac_client::Capability;

use crate::render;

pub fn list(json_output: bool, config_path: &Path) -> Result<()> {
    let config = super::load(config_path)?;
    super::require_any(&config, &[Capability::DomandaOwn, Capability::DomandaAll])?;

    let domande = super::api(&config)?.get_domande()?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&domande)?);
        return Ok(());
    }
    if domande.is_empty() {
        println!("Nessuna domanda.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = domande.iter().map(row).collect();
    print!(
        "{}",
        render::table(&["ID", "ANNO", "STATO", "PRESENTATA IL", "IMPORTO"], &rows)
    );
    Ok(())
}

/// Detail view: domanda, declared crops, and the actions the current role
/// can trigger in the current stato.
pub fn show(id: i64, json_output: bool, config_path: &Path) -> Result<()> {
    let config = super::load(config_path)?;
    super::require_any(&config, &[Capability::DomandaOwn, Capability::DomandaAll])?;

    let detail = super::api(&config)?.get_domanda(id)?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    let domanda: Domanda = serde_json::from_value(
        detail.get("domanda").cloned().unwrap_or_else(|| detail.clone()),
    )?;
    println!("Domanda:      {}", domanda.id);
    println!("Anno:         {}", domanda.anno_campagna);
    println!("Stato:        {}", domanda.stato);
    println!(
        "Presentata:   {}",
        render::opt(&domanda.data_presentazione)
    );
    println!(
        "Importo:      {}",
        domanda
            .importo_calcolato
            .map(render::eur)
            .unwrap_or_else(|| "-".to_string())
    );

    if let Some(colture) = detail.get("colture").and_then(|c| c.as_array()) {
        println!();
        println!("Colture dichiarate:");
        for c in colture {
            println!(
                "  particella {}  coltura {}  {}",
                c["particella_id"],
                c["coltura_id"],
                c["superficie_mq"]
                    .as_f64()
                    .map(render::mq)
                    .unwrap_or_else(|| "-".to_string()),
            );
        }
    }

    if let Some(note) = detail.get("note_istruttoria").and_then(|n| n.as_str()) {
        if !note.is_empty() {
            println!();
            println!("Note istruttoria: {}", note);
        }
    }

    if let Some(role) = config.role() {
        let azioni = azioni_for(role, domanda.stato);
        if !azioni.is_empty() {
            let labels: Vec<&str> = azioni.iter().map(|a| a.label()).collect();
            println!();
            println!("Azioni disponibili: {}", labels.join(", "));
        }
    }
    Ok(())
}

/// Create a draft. Crop specs come as `particella_id:coltura_id:superficie_mq`.
pub fn crea(fascicolo_id: i64, anno: i32, colture: &[String], config_path: &Path) -> Result<()> {
    let config = super::load(config_path)?;
    super::require(&config, Capability::DomandaOwn)?;

    let colture = colture
        .iter()
        .map(|s| parse_coltura(s))
        .collect::<Result<Vec<_>>>()?;

    let payload = DomandaCreate {
        anno_campagna: anno,
        colture,
    };
    let created = super::api(&config)?.create_domanda(&payload, fascicolo_id)?;
    println!(
        "Domanda {} creata in stato {}.",
        created["id"],
        DomandaStato::Bozza
    );
    Ok(())
}

pub fn presenta(id: i64, config_path: &Path) -> Result<()> {
    let config = super::load(config_path)?;
    super::require(&config, Capability::DomandaOwn)?;
    super::api(&config)?.presenta_domanda(id)?;
    println!("Domanda {} presentata.", id);
    Ok(())
}

pub fn istruttoria(id: i64, config_path: &Path) -> Result<()> {
    let config = super::load(config_path)?;
    super::require(&config, Capability::DomandaAll)?;
    super::api(&config)?.avvia_istruttoria(id)?;
    println!("Domanda {} presa in carico.", id);
    Ok(())
}

/// Compute the contribution. The stato is left untouched: approval stays
/// an explicit, separate step.
pub fn calcola(id: i64, config_path: &Path) -> Result<()> {
    let config = super::load(config_path)?;
    super::require(&config, Capability::Calcolo)?;

    let calcolo = super::api(&config)?.calcola_contributo(id)?;
    println!("Calcolo per la domanda {}:", id);
    for d in &calcolo.dettagli {
        let cap = if d.massimale_applicato {
            "  (massimale applicato)"
        } else {
            ""
        };
        println!(
            "  coltura {}  {}  x {}  = {}{}",
            d.coltura_id,
            render::mq(d.superficie_calcolata.unwrap_or(d.superficie_mq)),
            render::eur(d.importo_unitario),
            render::eur(d.importo),
            cap,
        );
    }
    println!("Totale: {}", render::eur(calcolo.importo_totale));
    Ok(())
}

pub fn approva(id: i64, config_path: &Path) -> Result<()> {
    let config = super::load(config_path)?;
    super::require(&config, Capability::DomandaAll)?;
    super::api(&config)?.approva_domanda(id)?;
    println!("Domanda {} approvata.", id);
    Ok(())
}

pub fn respingi(id: i64, motivo: &str, config_path: &Path) -> Result<()> {
    let config = super::load(config_path)?;
    super::require(&config, Capability::DomandaAll)?;
    super::api(&config)?.respingi_domanda(id, motivo)?;
    println!("Domanda {} respinta.", id);
    Ok(())
}

fn parse_coltura(spec: &str) -> Result<ColturaDichiarata> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 3 {
        anyhow::bail!(
            "Coltura non valida \"{}\": atteso particella_id:coltura_id:superficie_mq",
            spec
        );
    }
    let superficie_mq: f64 = parts[2]
        .parse()
        .map_err(|_| anyhow::anyhow!("Superficie non valida: {}", parts[2]))?;
    if superficie_mq <= 0.0 {
        anyhow::bail!("La superficie deve essere positiva: {}", parts[2]);
    }
    Ok(ColturaDichiarata {
        particella_id: parts[0]
            .parse()
            .map_err(|_| anyhow::anyhow!("ID particella non valido: {}", parts[0]))?,
        coltura_id: parts[1]
            .parse()
            .map_err(|_| anyhow::anyhow!("ID coltura non valido: {}", parts[1]))?,
        superficie_mq,
    })
}

fn row(d: &Domanda) -> Vec<String> {
    // Prefer the parsed timestamp in day-first form; fall back to the raw
    // string when it doesn't parse.
    let presentata = d
        .presentata_il()
        .map(|ts| ts.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| render::opt(&d.data_presentazione));
    vec![
        d.id.to_string(),
        d.anno_campagna.to_string(),
        d.stato.to_string(),
        presentata,
        d.importo_calcolato
            .map(render::eur)
            .unwrap_or_else(|| "-".to_string()),
    ]
}
