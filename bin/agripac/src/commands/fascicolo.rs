//! Fascicolo commands.

use std::path::Path;

use anyhow::Result;

use agripac_client::types::{Fascicolo, FascicoloCreate};
use agripac_client::Capability;

use crate::render;

pub fn show(json_output: bool, config_path: &Path) -> Result<()> {
    let config = super::load(config_path)?;
    super::require_any(&config, &[Capability::FascicoloOwn, Capability::FascicoloAll])?;

    let fascicoli = super::api(&config)?.get_fascicoli()?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&fascicoli)?);
        return Ok(());
    }
    if fascicoli.is_empty() {
        println!("Nessun fascicolo registrato.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = fascicoli.iter().map(row).collect();
    print!(
        "{}",
        render::table(
            &["ID", "RAGIONE SOCIALE", "CF/P.IVA", "COMUNE", "PROV", "EMAIL"],
            &rows,
        )
    );
    Ok(())
}

pub fn create(fascicolo: FascicoloCreate, config_path: &Path) -> Result<()> {
    let config = super::load(config_path)?;
    super::require_any(&config, &[Capability::FascicoloOwn, Capability::FascicoloAll])?;

    let created = super::api(&config)?.create_fascicolo(&fascicolo)?;
    println!(
        "Fascicolo {} creato: {} ({})",
        created.id, created.ragione_sociale, created.cf_piva
    );
    Ok(())
}

fn row(f: &Fascicolo) -> Vec<String> {
    vec![
        f.id.to_string(),
        f.ragione_sociale.clone(),
        f.cf_piva.clone(),
        f.comune.clone(),
        f.provincia.clone(),
        render::opt(&f.email),
    ]
}
