//! Reference data commands (AMMINISTRATORE only).

use std::path::Path;

use anyhow::Result;

use agripac_client::types::{ColturaCreate, ContributoCreate};
use agripac_client::Capability;

use crate::render;

pub fn colture_list(json_output: bool, config_path: &Path) -> Result<()> {
    let config = super::load(config_path)?;
    super::require(&config, Capability::Admin)?;

    let colture = super::api(&config)?.get_colture()?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&colture)?);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = colture
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.codice.clone(),
                c.descrizione.clone(),
                if c.attiva { "sì" } else { "no" }.to_string(),
            ]
        })
        .collect();
    print!(
        "{}",
        render::table(&["ID", "CODICE", "DESCRIZIONE", "ATTIVA"], &rows)
    );
    Ok(())
}

pub fn colture_add(
    codice: &str,
    descrizione: &str,
    attiva: bool,
    config_path: &Path,
) -> Result<()> {
    let config = super::load(config_path)?;
    super::require(&config, Capability::Admin)?;

    let created = super::api(&config)?.create_coltura(&ColturaCreate {
        codice: codice.to_string(),
        descrizione: descrizione.to_string(),
        attiva,
    })?;
    println!("Coltura {} creata: {}", created.id, created.codice);
    Ok(())
}

pub fn contributi_list(
    campagna_id: Option<i64>,
    json_output: bool,
    config_path: &Path,
) -> Result<()> {
    let config = super::load(config_path)?;
    super::require(&config, Capability::Admin)?;

    let contributi = super::api(&config)?.get_contributi(campagna_id)?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&contributi)?);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = contributi
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.campagna_id.to_string(),
                if c.coltura_descrizione.is_empty() {
                    c.coltura_id.to_string()
                } else {
                    c.coltura_descrizione.clone()
                },
                format!("{:.4} €/m²", c.importo_per_mq),
                c.massimale_superficie
                    .map(render::mq)
                    .unwrap_or_else(|| "-".to_string()),
                c.massimale_importo
                    .map(render::eur)
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    print!(
        "{}",
        render::table(
            &["ID", "CAMPAGNA", "COLTURA", "IMPORTO", "MAX SUP.", "MAX IMPORTO"],
            &rows,
        )
    );
    Ok(())
}

pub fn contributi_add(contributo: ContributoCreate, config_path: &Path) -> Result<()> {
    let config = super::load(config_path)?;
    super::require(&config, Capability::Admin)?;

    if contributo.importo_per_mq <= 0.0 {
        anyhow::bail!("L'importo per m² deve essere positivo.");
    }
    let created = super::api(&config)?.create_contributo(&contributo)?;
    println!(
        "Contributo {} creato: campagna {} coltura {}",
        created.id, created.campagna_id, created.coltura_id
    );
    Ok(())
}

pub fn campagne_list(json_output: bool, config_path: &Path) -> Result<()> {
    let config = super::load(config_path)?;
    super::require(&config, Capability::Admin)?;

    let campagne = super::api(&config)?.get_campagne()?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&campagne)?);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = campagne
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.anno.to_string(),
                c.descrizione.clone(),
                render::opt(&c.data_inizio),
                render::opt(&c.data_fine),
                if c.attiva { "sì" } else { "no" }.to_string(),
            ]
        })
        .collect();
    print!(
        "{}",
        render::table(
            &["ID", "ANNO", "DESCRIZIONE", "INIZIO", "FINE", "ATTIVA"],
            &rows,
        )
    );
    Ok(())
}
