//! System commands (SISTEMISTA only): service health and usage counters.

use std::path::Path;

use anyhow::Result;

use agripac_client::Capability;

use crate::render;

pub fn status(json_output: bool, config_path: &Path) -> Result<()> {
    let config = super::load(config_path)?;
    super::require(&config, Capability::System)?;

    let report = super::api(&config)?.get_health()?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Stato complessivo: {}", report.overall_status);
    println!();

    let rows: Vec<Vec<String>> = report
        .services
        .iter()
        .map(|(name, s)| {
            vec![
                name.clone(),
                s.status.clone(),
                format!("{:.1} ms", s.response_time_ms),
                s.http_status
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                s.error.clone().unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    print!(
        "{}",
        render::table(&["SERVIZIO", "STATO", "TEMPO", "HTTP", "ERRORE"], &rows)
    );
    Ok(())
}

pub fn stats(json_output: bool, config_path: &Path) -> Result<()> {
    let config = super::load(config_path)?;
    super::require(&config, Capability::Stats)?;

    let stats = super::api(&config)?.get_stats()?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Utenti:           {}", stats.total_users);
    println!("Fascicoli:        {}", stats.total_fascicoli);
    println!("Particelle:       {}", stats.total_particelle);
    println!("Domande:          {}", stats.total_domande);
    println!("Colture attive:   {}", stats.total_colture_attive);
    Ok(())
}
