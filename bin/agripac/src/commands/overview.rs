//! Landing summary: counts of the records the role can reach, platform
//! totals for the sistemista.

use std::path::Path;

use anyhow::Result;

use agripac_client::session::has_permission;
use agripac_client::types::{Domanda, DomandaStato};
use agripac_client::Capability;

pub fn show(config_path: &Path) -> Result<()> {
    let config = super::load(config_path)?;
    let role = config
        .role()
        .ok_or_else(|| anyhow::anyhow!("Nessuna sessione attiva. Esegui `agripac login`."))?;
    if let Some(session) = &config.session {
        println!("Benvenuto, {} ({})", session.user.username, role);
    }

    let api = super::api(&config)?;

    if has_permission(Some(role), Capability::FascicoloOwn)
        || has_permission(Some(role), Capability::FascicoloAll)
    {
        let fascicoli = api.get_fascicoli()?;
        println!("Fascicoli: {}", fascicoli.len());
    }

    if has_permission(Some(role), Capability::DomandaOwn)
        || has_permission(Some(role), Capability::DomandaAll)
    {
        let domande = api.get_domande()?;
        println!("Domande:   {}", domande.len());
        for (stato, n) in conta_per_stato(&domande) {
            println!("  {:<15} {}", stato, n);
        }
    }

    if has_permission(Some(role), Capability::Stats) {
        let stats = api.get_stats()?;
        println!("Piattaforma:");
        println!("  utenti          {}", stats.total_users);
        println!("  fascicoli       {}", stats.total_fascicoli);
        println!("  particelle      {}", stats.total_particelle);
        println!("  domande         {}", stats.total_domande);
        println!("  colture attive  {}", stats.total_colture_attive);
    }
    Ok(())
}

/// Counts per stato, workflow order, zero rows omitted.
fn conta_per_stato(domande: &[Domanda]) -> Vec<(DomandaStato, usize)> {
    const ORDINE: [DomandaStato; 6] = [
        DomandaStato::Bozza,
        DomandaStato::Presentata,
        DomandaStato::InIstruttoria,
        DomandaStato::Approvata,
        DomandaStato::Respinta,
        DomandaStato::Liquidata,
    ];
    ORDINE
        .iter()
        .filter_map(|stato| {
            let n = domande.iter().filter(|d| d.stato == *stato).count();
            (n > 0).then_some((*stato, n))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domanda(id: i64, stato: DomandaStato) -> Domanda {
        Domanda {
            id,
            anno_campagna: 2025,
            stato,
            data_presentazione: None,
            importo_calcolato: None,
        }
    }

    #[test]
    fn test_conta_per_stato_workflow_order() {
        let domande = vec![
            domanda(1, DomandaStato::Approvata),
            domanda(2, DomandaStato::Bozza),
            domanda(3, DomandaStato::Bozza),
            domanda(4, DomandaStato::Presentata),
        ];
        assert_eq!(
            conta_per_stato(&domande),
            vec![
                (DomandaStato::Bozza, 2),
                (DomandaStato::Presentata, 1),
                (DomandaStato::Approvata, 1),
            ]
        );
    }

    #[test]
    fn test_conta_per_stato_empty() {
        assert!(conta_per_stato(&[]).is_empty());
    }
}
