//! `agripac` — the AgriPAC CLI client.
//!
//! Manages the login session and drives the subsidy workflow against the
//! AgriPAC services: fascicolo, particelle, domande, reference data,
//! system status. Think of it as `kubectl` for AgriPAC.

mod commands;
mod progress;
mod render;

use clap::{Parser, Subcommand};

/// AgriPAC CLI tool.
#[derive(Parser, Debug)]
#[command(name = "agripac", about = "AgriPAC CLI client")]
struct Cli {
    /// Path to client config file (default: ~/.agripac/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Set the server base URL.
    Server {
        /// Base URL, e.g. http://localhost:8080
        url: String,
    },

    /// Login against the auth service.
    Login {
        /// Username.
        #[arg(long)]
        user: Option<String>,
        /// Password (not recommended — use interactive prompt).
        #[arg(long)]
        password: Option<String>,
    },

    /// Logout — clear the stored session.
    Logout,

    /// Show the current session: user, role, available sections.
    Whoami,

    /// Renew the access token using the stored refresh token.
    Refresh,

    /// Landing summary for the logged-in role.
    Overview,

    /// Beneficiary dossier.
    Fascicolo {
        #[command(subcommand)]
        action: FascicoloAction,
    },

    /// Cadastral parcels of a fascicolo.
    Particelle {
        #[command(subcommand)]
        action: ParticelleAction,
    },

    /// Subsidy applications and their workflow.
    Domande {
        #[command(subcommand)]
        action: DomandeAction,
    },

    /// Reference data management (AMMINISTRATORE).
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },

    /// Service health and usage statistics (SISTEMISTA).
    Sistema {
        #[command(subcommand)]
        action: SistemaAction,
    },

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum FascicoloAction {
    /// Show the fascicolo (own, or all for istruttori/amministratori).
    Show,
    /// Register a new fascicolo.
    Create {
        #[arg(long)]
        ragione_sociale: String,
        #[arg(long)]
        cf_piva: String,
        #[arg(long)]
        indirizzo: String,
        #[arg(long)]
        cap: String,
        #[arg(long)]
        comune: String,
        #[arg(long)]
        provincia: String,
        #[arg(long)]
        telefono: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ParticelleAction {
    /// List the parcels of a fascicolo.
    List {
        /// Fascicolo ID.
        fascicolo_id: i64,
    },
    /// Add a parcel, optionally with a drawn boundary.
    Add {
        /// Fascicolo ID.
        fascicolo_id: i64,
        #[arg(long)]
        comune: String,
        #[arg(long)]
        foglio: String,
        #[arg(long)]
        particella: String,
        #[arg(long)]
        subalterno: Option<String>,
        /// Declared surface in m².
        #[arg(long)]
        superficie_mq: f64,
        /// GeoJSON polygon: inline JSON or @file path.
        #[arg(long)]
        geometria: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum DomandeAction {
    /// List domande (own, or all for istruttori).
    List,
    /// Show a domanda with its crops, calculation and available actions.
    Show {
        /// Domanda ID.
        id: i64,
    },
    /// Create a draft domanda.
    Crea {
        /// Fascicolo ID.
        #[arg(long)]
        fascicolo: i64,
        /// Campaign year.
        #[arg(long)]
        anno: i32,
        /// Declared crop, repeatable: particella_id:coltura_id:superficie_mq
        #[arg(long = "coltura", required = true)]
        colture: Vec<String>,
    },
    /// Submit a draft (BOZZA → PRESENTATA).
    Presenta {
        id: i64,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },
    /// Take charge of a submitted domanda (PRESENTATA → IN_ISTRUTTORIA).
    Istruttoria {
        id: i64,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },
    /// Compute the contribution amount. Leaves the stato untouched.
    Calcola { id: i64 },
    /// Approve (IN_ISTRUTTORIA → APPROVATA).
    Approva {
        id: i64,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },
    /// Reject with a mandatory motivo (IN_ISTRUTTORIA → RESPINTA).
    Respingi {
        id: i64,
        /// Reason for rejection.
        #[arg(long)]
        motivo: String,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum AdminAction {
    /// Crop registry.
    Colture {
        #[command(subcommand)]
        action: ColtureAction,
    },
    /// Contribution rates per campaign and crop.
    Contributi {
        #[command(subcommand)]
        action: ContributiAction,
    },
    /// List campaigns.
    Campagne,
}

#[derive(Subcommand, Debug)]
enum ColtureAction {
    List,
    Add {
        #[arg(long)]
        codice: String,
        #[arg(long)]
        descrizione: String,
        /// Register as inactive.
        #[arg(long)]
        inattiva: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ContributiAction {
    List {
        /// Restrict to one campaign.
        #[arg(long)]
        campagna: Option<i64>,
    },
    Add {
        #[arg(long)]
        campagna: i64,
        #[arg(long)]
        coltura: i64,
        /// Rate in EUR per m².
        #[arg(long)]
        importo_per_mq: f64,
        /// Surface cap in m².
        #[arg(long)]
        massimale_superficie: Option<f64>,
        /// Amount cap in EUR.
        #[arg(long)]
        massimale_importo: Option<f64>,
    },
}

#[derive(Subcommand, Debug)]
enum SistemaAction {
    /// Health of every backend service.
    Status,
    /// Usage counters.
    Stats,
}

/// Ask y/N on stderr; anything but y aborts.
fn confirm(prompt: &str, yes: bool) -> bool {
    if yes {
        return true;
    }
    eprint!("{} [y/N]: ", prompt);
    let mut s = String::new();
    if std::io::stdin().read_line(&mut s).is_err() {
        return false;
    }
    s.trim().eq_ignore_ascii_case("y")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(agripac_client::ClientConfig::default_path);
    let json_output = cli.output == "json";

    match cli.command {
        Commands::Server { url } => {
            commands::login::set_server(&url, &config_path)?;
        }

        Commands::Login { user, password } => {
            let username = user.unwrap_or_else(|| {
                eprint!("Username: ");
                let mut s = String::new();
                std::io::stdin().read_line(&mut s).unwrap();
                s.trim().to_string()
            });
            let password = password.unwrap_or_else(|| {
                rpassword::prompt_password("Password: ").unwrap_or_default()
            });
            commands::login::login(&username, &password, &config_path)?;
        }

        Commands::Logout => {
            commands::login::logout(&config_path)?;
        }

        Commands::Whoami => {
            commands::login::whoami(&config_path)?;
        }

        Commands::Refresh => {
            commands::login::refresh(&config_path)?;
        }

        Commands::Overview => {
            commands::overview::show(&config_path)?;
        }

        Commands::Fascicolo { action } => match action {
            FascicoloAction::Show => {
                commands::fascicolo::show(json_output, &config_path)?;
            }
            FascicoloAction::Create {
                ragione_sociale,
                cf_piva,
                indirizzo,
                cap,
                comune,
                provincia,
                telefono,
                email,
            } => {
                commands::fascicolo::create(
                    agripac_client::types::FascicoloCreate {
                        ragione_sociale,
                        cf_piva,
                        indirizzo,
                        cap,
                        comune,
                        provincia,
                        telefono,
                        email,
                    },
                    &config_path,
                )?;
            }
        },

        Commands::Particelle { action } => match action {
            ParticelleAction::List { fascicolo_id } => {
                commands::particelle::list(fascicolo_id, json_output, &config_path)?;
            }
            ParticelleAction::Add {
                fascicolo_id,
                comune,
                foglio,
                particella,
                subalterno,
                superficie_mq,
                geometria,
            } => {
                commands::particelle::add(
                    fascicolo_id,
                    &comune,
                    &foglio,
                    &particella,
                    subalterno.as_deref(),
                    superficie_mq,
                    geometria.as_deref(),
                    &config_path,
                )?;
            }
        },

        Commands::Domande { action } => match action {
            DomandeAction::List => {
                commands::domande::list(json_output, &config_path)?;
            }
            DomandeAction::Show { id } => {
                commands::domande::show(id, json_output, &config_path)?;
            }
            DomandeAction::Crea {
                fascicolo,
                anno,
                colture,
            } => {
                commands::domande::crea(fascicolo, anno, &colture, &config_path)?;
            }
            DomandeAction::Presenta { id, yes } => {
                if !confirm(
                    &format!("Presentare la domanda {}? Non sarà più modificabile.", id),
                    yes,
                ) {
                    println!("Annullato.");
                    return Ok(());
                }
                commands::domande::presenta(id, &config_path)?;
            }
            DomandeAction::Istruttoria { id, yes } => {
                if !confirm(&format!("Prendere in carico la domanda {}?", id), yes) {
                    println!("Annullato.");
                    return Ok(());
                }
                commands::domande::istruttoria(id, &config_path)?;
            }
            DomandeAction::Calcola { id } => {
                commands::domande::calcola(id, &config_path)?;
            }
            DomandeAction::Approva { id, yes } => {
                if !confirm(&format!("Approvare la domanda {}?", id), yes) {
                    println!("Annullato.");
                    return Ok(());
                }
                commands::domande::approva(id, &config_path)?;
            }
            DomandeAction::Respingi { id, motivo, yes } => {
                if !confirm(&format!("Respingere la domanda {}?", id), yes) {
                    println!("Annullato.");
                    return Ok(());
                }
                commands::domande::respingi(id, &motivo, &config_path)?;
            }
        },

        Commands::Admin { action } => match action {
            AdminAction::Colture { action } => match action {
                ColtureAction::List => {
                    commands::admin::colture_list(json_output, &config_path)?;
                }
                ColtureAction::Add {
                    codice,
                    descrizione,
                    inattiva,
                } => {
                    commands::admin::colture_add(&codice, &descrizione, !inattiva, &config_path)?;
                }
            },
            AdminAction::Contributi { action } => match action {
                ContributiAction::List { campagna } => {
                    commands::admin::contributi_list(campagna, json_output, &config_path)?;
                }
                ContributiAction::Add {
                    campagna,
                    coltura,
                    importo_per_mq,
                    massimale_superficie,
                    massimale_importo,
                } => {
                    commands::admin::contributi_add(
                        agripac_client::types::ContributoCreate {
                            campagna_id: campagna,
                            coltura_id: coltura,
                            importo_per_mq,
                            massimale_superficie,
                            massimale_importo,
                        },
                        &config_path,
                    )?;
                }
            },
            AdminAction::Campagne => {
                commands::admin::campagne_list(json_output, &config_path)?;
            }
        },

        Commands::Sistema { action } => match action {
            SistemaAction::Status => {
                commands::sistema::status(json_output, &config_path)?;
            }
            SistemaAction::Stats => {
                commands::sistema::stats(json_output, &config_path)?;
            }
        },

        Commands::Version => {
            println!("agripac cli v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_transition_accepts_yes_flag() {
        // Each state transition asks y/N and takes --yes to skip it.
        for args in [
            ["agripac", "domande", "presenta", "5", "--yes"],
            ["agripac", "domande", "istruttoria", "5", "--yes"],
            ["agripac", "domande", "approva", "5", "--yes"],
        ] {
            assert!(Cli::try_parse_from(args).is_ok(), "{:?}", args);
        }
        assert!(Cli::try_parse_from([
            "agripac", "domande", "respingi", "5", "--motivo", "documentazione incompleta",
            "--yes",
        ])
        .is_ok());
    }

    #[test]
    fn test_confirm_honours_yes_without_reading_stdin() {
        assert!(confirm("Procedere?", true));
    }

    #[test]
    fn test_overview_command_parses() {
        assert!(Cli::try_parse_from(["agripac", "overview"]).is_ok());
    }
}
