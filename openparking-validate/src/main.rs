//! Point d'entrée CLI pour openparking-validate

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use openparking_validate::ValidationConfig;

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Valider des flux de parkings avant publication
#[derive(Parser)]
#[command(name = "openparking-validate")]
#[command(author, version)]
#[command(about = "Valider des flux de parkings GeoJSON contre les invariants du modèle")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Validate {
            path,
            config,
            ignore_exceeded_capacity,
            ignore_data_age,
            report,
        } => {
            info!(path = %path.display(), config = ?config, "Validation des flux");
            let flags = ValidationConfig {
                ignore_exceeded_capacity,
                ignore_data_age,
            };
            cli::cmd_validate(&path, config.as_deref(), flags, report.as_deref())?;
        }
        Commands::List { path, json } => {
            info!(path = %path.display(), "Liste des parkings");
            cli::cmd_list(&path, json)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
