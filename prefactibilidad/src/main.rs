//! Point d'entrée CLI pour prefactibilidad

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use prefactibilidad::{Config, RunStatus};

/// `.env` du répertoire courant, sinon celui posé à côté du binaire
/// (`PREFACTIBILIDAD_TABLES`, `RUST_LOG`)
fn load_env() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        return Some(path);
    }
    let path = std::env::current_exe().ok()?.parent()?.join(".env");
    dotenvy::from_path(&path).ok().map(|_| path)
}

mod cli;

use cli::Commands;

/// Estimer la capacité constructible et la plusvalía de parcelles urbaines
#[derive(Parser)]
#[command(name = "prefactibilidad")]
#[command(author, version)]
#[command(about = "Buildable capacity and plusvalía estimates for single or consolidated parcels")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Calculation tables: preset name (caba, caba-sin-patio) or path to a JSON file
    #[arg(long, global = true)]
    tables: Option<String>,

    /// User-chosen incidence value (B) overriding record values
    #[arg(long, global = true)]
    incidence: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let env_file = load_env();
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);
    debug!(env_file = ?env_file, "Environment loaded");

    let config = Config::resolve(cli.tables.as_deref())?;
    info!(tables = %config.source, incidence = ?cli.incidence, "Tables loaded");

    let report = match cli.command {
        Commands::Analyze { input, output } => {
            cli::cmd_analyze(&input, output.as_deref(), &config, cli.incidence)?
        }
        Commands::Consolidate {
            input,
            address,
            output,
        } => cli::cmd_consolidate(&input, &address, output.as_deref(), &config, cli.incidence)?,
        Commands::Export { input, output } => {
            cli::cmd_export(&input, &output)?;
            return Ok(());
        }
    };

    if !cli.quiet {
        report.display();
    }
    info!("{}", report.summary());

    if report.status == RunStatus::Failed {
        anyhow::bail!("{}", report.summary());
    }

    Ok(())
}

/// -q : avertissements seuls ; -v : détail des calculs ; -vv : tout
///
/// `RUST_LOG`, s'il est défini, remplace entièrement ce réglage.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    // Les dépendances restent au niveau warn
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,informe={level},prefactibilidad={level}"))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(verbose > 0)
        .without_time()
        .init();
}
