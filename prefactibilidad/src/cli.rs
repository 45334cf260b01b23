//! Définition et implémentation des commandes CLI
//!
//! - `analyze` : fiches individuelles → capacité + plusvalía
//! - `consolidate` : parcelles contiguës → fiche fusionnée analysée
//! - `export` : géométries → GeoJSON

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Subcommand;
use rayon::prelude::*;
use tracing::{info, warn};

use informe::consolidate::consolidate;
use informe::{Calculator, ParcelRecord};
use prefactibilidad::export::export_to_geojson;
use prefactibilidad::input::{collect_inputs, display_name, load_record};
use prefactibilidad::report::input_fingerprint;
use prefactibilidad::{Config, RunReport};

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one or more parcel records independently
    Analyze {
        /// Record JSON file or directory of *.json files (repeatable)
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,

        /// Save the JSON report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate adjacency, merge the parcels and analyze the consolidated record
    Consolidate {
        /// Record JSON files, in block order (repeatable)
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,

        /// Human address of each record, same order as --input (défaut : nom du fichier)
        #[arg(short, long)]
        address: Vec<String>,

        /// Save the JSON report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export record geometry (consolidated when several inputs) to GeoJSON
    Export {
        /// Record JSON files, in block order (repeatable)
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,

        /// Output GeoJSON file
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Exécute la commande analyze
pub fn cmd_analyze(
    paths: &[PathBuf],
    output: Option<&Path>,
    config: &Config,
    incidence: Option<f64>,
) -> Result<RunReport> {
    let start = Instant::now();
    let inputs = collect_inputs(paths)?;
    info!(files = inputs.len(), "Analyzing records");

    let calculator = Calculator::new(config.tables.clone());

    // L'ordre des résultats suit celui des fichiers
    let results: Vec<(PathBuf, Result<ParcelRecord>)> = inputs
        .into_par_iter()
        .map(|path| {
            let record = load_record(&path);
            (path, record)
        })
        .collect();

    let mut report = RunReport::new("analyze", &config.source);
    let mut loaded = Vec::new();

    for (path, result) in results {
        match result {
            Ok(record) => {
                report.record_analysis(calculator.analyze(&record, incidence));
                loaded.push(record);
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Record skipped");
                report.record_input_failure(&display_name(&path), &format!("{:#}", e));
            }
        }
    }

    report.set_fingerprint(input_fingerprint(&loaded, &config.tables, incidence)?);
    finish(report, start, output)
}

/// Exécute la commande consolidate
pub fn cmd_consolidate(
    paths: &[PathBuf],
    addresses: &[String],
    output: Option<&Path>,
    config: &Config,
    incidence: Option<f64>,
) -> Result<RunReport> {
    let start = Instant::now();
    let records = load_all(paths)?;

    // Une liste d'adresses de mauvaise longueur est rejetée par la validation
    let addresses: Vec<String> = if addresses.is_empty() {
        paths.iter().map(|p| display_name(p)).collect()
    } else {
        addresses.to_vec()
    };

    let calculator = Calculator::new(config.tables.clone());
    let mut report = RunReport::new("consolidate", &config.source);

    match calculator.analyze_batch(&addresses, &records, incidence) {
        Ok(batch) => report.record_batch(batch),
        Err(e) => {
            warn!(kind = e.kind(), error = %e, "Batch rejected");
            report.record_rejection(&e);
        }
    }

    report.set_fingerprint(input_fingerprint(&records, &config.tables, incidence)?);
    finish(report, start, output)
}

/// Exécute la commande export
pub fn cmd_export(paths: &[PathBuf], output: &Path) -> Result<()> {
    let records = load_all(paths)?;

    let record = match records.as_slice() {
        [single] => single.clone(),
        _ => {
            let addresses: Vec<String> = paths.iter().map(|p| display_name(p)).collect();
            consolidate(&addresses, &records)
                .context("Cannot export a batch that fails adjacency validation")?
                .merged_record
        }
    };

    let count = export_to_geojson(&record, output)?;
    info!(
        parcel_id = %record.parcel_id(),
        features = count,
        output = %output.display(),
        "GeoJSON exported"
    );

    Ok(())
}

/// Charge toutes les fiches, la première erreur interrompt la commande
fn load_all(paths: &[PathBuf]) -> Result<Vec<ParcelRecord>> {
    paths.iter().map(|p| load_record(p)).collect()
}

fn finish(mut report: RunReport, start: Instant, output: Option<&Path>) -> Result<RunReport> {
    report.set_duration(start.elapsed());
    report.finalize();

    if let Some(path) = output {
        report
            .save_to_file(path)
            .context(format!("Failed to save report: {}", path.display()))?;
        info!(path = %path.display(), "Report saved");
    }

    Ok(report)
}
