//! Rapport d'exécution avec graceful degradation
//!
//! Collecte les analyses, les rejets et les avertissements de données
//! manquantes, puis les affiche ou les sauvegarde en JSON.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

use informe::{Analysis, BatchAnalysis, CalculationTables, InformeError, ParcelRecord};

/// Statut global de l'exécution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Toutes les estimations reposent sur des données complètes
    Success,
    /// Estimations produites, mais certaines entrées rejetées ou incomplètes
    PartialSuccess,
    /// Aucune estimation produite
    Failed,
}

/// Niveau de sévérité des erreurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorLevel {
    /// Le lot entier est rejeté
    Fatal,
    /// Une entrée est ignorée
    Error,
}

/// Erreur avec contexte
#[derive(Debug, Clone, Serialize)]
pub struct RunError {
    pub level: ErrorLevel,
    /// Fichier source (optionnel)
    pub input: Option<String>,
    /// Type d'erreur de validation (`NotAdjacent`, ...)
    pub kind: Option<String>,
    pub message: String,
}

/// Avertissement sur une parcelle analysée
#[derive(Debug, Clone, Serialize)]
pub struct RunWarning {
    pub parcel_id: String,
    pub message: String,
}

/// Rapport complet d'exécution
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Commande exécutée
    pub command: String,
    /// Origine des tables de calcul
    pub tables_source: String,
    /// Empreinte blake3 des entrées et des tables
    pub fingerprint: String,
    pub duration_secs: f64,
    pub status: RunStatus,

    pub inputs_processed: usize,
    pub inputs_failed: usize,
    pub parcels_analyzed: usize,
    /// Parcelles dont l'estimation repose sur des données manquantes
    pub parcels_incomplete: usize,
    /// Fiches fusionnées analysées (hors parcelles sources)
    pub merged_analyzed: usize,

    pub analyses: Vec<Analysis>,
    pub batch: Option<BatchAnalysis>,

    pub errors: Vec<RunError>,
    pub warnings: Vec<RunWarning>,
}

impl RunReport {
    pub fn new(command: &str, tables_source: &str) -> Self {
        Self {
            command: command.to_string(),
            tables_source: tables_source.to_string(),
            fingerprint: String::new(),
            duration_secs: 0.0,
            status: RunStatus::Success,
            inputs_processed: 0,
            inputs_failed: 0,
            parcels_analyzed: 0,
            parcels_incomplete: 0,
            merged_analyzed: 0,
            analyses: Vec::new(),
            batch: None,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Enregistre une analyse individuelle
    pub fn record_analysis(&mut self, analysis: Analysis) {
        self.inputs_processed += 1;
        self.parcels_analyzed += 1;
        self.warn_analysis(&analysis);
        self.analyses.push(analysis);
    }

    /// Enregistre l'analyse d'un lot consolidé
    pub fn record_batch(&mut self, batch: BatchAnalysis) {
        self.inputs_processed += batch.parcels.len();
        self.parcels_analyzed += batch.parcels.len();
        for analysis in &batch.parcels {
            self.warn_analysis(analysis);
        }
        self.merged_analyzed += 1;
        self.batch = Some(batch);
    }

    /// Avertissements d'une parcelle source ; la fiche fusionnée hérite des
    /// manques de ses sources et n'est pas comptée une seconde fois
    fn warn_analysis(&mut self, analysis: &Analysis) {
        if !analysis.is_complete() {
            self.parcels_incomplete += 1;
            let fields: Vec<&str> = analysis.missing_fields.iter().map(|f| f.path()).collect();
            self.warnings.push(RunWarning {
                parcel_id: analysis.parcel_id.clone(),
                message: format!("Missing data defaulted to 0: {}", fields.join(", ")),
            });
        }
        if analysis.affectation_inferred {
            self.warnings.push(RunWarning {
                parcel_id: analysis.parcel_id.clone(),
                message: format!(
                    "Affectation {:.2}% inferred from LIB/LFI geometry",
                    analysis.capacity.affectation_percent_applied
                ),
            });
        }
    }

    /// Enregistre un fichier illisible ou invalide
    pub fn record_input_failure(&mut self, input: &str, message: &str) {
        self.inputs_processed += 1;
        self.inputs_failed += 1;
        self.errors.push(RunError {
            level: ErrorLevel::Error,
            input: Some(input.to_string()),
            kind: None,
            message: message.to_string(),
        });
    }

    /// Enregistre le rejet d'un lot par la validation
    pub fn record_rejection(&mut self, error: &InformeError) {
        self.errors.push(RunError {
            level: ErrorLevel::Fatal,
            input: None,
            kind: Some(error.kind().to_string()),
            message: error.to_string(),
        });
    }

    pub fn set_fingerprint(&mut self, fingerprint: String) {
        self.fingerprint = fingerprint;
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        let has_fatal = self.errors.iter().any(|e| e.level == ErrorLevel::Fatal);
        let has_results = self.parcels_analyzed > 0;
        let degraded = !self.errors.is_empty() || self.parcels_incomplete > 0;

        self.status = if has_fatal || !has_results {
            RunStatus::Failed
        } else if degraded {
            RunStatus::PartialSuccess
        } else {
            RunStatus::Success
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("PREFACTIBILIDAD - {}", self.command);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Tables: {}", self.tables_source);
        println!("Fingerprint: {}", self.fingerprint);
        println!("Duration: {:.3}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Inputs: {} processed, {} failed",
            self.inputs_processed, self.inputs_failed
        );
        println!(
            "Parcels: {} analyzed, {} with missing data",
            self.parcels_analyzed, self.parcels_incomplete
        );
        if self.merged_analyzed > 0 {
            println!("Merged records: {}", self.merged_analyzed);
        }

        if !self.analyses.is_empty() {
            println!("\n--- PARCELS ---");
            for analysis in &self.analyses {
                print_analysis(analysis);
            }
        }

        if let Some(batch) = &self.batch {
            println!("\n--- CONSOLIDATED ({} parcels) ---", batch.parcels.len());
            for address in &batch.report.address_list {
                println!("  {}", address);
            }
            for analysis in &batch.parcels {
                print_analysis(analysis);
            }
            println!("  => merged");
            print_analysis(&batch.consolidated);
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                println!("  [{}] {}", w.parcel_id, w.message);
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        if !self.errors.is_empty() {
            println!("\n--- ERRORS ({}) ---", self.errors.len());
            for e in self.errors.iter().take(20) {
                let location = match (&e.input, &e.kind) {
                    (Some(input), _) => format!("[{}]", input),
                    (None, Some(kind)) => format!("[{}]", kind),
                    _ => String::new(),
                };
                println!("  {:?} {} {}", e.level, location, e.message);
            }
            if self.errors.len() > 20 {
                println!("  ... and {} more", self.errors.len() - 20);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        let tax: f64 = match &self.batch {
            Some(batch) => batch.consolidated.plusvalia.estimated_tax,
            None => self.analyses.iter().map(|a| a.plusvalia.estimated_tax).sum(),
        };
        let merged = if self.merged_analyzed > 0 {
            format!(" (+{} merged)", self.merged_analyzed)
        } else {
            String::new()
        };
        format!(
            "{}: {} parcels analyzed{}, {} incomplete, {} errors, estimated tax {:.2}",
            self.command,
            self.parcels_analyzed,
            merged,
            self.parcels_incomplete,
            self.errors.len(),
            tax
        )
    }
}

fn print_analysis(analysis: &Analysis) {
    let capacity = &analysis.capacity;
    let plusvalia = &analysis.plusvalia;
    println!(
        "  {}: {} | {} floors | {:.2} m² buildable ({:.2}% affected) | A1 {:.2} A2 {:.2} | B {:.2} | {:.2}% => {:.2}",
        analysis.parcel_id,
        capacity.building_type_label,
        capacity.floors_excluding_setbacks,
        capacity.total_buildable_area_adjusted,
        capacity.affectation_percent_applied,
        plusvalia.baseline_buildable_area,
        plusvalia.incremental_area,
        plusvalia.unit_incidence_value,
        plusvalia.tax_rate_percent,
        plusvalia.estimated_tax
    );
}

/// Empreinte déterministe des entrées d'un calcul
///
/// Deux exécutions avec les mêmes fiches, les mêmes tables et la même
/// incidence saisie produisent la même empreinte.
pub fn input_fingerprint(
    records: &[ParcelRecord],
    tables: &CalculationTables,
    incidence_override: Option<f64>,
) -> Result<String> {
    let mut hasher = blake3::Hasher::new();

    hasher.update(b"TABLES");
    hasher.update(&serde_json::to_vec(tables)?);
    hasher.update(b"OVERRIDE");
    if let Some(value) = incidence_override {
        hasher.update(&value.to_le_bytes());
    }
    for record in records {
        hasher.update(b"RECORD");
        hasher.update(&serde_json::to_vec(record)?);
    }

    Ok(hex::encode(hasher.finalize().as_bytes()))
}
