//! Chaîne complète : complétude → affectation → capacité → plusvalía

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::boundary::{self, BoundaryMeasurements};
use crate::capacity::{self, CapacityResult};
use crate::completeness::{self, MissingField};
use crate::consolidate;
use crate::plusvalia::{self, PlusvaliaResult};
use crate::tables::CalculationTables;
use crate::types::{ConsolidatedReport, ParcelRecord, RecordSummary};
use crate::{adjacency, InformeError};

/// Résultat complet de l'analyse d'une fiche
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub parcel_id: String,
    pub capacity: CapacityResult,
    pub plusvalia: PlusvaliaResult,
    pub boundaries: BoundaryMeasurements,
    /// Vrai si le pourcentage appliqué a été déduit de la géométrie LIB/LFI
    pub affectation_inferred: bool,
    pub missing_fields: Vec<MissingField>,
}

impl Analysis {
    /// L'estimation repose-t-elle sur des données complètes ?
    pub fn is_complete(&self) -> bool {
        self.missing_fields.is_empty()
    }

    /// Sous-totaux à reporter sur la fiche avant consolidation
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            total_buildable_area: self.capacity.total_buildable_area_adjusted,
            estimated_tax: self.plusvalia.estimated_tax,
        }
    }
}

/// Analyse d'un lot consolidé
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAnalysis {
    /// Analyses individuelles, dans l'ordre de saisie
    pub parcels: Vec<Analysis>,
    pub report: ConsolidatedReport,
    /// Analyse de la fiche fusionnée
    pub consolidated: Analysis,
}

/// Calculateur paramétré par ses tables de référence
#[derive(Debug, Clone, Default)]
pub struct Calculator {
    tables: CalculationTables,
}

impl Calculator {
    pub fn new(tables: CalculationTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &CalculationTables {
        &self.tables
    }

    pub fn capacity(&self, record: &ParcelRecord) -> CapacityResult {
        capacity::compute_capacity(record, &self.tables)
    }

    pub fn plusvalia(
        &self,
        record: &ParcelRecord,
        capacity: &CapacityResult,
        incidence_override: Option<f64>,
    ) -> PlusvaliaResult {
        plusvalia::compute_plusvalia(record, capacity, &self.tables, incidence_override)
    }

    /// Analyse une fiche individuelle ou fusionnée
    ///
    /// Sans pourcentage d'affectation explicite, celui-ci est déduit des
    /// mesures LIB/LFI quand elles sont disponibles.
    pub fn analyze(&self, record: &ParcelRecord, incidence_override: Option<f64>) -> Analysis {
        self.analyze_with(record, incidence_override, true)
    }

    fn analyze_with(
        &self,
        record: &ParcelRecord,
        incidence_override: Option<f64>,
        infer_affectation: bool,
    ) -> Analysis {
        let boundaries = boundary::measure(&record.geometry.lib, &record.geometry.lfi);

        let explicit = record.buildability.boundary_affectation_percent;
        let inferred = match explicit {
            Some(_) => None,
            None if infer_affectation => {
                boundaries.affectation_percent(record.buildability.parcel_area.unwrap_or(0.0))
            }
            None => None,
        };
        if let Some(percent) = inferred {
            debug!(parcel_id = %record.parcel_id(), percent, "Affectation inferred from LIB/LFI");
        }

        let capacity = capacity::compute_capacity_with_affectation(
            record,
            &self.tables,
            explicit.or(inferred),
        );
        let plusvalia = self.plusvalia(record, &capacity, incidence_override);
        let missing_fields =
            completeness::missing_fields(record, &self.tables, incidence_override);

        Analysis {
            parcel_id: record.parcel_id().to_string(),
            affectation_inferred: inferred.is_some_and(|p| p > 0.0),
            capacity,
            plusvalia,
            boundaries,
            missing_fields,
        }
    }

    /// Valide, analyse chaque fiche, consolide puis analyse la fiche fusionnée
    ///
    /// La validation a lieu avant tout calcul : un lot invalide ne produit rien.
    /// Les pourcentages déduits de la géométrie sont reportés sur chaque fiche
    /// avant la fusion ; la fiche fusionnée n'est jamais réinterprétée à partir
    /// des lignes LIB/LFI concaténées.
    pub fn analyze_batch(
        &self,
        addresses: &[String],
        records: &[ParcelRecord],
        incidence_override: Option<f64>,
    ) -> Result<BatchAnalysis, InformeError> {
        adjacency::validate(records)?;
        consolidate::check_addresses(addresses, records)?;

        let parcels: Vec<Analysis> = records
            .iter()
            .map(|record| self.analyze(record, incidence_override))
            .collect();

        let summarized: Vec<ParcelRecord> = records
            .iter()
            .zip(&parcels)
            .map(|(record, analysis)| summarize(record, analysis))
            .collect();

        let report = consolidate::consolidate_validated(addresses, &summarized);
        let mut consolidated = self.analyze_with(&report.merged_record, incidence_override, false);
        consolidated.affectation_inferred = parcels.iter().any(|a| a.affectation_inferred);

        info!(
            parcels = records.len(),
            parcel_id = %consolidated.parcel_id,
            buildable = consolidated.capacity.total_buildable_area_adjusted,
            tax = consolidated.plusvalia.estimated_tax,
            "Batch analyzed"
        );

        Ok(BatchAnalysis {
            parcels,
            report,
            consolidated,
        })
    }
}

/// Fiche enrichie de ses sous-totaux et du pourcentage effectivement appliqué
fn summarize(record: &ParcelRecord, analysis: &Analysis) -> ParcelRecord {
    let mut summarized = ParcelRecord {
        summary: Some(analysis.summary()),
        ..record.clone()
    };
    if analysis.affectation_inferred {
        summarized.buildability.boundary_affectation_percent =
            Some(analysis.capacity.affectation_percent_applied);
    }
    summarized
}
