//! Estimation de la plusvalía (DDHUS) à partir de la capacité constructible
//!
//! Aucune branche d'erreur : une estimation nulle ou faible reste un résultat
//! affichable.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capacity::CapacityResult;
use crate::tables::CalculationTables;
use crate::types::ParcelRecord;

/// Origine de la valeur d'incidence B retenue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IncidenceSource {
    /// Valeur choisie par l'utilisateur
    Override,
    /// `taxIncidenceValue` de la fiche
    Record,
    /// `plusvalia_em` (entre medianeras)
    LegacyPartyWall,
    /// `plusvalia_pl` (perímetro libre)
    LegacyFreeStanding,
    /// `plusvalia_sl` (semi libre)
    LegacySemiDetached,
    /// Aucune valeur disponible, B = 0
    Missing,
}

/// Origine du taux d'imposition retenu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaxRateSource {
    Record,
    DistrictTable,
    Missing,
}

/// Résultat du calcul de plusvalía
///
/// Les noms courts du formulaire officiel sont rappelés en commentaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlusvaliaResult {
    /// A1
    pub baseline_buildable_area: f64,
    /// A2
    pub incremental_area: f64,
    /// A = A1 + A2
    pub total_taxable_area: f64,
    /// B
    pub unit_incidence_value: f64,
    /// A × B
    pub tax_base: f64,
    pub tax_rate_percent: f64,
    pub estimated_tax: f64,
    pub incidence_source: IncidenceSource,
    pub tax_rate_source: TaxRateSource,
}

/// Calcule la plusvalía d'une fiche à partir de sa capacité
///
/// `incidence_override` est la valeur B saisie par l'utilisateur ; elle n'est
/// retenue que si elle est strictement positive.
pub fn compute_plusvalia(
    record: &ParcelRecord,
    capacity: &CapacityResult,
    tables: &CalculationTables,
    incidence_override: Option<f64>,
) -> PlusvaliaResult {
    let parcel_area = record.buildability.parcel_area.unwrap_or(0.0);
    let party_wall_ratio = record.buildability.floor_area_ratio.party_wall.unwrap_or(0.0);

    let baseline_buildable_area = parcel_area * party_wall_ratio;
    let incremental_area = capacity.total_buildable_area_adjusted - baseline_buildable_area;
    let total_taxable_area = baseline_buildable_area + incremental_area;

    let (unit_incidence_value, incidence_source) = resolve_incidence(record, incidence_override);
    let (tax_rate_percent, tax_rate_source) = resolve_tax_rate(record, tables);

    let tax_base = total_taxable_area * unit_incidence_value;
    let estimated_tax = tax_base * (tax_rate_percent / 100.0);

    debug!(
        parcel_id = %record.parcel_id(),
        a1 = baseline_buildable_area,
        a2 = incremental_area,
        b = unit_incidence_value,
        rate = tax_rate_percent,
        tax = estimated_tax,
        "Plusvalia computed"
    );

    PlusvaliaResult {
        baseline_buildable_area,
        incremental_area,
        total_taxable_area,
        unit_incidence_value,
        tax_base,
        tax_rate_percent,
        estimated_tax,
        incidence_source,
        tax_rate_source,
    }
}

/// Valeur B : saisie utilisateur, puis fiche, puis valeurs héritées
fn resolve_incidence(record: &ParcelRecord, incidence_override: Option<f64>) -> (f64, IncidenceSource) {
    if let Some(value) = incidence_override.filter(|v| *v > 0.0) {
        return (value, IncidenceSource::Override);
    }

    let legacy = &record.buildability.legacy_incidence;
    let candidates = [
        (record.buildability.tax_incidence_value, IncidenceSource::Record),
        (legacy.plusvalia_em, IncidenceSource::LegacyPartyWall),
        (legacy.plusvalia_pl, IncidenceSource::LegacyFreeStanding),
        (legacy.plusvalia_sl, IncidenceSource::LegacySemiDetached),
    ];

    candidates
        .into_iter()
        .find_map(|(value, source)| value.filter(|v| *v != 0.0).map(|v| (v, source)))
        .unwrap_or((0.0, IncidenceSource::Missing))
}

/// Taux : fiche si renseigné, sinon table des districts, sinon 0
fn resolve_tax_rate(record: &ParcelRecord, tables: &CalculationTables) -> (f64, TaxRateSource) {
    if let Some(rate) = record.buildability.tax_rate_percent {
        return (rate, TaxRateSource::Record);
    }

    record
        .buildability
        .district_tax_code
        .as_deref()
        .and_then(|code| tables.tax_rate_for(code))
        .map(|rate| (rate, TaxRateSource::DistrictTable))
        .unwrap_or((0.0, TaxRateSource::Missing))
}
