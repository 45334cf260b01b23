//! Inventaire des données manquantes d'une fiche
//!
//! Les calculs n'échouent jamais sur une donnée absente (elle vaut 0) ; ce
//! module permet à l'appelant de signaler que l'estimation repose sur des
//! données incomplètes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tables::CalculationTables;
use crate::types::ParcelRecord;

/// Champ absent remplacé par 0 dans les calculs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MissingField {
    ParcelArea,
    Frontage,
    BaseHeight,
    PartyWallRatio,
    IncidenceValue,
    TaxRate,
}

impl MissingField {
    /// Chemin JSON du champ dans la fiche
    pub fn path(&self) -> &'static str {
        match self {
            Self::ParcelArea => "buildability.parcelArea",
            Self::Frontage => "cadastral.frontage",
            Self::BaseHeight => "buildability.maxHeightByTier[0]",
            Self::PartyWallRatio => "buildability.floorAreaRatio.partyWall",
            Self::IncidenceValue => "buildability.taxIncidenceValue",
            Self::TaxRate => "buildability.taxRatePercent",
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Liste, dans un ordre fixe, les entrées des calculs qui seront remplacées par 0
///
/// L'incidence n'est manquante que si aucune source (fiche, valeurs héritées,
/// saisie utilisateur) n'est exploitable ; le taux, que si ni la fiche ni la
/// table des districts ne le fournissent.
pub fn missing_fields(
    record: &ParcelRecord,
    tables: &CalculationTables,
    incidence_override: Option<f64>,
) -> Vec<MissingField> {
    let b = &record.buildability;
    let mut missing = Vec::new();

    if b.parcel_area.is_none() {
        missing.push(MissingField::ParcelArea);
    }
    if record.cadastral.frontage.is_none() {
        missing.push(MissingField::Frontage);
    }
    if b.max_height_by_tier.is_empty() {
        missing.push(MissingField::BaseHeight);
    }
    if b.floor_area_ratio.party_wall.is_none() {
        missing.push(MissingField::PartyWallRatio);
    }

    let has_incidence = incidence_override.is_some_and(|v| v > 0.0)
        || [
            b.tax_incidence_value,
            b.legacy_incidence.plusvalia_em,
            b.legacy_incidence.plusvalia_pl,
            b.legacy_incidence.plusvalia_sl,
        ]
        .into_iter()
        .flatten()
        .any(|v| v != 0.0);
    if !has_incidence {
        missing.push(MissingField::IncidenceValue);
    }

    let has_rate = b.tax_rate_percent.is_some()
        || b
            .district_tax_code
            .as_deref()
            .and_then(|code| tables.tax_rate_for(code))
            .is_some();
    if !has_rate {
        missing.push(MissingField::TaxRate);
    }

    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::parcel;

    #[test]
    fn test_complete_record() {
        let record = parcel("001-001-001", 500.0, 10.0, 22.8);
        assert!(missing_fields(&record, &CalculationTables::default(), None).is_empty());
    }

    #[test]
    fn test_empty_record_lists_everything() {
        let missing = missing_fields(&ParcelRecord::default(), &CalculationTables::default(), None);
        assert_eq!(
            missing,
            vec![
                MissingField::ParcelArea,
                MissingField::Frontage,
                MissingField::BaseHeight,
                MissingField::PartyWallRatio,
                MissingField::IncidenceValue,
                MissingField::TaxRate,
            ]
        );
    }

    #[test]
    fn test_override_and_district_fill_gaps() {
        let mut record = parcel("001-001-001", 500.0, 10.0, 22.8);
        record.buildability.tax_incidence_value = None;
        record.buildability.tax_rate_percent = None;
        record.buildability.district_tax_code = Some("A3".to_string());

        let tables = CalculationTables::default();
        assert_eq!(
            missing_fields(&record, &tables, None),
            vec![MissingField::IncidenceValue]
        );
        assert!(missing_fields(&record, &tables, Some(1200.0)).is_empty());
    }

    #[test]
    fn test_display_path() {
        assert_eq!(MissingField::Frontage.to_string(), "cadastral.frontage");
    }
}
