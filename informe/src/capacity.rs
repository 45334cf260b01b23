//! Calcul de la capacité constructible d'une fiche
//!
//! Fonction pure d'une seule fiche : les champs numériques absents valent 0 et
//! se propagent tels quels dans l'arithmétique, sans erreur.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::tables::CalculationTables;
use crate::types::ParcelRecord;

/// Étages de retrait réservés au-dessus de la hauteur de base
pub const SETBACK_FLOORS: u32 = 2;

/// Résultat du calcul de capacité
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityResult {
    pub floors_excluding_setbacks: u32,
    pub floors_total: u32,
    pub building_type_label: String,
    pub typical_floors_area: f64,
    pub first_setback_area: f64,
    pub second_setback_area: f64,
    pub total_buildable_area_raw: f64,
    pub total_buildable_area_adjusted: f64,
    pub affectation_percent_applied: f64,
}

/// Calcule la capacité avec le pourcentage d'affectation porté par la fiche
pub fn compute_capacity(record: &ParcelRecord, tables: &CalculationTables) -> CapacityResult {
    compute_capacity_with_affectation(
        record,
        tables,
        record.buildability.boundary_affectation_percent,
    )
}

/// Calcule la capacité avec un pourcentage d'affectation fourni par l'appelant
/// (explicite ou déduit de la géométrie)
pub fn compute_capacity_with_affectation(
    record: &ParcelRecord,
    tables: &CalculationTables,
    affectation_percent: Option<f64>,
) -> CapacityResult {
    let parcel_area = record.buildability.parcel_area.unwrap_or(0.0);
    let frontage = record.cadastral.frontage.unwrap_or(0.0);
    let height = record.base_height();

    // 1. Surface nette des patios
    let adjusted_parcel_area = parcel_area - tables.patio_adjustment;

    // 2. Étages
    let levels = whole_levels(height, tables.floor_height);
    let floors_excluding_setbacks = if height > 0.0 { levels + 1 } else { 0 };
    let floors_total = levels + 1 + SETBACK_FLOORS;

    // 3. Type d'édifice
    let building_type_label = tables.classify(height).to_string();

    // 4-6. Surfaces (les retraits peuvent être négatifs sur les parcelles étroites)
    let typical_floors_area = f64::from(floors_excluding_setbacks) * adjusted_parcel_area;
    let first_setback_area = adjusted_parcel_area - 2.0 * frontage;
    let second_setback_area = adjusted_parcel_area - 4.0 * frontage;
    let total_buildable_area_raw = typical_floors_area + first_setback_area + second_setback_area;

    // 7. Affectation LIB/LFI
    let affectation_percent_applied = affectation_percent
        .filter(|p| p.is_finite() && *p > 0.0)
        .map(|p| p.min(100.0))
        .unwrap_or(0.0);
    let total_buildable_area_adjusted = if affectation_percent_applied > 0.0 {
        total_buildable_area_raw * (1.0 - affectation_percent_applied / 100.0)
    } else {
        total_buildable_area_raw
    };

    debug!(
        parcel_id = %record.parcel_id(),
        height,
        floors = floors_excluding_setbacks,
        raw = total_buildable_area_raw,
        adjusted = total_buildable_area_adjusted,
        "Capacity computed"
    );

    CapacityResult {
        floors_excluding_setbacks,
        floors_total,
        building_type_label,
        typical_floors_area,
        first_setback_area,
        second_setback_area,
        total_buildable_area_raw,
        total_buildable_area_adjusted,
        affectation_percent_applied,
    }
}

/// Nombre d'étages entiers contenus dans la hauteur
fn whole_levels(height: f64, floor_height: f64) -> u32 {
    if height > 0.0 && floor_height > 0.0 {
        (height / floor_height).floor() as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::parcel;
    use crate::tables::UNCLASSIFIED;

    #[test]
    fn test_usaa_parcel() {
        let tables = CalculationTables::default();
        let record = parcel("001-001-001", 500.0, 10.0, 22.8);
        let capacity = compute_capacity(&record, &tables);

        assert_eq!(capacity.floors_excluding_setbacks, 8);
        assert_eq!(capacity.floors_total, 10);
        assert_eq!(capacity.building_type_label, "USAA (PB + 7 plantas + 2 retiros)");
        // 484 m² nets
        assert_eq!(capacity.typical_floors_area, 3872.0);
        assert_eq!(capacity.first_setback_area, 464.0);
        assert_eq!(capacity.second_setback_area, 444.0);
        assert_eq!(capacity.total_buildable_area_raw, 4780.0);
        assert_eq!(capacity.total_buildable_area_adjusted, 4780.0);
        assert_eq!(capacity.affectation_percent_applied, 0.0);
    }

    #[test]
    fn test_zero_height() {
        let tables = CalculationTables::default();
        let record = parcel("001-001-001", 500.0, 10.0, 0.0);
        let capacity = compute_capacity(&record, &tables);

        assert_eq!(capacity.floors_excluding_setbacks, 0);
        assert_eq!(capacity.floors_total, 3);
        assert_eq!(capacity.building_type_label, UNCLASSIFIED);
        assert_eq!(capacity.typical_floors_area, 0.0);
        assert_eq!(capacity.total_buildable_area_raw, 464.0 + 444.0);
    }

    #[test]
    fn test_affectation_applied() {
        let tables = CalculationTables::default();
        let mut record = parcel("001-001-001", 500.0, 10.0, 22.8);
        record.buildability.boundary_affectation_percent = Some(20.0);
        let capacity = compute_capacity(&record, &tables);

        assert_eq!(capacity.affectation_percent_applied, 20.0);
        assert!((capacity.total_buildable_area_adjusted - 4780.0 * 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_affectation_zero_or_negative_ignored() {
        let tables = CalculationTables::default();
        let record = parcel("001-001-001", 500.0, 10.0, 22.8);

        for percent in [Some(0.0), Some(-5.0), None] {
            let capacity = compute_capacity_with_affectation(&record, &tables, percent);
            assert_eq!(capacity.affectation_percent_applied, 0.0);
            assert_eq!(
                capacity.total_buildable_area_adjusted,
                capacity.total_buildable_area_raw
            );
        }
    }

    #[test]
    fn test_affectation_capped_at_100() {
        let tables = CalculationTables::default();
        let record = parcel("001-001-001", 500.0, 10.0, 22.8);
        let capacity = compute_capacity_with_affectation(&record, &tables, Some(130.0));
        assert_eq!(capacity.affectation_percent_applied, 100.0);
        assert_eq!(capacity.total_buildable_area_adjusted, 0.0);
    }

    #[test]
    fn test_narrow_lot_negative_setbacks_not_clamped() {
        let tables = CalculationTables::default();
        // Façade de 8.66 m : retraits réduits à 60 m², négatifs à 25 m²
        let record = parcel("001-001-001", 60.0, 8.66, 11.6);
        let capacity = compute_capacity(&record, &tables);

        assert!((capacity.first_setback_area - (44.0 - 17.32)).abs() < 1e-9);
        assert!((capacity.second_setback_area - (44.0 - 34.64)).abs() < 1e-9);

        let very_narrow = parcel("001-001-002", 25.0, 8.66, 11.6);
        let capacity = compute_capacity(&very_narrow, &tables);
        assert!(capacity.first_setback_area < 0.0);
        assert!(capacity.second_setback_area < 0.0);
        assert_eq!(
            capacity.total_buildable_area_raw,
            capacity.typical_floors_area
                + capacity.first_setback_area
                + capacity.second_setback_area
        );
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let tables = CalculationTables::default();
        let record = ParcelRecord::default();
        let capacity = compute_capacity(&record, &tables);

        assert_eq!(capacity.floors_excluding_setbacks, 0);
        assert_eq!(capacity.first_setback_area, -tables.patio_adjustment);
        assert_eq!(capacity.second_setback_area, -tables.patio_adjustment);
    }

    #[test]
    fn test_pure_function() {
        let tables = CalculationTables::default();
        let record = parcel("001-001-001", 437.5, 8.66, 16.5);
        assert_eq!(
            compute_capacity(&record, &tables),
            compute_capacity(&record, &tables)
        );
    }

    #[test]
    fn test_custom_tables() {
        let tables = CalculationTables {
            floor_height: 2.5,
            patio_adjustment: 0.0,
            ..Default::default()
        };
        let record = parcel("001-001-001", 500.0, 10.0, 22.8);
        let capacity = compute_capacity(&record, &tables);
        // 22.8 / 2.5 = 9.12
        assert_eq!(capacity.floors_excluding_setbacks, 10);
        assert_eq!(capacity.floors_total, 12);
        assert_eq!(capacity.typical_floors_area, 5000.0);
    }
}
