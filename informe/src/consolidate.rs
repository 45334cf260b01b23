//! Fusion de plusieurs fiches contiguës en une fiche consolidée

use std::collections::BTreeSet;

use tracing::debug;

use crate::adjacency;
use crate::types::{
    Buildability, Cadastral, ConsolidatedReport, LatLng, NeighborPair, ParcelRecord,
    RecordGeometry, RecordSummary, ReportKind,
};
use crate::InformeError;

/// Séparateur des SMP dans l'identifiant affiché de la fiche fusionnée
pub const PARCEL_ID_SEPARATOR: &str = " + ";

/// Valide puis consolide un lot de fiches
///
/// Aucune fusion partielle n'est produite : la validation échoue avant
/// toute construction de la fiche fusionnée. `addresses` est vide ou
/// contient exactement une adresse par fiche, dans le même ordre.
pub fn consolidate(
    addresses: &[String],
    records: &[ParcelRecord],
) -> Result<ConsolidatedReport, InformeError> {
    adjacency::validate(records)?;
    check_addresses(addresses, records)?;
    Ok(consolidate_validated(addresses, records))
}

/// Vérifie l'alignement adresses / fiches
pub(crate) fn check_addresses(
    addresses: &[String],
    records: &[ParcelRecord],
) -> Result<(), InformeError> {
    if addresses.is_empty() || addresses.len() == records.len() {
        Ok(())
    } else {
        Err(InformeError::AddressMismatch {
            addresses: addresses.len(),
            records: records.len(),
        })
    }
}

/// Consolide un lot déjà validé par [`adjacency::validate`]
pub(crate) fn consolidate_validated(
    addresses: &[String],
    records: &[ParcelRecord],
) -> ConsolidatedReport {
    let merged_record = match records {
        [single] => single.clone(),
        _ => merge_records(records),
    };

    debug!(
        parcels = records.len(),
        parcel_id = %merged_record.cadastral.parcel_id,
        "Records consolidated"
    );

    ConsolidatedReport {
        address_list: addresses.to_vec(),
        source_records: records.to_vec(),
        merged_record,
    }
}

/// Fusionne les fiches champ par champ
///
/// Surfaces, façades et sous-totaux sont sommés ; les paramètres de zonage
/// (hauteurs, FOT, incidence, taux) sont ceux de la première fiche.
fn merge_records(records: &[ParcelRecord]) -> ParcelRecord {
    let leader = &records[0];
    let batch_ids: BTreeSet<&str> = records.iter().map(|r| r.parcel_id()).collect();

    let cadastral = Cadastral {
        parcel_id: records
            .iter()
            .map(|r| r.parcel_id())
            .collect::<Vec<_>>()
            .join(PARCEL_ID_SEPARATOR),
        total_area: sum_present(records.iter().map(|r| r.cadastral.total_area)),
        covered_area: sum_present(records.iter().map(|r| r.cadastral.covered_area)),
        frontage: sum_present(records.iter().map(|r| r.cadastral.frontage)),
        depth: sum_present(records.iter().map(|r| r.cadastral.depth)),
        neighboring_parcel_ids: outer_neighbors(records, &batch_ids),
    };

    let mut adjoining = Vec::new();
    for record in records {
        for id in &record.buildability.adjoining_parcel_ids {
            if !batch_ids.contains(id.as_str()) && !adjoining.contains(id) {
                adjoining.push(id.clone());
            }
        }
    }

    let buildability = Buildability {
        parcel_area: sum_present(records.iter().map(|r| r.buildability.parcel_area)),
        adjoining_parcel_ids: adjoining,
        boundary_affectation_percent: weighted_affectation(records),
        ..leader.buildability.clone()
    };

    let mut geometry = RecordGeometry::default();
    for record in records {
        geometry.parcel.extend(record.geometry.parcel.iter().cloned());
        geometry.lib.extend(record.geometry.lib.iter().cloned());
        geometry.lfi.extend(record.geometry.lfi.iter().cloned());
    }

    let report_kind = if records.iter().all(|r| r.report_kind == ReportKind::Complete) {
        ReportKind::Complete
    } else {
        ReportKind::Simple
    };

    ParcelRecord {
        cadastral,
        buildability,
        geometry,
        location: mean_location(records),
        summary: sum_summaries(records),
        timestamp: records
            .iter()
            .map(|r| r.timestamp.as_str())
            .max()
            .unwrap_or_default()
            .to_string(),
        report_kind,
    }
}

/// Somme des valeurs présentes, `None` si aucune fiche ne renseigne le champ
fn sum_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    values.fold(None, |acc, value| match (acc, value) {
        (None, None) => None,
        (acc, value) => Some(acc.unwrap_or(0.0) + value.unwrap_or(0.0)),
    })
}

/// Voisins extérieurs au lot : avant la première fiche, après la dernière
fn outer_neighbors(records: &[ParcelRecord], batch_ids: &BTreeSet<&str>) -> NeighborPair {
    let outside = |id: &Option<String>| {
        id.as_deref()
            .filter(|id| !batch_ids.contains(id))
            .map(str::to_string)
    };

    let first = &records[0].cadastral.neighboring_parcel_ids;
    let last = &records[records.len() - 1].cadastral.neighboring_parcel_ids;

    NeighborPair {
        previous: outside(&first.previous).or_else(|| outside(&first.next)),
        next: outside(&last.next).or_else(|| outside(&last.previous)),
    }
}

/// Moyenne des pourcentages d'affectation pondérée par la surface
fn weighted_affectation(records: &[ParcelRecord]) -> Option<f64> {
    let mut weighted = 0.0;
    let mut total_area = 0.0;

    for record in records {
        let area = record.buildability.parcel_area.unwrap_or(0.0);
        if let Some(percent) = record.buildability.boundary_affectation_percent {
            weighted += percent * area;
        }
        total_area += area;
    }

    let any_present = records
        .iter()
        .any(|r| r.buildability.boundary_affectation_percent.is_some());

    if !any_present {
        None
    } else if total_area > 0.0 {
        Some(weighted / total_area)
    } else {
        Some(0.0)
    }
}

/// Centre moyen, seulement si toutes les fiches en ont un
fn mean_location(records: &[ParcelRecord]) -> Option<LatLng> {
    let locations: Option<Vec<LatLng>> = records.iter().map(|r| r.location).collect();
    let locations = locations?;
    let n = locations.len() as f64;

    Some(LatLng {
        lat: locations.iter().map(|l| l.lat).sum::<f64>() / n,
        lng: locations.iter().map(|l| l.lng).sum::<f64>() / n,
    })
}

/// Somme des sous-totaux, seulement si toutes les fiches ont été analysées
fn sum_summaries(records: &[ParcelRecord]) -> Option<RecordSummary> {
    let summaries: Option<Vec<RecordSummary>> = records.iter().map(|r| r.summary).collect();

    summaries.map(|summaries| RecordSummary {
        total_buildable_area: summaries.iter().map(|s| s.total_buildable_area).sum(),
        estimated_tax: summaries.iter().map(|s| s.estimated_tax).sum(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{block, parcel};

    fn addresses(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("Av. Corrientes {}", 1000 + i)).collect()
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert_eq!(consolidate(&[], &[]), Err(InformeError::EmptyBatch));
    }

    #[test]
    fn test_address_list_must_match_records() {
        let records = block(&[300.0, 450.0]);
        assert_eq!(
            consolidate(&addresses(3), &records),
            Err(InformeError::AddressMismatch {
                addresses: 3,
                records: 2
            })
        );

        let report = consolidate(&[], &records).unwrap();
        assert!(report.address_list.is_empty());
    }

    #[test]
    fn test_adjacency_checked_before_addresses() {
        let records = vec![
            parcel("A", 300.0, 10.0, 22.8),
            parcel("B", 300.0, 10.0, 22.8),
        ];
        assert_eq!(
            consolidate(&addresses(1), &records),
            Err(InformeError::missing_adjacency("A"))
        );
    }

    #[test]
    fn test_single_record_is_structural_copy() {
        let record = parcel("001-002-003", 300.0, 10.0, 22.8);
        let report = consolidate(&addresses(1), &[record.clone()]).unwrap();
        assert_eq!(report.merged_record, record);
        assert_eq!(report.source_records, vec![record]);
    }

    #[test]
    fn test_total_area_sum() {
        let records = block(&[300.0, 450.0]);
        let report = consolidate(&addresses(2), &records).unwrap();
        assert_eq!(report.merged_record.cadastral.total_area, Some(750.0));
        assert_eq!(report.merged_record.buildability.parcel_area, Some(750.0));
        assert_eq!(report.merged_record.cadastral.frontage, Some(20.0));
    }

    #[test]
    fn test_parcel_id_joined_in_order() {
        let records = block(&[300.0, 450.0, 200.0]);
        let report = consolidate(&addresses(3), &records).unwrap();
        assert_eq!(
            report.merged_record.cadastral.parcel_id,
            "010-020-001 + 010-020-002 + 010-020-003"
        );
    }

    #[test]
    fn test_order_insensitive_sums_order_preserving_lists() {
        let records = block(&[300.0, 450.0, 200.0]);
        let mut reversed = records.clone();
        reversed.reverse();
        let mut reversed_addresses = addresses(3);
        reversed_addresses.reverse();

        let forward = consolidate(&addresses(3), &records).unwrap();
        let backward = consolidate(&reversed_addresses, &reversed).unwrap();

        assert_eq!(
            forward.merged_record.cadastral.total_area,
            backward.merged_record.cadastral.total_area
        );
        assert_eq!(
            forward.merged_record.cadastral.frontage,
            backward.merged_record.cadastral.frontage
        );
        assert_eq!(backward.address_list, reversed_addresses);
        assert_eq!(backward.source_records, reversed);
    }

    #[test]
    fn test_outer_neighbors_and_adjoining() {
        let mut records = block(&[300.0, 450.0]);
        records[0].cadastral.neighboring_parcel_ids.previous = Some("010-020-000".into());
        records[1].cadastral.neighboring_parcel_ids.next = Some("010-020-099".into());
        records[0].buildability.adjoining_parcel_ids =
            vec!["010-020-002".into(), "010-020-050".into()];
        records[1].buildability.adjoining_parcel_ids =
            vec!["010-020-001".into(), "010-020-050".into(), "010-020-051".into()];

        let merged = consolidate(&addresses(2), &records).unwrap().merged_record;
        assert_eq!(
            merged.cadastral.neighboring_parcel_ids,
            NeighborPair::new(Some("010-020-000"), Some("010-020-099"))
        );
        assert_eq!(
            merged.buildability.adjoining_parcel_ids,
            vec!["010-020-050".to_string(), "010-020-051".to_string()]
        );
    }

    #[test]
    fn test_location_mean_requires_all() {
        let mut records = block(&[300.0, 300.0]);
        records[0].location = Some(LatLng { lat: -34.60, lng: -58.40 });
        let merged = consolidate(&addresses(2), &records).unwrap().merged_record;
        assert_eq!(merged.location, None);

        records[1].location = Some(LatLng { lat: -34.62, lng: -58.42 });
        let merged = consolidate(&addresses(2), &records).unwrap().merged_record;
        let location = merged.location.unwrap();
        assert!((location.lat + 34.61).abs() < 1e-9);
        assert!((location.lng + 58.41).abs() < 1e-9);
    }

    #[test]
    fn test_affectation_weighted_by_area() {
        let mut records = block(&[100.0, 300.0]);
        records[0].buildability.boundary_affectation_percent = Some(40.0);
        let merged = consolidate(&addresses(2), &records).unwrap().merged_record;
        // (40 × 100 + 0 × 300) / 400
        assert_eq!(merged.buildability.boundary_affectation_percent, Some(10.0));
    }

    #[test]
    fn test_summaries_summed() {
        let mut records = block(&[300.0, 450.0]);
        records[0].summary = Some(RecordSummary {
            total_buildable_area: 1000.0,
            estimated_tax: 50.0,
        });
        assert_eq!(consolidate(&addresses(2), &records).unwrap().merged_record.summary, None);

        records[1].summary = Some(RecordSummary {
            total_buildable_area: 2000.0,
            estimated_tax: 70.0,
        });
        let merged = consolidate(&addresses(2), &records).unwrap().merged_record;
        assert_eq!(
            merged.summary,
            Some(RecordSummary {
                total_buildable_area: 3000.0,
                estimated_tax: 120.0
            })
        );
    }

    #[test]
    fn test_missing_numeric_fields_stay_absent() {
        let mut records = block(&[300.0, 450.0]);
        records[0].cadastral.covered_area = None;
        records[1].cadastral.covered_area = None;
        records[1].cadastral.depth = None;

        let merged = consolidate(&addresses(2), &records).unwrap().merged_record;
        assert_eq!(merged.cadastral.covered_area, None);
        assert_eq!(merged.cadastral.depth, records[0].cadastral.depth);
    }

    #[test]
    fn test_validation_failure_propagated() {
        let records = vec![
            parcel("A", 300.0, 10.0, 22.8),
            parcel("B", 300.0, 10.0, 22.8),
        ];
        assert_eq!(
            consolidate(&addresses(2), &records),
            Err(InformeError::missing_adjacency("A"))
        );
    }
}
