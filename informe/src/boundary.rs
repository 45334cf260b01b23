//! Mesures géométriques entre les lignes LIB et LFI
//!
//! Les coordonnées sont supposées planes et métriques. Le nombre de points
//! est toujours faible (quelques dizaines) : la distance minimale est
//! calculée par comparaison exhaustive, sans index spatial.

use geo::{Area, Coord, EuclideanDistance, EuclideanLength, LineString, Point, Polygon};
use geojson::{Feature, Value};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Surface et périmètre d'une ligne fermée en polygone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RingMeasure {
    pub area: f64,
    pub perimeter: f64,
    pub points: usize,
}

/// Mesures LIB/LFI ; une mesure impossible est simplement absente
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryMeasurements {
    pub lib: Option<RingMeasure>,
    pub lfi: Option<RingMeasure>,
    pub min_distance: Option<f64>,
}

impl BoundaryMeasurements {
    /// Pourcentage d'affectation déduit : écart de surface LIB/LFI rapporté
    /// à la surface de la parcelle, borné à [0, 100]
    pub fn affectation_percent(&self, parcel_area: f64) -> Option<f64> {
        let (lib, lfi) = (self.lib?, self.lfi?);
        if parcel_area <= 0.0 {
            return None;
        }
        let percent = (lib.area - lfi.area).abs() / parcel_area * 100.0;
        Some(percent.clamp(0.0, 100.0))
    }
}

/// Mesure les deux collections de lignes réglementaires
pub fn measure(lib: &[Feature], lfi: &[Feature]) -> BoundaryMeasurements {
    let lib_lines = collect_lines(lib, "LIB");
    let lfi_lines = collect_lines(lfi, "LFI");

    BoundaryMeasurements {
        lib: lib_lines.iter().find_map(|line| ring_measure(line)),
        lfi: lfi_lines.iter().find_map(|line| ring_measure(line)),
        min_distance: min_distance(&lib_lines, &lfi_lines),
    }
}

/// Ferme la ligne si nécessaire puis mesure le polygone obtenu
///
/// Une ligne de moins de 3 points ne peut pas être fermée.
pub fn ring_measure(coords: &[Coord]) -> Option<RingMeasure> {
    if coords.len() < 3 {
        return None;
    }

    let mut ring = coords.to_vec();
    if ring.first() != ring.last() {
        ring.push(ring[0]);
    }

    let ring = LineString::new(ring);
    let perimeter = ring.euclidean_length();
    let points = ring.0.len();
    let area = Polygon::new(ring, vec![]).unsigned_area();

    Some(RingMeasure {
        area,
        perimeter,
        points,
    })
}

/// Distance minimale entre deux ensembles de lignes (tous les couples de points)
pub fn min_distance(a: &[Vec<Coord>], b: &[Vec<Coord>]) -> Option<f64> {
    let mut best: Option<f64> = None;

    for pa in a.iter().flatten() {
        for pb in b.iter().flatten() {
            let d = Point::from(*pa).euclidean_distance(&Point::from(*pb));
            best = Some(best.map_or(d, |current| current.min(d)));
        }
    }

    best
}

/// Extrait les lignes exploitables d'une collection de features
///
/// Les polygones contribuent leur anneau extérieur. Une géométrie absente ou
/// mal formée est ignorée sans empêcher les autres mesures.
fn collect_lines(features: &[Feature], layer: &str) -> Vec<Vec<Coord>> {
    let mut lines = Vec::new();

    for (index, feature) in features.iter().enumerate() {
        let Some(geometry) = &feature.geometry else {
            warn!(layer, index, "Feature without geometry skipped");
            continue;
        };

        let parts: Vec<&Vec<Vec<f64>>> = match &geometry.value {
            Value::LineString(line) => vec![line],
            Value::MultiLineString(lines) => lines.iter().collect(),
            Value::Polygon(rings) => rings.first().into_iter().collect(),
            Value::MultiPolygon(polygons) => {
                polygons.iter().filter_map(|rings| rings.first()).collect()
            }
            _ => {
                warn!(layer, index, "Unsupported geometry type skipped");
                continue;
            }
        };

        for positions in parts {
            match to_coords(positions) {
                Some(coords) if !coords.is_empty() => lines.push(coords),
                Some(_) => {}
                None => warn!(layer, index, "Malformed coordinates skipped"),
            }
        }
    }

    lines
}

fn to_coords(positions: &[Vec<f64>]) -> Option<Vec<Coord>> {
    positions
        .iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => Some(Coord { x: *x, y: *y }),
            _ => None,
        })
        .collect()
}
