//! Types de données pour le crate informe
//!
//! Toutes les structures sont sérialisables en JSON (camelCase) pour être
//! consommées telles quelles par les couches de rendu, d'export et de persistance.

use geojson::Feature;
use serde::{Deserialize, Serialize};

/// Fiche d'une parcelle ("Informe"), unité de travail du calcul
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelRecord {
    /// Données cadastrales
    pub cadastral: Cadastral,

    /// Données d'édificabilité (Código Urbanístico)
    pub buildability: Buildability,

    /// Géométries transportées telles quelles (contour, LIB, LFI)
    #[serde(default)]
    pub geometry: RecordGeometry,

    /// Point central de la parcelle (style Google Maps)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,

    /// Sous-totaux calculés par l'appelant (surface constructible, impôt estimé)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<RecordSummary>,

    /// Horodatage ISO-8601 de la fiche source
    #[serde(default)]
    pub timestamp: String,

    /// Type de rapport demandé
    #[serde(default)]
    pub report_kind: ReportKind,
}

impl ParcelRecord {
    /// Identifiant cadastral (SMP)
    pub fn parcel_id(&self) -> &str {
        &self.cadastral.parcel_id
    }

    /// Hauteur de base (premier palier), 0 si absente
    pub fn base_height(&self) -> f64 {
        self.buildability
            .max_height_by_tier
            .first()
            .copied()
            .unwrap_or(0.0)
    }

    /// La fiche déclare-t-elle au moins une référence de voisinage ?
    pub fn has_neighbor_reference(&self) -> bool {
        self.cadastral.neighboring_parcel_ids.previous.is_some()
            || self.cadastral.neighboring_parcel_ids.next.is_some()
            || !self.buildability.adjoining_parcel_ids.is_empty()
    }
}

/// Bloc cadastral
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cadastral {
    /// Code SMP (sección-manzana-parcela)
    pub parcel_id: String,

    #[serde(default)]
    pub total_area: Option<f64>,

    #[serde(default)]
    pub covered_area: Option<f64>,

    /// Longueur de façade (m)
    #[serde(default)]
    pub frontage: Option<f64>,

    /// Profondeur (m)
    #[serde(default)]
    pub depth: Option<f64>,

    /// Voisins précédent/suivant le long de l'îlot
    #[serde(default)]
    pub neighboring_parcel_ids: NeighborPair,
}

/// Paire ordonnée de voisins le long de l'îlot
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NeighborPair {
    #[serde(default)]
    pub previous: Option<String>,

    #[serde(default)]
    pub next: Option<String>,
}

impl NeighborPair {
    pub fn new(previous: Option<&str>, next: Option<&str>) -> Self {
        Self {
            previous: previous.map(str::to_string),
            next: next.map(str::to_string),
        }
    }

    /// Vrai si `id` est le voisin précédent ou suivant
    pub fn contains(&self, id: &str) -> bool {
        self.previous.as_deref() == Some(id) || self.next.as_deref() == Some(id)
    }
}

/// Bloc d'édificabilité
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buildability {
    #[serde(default)]
    pub parcel_area: Option<f64>,

    /// Hauteurs maximales par palier, le premier étant la hauteur de base avant retraits
    #[serde(default)]
    pub max_height_by_tier: Vec<f64>,

    /// FOT selon la condition d'exposition
    #[serde(default)]
    pub floor_area_ratio: FloorAreaRatios,

    /// Code de district (CPU) pour la table des taux
    #[serde(default)]
    pub district_tax_code: Option<String>,

    /// Valeur d'incidence (UVA) par m² constructible
    #[serde(default)]
    pub tax_incidence_value: Option<f64>,

    /// Taux d'imposition explicite (%)
    #[serde(default)]
    pub tax_rate_percent: Option<f64>,

    /// Anciennes valeurs d'incidence par type d'exposition
    #[serde(default)]
    pub legacy_incidence: LegacyIncidence,

    #[serde(default)]
    pub adjoining_parcel_ids: Vec<String>,

    /// Pourcentage d'affectation par les lignes LIB/LFI (0-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary_affectation_percent: Option<f64>,
}

/// Coefficients FOT
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorAreaRatios {
    /// Entre murs mitoyens ("medianera"), le seul utilisé par le calcul de plusvalía
    #[serde(default)]
    pub party_wall: Option<f64>,

    /// Perímetro libre
    #[serde(default)]
    pub free_standing: Option<f64>,

    /// Semi libre
    #[serde(default)]
    pub semi_detached: Option<f64>,
}

/// Valeurs `plusvalia_*` héritées, dans l'ordre de repli
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LegacyIncidence {
    #[serde(default)]
    pub plusvalia_em: Option<f64>,

    #[serde(default)]
    pub plusvalia_pl: Option<f64>,

    #[serde(default)]
    pub plusvalia_sl: Option<f64>,
}

/// Collections de features GeoJSON transportées par la fiche
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordGeometry {
    /// Contour de la parcelle
    #[serde(default)]
    pub parcel: Vec<Feature>,

    /// Línea Interna de Basamento
    #[serde(default)]
    pub lib: Vec<Feature>,

    /// Línea de Frente Interno
    #[serde(default)]
    pub lfi: Vec<Feature>,
}

impl RecordGeometry {
    pub fn is_empty(&self) -> bool {
        self.parcel.is_empty() && self.lib.is_empty() && self.lfi.is_empty()
    }

    pub fn feature_count(&self) -> usize {
        self.parcel.len() + self.lib.len() + self.lfi.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Sous-totaux d'une fiche déjà analysée
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub total_buildable_area: f64,
    pub estimated_tax: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    #[default]
    Simple,
    Complete,
}

/// Rapport consolidé ("InformeCompuesto"), jamais persisté indépendamment de ses sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedReport {
    /// Adresses ayant produit le rapport, dans l'ordre de saisie
    pub address_list: Vec<String>,

    /// Fiches sources, dans l'ordre de saisie
    pub source_records: Vec<ParcelRecord>,

    /// Fiche synthétique fusionnée
    pub merged_record: ParcelRecord,
}

impl ConsolidatedReport {
    pub fn parcel_count(&self) -> usize {
        self.source_records.len()
    }
}
