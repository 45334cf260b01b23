//! Types d'erreurs pour le crate informe

use serde::Serialize;
use thiserror::Error;

/// Erreurs de validation et de consolidation d'un lot de parcelles
///
/// Sérialisée avec un champ `kind` pour que la couche de présentation
/// puisse afficher un message dédié à chaque cas.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind")]
pub enum InformeError {
    /// Consolidation demandée sans aucune parcelle
    #[error("Empty batch: at least one parcel is required")]
    EmptyBatch,

    /// Parcelle sans aucune référence de voisinage
    #[error("Missing adjacency data for parcel {parcel_id}")]
    MissingAdjacencyData { parcel_id: String },

    /// Deux parcelles consécutives ne sont pas contiguës
    #[error("Parcels {first} and {second} are not adjacent")]
    NotAdjacent { first: String, second: String },

    /// Même SMP présent deux fois dans le lot
    #[error("Duplicate parcel {parcel_id} in batch")]
    DuplicateParcel { parcel_id: String },

    /// Liste d'adresses non alignée sur les fiches
    #[error("{addresses} addresses given for {records} records")]
    AddressMismatch { addresses: usize, records: usize },
}

impl InformeError {
    pub fn missing_adjacency(parcel_id: impl Into<String>) -> Self {
        Self::MissingAdjacencyData {
            parcel_id: parcel_id.into(),
        }
    }

    pub fn not_adjacent(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self::NotAdjacent {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Nom stable du type d'erreur (identique au champ `kind` sérialisé)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyBatch => "EmptyBatch",
            Self::MissingAdjacencyData { .. } => "MissingAdjacencyData",
            Self::NotAdjacent { .. } => "NotAdjacent",
            Self::DuplicateParcel { .. } => "DuplicateParcel",
            Self::AddressMismatch { .. } => "AddressMismatch",
        }
    }
}
