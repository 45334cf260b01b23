//! Validation de la contiguïté d'un lot de parcelles
//!
//! Le contrôle est une chaîne : chaque parcelle doit toucher celle qui la suit
//! dans l'ordre de saisie. La connexité globale du graphe n'est pas exigée.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::types::ParcelRecord;
use crate::InformeError;

/// Graphe non orienté de voisinage, restreint aux parcelles du lot
#[derive(Debug, Default)]
pub struct AdjacencyGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl AdjacencyGraph {
    /// Construit le graphe à partir des références déclarées par les fiches
    ///
    /// Arêtes retenues :
    /// - voisin précédent/suivant déclaré par l'une ou l'autre des deux fiches
    /// - appartenance mutuelle aux listes `adjoiningParcelIds`
    ///
    /// Les références vers des parcelles hors du lot sont ignorées.
    pub fn build(records: &[ParcelRecord]) -> Self {
        let ids: BTreeSet<&str> = records.iter().map(|r| r.parcel_id()).collect();
        let mut graph = Self::default();

        for id in &ids {
            graph.edges.entry(id.to_string()).or_default();
        }

        for record in records {
            let id = record.parcel_id();
            let pair = &record.cadastral.neighboring_parcel_ids;

            for neighbor in [pair.previous.as_deref(), pair.next.as_deref()]
                .into_iter()
                .flatten()
            {
                if neighbor != id && ids.contains(neighbor) {
                    graph.add_edge(id, neighbor);
                }
            }
        }

        for (i, a) in records.iter().enumerate() {
            for b in &records[i + 1..] {
                if mutually_adjoining(a, b) {
                    graph.add_edge(a.parcel_id(), b.parcel_id());
                }
            }
        }

        graph
    }

    fn add_edge(&mut self, a: &str, b: &str) {
        self.edges
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
        self.edges
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());
    }

    pub fn are_adjacent(&self, a: &str, b: &str) -> bool {
        self.edges.get(a).is_some_and(|n| n.contains(b))
    }

    /// Voisins d'une parcelle dans le lot (ordre lexicographique)
    pub fn neighbors(&self, id: &str) -> impl Iterator<Item = &str> {
        self.edges
            .get(id)
            .into_iter()
            .flat_map(|n| n.iter().map(String::as_str))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum::<usize>() / 2
    }
}

fn mutually_adjoining(a: &ParcelRecord, b: &ParcelRecord) -> bool {
    let a_lists_b = a
        .buildability
        .adjoining_parcel_ids
        .iter()
        .any(|id| id == b.parcel_id());
    let b_lists_a = b
        .buildability
        .adjoining_parcel_ids
        .iter()
        .any(|id| id == a.parcel_id());
    a_lists_b && b_lists_a
}

/// Vérifie qu'un lot forme une chaîne de parcelles contiguës
///
/// # Errors
///
/// - `EmptyBatch` si le lot est vide
/// - `DuplicateParcel` si un SMP apparaît deux fois
/// - `MissingAdjacencyData` si une parcelle n'a aucune référence de voisinage (lot ≥ 2)
/// - `NotAdjacent` pour la première paire consécutive non contiguë
pub fn validate(records: &[ParcelRecord]) -> Result<(), InformeError> {
    if records.is_empty() {
        return Err(InformeError::EmptyBatch);
    }

    let mut seen = BTreeSet::new();
    for record in records {
        if !seen.insert(record.parcel_id()) {
            return Err(InformeError::DuplicateParcel {
                parcel_id: record.parcel_id().to_string(),
            });
        }
    }

    if records.len() == 1 {
        return Ok(());
    }

    if let Some(record) = records.iter().find(|r| !r.has_neighbor_reference()) {
        return Err(InformeError::missing_adjacency(record.parcel_id()));
    }

    let graph = AdjacencyGraph::build(records);
    debug!(
        parcels = records.len(),
        edges = graph.edge_count(),
        "Adjacency graph built"
    );

    for pair in records.windows(2) {
        let (a, b) = (pair[0].parcel_id(), pair[1].parcel_id());
        if !graph.are_adjacent(a, b) {
            return Err(InformeError::not_adjacent(a, b));
        }
    }

    Ok(())
}
