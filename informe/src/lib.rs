//! # informe
//!
//! Noyau de calcul des rapports de préfaisabilité urbaine (Buenos Aires) :
//! capacité constructible et plusvalía (DDHUS) d'une parcelle ou d'un
//! regroupement de parcelles contiguës.
//!
//! ## Features
//!
//! - Validation de contiguïté d'un lot (chaîne dans l'ordre de saisie)
//! - Consolidation de N fiches en une fiche synthétique
//! - Capacité constructible (étages, retraits, affectation LIB/LFI)
//! - Estimation de la plusvalía (A1, A2, A × B, taux)
//! - Mesures géométriques LIB/LFI avec les types `geo`
//!
//! Toutes les fonctions sont pures et déterministes : aucune I/O, aucune
//! horloge, aucun état partagé.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use informe::{Calculator, ParcelRecord};
//!
//! let record: ParcelRecord = serde_json::from_str(&json)?;
//! let analysis = Calculator::default().analyze(&record, None);
//! println!("{}", analysis.capacity.building_type_label);
//! println!("Plusvalía estimée: {:.2}", analysis.plusvalia.estimated_tax);
//! ```

pub mod adjacency;
pub mod analysis;
pub mod boundary;
pub mod capacity;
pub mod completeness;
pub mod consolidate;
pub mod error;
pub mod plusvalia;
pub mod tables;
pub mod types;

pub use analysis::{Analysis, BatchAnalysis, Calculator};
pub use capacity::CapacityResult;
pub use completeness::MissingField;
pub use error::InformeError;
pub use plusvalia::PlusvaliaResult;
pub use tables::{CalculationTables, HeightTier};
pub use types::{ConsolidatedReport, ParcelRecord};
