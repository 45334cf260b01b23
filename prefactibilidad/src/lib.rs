//! # prefactibilidad
//!
//! Rapports de préfaisabilité (capacité constructible et plusvalía) pour une
//! parcelle ou un regroupement de parcelles contiguës, à partir de fiches JSON.
//!
//! ## Features
//!
//! - Tables de calcul injectables (presets embarqués ou fichier JSON)
//! - Analyse parallèle de nombreuses fiches
//! - Consolidation validée de parcelles contiguës
//! - Rapport d'exécution avec empreinte déterministe des entrées
//! - Export GeoJSON des géométries
//!
//! ## Usage CLI
//!
//! ```bash
//! # Analyse d'une ou plusieurs fiches (fichiers ou répertoires)
//! prefactibilidad analyze --input ./fiches/ --output rapport.json
//!
//! # Consolidation de parcelles contiguës
//! prefactibilidad consolidate --input a.json --input b.json \
//!     --address "Av. Santa Fe 3201" --address "Av. Santa Fe 3211"
//!
//! # Export GeoJSON (fiche consolidée si plusieurs entrées)
//! prefactibilidad export --input a.json --input b.json --output lote.geojson
//! ```

pub mod config;
pub mod export;
pub mod input;
pub mod report;

pub use config::Config;
pub use report::{RunReport, RunStatus};
