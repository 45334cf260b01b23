//! Export GeoJSON des géométries d'une fiche (individuelle ou consolidée)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection};

use informe::ParcelRecord;

/// Aplatit les couches de la fiche en features étiquetées
///
/// Chaque feature reçoit les propriétés `layer` (`parcel`, `lib`, `lfi`) et
/// `parcelId`, les autres propriétés d'origine étant conservées.
pub fn layered_features(record: &ParcelRecord) -> Vec<Feature> {
    let layers = [
        ("parcel", &record.geometry.parcel),
        ("lib", &record.geometry.lib),
        ("lfi", &record.geometry.lfi),
    ];

    layers
        .into_iter()
        .flat_map(|(layer, features)| {
            features.iter().cloned().map(move |mut feature| {
                feature.set_property("layer", layer);
                feature.set_property("parcelId", record.parcel_id());
                feature
            })
        })
        .collect()
}

/// Écrit la FeatureCollection de la fiche et retourne le nombre de features
pub fn export_to_geojson(record: &ParcelRecord, output_path: &Path) -> Result<usize> {
    let collection = FeatureCollection {
        bbox: None,
        features: layered_features(record),
        foreign_members: None,
    };

    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, &collection).context("Failed to write GeoJSON")?;
    writer.flush()?;

    Ok(collection.features.len())
}
