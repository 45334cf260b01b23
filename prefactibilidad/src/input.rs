//! Lecture des fiches JSON

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use informe::ParcelRecord;

/// Charge une fiche depuis un fichier JSON
pub fn load_record(path: &Path) -> Result<ParcelRecord> {
    let content = std::fs::read_to_string(path)
        .context(format!("Failed to read record: {}", path.display()))?;

    let record: ParcelRecord = serde_json::from_str(&content)
        .context(format!("Failed to parse record JSON: {}", path.display()))?;

    if record.cadastral.parcel_id.trim().is_empty() {
        anyhow::bail!("Record without cadastral.parcelId: {}", path.display());
    }

    Ok(record)
}

/// Développe les chemins : un répertoire donne ses fichiers `*.json`, triés
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(path)
                .context(format!("Failed to read directory: {}", path.display()))?
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            found.sort();
            inputs.extend(found);
        } else {
            inputs.push(path.clone());
        }
    }

    if inputs.is_empty() {
        anyhow::bail!("No record files found");
    }

    Ok(inputs)
}

/// Nom court d'un fichier pour les rapports
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
