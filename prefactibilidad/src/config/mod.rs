//! Configuration des tables de calcul

use std::path::Path;

use anyhow::{Context, Result};
use informe::CalculationTables;

/// Variable d'environnement donnant le preset ou le fichier de tables par défaut
pub const TABLES_ENV: &str = "PREFACTIBILIDAD_TABLES";

/// Preset utilisé quand rien n'est précisé
pub const DEFAULT_PRESET: &str = "caba";

/// Configuration principale
#[derive(Debug, Clone)]
pub struct Config {
    /// Tables injectées dans le calculateur
    pub tables: CalculationTables,

    /// Origine des tables (nom de preset ou chemin), reportée dans le rapport
    pub source: String,
}

impl Config {
    /// Charge une configuration depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read tables file: {}", path.display()))?;

        let tables: CalculationTables =
            serde_json::from_str(&content).context("Failed to parse tables JSON")?;

        Self::checked(tables, path.display().to_string())
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        let json = match preset {
            "caba" => include_str!("presets/caba.json"),
            "caba-sin-patio" => include_str!("presets/caba-sin-patio.json"),
            _ => anyhow::bail!("Unknown preset: {}. Use: caba, caba-sin-patio", preset),
        };

        let tables: CalculationTables =
            serde_json::from_str(json).context("Failed to parse embedded tables")?;
        Self::checked(tables, preset.to_string())
    }

    /// Résout `--tables` : preset, sinon chemin ; à défaut la variable
    /// d'environnement, puis le preset par défaut
    pub fn resolve(choice: Option<&str>) -> Result<Self> {
        let choice = match choice {
            Some(choice) => choice.to_string(),
            None => std::env::var(TABLES_ENV).unwrap_or_else(|_| DEFAULT_PRESET.to_string()),
        };

        if Self::is_preset(&choice) {
            Self::from_preset(&choice)
        } else {
            Self::load(Path::new(&choice))
        }
    }

    fn is_preset(name: &str) -> bool {
        matches!(name, "caba" | "caba-sin-patio")
    }

    fn checked(tables: CalculationTables, source: String) -> Result<Self> {
        let problems = tables.problems();
        if !problems.is_empty() {
            anyhow::bail!("Invalid tables ({}): {}", source, problems.join("; "));
        }
        Ok(Self { tables, source })
    }
}
