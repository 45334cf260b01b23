//! Tables de référence injectables (paliers de hauteur, taux par district)
//!
//! Les valeurs par défaut reprennent le Código Urbanístico de Buenos Aires ;
//! elles peuvent être remplacées par un fichier JSON sans toucher aux formules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Libellé retourné quand aucune bande ne correspond
pub const UNCLASSIFIED: &str = "unclassified";

/// Hauteur d'étage type (m)
pub const DEFAULT_FLOOR_HEIGHT: f64 = 3.0;

/// Surface forfaitaire déduite pour les patios de lumière (m²)
pub const DEFAULT_PATIO_ADJUSTMENT: f64 = 16.0;

/// Bande de classification : hauteur minimale -> libellé
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeightTier {
    pub min_height: f64,
    pub label: String,
}

impl HeightTier {
    pub fn new(min_height: f64, label: impl Into<String>) -> Self {
        Self {
            min_height,
            label: label.into(),
        }
    }
}

/// Tables utilisées par les calculs de capacité et de plusvalía
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculationTables {
    pub floor_height: f64,
    pub patio_adjustment: f64,
    pub height_tiers: Vec<HeightTier>,
    pub district_tax_rates: BTreeMap<String, f64>,
}

impl Default for CalculationTables {
    fn default() -> Self {
        let height_tiers = vec![
            HeightTier::new(38.0, "Corredor Alto (PB + 12 plantas + 2 retiros)"),
            HeightTier::new(31.2, "Corredor Medio (PB + 10 plantas + 2 retiros)"),
            HeightTier::new(22.8, "USAA (PB + 7 plantas + 2 retiros)"),
            HeightTier::new(16.5, "USAM (PB + 5 plantas + 2 retiros)"),
            HeightTier::new(11.6, "USAB 2 (PB + 3 plantas + 2 retiros)"),
            HeightTier::new(9.0, "USAB 1 (PB + 2 plantas + 1 retiro)"),
        ];

        let district_tax_rates = [("A1", 35.0), ("A2", 25.0), ("A3", 20.0), ("A4", 10.0)]
            .into_iter()
            .map(|(code, rate)| (code.to_string(), rate))
            .collect();

        Self {
            floor_height: DEFAULT_FLOOR_HEIGHT,
            patio_adjustment: DEFAULT_PATIO_ADJUSTMENT,
            height_tiers,
            district_tax_rates,
        }
    }
}

impl CalculationTables {
    /// Libellé de la bande la plus haute dont le minimum est atteint
    ///
    /// L'ordre de déclaration des bandes dans la table est sans effet.
    pub fn classify(&self, height: f64) -> &str {
        self.height_tiers
            .iter()
            .filter(|tier| height >= tier.min_height)
            .max_by(|a, b| a.min_height.total_cmp(&b.min_height))
            .map(|tier| tier.label.as_str())
            .unwrap_or(UNCLASSIFIED)
    }

    /// Taux (%) associé à un code de district, `None` si inconnu
    pub fn tax_rate_for(&self, district_code: &str) -> Option<f64> {
        self.district_tax_rates.get(district_code.trim()).copied()
    }

    /// Liste les incohérences de la table (vide si utilisable)
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if !self.floor_height.is_finite() || self.floor_height <= 0.0 {
            problems.push(format!("floorHeight must be > 0 (got {})", self.floor_height));
        }
        if !self.patio_adjustment.is_finite() || self.patio_adjustment < 0.0 {
            problems.push(format!(
                "patioAdjustment must be >= 0 (got {})",
                self.patio_adjustment
            ));
        }
        for tier in &self.height_tiers {
            if !tier.min_height.is_finite() || tier.min_height < 0.0 {
                problems.push(format!("invalid minHeight for tier '{}'", tier.label));
            }
        }
        for (code, rate) in &self.district_tax_rates {
            if !(0.0..=100.0).contains(rate) {
                problems.push(format!("tax rate for district {} out of range: {}", code, rate));
            }
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bands() {
        let tables = CalculationTables::default();
        assert_eq!(tables.classify(22.8), "USAA (PB + 7 plantas + 2 retiros)");
        assert_eq!(tables.classify(25.0), "USAA (PB + 7 plantas + 2 retiros)");
        assert_eq!(tables.classify(40.0), "Corredor Alto (PB + 12 plantas + 2 retiros)");
        assert_eq!(tables.classify(9.0), "USAB 1 (PB + 2 plantas + 1 retiro)");
        assert_eq!(tables.classify(8.99), UNCLASSIFIED);
        assert_eq!(tables.classify(0.0), UNCLASSIFIED);
    }

    #[test]
    fn test_classify_ignores_declaration_order() {
        let mut tables = CalculationTables::default();
        tables.height_tiers.reverse();
        assert_eq!(tables.classify(17.0), "USAM (PB + 5 plantas + 2 retiros)");
    }

    #[test]
    fn test_tax_rate_lookup() {
        let tables = CalculationTables::default();
        assert_eq!(tables.tax_rate_for("A2"), Some(25.0));
        assert_eq!(tables.tax_rate_for(" A1 "), Some(35.0));
        assert_eq!(tables.tax_rate_for("Z9"), None);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tables: CalculationTables = serde_json::from_str(r#"{"floorHeight": 2.9}"#).unwrap();
        assert_eq!(tables.floor_height, 2.9);
        assert_eq!(tables.patio_adjustment, DEFAULT_PATIO_ADJUSTMENT);
        assert_eq!(tables.district_tax_rates.len(), 4);
    }

    #[test]
    fn test_problems() {
        assert!(CalculationTables::default().problems().is_empty());

        let tables = CalculationTables {
            floor_height: 0.0,
            ..Default::default()
        };
        assert_eq!(tables.problems().len(), 1);
    }
}
