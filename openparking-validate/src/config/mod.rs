//! Configuration de la validation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};

/// Règles à assouplir pour une source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Ne pas vérifier la cohérence disponibilité / capacité
    pub ignore_exceeded_capacity: bool,

    /// Ne pas vérifier que l'âge des données est dans le passé
    pub ignore_data_age: bool,
}

impl ValidationConfig {
    /// Combine deux configurations: une règle assouplie d'un côté l'est pour le résultat
    pub fn merge(self, other: ValidationConfig) -> Self {
        Self {
            ignore_exceeded_capacity: self.ignore_exceeded_capacity
                || other.ignore_exceeded_capacity,
            ignore_data_age: self.ignore_data_age || other.ignore_data_age,
        }
    }
}

/// Configuration principale
///
/// ```json
/// {
///   "defaults": { "ignore_data_age": false },
///   "datasources": { "dresden": { "ignore_exceeded_capacity": true } }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Configuration appliquée aux sources sans entrée dédiée
    #[serde(default)]
    pub defaults: ValidationConfig,

    /// Configuration par nom de source
    #[serde(default)]
    pub datasources: HashMap<String, ValidationConfig>,
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse config JSON")
    }

    /// Récupère la configuration d'une source
    pub fn for_datasource(&self, name: &str) -> ValidationConfig {
        self.datasources.get(name).copied().unwrap_or(self.defaults)
    }
}
