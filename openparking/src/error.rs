//! Types d'erreurs pour le crate openparking

use thiserror::Error;

/// Échec de décodage d'un parking.
///
/// Non fatal: le parking concerné est écarté, le reste du lot continue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LotError {
    /// Métadonnées introuvables pour le parking
    #[error("missing metadata for {lot}")]
    MissingMetadata { lot: String },

    /// Champ de métadonnées obligatoire absent
    #[error("{lot} metadata missing expected field {field}")]
    MissingMetadataField { field: String, lot: String },

    #[error("lot failed: {reason}")]
    Other { reason: String },
}

impl LotError {
    /// Crée une erreur de champ manquant avec contexte
    pub fn missing_field(field: impl Into<String>, lot: impl Into<String>) -> Self {
        Self::MissingMetadataField {
            field: field.into(),
            lot: lot.into(),
        }
    }

    pub fn other(reason: impl Into<String>) -> Self {
        Self::Other {
            reason: reason.into(),
        }
    }
}

/// Erreurs pouvant survenir lors de la récupération des données d'une source
#[derive(Debug, Error)]
pub enum FetchError {
    /// Erreur d'I/O lors de la lecture du flux
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Texte qui n'est pas du JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// GeoJSON invalide
    #[error("Invalid GeoJSON: {0}")]
    Geojson(#[from] geojson::Error),

    /// Document valide mais inexploitable (ex: une géométrie seule)
    #[error("Unsupported document: {0}")]
    UnsupportedDocument(String),

    #[error("{0}")]
    Other(String),
}
