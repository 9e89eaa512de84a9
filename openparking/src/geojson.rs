//! Adaptateur GeoJSON
//!
//! Un flux GeoJSON décrit les parkings d'une ville: une `Feature` par parking,
//! une géométrie `Point` dont les deux composantes sont lues comme (lat, lng),
//! et les métadonnées dans `properties`.

use std::io::Read;

use geojson::feature::Id;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::property::{keys, FeedRecord, PropertyBag};
use crate::types::LotResult;
use crate::FetchError;

/// Collection de parkings décodée depuis un document GeoJSON
#[derive(Debug, Clone, Default)]
pub struct GeoJson {
    pub features: Vec<GeojsonFeature>,
}

/// Une feature GeoJSON vue comme enregistrement de flux
#[derive(Debug, Clone, Default)]
pub struct GeojsonFeature {
    pub id: Option<String>,
    pub properties: PropertyBag,
    /// Composantes de la géométrie (vide pour une géométrie qui n'est pas un point)
    pub geometry: Option<Vec<f64>>,
}

impl GeoJson {
    /// Parse un document GeoJSON (FeatureCollection ou Feature seule).
    ///
    /// Chaque feature est convertie séparément: une feature malformée reste un
    /// problème de ce parking et n'empêche pas le décodage des autres.
    ///
    /// # Errors
    ///
    /// `FetchError::Json` si le texte n'est pas du JSON, `FetchError::Geojson` si
    /// le document n'est pas du GeoJSON, `UnsupportedDocument` pour une géométrie
    /// seule ou une collection sans tableau `features`.
    pub fn parse(text: &str) -> Result<Self, FetchError> {
        let document: JsonValue = serde_json::from_str(text)?;

        let raw_features = match document.get("type").and_then(JsonValue::as_str) {
            Some("FeatureCollection") => match document.get("features") {
                Some(JsonValue::Array(features)) => features.clone(),
                _ => {
                    return Err(FetchError::UnsupportedDocument(
                        "FeatureCollection without a features array".to_string(),
                    ))
                }
            },
            Some("Feature") => vec![document],
            _ => {
                // Ni collection ni feature: le crate geojson tranche entre géométrie et document invalide
                return match geojson::GeoJson::try_from(document)? {
                    geojson::GeoJson::Geometry(_) => Err(FetchError::UnsupportedDocument(
                        "expected a FeatureCollection or a Feature, got a bare Geometry"
                            .to_string(),
                    )),
                    _ => Err(FetchError::UnsupportedDocument(
                        "unexpected GeoJSON document".to_string(),
                    )),
                };
            }
        };

        let features: Vec<GeojsonFeature> = raw_features
            .into_iter()
            .map(GeojsonFeature::from_json)
            .collect();
        debug!(count = features.len(), "Parsed GeoJSON features");

        Ok(Self { features })
    }

    /// Lit puis parse un document GeoJSON
    pub fn from_reader<R: Read>(mut reader: R, origin: &str) -> Result<Self, FetchError> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|source| FetchError::Io {
                path: origin.to_string(),
                source,
            })?;
        Self::parse(&text)
    }

    /// Première feature portant ce nom
    pub fn lot_named(&self, name: &str) -> Option<&GeojsonFeature> {
        self.features
            .iter()
            .find(|feature| feature.properties.string(keys::NAME) == Some(name))
    }

    /// Décode chaque feature, dans l'ordre du document
    pub fn lots(&self) -> Vec<LotResult> {
        self.features.iter().map(FeedRecord::to_lot).collect()
    }
}

impl GeojsonFeature {
    /// Convertit une feature JSON; si le crate geojson la refuse (position trop
    /// courte, coordonnée non numérique...), lecture directe des champs bruts.
    pub fn from_json(value: JsonValue) -> Self {
        match geojson::Feature::try_from(value.clone()) {
            Ok(feature) => Self::from(feature),
            Err(e) => {
                debug!(error = %e, "Malformed GeoJSON feature, reading raw fields");
                Self::from_raw(&value)
            }
        }
    }

    fn from_raw(value: &JsonValue) -> Self {
        let id = match value.get("id") {
            Some(JsonValue::String(s)) => Some(s.clone()),
            Some(JsonValue::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let properties = match value.get("properties") {
            Some(JsonValue::Object(properties)) => PropertyBag::from(properties.clone()),
            _ => PropertyBag::default(),
        };

        // Géométrie présente mais inexploitable: composantes numériques d'un point, sinon vide
        let geometry = value
            .get("geometry")
            .filter(|geometry| !geometry.is_null())
            .map(|geometry| {
                let is_point = geometry.get("type").and_then(JsonValue::as_str) == Some("Point");
                let components: Option<Vec<f64>> = geometry
                    .get("coordinates")
                    .and_then(JsonValue::as_array)
                    .and_then(|coordinates| {
                        coordinates.iter().map(JsonValue::as_f64).collect()
                    });
                match components {
                    Some(components) if is_point => components,
                    _ => Vec::new(),
                }
            });

        Self {
            id,
            properties,
            geometry,
        }
    }
}

impl From<geojson::Feature> for GeojsonFeature {
    fn from(feature: geojson::Feature) -> Self {
        let id = feature.id.map(|id| match id {
            Id::String(s) => s,
            Id::Number(n) => n.to_string(),
        });

        let geometry = feature.geometry.map(|geometry| match geometry.value {
            geojson::Value::Point(position) => position,
            _ => Vec::new(),
        });

        Self {
            id,
            properties: feature.properties.map(PropertyBag::from).unwrap_or_default(),
            geometry,
        }
    }
}

impl FeedRecord for GeojsonFeature {
    fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    fn geometry(&self) -> Option<&[f64]> {
        self.geometry.as_deref()
    }

    fn identifier(&self) -> Option<String> {
        self.id.clone()
    }
}
