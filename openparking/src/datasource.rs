//! Sources de données
//!
//! Une source produit un lot nommé de [`LotResult`]. La récupération est faite une
//! seule fois par passe et entièrement matérialisée avant toute validation.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::geojson::GeoJson;
use crate::types::LotResult;
use crate::FetchError;

/// Capacité "source de données"
pub trait Datasource {
    /// Identifiant utilisé dans les messages d'erreur
    fn name(&self) -> &str;

    /// Récupère et décode les parkings de la source.
    ///
    /// # Errors
    ///
    /// Retourne `FetchError` si la source n'a produit aucun résultat exploitable.
    fn data(&self) -> Result<Vec<LotResult>, FetchError>;
}

/// Origine du document GeoJSON
#[derive(Debug, Clone)]
enum Origin {
    File(PathBuf),
    Inline(String),
}

/// Source adossée à un document GeoJSON, sur disque ou en mémoire
#[derive(Debug, Clone)]
pub struct GeojsonDatasource {
    name: String,
    origin: Origin,
}

impl GeojsonDatasource {
    /// Source lisant un fichier; le nom est le nom du fichier sans extension
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        Self {
            name,
            origin: Origin::File(path.to_path_buf()),
        }
    }

    pub fn from_geojson(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: Origin::Inline(text.into()),
        }
    }

    /// Renomme la source
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Charge le document sans le décoder en parkings
    pub fn document(&self) -> Result<GeoJson, FetchError> {
        match &self.origin {
            Origin::File(path) => {
                let file = std::fs::File::open(path).map_err(|source| FetchError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                GeoJson::from_reader(std::io::BufReader::new(file), &path.display().to_string())
            }
            Origin::Inline(text) => GeoJson::parse(text),
        }
    }
}

impl Datasource for GeojsonDatasource {
    fn name(&self) -> &str {
        &self.name
    }

    fn data(&self) -> Result<Vec<LotResult>, FetchError> {
        debug!(datasource = %self.name, "Fetching GeoJSON");
        let lots = self.document()?.lots();
        info!(datasource = %self.name, lots = lots.len(), "Fetched lots");
        Ok(lots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_path() {
        let source = GeojsonDatasource::from_path(Path::new("/data/feeds/dresden.geojson"));
        assert_eq!(source.name(), "dresden");
        assert_eq!(source.named("Dresden").name(), "Dresden");
    }

    #[test]
    fn test_inline_data() {
        let source = GeojsonDatasource::from_geojson(
            "inline",
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":null,"properties":{"name":"P1","city":"Ulm"}}
            ]}"#,
        );
        let lots = source.data().unwrap();
        assert_eq!(lots.len(), 1);
        assert_eq!(lots[0].as_ref().unwrap().city, "Ulm");
    }

    #[test]
    fn test_missing_file() {
        let source = GeojsonDatasource::from_path(Path::new("/nonexistent/feed.geojson"));
        let err = source.data().unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/feed.geojson"));
    }
}
