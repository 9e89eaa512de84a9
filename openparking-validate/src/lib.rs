//! # openparking-validate
//!
//! Validation des flux de parkings avant publication.
//!
//! ## Features
//!
//! - Vérification de chaque parking contre les invariants du modèle
//! - Toutes les violations d'une source en une seule passe
//! - Rapport par source (console ou JSON)
//! - Assertions pour les tests des sources
//! - CLI simple
//!
//! ## Usage CLI
//!
//! ```bash
//! # Valider un flux ou un dossier de flux GeoJSON
//! openparking-validate validate --path ./feeds/dresden.geojson
//! openparking-validate validate --path ./feeds/ --config validation.json --report ./reports/
//!
//! # Lister les parkings décodés
//! openparking-validate list --path ./feeds/dresden.geojson
//! ```

pub mod assertions;
pub mod config;
pub mod report;
pub mod validate;

pub use assertions::{assert_datasource_valid, assert_lot_valid};
pub use config::{Config, ValidationConfig};
pub use report::{ValidationReport, ValidationStatus};
pub use validate::{validate_datasource, validate_lot, Rule, Validator, Violation};
