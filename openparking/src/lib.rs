//! # openparking
//!
//! Modèle canonique des parkings et adaptateurs de flux.
//!
//! ## Features
//!
//! - Modèle [`Lot`] immuable (position, capacité, disponibilité, tarifs, horaires)
//! - Contrat d'adaptation [`FeedRecord`] depuis un sac de propriétés faiblement typées
//! - Adaptateur GeoJSON basé sur le crate `geojson`
//! - Capacité [`Datasource`] et source GeoJSON (fichier ou mémoire)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use openparking::{Datasource, GeojsonDatasource};
//! use std::path::Path;
//!
//! let source = GeojsonDatasource::from_path(Path::new("dresden.geojson"));
//! for lot in source.data()? {
//!     match lot {
//!         Ok(lot) => println!("{}: {} places", lot.name, lot.available),
//!         Err(e) => eprintln!("{}", e),
//!     }
//! }
//! ```

pub mod datasource;
pub mod error;
pub mod geojson;
pub mod property;
pub mod types;
pub mod warning;

pub use crate::datasource::{Datasource, GeojsonDatasource};
pub use crate::error::{FetchError, LotError};
pub use crate::geojson::{GeoJson, GeojsonFeature};
pub use crate::property::{FeedRecord, PropertyBag};
pub use crate::types::{
    Available, Coordinates, Lot, LotResult, LotType, OpeningHours, PaymentInfo, State,
};
pub use crate::warning::Warnings;
