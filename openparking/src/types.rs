//! Types de données pour le crate openparking

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use crate::LotError;

/// Résultat du décodage d'un parking: le parking canonique ou la raison de l'échec
pub type LotResult = Result<Lot, LotError>;

/// Position géographique d'un parking
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Valeurs de remplissage (0.0, 1.0) que certains flux mettent à la place d'une vraie position
    pub fn is_placeholder_axis(value: f64) -> bool {
        value == 0.0 || value == 1.0
    }
}

/// Un parking, tel que décodé depuis un flux.
///
/// Construit une seule fois par l'adaptateur, ensuite uniquement lu.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Lot {
    /// Date d'observation du nombre de places disponibles
    pub data_age: Option<DateTime<Utc>>,

    pub name: String,

    /// Présent uniquement si la géométrie source a pu être résolue
    pub coordinates: Option<Coordinates>,

    /// Composantes brutes de la géométrie source.
    ///
    /// `Some` signifie que le flux portait une géométrie (vide si elle n'est pas un point),
    /// ce qui permet de distinguer "pas de géométrie" de "géométrie inexploitable".
    #[serde(skip)]
    pub geometry: Option<Vec<f64>>,

    pub city: String,
    pub region: Option<String>,
    pub address: Option<String>,
    pub available: Available,
    pub capacity: Option<i64>,
    pub state: State,
    pub lot_type: Option<LotType>,
    pub detail_url: Option<Url>,
    pub payment_info: Option<PaymentInfo>,
    pub opening_hours: Option<OpeningHours>,

    /// Avertissement non destiné à être stocké avec le parking,
    /// sert à signaler des incohérences dans les données statiques
    pub warning: Option<String>,

    /// Propriétés du flux hors schéma canonique
    pub additional_information: Option<HashMap<String, serde_json::Value>>,
}

/// Places disponibles: valeur exacte ou intervalle inclusif
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Available {
    Discrete(i64),
    Range { low: i64, high: i64 },
}

impl Default for Available {
    fn default() -> Self {
        Available::Discrete(0)
    }
}

impl fmt::Display for Available {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Available::Discrete(n) => write!(f, "{}", n),
            Available::Range { low, high } => write!(f, "{}-{}", low, high),
        }
    }
}

/// État d'ouverture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Open,
    Closed,
    #[default]
    NoData,
}

impl FromStr for State {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(State::Open),
            "closed" => Ok(State::Closed),
            "nodata" | "no_data" => Ok(State::NoData),
            other => Err(format!("unknown state '{}'", other)),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Open => write!(f, "open"),
            State::Closed => write!(f, "closed"),
            State::NoData => write!(f, "nodata"),
        }
    }
}

/// Type de parking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LotType {
    Lot,
    Structure,
    Underground,
    Street,
}

impl FromStr for LotType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lot" => Ok(LotType::Lot),
            "structure" => Ok(LotType::Structure),
            "underground" => Ok(LotType::Underground),
            "street" => Ok(LotType::Street),
            other => Err(format!("unknown lot type '{}'", other)),
        }
    }
}

impl fmt::Display for LotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LotType::Lot => write!(f, "lot"),
            LotType::Structure => write!(f, "structure"),
            LotType::Underground => write!(f, "underground"),
            LotType::Street => write!(f, "street"),
        }
    }
}

/// Informations tarifaires
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentInfo {
    pub url: Option<Url>,
    pub pricing: Option<String>,
}

/// Horaires d'ouverture
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OpeningHours {
    pub url: Option<Url>,
    pub times: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_axis() {
        assert!(Coordinates::is_placeholder_axis(0.0));
        assert!(Coordinates::is_placeholder_axis(1.0));
        assert!(!Coordinates::is_placeholder_axis(42.1));
        assert!(!Coordinates::is_placeholder_axis(-1.0));
    }

    #[test]
    fn test_state_from_str() {
        assert_eq!("open".parse::<State>(), Ok(State::Open));
        assert_eq!("Closed".parse::<State>(), Ok(State::Closed));
        assert_eq!("no_data".parse::<State>(), Ok(State::NoData));
        assert_eq!("nodata".parse::<State>(), Ok(State::NoData));
        assert!("full".parse::<State>().is_err());
    }

    #[test]
    fn test_lot_type_roundtrip_display() {
        for lot_type in [
            LotType::Lot,
            LotType::Structure,
            LotType::Underground,
            LotType::Street,
        ] {
            assert_eq!(lot_type.to_string().parse::<LotType>(), Ok(lot_type));
        }
        assert!("garage".parse::<LotType>().is_err());
    }

    #[test]
    fn test_defaults() {
        let lot = Lot::default();
        assert_eq!(lot.available, Available::Discrete(0));
        assert_eq!(lot.state, State::NoData);
        assert!(lot.coordinates.is_none());
    }

    #[test]
    fn test_available_display() {
        assert_eq!(Available::Discrete(12).to_string(), "12");
        assert_eq!(Available::Range { low: 10, high: 20 }.to_string(), "10-20");
    }
}
