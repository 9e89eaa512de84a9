//! Sac de propriétés et contrat d'adaptation d'un enregistrement de flux vers un [`Lot`]
//!
//! Chaque format de flux (GeoJSON, ...) fournit un enregistrement qui expose ses
//! propriétés sous forme de [`PropertyBag`] et, éventuellement, les composantes de
//! sa géométrie. Le décodage vers le modèle canonique est ensuite commun: un
//! accesseur explicite par champ connu, le reste part dans `additional_information`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use url::Url;

use crate::types::{Available, Coordinates, Lot, LotResult, LotType, OpeningHours, PaymentInfo, State};
use crate::{LotError, Warnings};

/// Clés des propriétés du schéma canonique
pub mod keys {
    pub const NAME: &str = "name";
    pub const CITY: &str = "city";
    pub const REGION: &str = "region";
    pub const ADDRESS: &str = "address";
    pub const CAPACITY: &str = "capacity";
    pub const AVAILABLE: &str = "available";
    pub const AVAILABLE_LOW: &str = "available_low";
    pub const AVAILABLE_HIGH: &str = "available_high";
    pub const STATE: &str = "state";
    pub const TYPE: &str = "type";
    pub const URL: &str = "url";
    pub const PAYMENT_URL: &str = "payment_url";
    pub const PRICING: &str = "pricing";
    pub const OPENING_HOURS_URL: &str = "opening_hours_url";
    pub const OPENING_HOURS: &str = "opening_hours";
    pub const DATA_AGE: &str = "data_age";
    pub const WARNING: &str = "warning";

    /// Toutes les clés consommées par le décodage
    pub const CANONICAL: &[&str] = &[
        NAME,
        CITY,
        REGION,
        ADDRESS,
        CAPACITY,
        AVAILABLE,
        AVAILABLE_LOW,
        AVAILABLE_HIGH,
        STATE,
        TYPE,
        URL,
        PAYMENT_URL,
        PRICING,
        OPENING_HOURS_URL,
        OPENING_HOURS,
        DATA_AGE,
        WARNING,
    ];
}

/// Propriétés faiblement typées d'un enregistrement.
///
/// Les accesseurs retournent `None` aussi bien pour une clé absente que pour
/// une valeur du mauvais type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    properties: Map<String, Value>,
}

impl From<Map<String, Value>> for PropertyBag {
    fn from(properties: Map<String, Value>) -> Self {
        Self { properties }
    }
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute une propriété (construction uniquement)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.properties.get(key)?.as_str()
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        self.properties.get(key)?.as_i64()
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        self.properties.get(key)?.as_f64()
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        self.properties.get(key)?.as_bool()
    }

    /// Interprète une propriété chaîne comme URL absolue
    pub fn url(&self, key: &str) -> Option<Url> {
        Url::parse(self.string(key)?).ok()
    }

    /// Interprète une propriété chaîne comme horodatage RFC 3339
    pub fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.string(key)?)
            .ok()
            .map(|date| date.with_timezone(&Utc))
    }

    /// Propriétés hors de `known`, `None` s'il n'en reste aucune
    pub fn extras(&self, known: &[&str]) -> Option<HashMap<String, Value>> {
        let extras: HashMap<String, Value> = self
            .properties
            .iter()
            .filter(|(key, _)| !known.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if extras.is_empty() {
            None
        } else {
            Some(extras)
        }
    }
}

/// Contrat d'un enregistrement de flux décodable en [`Lot`].
///
/// Seuls `properties` et `geometry` sont à fournir par le format; le décodage
/// est pur: la même entrée donne toujours le même résultat.
pub trait FeedRecord {
    fn properties(&self) -> &PropertyBag;

    /// Composantes de la géométrie source, `None` si le flux n'en porte pas
    fn geometry(&self) -> Option<&[f64]>;

    /// Identifiant de l'enregistrement dans le flux, utilisé quand le nom manque
    fn identifier(&self) -> Option<String> {
        None
    }

    /// Nom du parking, obligatoire
    fn name(&self) -> Result<&str, LotError> {
        self.properties().string(keys::NAME).ok_or_else(|| {
            LotError::missing_field(
                keys::NAME,
                self.identifier().unwrap_or_else(|| "unknown".to_string()),
            )
        })
    }

    /// Position: uniquement pour une géométrie à exactement deux composantes (lat, lng)
    fn coordinates(&self) -> Option<Coordinates> {
        match self.geometry()? {
            [latitude, longitude] => Some(Coordinates::new(*latitude, *longitude)),
            _ => None,
        }
    }

    fn city(&self) -> Option<&str> {
        self.properties().string(keys::CITY)
    }

    fn region(&self) -> Option<&str> {
        self.properties().string(keys::REGION)
    }

    fn address(&self) -> Option<&str> {
        self.properties().string(keys::ADDRESS)
    }

    fn capacity(&self) -> Option<i64> {
        self.properties().integer(keys::CAPACITY)
    }

    /// `available` entier, ou bien l'intervalle `available_low`..=`available_high`
    fn available(&self) -> Option<Available> {
        let properties = self.properties();
        if let Some(count) = properties.integer(keys::AVAILABLE) {
            return Some(Available::Discrete(count));
        }
        match (
            properties.integer(keys::AVAILABLE_LOW),
            properties.integer(keys::AVAILABLE_HIGH),
        ) {
            (Some(low), Some(high)) => Some(Available::Range { low, high }),
            _ => None,
        }
    }

    fn state(&self) -> Option<State> {
        self.properties().string(keys::STATE)?.parse().ok()
    }

    fn lot_type(&self) -> Option<LotType> {
        self.properties().string(keys::TYPE)?.parse().ok()
    }

    fn detail_url(&self) -> Option<Url> {
        self.properties().url(keys::URL)
    }

    /// Présent dès que l'une des clés tarifaires figure dans le flux
    fn payment_info(&self) -> Option<PaymentInfo> {
        let properties = self.properties();
        if !properties.contains(keys::PAYMENT_URL) && !properties.contains(keys::PRICING) {
            return None;
        }
        Some(PaymentInfo {
            url: properties.url(keys::PAYMENT_URL),
            pricing: properties.string(keys::PRICING).map(str::to_string),
        })
    }

    /// Présent dès que l'une des clés d'horaires figure dans le flux
    fn opening_hours(&self) -> Option<OpeningHours> {
        let properties = self.properties();
        if !properties.contains(keys::OPENING_HOURS_URL) && !properties.contains(keys::OPENING_HOURS)
        {
            return None;
        }
        Some(OpeningHours {
            url: properties.url(keys::OPENING_HOURS_URL),
            times: properties.string(keys::OPENING_HOURS).map(str::to_string),
        })
    }

    fn data_age(&self) -> Option<DateTime<Utc>> {
        self.properties().timestamp(keys::DATA_AGE)
    }

    /// Décode l'enregistrement en parking canonique.
    ///
    /// # Errors
    ///
    /// `MissingMetadataField` si `name` ou `city` manque.
    fn to_lot(&self) -> LotResult {
        let name = self.name()?;
        let city = self
            .city()
            .ok_or_else(|| LotError::missing_field(keys::CITY, name))?;
        let properties = self.properties();

        // Incohérences du flux: signalées sur le parking, jamais bloquantes
        let mut warnings = Warnings::new();
        if let Some(warning) = properties.string(keys::WARNING) {
            warnings.push(warning);
        }
        if let Some(raw) = properties.string(keys::TYPE) {
            if self.lot_type().is_none() {
                warnings.push(format!("unknown lot type '{}'", raw));
            }
        }
        if let Some(raw) = properties.string(keys::STATE) {
            if self.state().is_none() {
                warnings.push(format!("unknown state '{}'", raw));
            }
        }
        for key in [keys::URL, keys::PAYMENT_URL, keys::OPENING_HOURS_URL] {
            if let Some(raw) = properties.string(key) {
                if properties.url(key).is_none() {
                    warnings.push(format!("property '{}' is not a valid URL: '{}'", key, raw));
                }
            }
        }
        if let Some(raw) = properties.string(keys::DATA_AGE) {
            if self.data_age().is_none() {
                warnings.push(format!("property 'data_age' is not a RFC 3339 date: '{}'", raw));
            }
        }

        let state = self.state().unwrap_or_default();
        let available = match self.available() {
            Some(available) => available,
            None => {
                if state == State::Open {
                    warnings.push("lot is open but reports no availability");
                }
                Available::default()
            }
        };

        let warning = if warnings.is_empty() {
            None
        } else {
            Some(warnings.flush().join("; "))
        };

        Ok(Lot {
            data_age: self.data_age(),
            name: name.to_string(),
            coordinates: self.coordinates(),
            geometry: self.geometry().map(<[f64]>::to_vec),
            city: city.to_string(),
            region: self.region().map(str::to_string),
            address: self.address().map(str::to_string),
            available,
            capacity: self.capacity(),
            state,
            lot_type: self.lot_type(),
            detail_url: self.detail_url(),
            payment_info: self.payment_info(),
            opening_hours: self.opening_hours(),
            warning,
            additional_information: properties.extras(keys::CANONICAL),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Record {
        properties: PropertyBag,
        geometry: Option<Vec<f64>>,
    }

    impl FeedRecord for Record {
        fn properties(&self) -> &PropertyBag {
            &self.properties
        }

        fn geometry(&self) -> Option<&[f64]> {
            self.geometry.as_deref()
        }
    }

    fn record(properties: PropertyBag, geometry: Option<Vec<f64>>) -> Record {
        Record {
            properties,
            geometry,
        }
    }

    #[test]
    fn test_typed_getters_ignore_mismatch() {
        let bag = PropertyBag::new()
            .with("capacity", "lots")
            .with("city", 12)
            .with("ratio", 0.5)
            .with("covered", true);

        assert_eq!(bag.integer("capacity"), None);
        assert_eq!(bag.string("city"), None);
        assert_eq!(bag.float("ratio"), Some(0.5));
        assert_eq!(bag.boolean("covered"), Some(true));
        assert_eq!(bag.string("missing"), None);
    }

    #[test]
    fn test_url_getter() {
        let bag = PropertyBag::new()
            .with("good", "https://example.org/parking")
            .with("relative", "/parking")
            .with("number", 3);

        assert_eq!(
            bag.url("good").map(|u| u.to_string()),
            Some("https://example.org/parking".to_string())
        );
        assert_eq!(bag.url("relative"), None);
        assert_eq!(bag.url("number"), None);
    }

    #[test]
    fn test_extras() {
        let bag = PropertyBag::new()
            .with("name", "P1")
            .with("operator", "Stadtwerke");

        let extras = bag.extras(keys::CANONICAL).unwrap();
        assert_eq!(extras.len(), 1);
        assert_eq!(extras.get("operator"), Some(&json!("Stadtwerke")));
        assert!(PropertyBag::new().with("name", "P1").extras(keys::CANONICAL).is_none());
    }

    #[test]
    fn test_missing_name() {
        let result = record(PropertyBag::new().with("city", "Dresden"), None).to_lot();
        assert_eq!(result, Err(LotError::missing_field("name", "unknown")));
    }

    #[test]
    fn test_missing_city() {
        let result = record(PropertyBag::new().with("name", "Altmarkt"), None).to_lot();
        assert_eq!(result, Err(LotError::missing_field("city", "Altmarkt")));
    }

    #[test]
    fn test_coordinates_need_two_components() {
        let bag = PropertyBag::new().with("name", "P1").with("city", "Dresden");
        let two = record(bag.clone(), Some(vec![51.05, 13.74]));
        let three = record(bag.clone(), Some(vec![51.05, 13.74, 120.0]));
        let none = record(bag, None);

        assert_eq!(two.coordinates(), Some(Coordinates::new(51.05, 13.74)));
        assert_eq!(three.coordinates(), None);
        assert_eq!(none.coordinates(), None);
    }

    #[test]
    fn test_to_lot_full() {
        let bag = PropertyBag::new()
            .with("name", "Altmarkt")
            .with("city", "Dresden")
            .with("region", "Innere Altstadt")
            .with("address", "Altmarkt 1")
            .with("capacity", 400)
            .with("available", 120)
            .with("state", "open")
            .with("type", "underground")
            .with("url", "https://example.org/altmarkt")
            .with("pricing", "2 EUR/h")
            .with("opening_hours", "24/7")
            .with("data_age", "2024-05-01T12:00:00Z")
            .with("operator", "APCOA");
        let lot = record(bag, Some(vec![51.05, 13.74])).to_lot().unwrap();

        assert_eq!(lot.name, "Altmarkt");
        assert_eq!(lot.city, "Dresden");
        assert_eq!(lot.region.as_deref(), Some("Innere Altstadt"));
        assert_eq!(lot.available, Available::Discrete(120));
        assert_eq!(lot.capacity, Some(400));
        assert_eq!(lot.state, State::Open);
        assert_eq!(lot.lot_type, Some(LotType::Underground));
        assert_eq!(lot.coordinates, Some(Coordinates::new(51.05, 13.74)));
        assert_eq!(lot.payment_info.unwrap().pricing.as_deref(), Some("2 EUR/h"));
        assert_eq!(lot.opening_hours.unwrap().times.as_deref(), Some("24/7"));
        assert!(lot.data_age.is_some());
        assert!(lot.warning.is_none());
        assert_eq!(
            lot.additional_information.unwrap().get("operator"),
            Some(&json!("APCOA"))
        );
    }

    #[test]
    fn test_to_lot_range_and_warnings() {
        let bag = PropertyBag::new()
            .with("name", "Messe")
            .with("city", "Leipzig")
            .with("available_low", 10)
            .with("available_high", 50)
            .with("type", "garage")
            .with("payment_url", "not a url");
        let lot = record(bag, None).to_lot().unwrap();

        assert_eq!(lot.available, Available::Range { low: 10, high: 50 });
        assert_eq!(lot.lot_type, None);
        assert_eq!(lot.state, State::NoData);

        // Clé tarifaire présente mais inexploitable: l'info existe, vide
        assert_eq!(lot.payment_info, Some(PaymentInfo::default()));

        let warning = lot.warning.unwrap();
        assert!(warning.contains("unknown lot type 'garage'"));
        assert!(warning.contains("payment_url"));
    }

    #[test]
    fn test_open_without_availability_warns() {
        let bag = PropertyBag::new()
            .with("name", "P2")
            .with("city", "Dresden")
            .with("state", "open");
        let lot = record(bag, None).to_lot().unwrap();

        assert_eq!(lot.available, Available::Discrete(0));
        assert_eq!(
            lot.warning.as_deref(),
            Some("lot is open but reports no availability")
        );
    }

    #[test]
    fn test_to_lot_is_pure() {
        let bag = PropertyBag::new()
            .with("name", "P3")
            .with("city", "Dresden")
            .with("type", "garage");
        let rec = record(bag, Some(vec![51.0, 13.0]));
        assert_eq!(rec.to_lot(), rec.to_lot());
    }
}
