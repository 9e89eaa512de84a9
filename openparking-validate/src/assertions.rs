//! Assertions pour les tests des sources
//!
//! Branche le calcul des violations sur le mécanisme d'échec des tests Rust:
//! un `panic!` listant toutes les violations, attribué à l'appelant.

use openparking::{Datasource, LotResult};

use crate::config::ValidationConfig;
use crate::validate::{validate_datasource, validate_lot, Violation};

fn fail(subject: &str, violations: &[Violation]) -> ! {
    let lines: Vec<String> = violations.iter().map(|v| format!("  - {}", v)).collect();
    panic!(
        "{} has {} violation(s):\n{}",
        subject,
        violations.len(),
        lines.join("\n")
    );
}

/// Échoue si la source produit la moindre violation
#[track_caller]
pub fn assert_datasource_valid(datasource: &dyn Datasource, config: &ValidationConfig) {
    let violations = validate_datasource(datasource, config);
    if !violations.is_empty() {
        fail(&format!("datasource '{}'", datasource.name()), &violations);
    }
}

/// Échoue si le résultat de décodage produit la moindre violation
#[track_caller]
pub fn assert_lot_valid(result: &LotResult, config: &ValidationConfig) {
    let violations = validate_lot(result, config);
    if !violations.is_empty() {
        let subject = match result {
            Ok(lot) => format!("lot '{}'", lot.name),
            Err(_) => "lot".to_string(),
        };
        fail(&subject, &violations);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openparking::{Available, GeojsonDatasource, Lot, LotError};

    fn lot() -> Lot {
        Lot {
            name: "Deutschhaus".to_string(),
            city: "Ulm".to_string(),
            available: Available::Discrete(3),
            capacity: Some(594),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_lot_passes() {
        assert_lot_valid(&Ok(lot()), &ValidationConfig::default());
    }

    #[test]
    #[should_panic(expected = "exceeds the capacity")]
    fn test_invalid_lot_panics() {
        let lot = Lot {
            available: Available::Discrete(600),
            ..lot()
        };
        assert_lot_valid(&Ok(lot), &ValidationConfig::default());
    }

    #[test]
    #[should_panic(expected = "metadata missing expected field name")]
    fn test_failed_lot_panics() {
        assert_lot_valid(
            &Err(LotError::missing_field("name", "unknown")),
            &ValidationConfig::default(),
        );
    }

    #[test]
    #[should_panic(expected = "no lots returned")]
    fn test_empty_datasource_panics() {
        let source = GeojsonDatasource::from_geojson(
            "empty",
            r#"{"type":"FeatureCollection","features":[]}"#,
        );
        assert_datasource_valid(&source, &ValidationConfig::default());
    }
}
