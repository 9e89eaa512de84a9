//! Validation des parkings décodés
//!
//! Calcul pur des violations: aucune règle n'interrompt la passe, chaque parking
//! est vérifié en entier et dans l'ordre fourni par la source.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use openparking::{
    Available, Coordinates, Datasource, FetchError, Lot, LotError, LotResult, Warnings,
};

use crate::config::ValidationConfig;
use crate::report::ValidationReport;

/// Règle enfreinte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// La source n'a pas pu être récupérée
    Fetch,
    /// La source n'a retourné aucun parking
    EmptyBatch,
    MissingMetadata,
    MissingMetadataField,
    LotFailed,
    DataAgeNotInPast,
    EmptyName,
    EmptyCity,
    EmptyRegion,
    EmptyAddress,
    PlaceholderCoordinates,
    UnresolvedGeometry,
    IncompletePaymentInfo,
    IncompleteOpeningHours,
    NegativeAvailable,
    AvailableExceedsCapacity,
    NegativeRangeStart,
    RangeExceedsCapacity,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Fetch => "fetch",
            Rule::EmptyBatch => "empty_batch",
            Rule::MissingMetadata => "missing_metadata",
            Rule::MissingMetadataField => "missing_metadata_field",
            Rule::LotFailed => "lot_failed",
            Rule::DataAgeNotInPast => "data_age_not_in_past",
            Rule::EmptyName => "empty_name",
            Rule::EmptyCity => "empty_city",
            Rule::EmptyRegion => "empty_region",
            Rule::EmptyAddress => "empty_address",
            Rule::PlaceholderCoordinates => "placeholder_coordinates",
            Rule::UnresolvedGeometry => "unresolved_geometry",
            Rule::IncompletePaymentInfo => "incomplete_payment_info",
            Rule::IncompleteOpeningHours => "incomplete_opening_hours",
            Rule::NegativeAvailable => "negative_available",
            Rule::AvailableExceedsCapacity => "available_exceeds_capacity",
            Rule::NegativeRangeStart => "negative_range_start",
            Rule::RangeExceedsCapacity => "range_exceeds_capacity",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Une règle enfreinte par un parking (ou par la source)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Nom du parking concerné, quand il est connu
    pub lot: Option<String>,
    pub rule: Rule,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Violation {
    fn lot(lot: &Lot, rule: Rule, message: String) -> Self {
        Self {
            lot: (!lot.name.is_empty()).then(|| lot.name.clone()),
            rule,
            message,
        }
    }

    pub fn fetch(datasource: &str, error: &FetchError) -> Self {
        Self {
            lot: None,
            rule: Rule::Fetch,
            message: format!("fetching data from {} failed with: {}", datasource, error),
        }
    }

    pub fn empty_batch(datasource: &str) -> Self {
        Self {
            lot: None,
            rule: Rule::EmptyBatch,
            message: format!("no lots returned by datasource '{}'", datasource),
        }
    }

    /// Traduction 1:1 d'un échec de décodage
    pub fn from_lot_error(error: &LotError) -> Self {
        let (lot, rule) = match error {
            LotError::MissingMetadata { lot } => (Some(lot.clone()), Rule::MissingMetadata),
            LotError::MissingMetadataField { lot, .. } => {
                (Some(lot.clone()), Rule::MissingMetadataField)
            }
            LotError::Other { .. } => (None, Rule::LotFailed),
        };
        Self {
            lot,
            rule,
            message: error.to_string(),
        }
    }
}

/// Résultat d'une passe sur une source
enum Pass {
    /// Récupération impossible, rien n'a été vérifié
    FetchFailed(Violation),
    Checked {
        /// Violation de lot vide
        empty: Option<Violation>,
        /// Par parking: décodé ou non, et ses violations
        lots: Vec<(bool, Vec<Violation>)>,
    },
}

/// Validateur de parkings
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
    /// Horloge figée; `None` pour l'heure courante
    now: Option<DateTime<Utc>>,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config, now: None }
    }

    /// Fige l'instant de référence des vérifications d'âge
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    /// Vérifie un résultat de décodage.
    ///
    /// L'avertissement éventuel du parking est versé dans `warnings`.
    pub fn check_lot(&self, result: &LotResult, warnings: &mut Warnings) -> Vec<Violation> {
        self.check_lot_at(result, self.now(), warnings)
    }

    fn check_lot_at(
        &self,
        result: &LotResult,
        now: DateTime<Utc>,
        warnings: &mut Warnings,
    ) -> Vec<Violation> {
        match result {
            Err(error) => {
                debug!(error = %error, "Lot failed to decode");
                vec![Violation::from_lot_error(error)]
            }
            Ok(lot) => {
                if let Some(warning) = &lot.warning {
                    warnings.push(format!("{}: {}", lot.name, warning));
                }
                let violations = self.check_invariants(lot, now);
                debug!(lot = %lot.name, violations = violations.len(), "Lot checked");
                violations
            }
        }
    }

    /// Vérifie toutes les règles applicables à un parking décodé
    fn check_invariants(&self, lot: &Lot, now: DateTime<Utc>) -> Vec<Violation> {
        let mut violations = Vec::new();
        let name = &lot.name;

        if let Some(data_age) = lot.data_age {
            if !self.config.ignore_data_age && data_age >= now {
                violations.push(Violation::lot(
                    lot,
                    Rule::DataAgeNotInPast,
                    format!("Lot '{}' data age should be in the past ({})", name, data_age),
                ));
            }
        }

        if lot.name.is_empty() {
            violations.push(Violation::lot(
                lot,
                Rule::EmptyName,
                "Lot name should not be empty".to_string(),
            ));
        }
        if lot.city.is_empty() {
            violations.push(Violation::lot(
                lot,
                Rule::EmptyCity,
                format!("Lot '{}' city should not be empty", name),
            ));
        }
        if lot.region.as_deref().is_some_and(str::is_empty) {
            violations.push(Violation::lot(
                lot,
                Rule::EmptyRegion,
                format!("Lot '{}' region should not be empty if set", name),
            ));
        }
        if lot.address.as_deref().is_some_and(str::is_empty) {
            violations.push(Violation::lot(
                lot,
                Rule::EmptyAddress,
                format!("Lot '{}' address should not be empty if set", name),
            ));
        }

        if let Some(coordinates) = lot.coordinates {
            for (axis, value) in [
                ("latitude", coordinates.latitude),
                ("longitude", coordinates.longitude),
            ] {
                if Coordinates::is_placeholder_axis(value) {
                    violations.push(Violation::lot(
                        lot,
                        Rule::PlaceholderCoordinates,
                        format!(
                            "Lot '{}' position should not contain placeholder values ({} = {:.1})",
                            name, axis, value
                        ),
                    ));
                }
            }
        }

        // Plus de deux composantes (altitude...): position absente mais tolérée
        if let Some(components) = &lot.geometry {
            if lot.coordinates.is_none() && components.len() <= 2 {
                violations.push(Violation::lot(
                    lot,
                    Rule::UnresolvedGeometry,
                    format!("Lot '{}' position should not be absent if geometry is set", name),
                ));
            }
        }

        if let Some(payment) = &lot.payment_info {
            if payment.url.is_none() && payment.pricing.is_none() {
                violations.push(Violation::lot(
                    lot,
                    Rule::IncompletePaymentInfo,
                    format!(
                        "Lot '{}' either payment url or pricing should be set if payment information is supplied",
                        name
                    ),
                ));
            }
        }
        if let Some(hours) = &lot.opening_hours {
            if hours.url.is_none() && hours.times.is_none() {
                violations.push(Violation::lot(
                    lot,
                    Rule::IncompleteOpeningHours,
                    format!(
                        "Lot '{}' either opening hours url or times should be set if opening hours information is supplied",
                        name
                    ),
                ));
            }
        }

        if !self.config.ignore_exceeded_capacity {
            violations.extend(self.check_availability(lot));
        }

        violations
    }

    fn check_availability(&self, lot: &Lot) -> Vec<Violation> {
        let mut violations = Vec::new();
        let name = &lot.name;

        match lot.available {
            Available::Discrete(available) => {
                if available < 0 {
                    violations.push(Violation::lot(
                        lot,
                        Rule::NegativeAvailable,
                        format!("Lot '{}' available spots should be positive ({})", name, available),
                    ));
                }
                if let Some(capacity) = lot.capacity {
                    if available > capacity {
                        violations.push(Violation::lot(
                            lot,
                            Rule::AvailableExceedsCapacity,
                            format!(
                                "Lot '{}' available spots ({}) exceeds the capacity ({})",
                                name, available, capacity
                            ),
                        ));
                    }
                }
            }
            Available::Range { low, high } => {
                if low < 0 {
                    violations.push(Violation::lot(
                        lot,
                        Rule::NegativeRangeStart,
                        format!(
                            "Lot '{}' availability range should start at a positive value ({})",
                            name, low
                        ),
                    ));
                }
                if let Some(capacity) = lot.capacity {
                    if high > capacity {
                        violations.push(Violation::lot(
                            lot,
                            Rule::RangeExceedsCapacity,
                            format!(
                                "Lot '{}' availability range upper bound ({}) exceeds the capacity ({})",
                                name, high, capacity
                            ),
                        ));
                    }
                }
            }
        }

        violations
    }

    /// Récupère les données de la source, ou la violation terminale si la récupération échoue
    fn fetch(&self, datasource: &dyn Datasource) -> Result<Vec<LotResult>, Violation> {
        datasource.data().map_err(|e| {
            warn!(datasource = %datasource.name(), error = %e, "Fetch failed");
            Violation::fetch(datasource.name(), &e)
        })
    }

    /// Passe sur une source: récupération, lot vide, puis chaque parking dans l'ordre reçu
    fn pass(&self, datasource: &dyn Datasource, warnings: &mut Warnings) -> Pass {
        let lots = match self.fetch(datasource) {
            Ok(lots) => lots,
            Err(violation) => return Pass::FetchFailed(violation),
        };

        let empty = lots
            .is_empty()
            .then(|| Violation::empty_batch(datasource.name()));

        let now = self.now();
        let checked = lots
            .iter()
            .map(|lot| (lot.is_ok(), self.check_lot_at(lot, now, warnings)))
            .collect();

        Pass::Checked {
            empty,
            lots: checked,
        }
    }

    /// Vérifie tous les parkings d'une source, dans l'ordre reçu
    pub fn check_datasource(
        &self,
        datasource: &dyn Datasource,
        warnings: &mut Warnings,
    ) -> Vec<Violation> {
        match self.pass(datasource, warnings) {
            Pass::FetchFailed(violation) => vec![violation],
            Pass::Checked { empty, lots } => empty
                .into_iter()
                .chain(lots.into_iter().flat_map(|(_, violations)| violations))
                .collect(),
        }
    }

    /// Passe complète sur une source, avec rapport.
    ///
    /// Les avertissements collectés pendant la passe sont vidés dans le rapport.
    pub fn run(&self, datasource: &dyn Datasource) -> ValidationReport {
        let started_at = Instant::now();
        let mut report = ValidationReport::new(datasource.name());
        let mut warnings = Warnings::new();

        match self.pass(datasource, &mut warnings) {
            Pass::FetchFailed(violation) => report.record_fetch_failure(violation),
            Pass::Checked { empty, lots } => {
                if let Some(violation) = empty {
                    report.record_batch_violation(violation);
                }
                for (decoded, violations) in lots {
                    report.record_lot(decoded, violations);
                }
            }
        }

        report.record_warnings(warnings.flush());
        report.set_duration(started_at.elapsed());
        report.finalize();

        info!(
            datasource = %datasource.name(),
            status = ?report.status,
            violations = report.violations.len(),
            "Validation finished"
        );

        report
    }
}

/// Violations d'une source entière
pub fn validate_datasource(
    datasource: &dyn Datasource,
    config: &ValidationConfig,
) -> Vec<Violation> {
    Validator::new(*config).check_datasource(datasource, &mut Warnings::new())
}

/// Violations d'un seul résultat de décodage
pub fn validate_lot(result: &LotResult, config: &ValidationConfig) -> Vec<Violation> {
    Validator::new(*config).check_lot(result, &mut Warnings::new())
}
