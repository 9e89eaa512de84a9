//! Rapport de validation
//!
//! Ce module collecte les violations d'une passe sur une source et les
//! affiche ou les sauvegarde, sans jamais interrompre la passe.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::validate::Violation;

/// Statut global d'une source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationStatus {
    /// Aucune violation
    Passed,
    /// Au moins une violation
    Failed,
    /// Récupération des données impossible
    FetchFailed,
}

/// Rapport complet de validation d'une source
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Nom de la source
    pub datasource: String,
    /// Durée de la passe
    pub duration_secs: f64,
    /// Statut global
    pub status: ValidationStatus,

    /// Nombre de résultats examinés (décodés ou non)
    pub lots_checked: usize,
    /// Nombre de parkings sans aucune violation
    pub lots_valid: usize,
    /// Nombre de résultats en échec de décodage
    pub lots_failed: usize,

    /// Nombre de violations par règle
    pub by_rule: HashMap<String, usize>,

    /// Liste des violations, dans l'ordre des parkings
    pub violations: Vec<Violation>,
    /// Avertissements vidés en fin de passe
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Crée un nouveau rapport pour une source
    pub fn new(datasource: &str) -> Self {
        Self {
            datasource: datasource.to_string(),
            duration_secs: 0.0,
            status: ValidationStatus::Passed,
            lots_checked: 0,
            lots_valid: 0,
            lots_failed: 0,
            by_rule: HashMap::new(),
            violations: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn push_violation(&mut self, violation: Violation) {
        *self
            .by_rule
            .entry(violation.rule.as_str().to_string())
            .or_default() += 1;
        self.violations.push(violation);
    }

    /// Enregistre le résultat d'un parking
    pub fn record_lot(&mut self, decoded: bool, violations: Vec<Violation>) {
        self.lots_checked += 1;
        if !decoded {
            self.lots_failed += 1;
        } else if violations.is_empty() {
            self.lots_valid += 1;
        }
        for violation in violations {
            self.push_violation(violation);
        }
    }

    /// Enregistre une violation portant sur la source entière
    pub fn record_batch_violation(&mut self, violation: Violation) {
        self.push_violation(violation);
    }

    /// Enregistre l'échec de récupération, terminal pour la source
    pub fn record_fetch_failure(&mut self, violation: Violation) {
        self.push_violation(violation);
        self.status = ValidationStatus::FetchFailed;
    }

    pub fn record_warnings(&mut self, warnings: Vec<String>) {
        self.warnings.extend(warnings);
    }

    /// Définit la durée de la passe
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        if self.status == ValidationStatus::FetchFailed {
            return;
        }
        self.status = if self.violations.is_empty() {
            ValidationStatus::Passed
        } else {
            ValidationStatus::Failed
        };
    }

    pub fn passed(&self) -> bool {
        self.status == ValidationStatus::Passed
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("VALIDATION REPORT - {}", self.datasource);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.3}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Lots: {} checked, {} valid, {} failed to decode",
            self.lots_checked, self.lots_valid, self.lots_failed
        );

        if !self.by_rule.is_empty() {
            println!("\n--- BY RULE ---");
            let mut rules: Vec<_> = self.by_rule.iter().collect();
            rules.sort_by_key(|(k, _)| k.as_str());
            for (rule, count) in rules {
                println!("  {}: {}", rule, count);
            }
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                println!("  {}", w);
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        if !self.violations.is_empty() {
            println!("\n--- VIOLATIONS ({}) ---", self.violations.len());
            for v in self.violations.iter().take(20) {
                let location = v
                    .lot
                    .as_ref()
                    .map(|lot| format!("[{}]", lot))
                    .unwrap_or_default();
                println!("  {} {} {}", v.rule, location, v.message);
            }
            if self.violations.len() > 20 {
                println!("  ... and {} more", self.violations.len() - 20);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {:?}, {} lots checked, {} valid, {} violations, {} warnings",
            self.datasource,
            self.status,
            self.lots_checked,
            self.lots_valid,
            self.violations.len(),
            self.warnings.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::Rule;

    fn violation(rule: Rule) -> Violation {
        Violation {
            lot: Some("Altmarkt".to_string()),
            rule,
            message: "broken".to_string(),
        }
    }

    #[test]
    fn test_new_report() {
        let report = ValidationReport::new("dresden");
        assert_eq!(report.status, ValidationStatus::Passed);
        assert_eq!(report.lots_checked, 0);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn test_record_lot() {
        let mut report = ValidationReport::new("dresden");
        report.record_lot(true, Vec::new());
        report.record_lot(true, vec![violation(Rule::EmptyCity), violation(Rule::EmptyRegion)]);
        report.record_lot(false, vec![violation(Rule::MissingMetadataField)]);

        assert_eq!(report.lots_checked, 3);
        assert_eq!(report.lots_valid, 1);
        assert_eq!(report.lots_failed, 1);
        assert_eq!(report.violations.len(), 3);
        assert_eq!(report.by_rule.get("empty_city"), Some(&1));
    }

    #[test]
    fn test_finalize() {
        let mut report = ValidationReport::new("dresden");
        report.record_lot(true, Vec::new());
        report.finalize();
        assert!(report.passed());

        report.record_batch_violation(violation(Rule::EmptyBatch));
        report.finalize();
        assert_eq!(report.status, ValidationStatus::Failed);
    }

    #[test]
    fn test_fetch_failure_is_terminal() {
        let mut report = ValidationReport::new("dresden");
        report.record_fetch_failure(violation(Rule::Fetch));
        report.finalize();
        assert_eq!(report.status, ValidationStatus::FetchFailed);
        assert!(!report.passed());
    }

    #[test]
    fn test_summary() {
        let mut report = ValidationReport::new("dresden");
        report.record_lot(true, Vec::new());
        report.record_warnings(vec!["Altmarkt: capacity estimated".to_string()]);
        report.finalize();

        let summary = report.summary();
        assert!(summary.contains("dresden"));
        assert!(summary.contains("1 lots checked"));
        assert!(summary.contains("1 warnings"));
    }

    #[test]
    fn test_save_to_file() {
        let mut report = ValidationReport::new("dresden");
        report.record_lot(true, vec![violation(Rule::PlaceholderCoordinates)]);
        report.finalize();

        let path = std::env::temp_dir().join("openparking_test_report.json");
        report.save_to_file(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"placeholder_coordinates\""));
        assert!(content.contains("\"Failed\""));

        std::fs::remove_file(path).ok();
    }
}
