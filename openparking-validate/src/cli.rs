//! Définition et implémentation des commandes CLI
//!
//! - `validate`: flux GeoJSON → rapport de validation
//! - `list`: flux GeoJSON → parkings décodés

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::json;
use tracing::{info, warn};

use openparking::{Datasource, GeojsonDatasource};
use openparking_validate::{Config, ValidationConfig, Validator};

#[derive(Subcommand)]
pub enum Commands {
    /// Validate GeoJSON parking feeds
    Validate {
        /// Path to a GeoJSON feed (.geojson) or a directory of feeds
        #[arg(short, long)]
        path: PathBuf,

        /// JSON config with per-datasource relaxations
        #[arg(long)]
        config: Option<PathBuf>,

        /// Skip availability / capacity consistency checks for every feed
        #[arg(long)]
        ignore_exceeded_capacity: bool,

        /// Skip the "data age must be in the past" check for every feed
        #[arg(long)]
        ignore_data_age: bool,

        /// Directory where one JSON report per feed is written
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List the lots decoded from a GeoJSON feed
    List {
        /// Path to a GeoJSON feed
        #[arg(short, long)]
        path: PathBuf,

        /// Print lots as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Exécute la commande validate
pub fn cmd_validate(
    path: &Path,
    config_path: Option<&Path>,
    flags: ValidationConfig,
    report_dir: Option<&Path>,
) -> Result<()> {
    let feeds = collect_feeds(path)?;
    if feeds.is_empty() {
        anyhow::bail!("No GeoJSON feeds (.geojson) found in {}", path.display());
    }

    // Fichier de config optionnel, les flags CLI s'ajoutent par-dessus
    let config = match config_path {
        Some(p) => Config::load(p)?,
        None => Config::default(),
    };

    if let Some(dir) = report_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create report directory {}", dir.display()))?;
    }

    info!(feeds = feeds.len(), "Starting validation");

    let mut failed = 0;
    let mut summaries = Vec::with_capacity(feeds.len());

    for feed in &feeds {
        let source = GeojsonDatasource::from_path(feed);
        let validation = config.for_datasource(source.name()).merge(flags);
        let report = Validator::new(validation).run(&source);

        report.display();

        if let Some(dir) = report_dir {
            let output = dir.join(format!("{}.json", report.datasource));
            report.save_to_file(&output)?;
            info!(report = %output.display(), "Report saved");
        }

        if !report.passed() {
            failed += 1;
        }
        summaries.push(report.summary());
    }

    println!("\n=== Summary ===");
    for summary in &summaries {
        println!("  {}", summary);
    }

    if failed > 0 {
        anyhow::bail!("{}/{} datasource(s) failed validation", failed, feeds.len());
    }

    println!("All {} datasource(s) passed", feeds.len());
    Ok(())
}

/// Exécute la commande list
pub fn cmd_list(path: &Path, as_json: bool) -> Result<()> {
    let source = GeojsonDatasource::from_path(path);
    let lots = source
        .data()
        .with_context(|| format!("Failed to load {}", path.display()))?;

    if as_json {
        let entries: Vec<serde_json::Value> = lots
            .iter()
            .map(|result| match result {
                Ok(lot) => serde_json::to_value(lot).unwrap_or_else(|e| json!({ "error": e.to_string() })),
                Err(e) => json!({ "error": e.to_string() }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("=== {} ({} lots) ===", source.name(), lots.len());
    for result in &lots {
        match result {
            Ok(lot) => {
                let capacity = lot
                    .capacity
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "?".to_string());
                let kind = lot
                    .lot_type
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "  {} ({}) [{}] {}: {}/{}",
                    lot.name, lot.city, kind, lot.state, lot.available, capacity
                );
            }
            Err(e) => warn!("{}", e),
        }
    }

    Ok(())
}

/// Collecte les flux GeoJSON d'un fichier ou d'un dossier (récursif)
fn collect_feeds(path: &Path) -> Result<Vec<PathBuf>> {
    let mut feeds = Vec::new();

    if path.is_file() {
        if is_geojson(path) {
            feeds.push(path.to_path_buf());
        }
        return Ok(feeds);
    }

    for entry in std::fs::read_dir(path)
        .with_context(|| format!("Cannot read directory {}", path.display()))?
    {
        let entry = entry?;
        let entry_path = entry.path();

        if entry_path.is_dir() {
            feeds.extend(collect_feeds(&entry_path)?);
        } else if is_geojson(&entry_path) {
            feeds.push(entry_path);
        }
    }

    // Ordre stable d'une exécution à l'autre
    feeds.sort();
    Ok(feeds)
}

fn is_geojson(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "geojson")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures")
    }

    #[test]
    fn test_is_geojson() {
        assert!(is_geojson(Path::new("dresden.geojson")));
        assert!(!is_geojson(Path::new("dresden.json")));
        assert!(!is_geojson(Path::new("README")));
    }

    #[test]
    fn test_collect_feeds() {
        let dir = fixtures_dir();
        if !dir.exists() {
            eprintln!("Fixtures not found, skipping test");
            return;
        }

        let feeds = collect_feeds(&dir.join("valid")).unwrap();
        let names: Vec<_> = feeds
            .iter()
            .filter_map(|p| p.file_name().and_then(|s| s.to_str()))
            .collect();
        assert_eq!(names, vec!["dresden.geojson", "ulm.geojson"]);
    }

    #[test]
    fn test_validate_valid_fixtures() {
        let dir = fixtures_dir().join("valid");
        if !dir.exists() {
            eprintln!("Fixtures not found, skipping test");
            return;
        }
        cmd_validate(&dir, None, ValidationConfig::default(), None).unwrap();
    }

    #[test]
    fn test_validate_invalid_fixtures_fails() {
        let dir = fixtures_dir().join("invalid");
        if !dir.exists() {
            eprintln!("Fixtures not found, skipping test");
            return;
        }
        let err = cmd_validate(&dir, None, ValidationConfig::default(), None).unwrap_err();
        assert!(err.to_string().contains("2/2 datasource(s) failed"));
    }
}
