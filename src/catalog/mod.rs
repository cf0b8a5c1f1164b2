// src/catalog/mod.rs
// =============================================================================
// This module owns the persisted site catalog.
//
// The catalog is a JSON array of objects. We only interpret "domain" and
// "title"; everything else rides along in `extra` and is written back
// verbatim, so a verification pass never loses fields it doesn't know about.
//
// A catalog that fails to load is fatal for the whole run - the caller bails
// out before any probing so no partial or corrupt state is ever produced.
// =============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

// One site in the catalog. Identity is the domain; entries are never
// mutated, only copied into the keep list or dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub domain: String,
    pub title: String,

    // Arbitrary additional fields, preserved unchanged through a run
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Loads the catalog from disk.
//
// Returns an error (with context) if the file is unreadable or not valid
// JSON for a list of entries - both are run-fatal for the caller.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file '{}'", path.display()))?;

    let entries: Vec<CatalogEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("Catalog file '{}' is not valid JSON", path.display()))?;

    Ok(entries)
}

// Overwrites the catalog file with the given entries.
//
// Pretty-printed with 2-space indentation; serde_json leaves non-ASCII
// characters unescaped, so titles like "Café" survive byte-for-byte.
pub fn save_catalog(path: &Path, entries: &[CatalogEntry]) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)
        .context("Failed to serialize catalog")?;

    std::fs::write(path, json)
        .with_context(|| format!("Failed to write catalog file '{}'", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_fields_round_trip() {
        let raw = r#"[{"domain":"example.com","title":"Example","icon":"ex.png","rank":3}]"#;
        let entries: Vec<CatalogEntry> = serde_json::from_str(raw).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].domain, "example.com");
        assert_eq!(entries[0].title, "Example");
        assert_eq!(entries[0].extra["icon"], "ex.png");
        assert_eq!(entries[0].extra["rank"], 3);

        // Serializing back must keep the extra fields at the top level
        let round_tripped: Value = serde_json::to_value(&entries).unwrap();
        let original: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(round_tripped, original);
    }

    #[test]
    fn test_save_and_load_preserves_non_ascii() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");

        let entries = vec![CatalogEntry {
            domain: "café.example".to_string(),
            title: "Café Корица".to_string(),
            extra: Map::new(),
        }];

        save_catalog(&path, &entries).unwrap();

        // Non-ASCII must land in the file unescaped
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Café Корица"));

        let loaded = load_catalog(&path).unwrap();
        assert_eq!(loaded, entries);
    }

    #[test]
    fn test_load_malformed_catalog_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{ this is not json").unwrap();

        let result = load_catalog(&path);
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("not valid JSON"));
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let result = load_catalog(Path::new("/definitely/not/here/catalog.json"));
        assert!(result.is_err());
    }
}
