// src/report/mod.rs
// =============================================================================
// This module turns verification results back into persisted state.
//
// reconcile() is a pure fold: it partitions the catalog into a keep list and
// removal records, using should_remove() as the only signal. The partition
// is complete - every result lands on exactly one side - and the original
// entries pass through untouched, extra fields included.
// =============================================================================

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::catalog::CatalogEntry;
use crate::verifier::VerificationResult;

// One pruned entry in the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemovalRecord {
    pub domain: String,
    pub title: String,
    pub reason: String,
}

// The run's audit report, overwritten on every run (not appended).
#[derive(Debug, Serialize)]
pub struct VerificationReport {
    pub removed: Vec<RemovalRecord>,
    pub remaining_count: usize,
    pub removed_count: usize,
    pub execution_time: f64,
}

// Partitions the catalog according to the verification results.
//
// Parameters:
//   catalog: the entries that were verified
//   results: one result per entry, in any order (completion order in a
//            live run - the partition itself is order-independent, only
//            the removal list order follows the input order)
//   elapsed_secs: wall-clock time of the whole run, for the report
//
// Returns: (keep list, report). keep.len() + report.removed.len() always
// equals the number of results.
pub fn reconcile(
    catalog: &[CatalogEntry],
    results: &[VerificationResult],
    elapsed_secs: f64,
) -> (Vec<CatalogEntry>, VerificationReport) {
    let by_domain: HashMap<&str, &CatalogEntry> = catalog
        .iter()
        .map(|entry| (entry.domain.as_str(), entry))
        .collect();

    let mut keep = Vec::new();
    let mut removed = Vec::new();

    for result in results {
        let entry = match by_domain.get(result.domain.as_str()) {
            Some(entry) => *entry,
            // Results always come from the catalog; an unknown domain here
            // would be a bug upstream, not something to act on
            None => continue,
        };

        if result.should_remove() {
            removed.push(RemovalRecord {
                domain: result.domain.clone(),
                title: result.title.clone(),
                reason: result.reason.clone(),
            });
        } else {
            keep.push(entry.clone());
        }
    }

    let report = VerificationReport {
        remaining_count: keep.len(),
        removed_count: removed.len(),
        removed,
        execution_time: elapsed_secs,
    };

    (keep, report)
}

// Overwrites the audit report file.
pub fn save_report(path: &Path, report: &VerificationReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize verification report")?;

    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report file '{}'", path.display()))?;

    Ok(())
}
