// src/verifier/pool.rs
// =============================================================================
// This module fans verification tasks out over a fixed-size worker pool.
//
// Tasks are independent - no shared mutable state between domains, no
// ordering requirement - so the pool is just a stream of futures with a
// concurrency cap. Results come back in completion order, and the progress
// bar ticks once per completed entry. verify_all only returns once every
// entry has a result: the reconciler sees the complete catalog or nothing.
// =============================================================================

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tracing::debug;

use super::probe::{SiteProber, VerificationResult};
use crate::catalog::CatalogEntry;

/// Size of the worker pool unless overridden on the command line.
pub const DEFAULT_WORKERS: usize = 20;

// Builds the run's progress bar: completed/total plus a percentage,
// updated on every task completion. Hidden bars still count, which keeps
// the completion counter observable in tests and with --no-progress.
pub fn progress_bar(total: u64, enabled: bool) -> ProgressBar {
    let bar = if enabled {
        ProgressBar::new(total)
    } else {
        ProgressBar::hidden()
    };
    bar.set_length(total);
    bar.set_style(
        ProgressStyle::with_template("Progress: |{bar:50.cyan}| {pos}/{len} ({percent}%)")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("██-"),
    );
    bar
}

// Verifies every catalog entry through the pool.
//
// Parameters:
//   prober: shared read-only prober (client + resolver + retry policy)
//   entries: the full catalog
//   workers: concurrency cap (at least 1)
//   progress: bar to tick as tasks complete
//
// Returns one VerificationResult per entry, in completion order.
pub async fn verify_all(
    prober: Arc<SiteProber>,
    entries: &[CatalogEntry],
    workers: usize,
    progress: &ProgressBar,
) -> Vec<VerificationResult> {
    let tasks = entries.iter().map(|entry| {
        let prober = Arc::clone(&prober);
        async move {
            let result = prober.probe(&entry.domain, &entry.title).await;
            debug!(
                domain = %result.domain,
                reason = %result.reason,
                remove = result.should_remove(),
                "verification task finished"
            );
            result
        }
    });

    stream::iter(tasks)
        .buffer_unordered(workers.max(1))
        .inspect(|_| progress.inc(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::dns::DomainResolver;
    use crate::verifier::retry::RetryPolicy;
    use async_trait::async_trait;
    use reqwest::Client;
    use std::collections::HashSet;
    use std::time::Duration;

    struct NeverResolves;

    #[async_trait]
    impl DomainResolver for NeverResolves {
        async fn resolves(&self, _domain: &str) -> bool {
            false
        }
    }

    fn entry(domain: &str) -> CatalogEntry {
        CatalogEntry {
            domain: domain.to_string(),
            title: domain.to_uppercase(),
            extra: serde_json::Map::new(),
        }
    }

    #[tokio::test]
    async fn test_every_entry_yields_exactly_one_result() {
        let entries: Vec<CatalogEntry> = (0..7).map(|i| entry(&format!("site{}.test", i))).collect();
        let prober = Arc::new(SiteProber::new(
            Client::new(),
            Arc::new(NeverResolves),
            RetryPolicy::new(0, Duration::ZERO),
        ));

        let progress = progress_bar(entries.len() as u64, false);
        let results = verify_all(prober, &entries, 3, &progress).await;

        assert_eq!(results.len(), entries.len());

        // One result per domain, no duplicates, no omissions
        let domains: HashSet<&str> = results.iter().map(|r| r.domain.as_str()).collect();
        assert_eq!(domains.len(), entries.len());
        for e in &entries {
            assert!(domains.contains(e.domain.as_str()));
        }

        // The completion counter saw every task
        assert_eq!(progress.position(), entries.len() as u64);
    }

    #[tokio::test]
    async fn test_empty_catalog_completes_with_no_results() {
        let prober = Arc::new(SiteProber::new(
            Client::new(),
            Arc::new(NeverResolves),
            RetryPolicy::new(0, Duration::ZERO),
        ));

        let progress = progress_bar(0, false);
        let results = verify_all(prober, &[], 20, &progress).await;

        assert!(results.is_empty());
        assert_eq!(progress.position(), 0);
    }

    #[tokio::test]
    async fn test_zero_workers_is_clamped_to_one() {
        let entries = vec![entry("one.test")];
        let prober = Arc::new(SiteProber::new(
            Client::new(),
            Arc::new(NeverResolves),
            RetryPolicy::new(0, Duration::ZERO),
        ));

        let progress = progress_bar(1, false);
        let results = verify_all(prober, &entries, 0, &progress).await;

        assert_eq!(results.len(), 1);
    }
}
