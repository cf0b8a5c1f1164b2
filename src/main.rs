// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Load the site catalog (a load failure aborts before any probing)
// 3. Verify every entry through the concurrent worker pool
// 4. Reconcile: rewrite the catalog and write the audit report
// 5. Exit with proper code (0 = nothing removed, 1 = catalog changed,
//    2 = error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod catalog; // src/catalog/ - persisted catalog load/save
mod cli; // src/cli.rs - command-line parsing
mod report; // src/report/ - reconciliation and audit report
mod verifier; // src/verifier/ - DNS + HTTP verification engine

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use tracing_subscriber::EnvFilter;

use catalog::{load_catalog, save_catalog};
use cli::Cli;
use report::{reconcile, save_report, VerificationReport};
use verifier::{
    progress_bar, verify_all, DnsResolver, RetryPolicy, SiteProber, VerificationResult,
};

// Browser-like User-Agent, set once on the shared client. Some sites answer
// 403 to unknown clients, which would skew verdicts.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/131.0.0.0 Safari/537.36";

#[tokio::main]
async fn main() {
    // Run our application logic and capture the exit code
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0) = run completed, nothing removed
//   Ok(1) = run completed, at least one entry removed
//   Err = run-fatal error (mapped to exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    // Diagnostics go to stderr via RUST_LOG; stdout stays human-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // A catalog that doesn't load is fatal - no probing, no partial state
    let sites = load_catalog(&cli.catalog)?;
    println!("📋 Total sites: {}\n", sites.len());

    // One configured client for the whole run, shared by all workers
    let client = build_client(cli.timeout, cli.workers)?;
    let prober = Arc::new(SiteProber::new(
        client,
        Arc::new(DnsResolver::new()),
        RetryPolicy::default(),
    ));

    let start = Instant::now();
    let progress = progress_bar(sites.len() as u64, !cli.no_progress);
    let results = verify_all(prober, &sites, cli.workers, &progress).await;
    progress.finish_and_clear();
    let elapsed = start.elapsed().as_secs_f64();

    let (keep, verification_report) = reconcile(&sites, &results, elapsed);

    print_results(&results, cli.json)?;
    print_summary(&verification_report);

    save_catalog(&cli.catalog, &keep)?;
    save_report(&cli.report, &verification_report)?;
    println!("💾 Catalog updated, report saved to {}", cli.report.display());

    // Non-zero tells automation callers the catalog changed
    if verification_report.removed_count > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Builds the shared HTTP client: per-request timeout, redirects followed,
// browser-like User-Agent, connection pool at least as large as the worker
// pool so workers never queue on connections.
fn build_client(timeout_secs: u64, workers: usize) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(10))
        .user_agent(USER_AGENT)
        .pool_max_idle_per_host(workers.max(verifier::DEFAULT_WORKERS))
        .build()
        .context("Failed to create HTTP client")
}

// Prints the results either as a table or JSON
fn print_results(results: &[VerificationResult], json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(results)?;
        println!("{}", json_output);
    } else {
        print_table(results);
    }
    Ok(())
}

// Prints results as a human-readable table in the terminal
fn print_table(results: &[VerificationResult]) {
    println!("{:<45} {:<14} {:<25}", "DOMAIN", "VERDICT", "REASON");
    println!("{}", "=".repeat(85));

    for result in results {
        // Truncate long domains for display (char-wise: domains can be IDN)
        let domain_display = if result.domain.chars().count() > 42 {
            let head: String = result.domain.chars().take(42).collect();
            format!("{}...", head)
        } else {
            result.domain.clone()
        };

        println!(
            "{:<45} {:<14} {:<25}",
            domain_display,
            format_verdict(result),
            result.reason
        );
    }
}

// Formats the verdict as a short status label
fn format_verdict(result: &VerificationResult) -> String {
    if result.should_remove() {
        "🗑️  REMOVE".to_string()
    } else if result.reachable() {
        "✅ ALIVE".to_string()
    } else {
        "⚠️  KEPT".to_string()
    }
}

fn print_summary(report: &VerificationReport) {
    println!(
        "\n⏱️  Verification finished in {:.2}s",
        report.execution_time
    );
    println!("✅ Sites remaining: {}", report.remaining_count);
    println!("🗑️  Sites removed: {}", report.removed_count);
}
