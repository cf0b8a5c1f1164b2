// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// site-warden takes a single positional argument (the catalog file) plus a
// handful of tuning flags. The defaults match the values the verification
// engine was tuned with: 20 workers, 10 second request timeout.
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

use crate::verifier::DEFAULT_WORKERS;

#[derive(Parser, Debug)]
#[command(
    name = "site-warden",
    version = "0.1.0",
    about = "Verify site liveness and prune dead domains from a JSON catalog",
    long_about = "site-warden probes every domain in a JSON catalog (DNS first, then HTTP \
                  across protocol and www variants), removes entries that are confirmed dead, \
                  rewrites the catalog in place and writes an audit report. The exit code \
                  signals whether the catalog changed, so it slots into automation."
)]
pub struct Cli {
    /// Path to the catalog JSON file: an array of objects with at least
    /// "domain" and "title"; any extra fields are preserved
    ///
    /// This is a positional argument (required, no flag needed)
    pub catalog: PathBuf,

    /// Where to write the audit report (overwritten on every run)
    #[arg(long, default_value = "site_verification_report.json")]
    pub report: PathBuf,

    /// Number of concurrent verification workers
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Per-request timeout in seconds
    ///
    /// Bounds each HTTP attempt; there is no overall per-domain deadline
    /// beyond the sum of the variant attempts and retry backoffs
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// Output verification results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}
