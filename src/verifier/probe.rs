// src/verifier/probe.rs
// =============================================================================
// This module probes a single domain and classifies the outcome.
//
// Probe order for a domain "example.com":
//   1. DNS lookup - no address means "gone", nothing else is attempted
//   2. https://example.com
//   3. http://example.com
//   4. https://www.example.com
//   5. http://www.example.com
//
// Each HTTP attempt goes through the bounded-retry layer and is judged
// immediately; the first terminal verdict stops the remaining variants.
//
// The only verdicts that mark an entry for removal are a failed DNS lookup
// and a confirmed dead status (404/410/451). Timeouts, 5xx after retries and
// other 4xx never delete a site - a degraded site is not a dead one.
// =============================================================================

use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use super::dns::DomainResolver;
use super::retry::{send_with_retry, RetryPolicy};

/// Statuses that confirm a site is permanently gone.
const REMOVABLE_STATUS: [u16; 3] = [404, 410, 451];

/// Host prefixes tried for each domain (outer loop).
const HOST_PREFIXES: [&str; 2] = ["", "www."];

/// Protocols tried for each prefix (inner loop).
const PROTOCOLS: [&str; 2] = ["https", "http"];

// Final classification of one domain.
//
// #[derive(Serialize)] so results can be dumped as JSON with --json
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The site answered with a non-error status
    Alive,
    /// Confirmed dead by a 404/410/451 response
    ConfirmedDead,
    /// Reachable in principle but failing right now; kept in the catalog
    TransientOrUnknownFailure,
    /// The domain no longer resolves
    DnsAbsent,
}

impl Verdict {
    /// True when the catalog entry should be deleted.
    pub fn removable(&self) -> bool {
        matches!(self, Verdict::ConfirmedDead | Verdict::DnsAbsent)
    }
}

// The outcome of verifying one catalog entry. Produced exactly once per
// entry and never modified afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResult {
    pub domain: String,
    pub title: String,
    pub verdict: Verdict,
    /// Human-readable cause: "OK 200", "404 DEAD", "HTTP 503",
    /// "DNS Not Found", or a request error kind like "Timeout"
    pub reason: String,
    /// Status of the response the verdict came from; None when no HTTP
    /// response was obtained at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl VerificationResult {
    pub fn reachable(&self) -> bool {
        matches!(self.verdict, Verdict::Alive)
    }

    pub fn should_remove(&self) -> bool {
        self.verdict.removable()
    }
}

// What to do after one variant's request completed with a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusDecision {
    /// Terminal: confirmed dead, removable
    Dead,
    /// Terminal: the site answered
    Alive,
    /// Terminal: real site with an HTTP-layer problem; not removable
    KeptHttpError,
    /// Inconclusive (https with a non-dead error status); try the next variant
    TryNextVariant,
}

// The per-attempt decision table.
//
// An http-protocol error status outside the removable set is terminal and
// non-removable even when the https attempt for the same prefix also
// errored; that literal behavior is intentional.
fn decide(status: u16, protocol: &str) -> StatusDecision {
    if REMOVABLE_STATUS.contains(&status) {
        StatusDecision::Dead
    } else if status < 400 {
        StatusDecision::Alive
    } else if protocol == "http" {
        StatusDecision::KeptHttpError
    } else {
        StatusDecision::TryNextVariant
    }
}

// One candidate URL plus the protocol label the decision table needs.
struct ProbeVariant {
    url: String,
    protocol: &'static str,
}

// Builds the four candidate URLs in their fixed probe order.
fn candidate_urls(domain: &str) -> Vec<ProbeVariant> {
    let mut variants = Vec::with_capacity(HOST_PREFIXES.len() * PROTOCOLS.len());
    for prefix in HOST_PREFIXES {
        for protocol in PROTOCOLS {
            variants.push(ProbeVariant {
                url: format!("{}://{}{}", protocol, prefix, domain),
                protocol,
            });
        }
    }
    variants
}

// Maps a request error to a coarse, stable kind string for the audit trail.
fn error_kind(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "Timeout"
    } else if error.is_connect() {
        "ConnectionError"
    } else if error.is_redirect() {
        "TooManyRedirects"
    } else if error.is_body() || error.is_decode() {
        "BodyError"
    } else {
        "RequestError"
    }
}

/// Probes one domain at a time: DNS first, then the HTTP variant ladder.
///
/// One instance is shared read-only across all worker tasks; the reqwest
/// client inside it is a handle onto a thread-safe connection pool.
pub struct SiteProber {
    client: Client,
    resolver: Arc<dyn DomainResolver>,
    retry_policy: RetryPolicy,
}

impl SiteProber {
    pub fn new(client: Client, resolver: Arc<dyn DomainResolver>, retry_policy: RetryPolicy) -> Self {
        Self {
            client,
            resolver,
            retry_policy,
        }
    }

    // Verifies a single catalog entry.
    //
    // Never returns an error: every failure mode is folded into the
    // VerificationResult so one bad domain cannot affect the others.
    pub async fn probe(&self, domain: &str, title: &str) -> VerificationResult {
        if !self.resolver.resolves(domain).await {
            debug!(domain, "does not resolve, marking for removal");
            return VerificationResult {
                domain: domain.to_string(),
                title: title.to_string(),
                verdict: Verdict::DnsAbsent,
                reason: "DNS Not Found".to_string(),
                http_status: None,
            };
        }

        self.probe_candidates(domain, title, candidate_urls(domain))
            .await
    }

    // Walks the candidate URLs in order, stopping at the first terminal
    // verdict.
    async fn probe_candidates(
        &self,
        domain: &str,
        title: &str,
        candidates: Vec<ProbeVariant>,
    ) -> VerificationResult {
        // Holds the kind of the most recent request error; only read if no
        // variant reaches a terminal verdict.
        let mut last_error: Option<&'static str> = None;

        for variant in &candidates {
            // A domain that can't form a valid URL counts as a failed attempt
            if Url::parse(&variant.url).is_err() {
                warn!(domain, url = %variant.url, "candidate URL does not parse");
                last_error = Some("InvalidUrl");
                continue;
            }

            match send_with_retry(&self.client, &self.retry_policy, &variant.url).await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    debug!(domain, url = %variant.url, status, "probe attempt completed");

                    match decide(status, variant.protocol) {
                        StatusDecision::Dead => {
                            return self.terminal(
                                domain,
                                title,
                                Verdict::ConfirmedDead,
                                format!("{} DEAD", status),
                                Some(status),
                            );
                        }
                        StatusDecision::Alive => {
                            return self.terminal(
                                domain,
                                title,
                                Verdict::Alive,
                                format!("OK {}", status),
                                Some(status),
                            );
                        }
                        StatusDecision::KeptHttpError => {
                            return self.terminal(
                                domain,
                                title,
                                Verdict::TransientOrUnknownFailure,
                                format!("HTTP {}", status),
                                Some(status),
                            );
                        }
                        StatusDecision::TryNextVariant => {
                            // https answered with a non-dead error status;
                            // give plain http a chance before giving up
                        }
                    }
                }
                Err(error) => {
                    let kind = error_kind(&error);
                    debug!(domain, url = %variant.url, error = %error, kind, "probe attempt failed");
                    last_error = Some(kind);
                }
            }
        }

        // Every variant failed without a verdict. An unreachable host is not
        // proof the site is gone, so the entry is kept.
        warn!(domain, last_error, "all probe variants failed");
        self.terminal(
            domain,
            title,
            Verdict::TransientOrUnknownFailure,
            last_error.unwrap_or("Unknown Error").to_string(),
            None,
        )
    }

    fn terminal(
        &self,
        domain: &str,
        title: &str,
        verdict: Verdict,
        reason: String,
        http_status: Option<u16>,
    ) -> VerificationResult {
        VerificationResult {
            domain: domain.to_string(),
            title: title.to_string(),
            verdict,
            reason,
            http_status,
        }
    }
}
