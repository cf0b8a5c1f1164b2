// src/verifier/dns.rs
// =============================================================================
// DNS pre-check for catalog domains.
//
// A domain that no longer resolves is a strong, immediate "gone" signal, so
// we look it up once before spending any time on HTTP. There is no retry and
// no caching across domains - resolution is cheap next to probing.
// =============================================================================

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use tracing::debug;

// The resolution seam the prober depends on.
//
// Object-safe so the prober can hold `Arc<dyn DomainResolver>` and tests can
// substitute a stub that never touches the network.
#[async_trait]
pub trait DomainResolver: Send + Sync {
    /// Returns true if the domain resolves to at least one address.
    async fn resolves(&self, domain: &str) -> bool;
}

/// Production resolver backed by hickory's async resolver.
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
}

impl DnsResolver {
    // Prefers the platform resolver configuration (/etc/resolv.conf etc.);
    // falls back to the library defaults when none can be read.
    pub fn new() -> Self {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|_| {
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });
        Self { resolver }
    }
}

impl Default for DnsResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DomainResolver for DnsResolver {
    async fn resolves(&self, domain: &str) -> bool {
        match self.resolver.lookup_ip(domain).await {
            Ok(lookup) => {
                // A successful lookup with zero addresses still means "absent"
                let found = lookup.iter().next().is_some();
                debug!(domain, found, "DNS lookup completed");
                found
            }
            Err(e) => {
                // NXDOMAIN and friends all land here
                debug!(domain, error = %e, "DNS lookup failed");
                false
            }
        }
    }
}
