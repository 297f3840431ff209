//! Cache configuration.
//!
//! Controls which backend caches cake lookups and how cache failures are treated.

use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_TTL_SECS: u64 = 60;
const DEFAULT_MEMORY_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    Disabled,
    Memory,
    Redis,
}

impl FromStr for CacheBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "disabled" => Ok(Self::Disabled),
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => Err(format!(
                "unknown cache backend `{other}` (expected none, memory or redis)"
            )),
        }
    }
}

/// What a cache failure does to the surrounding repository call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheFailurePolicy {
    /// Any cache failure fails the call, even after the store write committed.
    Strict,
    /// Cache failures are logged; reads fall back to the store.
    BestEffort,
}

impl FromStr for CacheFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "strict" => Ok(Self::Strict),
            "best_effort" => Ok(Self::BestEffort),
            other => Err(format!(
                "unknown cache failure policy `{other}` (expected strict or best_effort)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackendKind,
    pub redis_url: Option<String>,
    /// Expiry applied to every entry written after a store read.
    pub ttl: Duration,
    /// Maximum entries held by the in-process backend.
    pub memory_capacity: NonZeroUsize,
    pub failure_policy: CacheFailurePolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::Disabled,
            redis_url: None,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            memory_capacity: NonZeroUsize::new(DEFAULT_MEMORY_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
            failure_policy: CacheFailurePolicy::Strict,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            backend: settings.backend,
            redis_url: settings.redis_url.clone(),
            ttl: settings.ttl,
            memory_capacity: settings.memory_capacity,
            failure_policy: settings.failure_policy,
        }
    }
}

impl CacheConfig {
    pub fn is_enabled(&self) -> bool {
        self.backend != CacheBackendKind::Disabled
    }
}
