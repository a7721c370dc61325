//! In-memory result cache keyed by content fingerprint.
//!
//! Entries expire after a fixed TTL. Expired entries are invisible to
//! [`ContentCache::get`] but stay in memory until the next
//! [`ContentCache::sweep`]; the pipeline sweeps after every insert. There is
//! no background timer and nothing is persisted.

use dashmap::DashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::claim::CanonicalAnalysisResult;
use crate::fingerprint::Fingerprint;

/// Time source for cache ages. Production uses [`SystemClock`].
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|p| p.into_inner());
        *offset += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(|p| p.into_inner());
        self.origin + offset
    }
}

/// A stored result. Never mutated after insertion; re-inserting replaces it.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: Fingerprint,
    pub text: String,
    pub data: CanonicalAnalysisResult,
    pub created_at: Instant,
}

pub struct ContentCache {
    entries: DashMap<Fingerprint, Arc<CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for ContentCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentCache")
            .field("entries", &self.entries.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl ContentCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn age(&self, entry: &CacheEntry) -> Duration {
        self.clock.now().saturating_duration_since(entry.created_at)
    }

    /// Returns the live entry for `text`, if any.
    pub fn get(&self, text: &str) -> Option<Arc<CacheEntry>> {
        let key = Fingerprint::of(text);
        let entry = self.entries.get(&key)?.value().clone();
        if entry.text != text {
            tracing::warn!(fingerprint = %key, "cache.collision");
            return None;
        }
        if self.age(&entry) >= self.ttl {
            tracing::trace!(fingerprint = %key, "cache.expired");
            return None;
        }
        Some(entry)
    }

    /// Stores `data` for `text` with a fresh timestamp, replacing any previous entry.
    pub fn put(&self, text: &str, data: CanonicalAnalysisResult) -> Arc<CacheEntry> {
        let key = Fingerprint::of(text);
        let entry = Arc::new(CacheEntry {
            key,
            text: text.to_string(),
            data,
            created_at: self.clock.now(),
        });
        self.entries.insert(key, entry.clone());
        entry
    }

    /// Drops every entry older than the TTL. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let before = self.entries.len();
        let now = self.clock.now();
        self.entries
            .retain(|_, e| now.saturating_duration_since(e.created_at) <= self.ttl);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, remaining = self.entries.len(), "cache.sweep");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}
