//! Enrichment cache: semantic-keyed artifacts with single-flight generation.
//!
//! Each enrichment (explanation text, troubleshooting text, rendered video
//! URL) is stored under a key derived from the request, never from object
//! identity, so repeated requests for the same step hit the cache. Misses
//! invoke the caller-supplied generator under a per-key lock: concurrent
//! requests for one key share a single generation, while requests for
//! different keys proceed independently. Failed generations are never
//! stored and never disturb a pre-existing entry.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::GuideError;

/// Hex digest prefix length used for help-request fingerprints.
const FINGERPRINT_LEN: usize = 16;

/// Bounded, deterministic fingerprint of a step's text.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(FINGERPRINT_LEN);
    hex
}

/// Semantic identity of an enrichment request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The application welcome video.
    Welcome,
    /// Avatar video for the step at `index`.
    StepVideo { index: usize },
    /// Explanation text for the step at `index`.
    Explain { index: usize },
    /// Troubleshooting text for the step at `index`.
    Troubleshoot { index: usize },
    /// Help video keyed by a fingerprint of the step text.
    Help { fingerprint: String },
}

impl CacheKey {
    /// Help key for a step, fingerprinting its full text.
    pub fn help_for(step_text: &str) -> Self {
        CacheKey::Help {
            fingerprint: fingerprint(step_text),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Welcome => write!(f, "welcome"),
            CacheKey::StepVideo { index } => write!(f, "step:{index}"),
            CacheKey::Explain { index } => write!(f, "explain:{index}"),
            CacheKey::Troubleshoot { index } => write!(f, "troubleshoot:{index}"),
            CacheKey::Help { fingerprint } => write!(f, "help:{fingerprint}"),
        }
    }
}

/// A generated enrichment artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Artifact {
    /// Free-form advisory text.
    Text(String),
    /// URL (or path) of a rendered video asset.
    VideoUrl(String),
}

impl Artifact {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Artifact::Text(text) => Some(text),
            Artifact::VideoUrl(_) => None,
        }
    }

    pub fn as_video_url(&self) -> Option<&str> {
        match self {
            Artifact::VideoUrl(url) => Some(url),
            Artifact::Text(_) => None,
        }
    }
}

/// Result of a cache lookup: the artifact and where it came from.
#[derive(Debug, Clone)]
pub struct Lookup {
    pub artifact: Artifact,
    /// True when the artifact was served from the cache rather than
    /// freshly generated.
    pub was_cached: bool,
}

/// Stored entries plus LRU bookkeeping.
struct Store {
    entries: HashMap<CacheKey, Artifact>,
    access_order: Vec<CacheKey>,
    capacity: usize,
}

impl Store {
    fn touch(&mut self, key: &CacheKey) {
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            let key = self.access_order.remove(pos);
            self.access_order.push(key);
        }
    }

    fn get(&mut self, key: &CacheKey) -> Option<Artifact> {
        let artifact = self.entries.get(key).cloned()?;
        self.touch(key);
        Some(artifact)
    }

    fn insert(&mut self, key: CacheKey, artifact: Artifact) {
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            self.evict_lru();
        }
        if let Some(pos) = self.access_order.iter().position(|k| k == &key) {
            self.access_order.remove(pos);
        }
        self.access_order.push(key.clone());
        self.entries.insert(key, artifact);
    }

    fn evict_lru(&mut self) {
        if self.access_order.is_empty() {
            return;
        }
        let key = self.access_order.remove(0);
        tracing::debug!(key = %key, "evicting least recently used entry");
        self.entries.remove(&key);
    }
}

/// Process-wide artifact cache with per-key single-flight generation.
pub struct EnrichmentCache {
    store: Mutex<Store>,
    flights: Mutex<HashMap<CacheKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl EnrichmentCache {
    /// Create a cache bounded to `capacity` entries (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            store: Mutex::new(Store {
                entries: HashMap::new(),
                access_order: Vec::new(),
                capacity: capacity.max(1),
            }),
            flights: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.store.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up `key` without generating. Refreshes LRU recency on hit.
    pub fn peek(&self, key: &CacheKey) -> Option<Artifact> {
        self.store.lock().unwrap().get(key)
    }

    /// Return the cached artifact for `key`, generating it on a miss.
    ///
    /// With `force` set, the generator always runs and its result replaces
    /// any stored entry. Concurrent callers for the same key serialize on a
    /// per-key lock; the loser of the race observes the winner's freshly
    /// stored entry instead of generating again. A generator failure
    /// propagates without storing anything, so a later call retries and a
    /// pre-existing entry for the key survives untouched.
    pub async fn get_or_generate<F, Fut>(
        &self,
        key: CacheKey,
        force: bool,
        generator: F,
    ) -> Result<Lookup, GuideError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Artifact, GuideError>>,
    {
        if !force {
            if let Some(artifact) = self.peek(&key) {
                tracing::debug!(key = %key, "cache hit");
                return Ok(Lookup {
                    artifact,
                    was_cached: true,
                });
            }
        }

        let flight = self.flight_slot(&key);
        let guard = flight.lock().await;

        // Another caller may have filled the entry while we waited.
        if !force {
            if let Some(artifact) = self.peek(&key) {
                tracing::debug!(key = %key, "cache hit after shared generation");
                drop(guard);
                self.release_flight(&key, &flight);
                return Ok(Lookup {
                    artifact,
                    was_cached: true,
                });
            }
        }

        tracing::debug!(key = %key, force, "invoking generator");
        let result = generator().await;

        // Store before releasing the lock so waiters see the fresh entry.
        let outcome = match result {
            Ok(artifact) => {
                self.store
                    .lock()
                    .unwrap()
                    .insert(key.clone(), artifact.clone());
                Ok(Lookup {
                    artifact,
                    was_cached: false,
                })
            }
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "generation failed, nothing cached");
                Err(err)
            }
        };

        drop(guard);
        self.release_flight(&key, &flight);
        outcome
    }

    /// Per-key lock slot, created on first use.
    fn flight_slot(&self, key: &CacheKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut flights = self.flights.lock().unwrap();
        flights
            .entry(key.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Drop the slot once no other caller holds it.
    fn release_flight(&self, key: &CacheKey, slot: &Arc<tokio::sync::Mutex<()>>) {
        let mut flights = self.flights.lock().unwrap();
        // Two strong refs mean the map and our caller only; waiters hold more.
        if Arc::strong_count(slot) <= 2 {
            flights.remove(key);
        }
    }
}
