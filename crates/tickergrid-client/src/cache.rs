//! Keyed response cache with hierarchical invalidation.
//!
//! Keys are ordered tuples of resource class, optional resource id, and an
//! optional canonical query signature. Invalidation works on key prefixes,
//! plus explicit links between resource classes (a stock mutation also
//! drops its price series). The linked classes are NOT nested under the
//! stock prefix, see [`ResourceClass::invalidates_with`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tickergrid_core::ResourceClass;

use crate::token::RequestToken;

/// Cache interaction mode for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Serve a cached entry when present; fetch and populate otherwise.
    #[default]
    Use,
    /// Fetch from the network and overwrite the cached entry.
    Refresh,
    /// Fetch from the network; neither read nor write the cache.
    Bypass,
}

/// Ordered cache key: class, then optional id, then optional query
/// signature. A prefix is a key with trailing components unset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    class: ResourceClass,
    id: Option<String>,
    query: Option<String>,
}

impl CacheKey {
    /// Key prefix covering a whole resource class.
    pub fn class(class: ResourceClass) -> Self {
        Self {
            class,
            id: None,
            query: None,
        }
    }

    /// Key prefix covering one resource.
    pub fn resource(class: ResourceClass, id: impl Into<String>) -> Self {
        Self {
            class,
            id: Some(id.into()),
            query: None,
        }
    }

    /// Attach a canonical query signature: pairs are sorted and
    /// percent-encoded so parameter order never splits the cache.
    pub fn with_query(mut self, params: &[(&str, &str)]) -> Self {
        let mut pairs: Vec<(&str, &str)> = params.to_vec();
        pairs.sort_unstable();
        let signature = pairs
            .iter()
            .map(|(name, value)| {
                format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&");
        self.query = Some(signature);
        self
    }

    pub const fn resource_class(&self) -> ResourceClass {
        self.class
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn query_signature(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Whether this key starts with `prefix` (unset prefix components
    /// match anything).
    fn starts_with(&self, prefix: &CacheKey) -> bool {
        if self.class != prefix.class {
            return false;
        }
        if let Some(prefix_id) = &prefix.id {
            if self.id.as_ref() != Some(prefix_id) {
                return false;
            }
        }
        if let Some(prefix_query) = &prefix.query {
            if self.query.as_ref() != Some(prefix_query) {
                return false;
            }
        }
        true
    }
}

/// Staleness and eviction windows.
///
/// An entry younger than `staleness` is fresh. Between `staleness` and
/// `ttl` it is served stale while a revalidation is due. Past `ttl` it is
/// gone. `ttl` is clamped to at least `staleness`.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    pub staleness: Duration,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            staleness: Duration::from_secs(30),
            ttl: Duration::from_secs(300),
        }
    }
}

impl CacheConfig {
    pub fn new(staleness: Duration, ttl: Duration) -> Self {
        Self {
            staleness,
            ttl: ttl.max(staleness),
        }
    }
}

/// A cache read: the payload plus whether it is past its staleness window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheHit {
    Fresh(String),
    Stale(String),
}

impl CacheHit {
    pub fn value(&self) -> &str {
        match self {
            Self::Fresh(body) | Self::Stale(body) => body,
        }
    }

    pub fn into_value(self) -> String {
        match self {
            Self::Fresh(body) | Self::Stale(body) => body,
        }
    }

    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::Stale(_))
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    stored_at: Instant,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<CacheKey, CacheEntry>,
    config: CacheConfig,
}

/// Shared, keyed response cache. One instance per client session; all
/// mutation goes through `set`/`invalidate_*`, atomic per key.
///
/// Writes are last-completion-wins: whichever `set` reaches the lock last
/// owns the entry, regardless of when its fetch started.
#[derive(Debug, Clone)]
pub struct CacheCoordinator {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl CacheCoordinator {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner {
                map: HashMap::new(),
                config,
            })),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Read an entry, classifying it against the staleness window. Entries
    /// past their ttl read as absent.
    pub async fn get(&self, key: &CacheKey) -> Option<CacheHit> {
        let inner = self.inner.read().await;
        let entry = inner.map.get(key)?;
        let age = entry.stored_at.elapsed();

        if age > inner.config.ttl {
            return None;
        }
        if age > inner.config.staleness {
            return Some(CacheHit::Stale(entry.body.clone()));
        }
        Some(CacheHit::Fresh(entry.body.clone()))
    }

    /// Store a payload under the key, overwriting any previous entry.
    pub async fn set(&self, key: CacheKey, body: String) {
        let mut inner = self.inner.write().await;
        inner.map.insert(
            key,
            CacheEntry {
                body,
                stored_at: Instant::now(),
            },
        );
    }

    /// Store a payload unless the owning request was cancelled. This is
    /// the only write path the client uses, which is what keeps late
    /// completions of cancelled requests out of the cache.
    pub async fn set_guarded(&self, key: CacheKey, body: String, token: &RequestToken) {
        if token.is_cancelled() {
            return;
        }
        // The cancellation check and the insert are under one lock scope;
        // a cancel after this point only affects future writes.
        let mut inner = self.inner.write().await;
        if token.is_cancelled() {
            return;
        }
        inner.map.insert(
            key,
            CacheEntry {
                body,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop every entry whose key starts with the prefix. Idempotent.
    pub async fn invalidate_prefix(&self, prefix: &CacheKey) {
        let mut inner = self.inner.write().await;
        inner.map.retain(|key, _| !key.starts_with(prefix));
    }

    /// Invalidation rule for a successful mutation on one resource: the
    /// resource's own entries, the class-level list/search entries, and
    /// the same resource's entries in every linked class.
    pub async fn invalidate_resource(&self, class: ResourceClass, id: &str) {
        let mut inner = self.inner.write().await;
        inner.map.retain(|key, _| {
            let classes_match =
                key.resource_class() == class || class.invalidates_with().contains(&key.resource_class());
            if !classes_match {
                return true;
            }
            // Keep only entries pinned to a different resource id.
            match key.id() {
                Some(entry_id) => entry_id != id,
                None => false,
            }
        });
    }

    /// Drop a whole resource class and its linked classes.
    pub async fn invalidate_class(&self, class: ResourceClass) {
        let mut inner = self.inner.write().await;
        inner.map.retain(|key, _| {
            key.resource_class() != class
                && !class.invalidates_with().contains(&key.resource_class())
        });
    }

    pub async fn invalidate_all(&self) {
        let mut inner = self.inner.write().await;
        inner.map.clear();
    }

    /// Drop entries past their ttl.
    pub async fn clear_expired(&self) {
        let mut inner = self.inner.write().await;
        let ttl = inner.config.ttl;
        inner.map.retain(|_, entry| entry.stored_at.elapsed() <= ttl);
    }

    pub async fn len(&self) -> usize {
        let inner = self.inner.read().await;
        inner.map.len()
    }
}
