//! Location caching shared by the transit and weather providers.
//!
//! A [`LocationCache`] maps user-visible display names to whatever a
//! provider needs to query its backend (a station id, a coordinate).
//! Entries arrive through [`LocationCache::search`] and
//! [`LocationCache::resolve_missing`]. Several dashboards share one
//! cache, so request handlers only add names and let
//! [`LocationCache::evict_idle`] drop names no client asked for lately.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Backend that resolves free-text queries to locations.
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Provider-specific location metadata.
    type Location: Clone + Send + Sync;

    /// Backend error.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Candidate `(display name, location)` pairs for `query`, best first.
    ///
    /// `limit` is a hint; sources may return more candidates and the
    /// cache truncates after ranking.
    async fn lookup(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<(String, Self::Location)>, Self::Error>;
}

#[async_trait]
impl<T: LocationSource> LocationSource for Arc<T> {
    type Location = T::Location;
    type Error = T::Error;

    async fn lookup(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<(String, T::Location)>, T::Error> {
        (**self).lookup(query, limit).await
    }
}

/// The capability both dashboard providers expose.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Parameters of a data fetch.
    type Request: Send;
    /// Result of a data fetch.
    type Output: Send;
    /// Error of any provider operation.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Resolve `query` and remember up to `limit` matches.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, Self::Error>;

    /// Make the cached locations follow the current selection.
    async fn reconcile(&self, names: &[String]) -> Result<(), Self::Error>;

    /// Cache the names of `names` that are missing, keeping every other entry.
    async fn resolve_missing(&self, names: &[String]) -> Result<(), Self::Error>;

    /// Fetch fresh data.
    async fn fetch(&self, request: Self::Request) -> Result<Self::Output, Self::Error>;
}

/// Display name → location cache backed by a [`LocationSource`].
///
/// Safe to share between concurrent requests; the map sits behind an
/// async `RwLock` and backend lookups happen outside the lock.
pub struct LocationCache<S: LocationSource> {
    source: S,
    entries: RwLock<HashMap<String, Entry<S::Location>>>,
}

struct Entry<L> {
    location: L,
    last_used: Instant,
}

impl<L> Entry<L> {
    fn new(location: L) -> Self {
        Self {
            location,
            last_used: Instant::now(),
        }
    }
}

impl<S: LocationSource> LocationCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The backing source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolve `query`, cache up to `limit` matches and return their names.
    ///
    /// An exact name match is moved to the front before truncation, so it
    /// survives even when the backend ranks it lower. Blank queries return
    /// nothing without touching the backend.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, S::Error> {
        if query.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut candidates = self.source.lookup(query, limit).await?;

        if let Some(idx) = candidates.iter().position(|(name, _)| name == query) {
            candidates.swap(0, idx);
        }
        candidates.truncate(limit);

        let mut names: Vec<String> = Vec::with_capacity(candidates.len());
        let mut entries = self.entries.write().await;
        for (name, location) in candidates {
            if names.contains(&name) {
                continue;
            }
            entries.insert(name.clone(), Entry::new(location));
            names.push(name);
        }

        debug!(query, found = names.len(), "location search");
        Ok(names)
    }

    /// Drop entries not in `names` and look up the ones not yet cached.
    ///
    /// Every missing name is attempted; the first backend error (if any) is
    /// returned after all lookups ran. Names the backend cannot resolve are
    /// simply left out.
    ///
    /// This replaces the whole cache with one selection. Request handlers
    /// serving several clients use [`resolve_missing`](Self::resolve_missing)
    /// and [`evict_idle`](Self::evict_idle) instead.
    pub async fn reconcile(&self, names: &[String]) -> Result<(), S::Error> {
        let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
        self.entries
            .write()
            .await
            .retain(|name, _| wanted.contains(name.as_str()));

        self.resolve_missing(names).await
    }

    /// Look up the names in `names` that are not cached yet, never evicting.
    ///
    /// Cached names count as used now, so [`evict_idle`](Self::evict_idle)
    /// keeps them. Errors are handled as in [`reconcile`](Self::reconcile).
    pub async fn resolve_missing(&self, names: &[String]) -> Result<(), S::Error> {
        let missing: Vec<&str> = {
            let mut entries = self.entries.write().await;
            let now = Instant::now();

            let mut seen = HashSet::new();
            names
                .iter()
                .map(String::as_str)
                .filter(|name| match entries.get_mut(*name) {
                    Some(entry) => {
                        entry.last_used = now;
                        false
                    }
                    None => seen.insert(*name),
                })
                .collect()
        };

        let mut first_error = None;
        for name in missing {
            match self.search(name, 1).await {
                Ok(found) if found.first().map(String::as_str) == Some(name) => {}
                Ok(found) => debug!(name, ?found, "location resolved under a different name"),
                Err(e) => {
                    warn!(name, error = %e, "location lookup failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Drop entries nobody searched for or resolved within `max_idle`.
    ///
    /// Returns how many entries were removed.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.last_used.elapsed() <= max_idle);

        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, "idle locations evicted");
        }
        evicted
    }

    /// Look up a cached location.
    pub async fn get(&self, name: &str) -> Option<S::Location> {
        self.entries
            .read()
            .await
            .get(name)
            .map(|entry| entry.location.clone())
    }

    /// Whether `name` is cached.
    pub async fn contains(&self, name: &str) -> bool {
        self.entries.read().await.contains_key(name)
    }

    /// All cached names, sorted.
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
