use metrics::counter;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    application::render::{RenderedFragment, render_fragment},
    domain::{entries::ErrorEntry, error::DomainError},
};

use super::{
    keys::CacheKey,
    store::{FragmentStore, StoreError},
};

const CACHE_HIT_TOTAL: &str = "errata_cache_hit_total";
const CACHE_MISS_TOTAL: &str = "errata_cache_miss_total";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to fingerprint entry: {0}")]
    Fingerprint(#[source] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Render(#[from] DomainError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

impl CacheOutcome {
    fn as_str(self) -> &'static str {
        match self {
            CacheOutcome::Hit => "cache_hit",
            CacheOutcome::Miss => "cache_miss",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

impl CacheStats {
    pub fn lookups(&self) -> usize {
        self.hits + self.misses
    }
}

/// Memoizes [`render_fragment`] on top of a [`FragmentStore`].
///
/// A hit returns the stored fragment verbatim and writes nothing; a miss
/// renders and performs exactly one `put`.
pub struct RenderCache<'s, S: FragmentStore + ?Sized> {
    store: &'s mut S,
    stats: CacheStats,
}

impl<'s, S: FragmentStore + ?Sized> RenderCache<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self {
            store,
            stats: CacheStats::default(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn get_or_render(&mut self, entry: &ErrorEntry) -> Result<RenderedFragment, CacheError> {
        self.lookup(entry).map(|(fragment, _)| fragment)
    }

    /// Like [`Self::get_or_render`], also reporting whether the store served it.
    pub fn lookup(
        &mut self,
        entry: &ErrorEntry,
    ) -> Result<(RenderedFragment, CacheOutcome), CacheError> {
        let key = CacheKey::for_entry(entry).map_err(CacheError::Fingerprint)?;

        let (fragment, outcome) = if self.store.contains(&key)? {
            (self.store.get(&key)?, CacheOutcome::Hit)
        } else {
            let fragment = render_fragment(entry)?;
            self.store.put(&key, &fragment)?;
            (fragment, CacheOutcome::Miss)
        };

        match outcome {
            CacheOutcome::Hit => {
                self.stats.hits += 1;
                counter!(CACHE_HIT_TOTAL).increment(1);
                info!(
                    target = "errata::cache",
                    op = "render_cache::lookup",
                    result = outcome.as_str(),
                    key = %key,
                    "Cache hit"
                );
            }
            CacheOutcome::Miss => {
                self.stats.misses += 1;
                counter!(CACHE_MISS_TOTAL).increment(1);
                debug!(
                    target = "errata::cache",
                    op = "render_cache::lookup",
                    result = outcome.as_str(),
                    key = %key,
                    fragment_bytes = fragment.as_str().len(),
                    "Rendered and stored fragment"
                );
            }
        }

        Ok((fragment, outcome))
    }
}

/// One-off lookup against `store`.
pub fn get_or_render<S: FragmentStore + ?Sized>(
    entry: &ErrorEntry,
    store: &mut S,
) -> Result<RenderedFragment, CacheError> {
    RenderCache::new(store).get_or_render(entry)
}
