//! Content-addressed render cache.
//!
//! Every entry is fingerprinted from its canonical JSON form. A fingerprint
//! that is already stored is served verbatim; anything else is rendered once
//! and written under its key. Keys are never rewritten and never evicted.

mod keys;
mod render_cache;
mod store;

pub use keys::{CacheKey, canonical_json};
pub use render_cache::{CacheError, CacheOutcome, CacheStats, RenderCache, get_or_render};
pub use store::{DirectoryStore, FragmentStore, MemoryStore, StoreError};
