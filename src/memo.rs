//! Memoizing parser wrapper.
//!
//! Trees are cached under the SHA-256 of the source text, hex-encoded, so
//! identical files (generated sources, vendored copies) are parsed once per
//! process. Only successful parses are cached; a parser failure is retried
//! on the next request.
//!
//! The cache is bounded: once it holds `capacity` trees, the least recently
//! used one is evicted to make room (`[parser] memo_capacity`).

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::config::DEFAULT_MEMO_CAPACITY;
use crate::parser::{ParserError, SourceParser};

/// Hex SHA-256 of `source`.
pub fn source_digest(source: &str) -> String {
    hex::encode(Sha256::digest(source.as_bytes()))
}

/// Caches the trees produced by `P`.
#[derive(Debug)]
pub struct MemoParser<P> {
    inner: P,
    cache: Mutex<LruCache<String, Value>>,
}

impl<P: SourceParser> MemoParser<P> {
    /// Wrap `inner` with a cache of [`DEFAULT_MEMO_CAPACITY`] trees.
    pub fn new(inner: P) -> Self {
        let capacity = NonZeroUsize::new(DEFAULT_MEMO_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self::with_capacity(inner, capacity)
    }

    pub fn with_capacity(inner: P, capacity: NonZeroUsize) -> Self {
        MemoParser {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Most trees held before eviction.
    pub fn capacity(&self) -> usize {
        self.cache
            .lock()
            .map(|c| c.cap().get())
            .unwrap_or_else(|e| e.into_inner().cap().get())
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of cached trees.
    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or_else(|e| e.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P: SourceParser> SourceParser for MemoParser<P> {
    fn parse(&self, source: &str) -> Result<Value, ParserError> {
        let key = source_digest(source);
        {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(tree) = cache.get(&key) {
                trace!(%key, "parse cache hit");
                return Ok(tree.clone());
            }
        }

        trace!(%key, "parse cache miss");
        let tree = self.inner.parse(source)?;
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .put(key, tree.clone());
        Ok(tree)
    }
}
