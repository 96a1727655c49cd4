//! TTL-bound key/value cache contract used by the slotcap adapter.
//!
//! The adapter core only needs a namespaced get/set with a per-entry TTL;
//! anything richer (persistence, eviction policies) lives behind this trait.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store is unavailable: {0}")]
    Unavailable(String),

    #[error("cache value could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + Send + 'a>>;

/// Namespaced key/value store with per-entry TTL.
///
/// Writes on the adapter's response path are fire-and-forget: a failed `set`
/// must never fail the caller's request.
pub trait CacheStore: Send + Sync {
    fn get<'a>(&'a self, namespace: &'a str, key: &'a str) -> CacheFuture<'a, Option<Value>>;

    fn set<'a>(
        &'a self,
        namespace: &'a str,
        key: &'a str,
        value: Value,
        ttl: Duration,
    ) -> CacheFuture<'a, ()>;
}

struct Entry {
    value: Value,
    expires_at: Instant,
}

/// In-memory `CacheStore` with lazy expiry on read.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<(String, String), Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn compound_key(namespace: &str, key: &str) -> (String, String) {
        (namespace.to_owned(), key.to_owned())
    }
}

impl CacheStore for MemoryCache {
    fn get<'a>(&'a self, namespace: &'a str, key: &'a str) -> CacheFuture<'a, Option<Value>> {
        Box::pin(async move {
            let mut entries = self
                .entries
                .lock()
                .map_err(|_| CacheError::Unavailable(String::from("cache mutex poisoned")))?;

            let compound = Self::compound_key(namespace, key);
            match entries.get(&compound) {
                Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
                Some(_) => {
                    entries.remove(&compound);
                    Ok(None)
                }
                None => Ok(None),
            }
        })
    }

    fn set<'a>(
        &'a self,
        namespace: &'a str,
        key: &'a str,
        value: Value,
        ttl: Duration,
    ) -> CacheFuture<'a, ()> {
        Box::pin(async move {
            let mut entries = self
                .entries
                .lock()
                .map_err(|_| CacheError::Unavailable(String::from("cache mutex poisoned")))?;

            entries.insert(
                Self::compound_key(namespace, key),
                Entry {
                    value,
                    expires_at: Instant::now() + ttl,
                },
            );
            Ok(())
        })
    }
}
