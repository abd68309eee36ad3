use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};
use smol_str::SmolStr;

use crate::Result;

/// Deterministic fingerprint of raw query bytes, used as the cache key when
/// the client supplied no named-query alias. The same bytes must always yield
/// the same key.
pub trait HashProvider: Send + Sync {
    fn fingerprint(&self, query: &[u8]) -> Result<SmolStr>;
}

/// Shared store of compiled documents, keyed by alias or fingerprint.
///
/// Implementations must be safe under concurrent lookup and insertion.
/// Concurrent misses on one key may each compile and race on `set`; either
/// writer may win, but a reader must never observe a partially constructed
/// document.
pub trait DocumentCache<D>: Send + Sync {
    fn try_get(&self, key: &str) -> Option<Arc<D>>;
    fn set(&self, key: &str, document: Arc<D>);
}

/// Hex-encoded SHA-256 over the raw (still escaped) query bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256HashProvider;

impl HashProvider for Sha256HashProvider {
    fn fingerprint(&self, query: &[u8]) -> Result<SmolStr> {
        let digest = Sha256::digest(query);
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest {
            write!(hex, "{byte:02x}").expect("writing to a String cannot fail");
        }
        Ok(SmolStr::from(hex))
    }
}

/// Mutex-guarded map cache. Last writer wins on racing insertions; entries
/// are complete `Arc`s, so readers always see a fully built document.
#[derive(Debug)]
pub struct InMemoryDocumentCache<D> {
    entries: Mutex<HashMap<SmolStr, Arc<D>>>,
}

impl<D> InMemoryDocumentCache<D> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<D> Default for InMemoryDocumentCache<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Send + Sync> DocumentCache<D> for InMemoryDocumentCache<D> {
    fn try_get(&self, key: &str) -> Option<Arc<D>> {
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, document: Arc<D>) {
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .insert(SmolStr::new(key), document);
    }
}
