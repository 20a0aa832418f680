//! Compiled-output cache keyed by source text.
//!
//! Each distinct source compiles at most once at a time: concurrent callers for the same source
//! block on one shared cell and receive the same `Arc`. A slot stays in a pending table until its
//! compile finishes and only then enters the LRU, so eviction never drops an in-flight compile.
//! Errors are cached as well, since compilation is pure.

use std::hash::BuildHasher;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hashbrown::hash_map::DefaultHashBuilder;
use hashbrown::HashMap;
use log::{debug, trace};
use lru::LruCache;
use once_cell::sync::OnceCell;

use crate::compile::{compile, Compiled};
use crate::config::CompilerConfig;
use crate::error::CompileError;

type Slot = Arc<OnceCell<Result<Arc<Compiled>, CompileError>>>;

struct Entry {
    source: Arc<str>,
    slot: Slot,
}

impl Entry {
    fn new(source: &str) -> Self {
        Self {
            source: Arc::from(source),
            slot: Slot::default(),
        }
    }
}

struct Entries {
    done: LruCache<u64, Entry>,
    pending: HashMap<u64, Entry>,
}

/// LRU cache bound to one [`CompilerConfig`].
pub struct CompileCache {
    config: CompilerConfig,
    hasher: DefaultHashBuilder,
    entries: Mutex<Entries>,
}

impl CompileCache {
    pub fn new(config: CompilerConfig) -> Result<Self, CompileError> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.cache_capacity).ok_or_else(|| CompileError::InvalidConfig {
            reason: "cache capacity must be greater than 0".to_string(),
        })?;
        Ok(Self {
            config,
            hasher: DefaultHashBuilder::default(),
            entries: Mutex::new(Entries {
                done: LruCache::new(capacity),
                pending: HashMap::new(),
            }),
        })
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Return the cached result for `source`, compiling it first if needed.
    pub fn get_or_compile(&self, source: &str) -> Result<Arc<Compiled>, CompileError> {
        let key = self.hasher.hash_one(source);

        match self.slot_for(key, source) {
            // Compile outside the lock so other sources are not held up.
            Some(slot) => {
                let result = slot
                    .get_or_init(|| compile(source, &self.config).map(Arc::new))
                    .clone();
                self.promote(key, &slot);
                result
            }
            None => {
                debug!("hash collision on {key:016x}; compiling without caching");
                compile(source, &self.config).map(Arc::new)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Find or register the slot for `source`. `None` means another source owns the key.
    fn slot_for(&self, key: u64, source: &str) -> Option<Slot> {
        let mut entries = self.lock();
        let Entries { done, pending } = &mut *entries;

        if let Some(entry) = done.get(&key) {
            return if *entry.source == *source {
                trace!("cache hit for {key:016x}");
                Some(Arc::clone(&entry.slot))
            } else {
                None
            };
        }

        let entry = pending.entry(key).or_insert_with(|| Entry::new(source));
        if *entry.source == *source {
            Some(Arc::clone(&entry.slot))
        } else {
            None
        }
    }

    /// Move a finished slot from the pending table into the LRU.
    fn promote(&self, key: u64, slot: &Slot) {
        let mut entries = self.lock();
        let owned = entries
            .pending
            .get(&key)
            .is_some_and(|entry| Arc::ptr_eq(&entry.slot, slot));
        if owned {
            if let Some(entry) = entries.pending.remove(&key) {
                entries.done.put(key, entry);
            }
        }
    }

    /// Finished entries held by the LRU.
    pub fn len(&self) -> usize {
        self.lock().done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every finished entry. Compiles still in flight are kept.
    pub fn clear(&self) {
        self.lock().done.clear();
    }
}
