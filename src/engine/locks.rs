//! Keyed mutual exclusion.
//!
//! Time-card writes hold their staff contract's lock in shared mode and the
//! lock of their `(contract, year-month)` exclusively, so two cards of one
//! month never recompute in parallel while different months proceed
//! independently. Lifecycle operations and deletions hold the contract lock
//! exclusively and therefore wait out every card write of that contract.
//!
//! Entries are created on first use and evicted once no caller holds or
//! waits on them.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, RwLock};

use crate::error::{EngineError, EngineResult};

/// A lazily populated map of per-key reader-writer locks.
#[derive(Debug)]
pub struct KeyedLocks<K> {
    locks: Mutex<HashMap<K, Arc<RwLock<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

fn poisoned() -> EngineError {
    EngineError::Storage {
        message: "engine lock poisoned".to_string(),
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    /// Runs `f` while holding the lock for `key` exclusively.
    pub fn with<T>(&self, key: &K, f: impl FnOnce() -> EngineResult<T>) -> EngineResult<T> {
        let handle = self.acquire(key)?;
        let result = match handle.write() {
            Ok(_guard) => f(),
            Err(_) => Err(poisoned()),
        };
        self.release(key, handle);
        result
    }

    /// Runs `f` while holding the lock for `key` in shared mode.
    pub fn with_shared<T>(&self, key: &K, f: impl FnOnce() -> EngineResult<T>) -> EngineResult<T> {
        let handle = self.acquire(key)?;
        let result = match handle.read() {
            Ok(_guard) => f(),
            Err(_) => Err(poisoned()),
        };
        self.release(key, handle);
        result
    }

    fn acquire(&self, key: &K) -> EngineResult<Arc<RwLock<()>>> {
        let mut locks = self.locks.lock().map_err(|_| poisoned())?;
        Ok(Arc::clone(locks.entry(key.clone()).or_default()))
    }

    /// Drops the map's entry when `handle` is its only other owner. Handles
    /// are only cloned under the map lock, so the count cannot rise here.
    fn release(&self, key: &K, handle: Arc<RwLock<()>>) {
        if let Ok(mut locks) = self.locks.lock() {
            if Arc::strong_count(&handle) == 2 {
                locks.remove(key);
            }
        }
    }

    /// Number of keys currently held or waited on.
    pub fn len(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or(0)
    }

    /// Whether no key is held or waited on.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::thread;

    #[test]
    fn test_same_key_serializes() {
        let locks = Arc::new(KeyedLocks::<u32>::default());
        let inside = Arc::new(AtomicU32::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                thread::spawn(move || {
                    locks
                        .with(&1, || {
                            let before = inside.fetch_add(1, Ordering::SeqCst);
                            assert_eq!(before, 0);
                            thread::yield_now();
                            inside.fetch_sub(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(locks.is_empty());
    }

    #[test]
    fn test_entries_evicted_after_use() {
        let locks = KeyedLocks::<u32>::default();
        for key in 0..100 {
            locks.with(&key, || Ok(())).unwrap();
            locks.with_shared(&key, || Ok(())).unwrap();
        }
        assert!(locks.is_empty());
    }

    #[test]
    fn test_entry_kept_while_held() {
        let locks = KeyedLocks::<u32>::default();
        locks
            .with(&7, || {
                assert_eq!(locks.len(), 1);
                Ok(())
            })
            .unwrap();
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn test_exclusive_waits_for_shared() {
        let locks = Arc::new(KeyedLocks::<u32>::default());
        let reading = Arc::new(AtomicU32::new(0));
        let (entered_tx, entered_rx) = std::sync::mpsc::channel();

        let reader = {
            let locks = Arc::clone(&locks);
            let reading = Arc::clone(&reading);
            thread::spawn(move || {
                locks
                    .with_shared(&1, || {
                        reading.store(1, Ordering::SeqCst);
                        entered_tx.send(()).unwrap();
                        thread::sleep(std::time::Duration::from_millis(50));
                        reading.store(0, Ordering::SeqCst);
                        Ok(())
                    })
                    .unwrap();
            })
        };
        entered_rx.recv().unwrap();
        locks
            .with(&1, || {
                assert_eq!(reading.load(Ordering::SeqCst), 0);
                Ok(())
            })
            .unwrap();
        reader.join().unwrap();
        assert!(locks.is_empty());
    }

    #[test]
    fn test_error_passes_through() {
        let locks = KeyedLocks::<&str>::default();
        let result: EngineResult<()> = locks.with(&"a", || Err(EngineError::invalid_interval("x")));
        assert!(matches!(result, Err(EngineError::InvalidInterval { .. })));
        // The lock is released on error
        assert!(locks.with(&"a", || Ok(1)).is_ok());
        assert!(locks.is_empty());
    }
}
