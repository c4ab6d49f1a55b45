use std::any::Any;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use spdlog::debug;

type CacheValue = Arc<dyn Any + Send + Sync>;

/// Identifies one getter in a [`DataCache`]. Every call to `unique` returns a new key.
#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
pub struct CacheKey(usize);

impl CacheKey {
    pub fn unique() -> Self {
        static NEXT_KEY: AtomicUsize = AtomicUsize::new(0);
        CacheKey(NEXT_KEY.fetch_add(1, Ordering::Relaxed))
    }
}

/// Values computed once and kept until the cache is dropped or cleared.
#[derive(Default)]
pub struct DataCache {
    cache: RwLock<HashMap<CacheKey, CacheValue>>,
}

impl DataCache {
    pub fn new() -> Self {
        DataCache {
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn get<T: Any + Send + Sync>(&self, key: CacheKey) -> Option<Arc<T>> {
        let reader = self.cache.read().unwrap_or_else(|e| e.into_inner());
        let value = reader.get(&key)?.clone();
        value.downcast::<T>().ok()
    }

    /// Keeps the value already stored for `key`, if any, and returns the stored one.
    pub fn insert<T: Any + Send + Sync>(&self, key: CacheKey, value: T) -> Arc<T> {
        let value = Arc::new(value);
        let stored = {
            let mut writer = self.cache.write().unwrap_or_else(|e| e.into_inner());
            writer.entry(key)
                .or_insert_with(|| value.clone() as CacheValue)
                .clone()
        };

        // A key is only ever used by one Lazy<T>, a type mismatch cannot happen through it
        stored.downcast::<T>().unwrap_or(value)
    }

    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.cache.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

type Loader<T> = Box<dyn Fn() -> io::Result<T> + Send + Sync>;

/// A getter that runs its loader on first access and reads from the cache afterwards.
/// Failed loads are not cached.
pub struct Lazy<T> {
    key: CacheKey,
    load: Loader<T>,
}

impl<T: Any + Send + Sync> Lazy<T> {
    pub fn new<F>(load: F) -> Self
    where
        F: Fn() -> io::Result<T> + Send + Sync + 'static,
    {
        Lazy {
            key: CacheKey::unique(),
            load: Box::new(load),
        }
    }

    pub fn key(&self) -> CacheKey {
        self.key
    }

    pub fn get(&self, cache: &DataCache) -> io::Result<Arc<T>> {
        if let Some(value) = cache.get::<T>(self.key) {
            return Ok(value);
        }

        debug!("Loading cached data for {:?}", self.key);
        let value = (self.load)()?;
        Ok(cache.insert(self.key, value))
    }
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;

    use super::*;

    fn counting_lazy(counter: Arc<AtomicUsize>) -> Lazy<String> {
        Lazy::new(move || {
            let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("loaded {}", count))
        })
    }

    #[test]
    fn test_keys_are_unique() {
        assert_ne!(CacheKey::unique(), CacheKey::unique());
    }

    #[test]
    fn test_loads_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let lazy = counting_lazy(counter.clone());
        let cache = DataCache::new();

        assert_eq!(lazy.get(&cache).unwrap().as_str(), "loaded 1");
        assert_eq!(lazy.get(&cache).unwrap().as_str(), "loaded 1");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_getters_do_not_share_values() {
        let counter = Arc::new(AtomicUsize::new(0));
        let first = counting_lazy(counter.clone());
        let second = counting_lazy(counter.clone());
        let cache = DataCache::new();

        assert_eq!(first.get(&cache).unwrap().as_str(), "loaded 1");
        assert_eq!(second.get(&cache).unwrap().as_str(), "loaded 2");
        assert_eq!(first.get(&cache).unwrap().as_str(), "loaded 1");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_clear_forces_reload() {
        let counter = Arc::new(AtomicUsize::new(0));
        let lazy = counting_lazy(counter.clone());
        let cache = DataCache::new();

        lazy.get(&cache).unwrap();
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(lazy.get(&cache).unwrap().as_str(), "loaded 2");
    }

    #[test]
    fn test_first_insert_wins() {
        let cache = DataCache::new();
        let key = CacheKey::unique();
        let first = cache.insert(key, 1_u32);
        let second = cache.insert(key, 2_u32);
        assert_eq!(*first, 1);
        assert_eq!(*second, 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let counter = Arc::new(AtomicUsize::new(0));
        let calls = counter.clone();
        let lazy: Lazy<String> = Lazy::new(move || {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(io::Error::new(ErrorKind::NotFound, "not yet"))
            } else {
                Ok("ready".to_string())
            }
        });
        let cache = DataCache::new();

        assert_eq!(lazy.get(&cache).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(lazy.get(&cache).unwrap().as_str(), "ready");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
