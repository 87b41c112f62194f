// Read-through cache of remote objects keyed by numeric id
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Entries are kept for the life of the process; nothing is evicted or
/// invalidated.
pub struct ObjectCache<T> {
    entries: RwLock<HashMap<u64, Arc<T>>>,
}

impl<T> ObjectCache<T> {
    pub fn new() -> Self {
        Self::with_entries(HashMap::new())
    }

    pub fn with_entries(entries: HashMap<u64, Arc<T>>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub async fn get(&self, id: u64) -> Option<Arc<T>> {
        self.entries.read().await.get(&id).cloned()
    }

    /// Return the cached object or run `fetch` and remember its result.
    /// Errors are not cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, id: u64, fetch: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(found) = self.get(id).await {
            return Ok(found);
        }

        let fetched = Arc::new(fetch().await?);
        let mut entries = self.entries.write().await;
        // A concurrent request may have filled the slot while we were fetching.
        let entry = entries.entry(id).or_insert(fetched);
        Ok(entry.clone())
    }

    pub async fn insert_all<I>(&self, items: I)
    where
        I: IntoIterator<Item = (u64, T)>,
    {
        let mut entries = self.entries.write().await;
        for (id, item) in items {
            entries.insert(id, Arc::new(item));
        }
    }

    pub async fn values(&self) -> Vec<Arc<T>> {
        self.entries.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<T> Default for ObjectCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_get_or_fetch_fetches_once() {
        let cache: ObjectCache<String> = ObjectCache::new();
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        for _ in 0..3 {
            let value = cache
                .get_or_fetch(1, move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>("group".to_string())
                })
                .await
                .unwrap();
            assert_eq!(value.as_str(), "group");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: ObjectCache<u32> = ObjectCache::new();

        let failed = cache.get_or_fetch(7, || async { Err::<u32, _>("boom") }).await;
        assert!(failed.is_err());
        assert!(cache.get(7).await.is_none());

        let value = cache.get_or_fetch(7, || async { Ok::<_, &str>(42) }).await.unwrap();
        assert_eq!(*value, 42);
    }

    #[tokio::test]
    async fn test_injected_entries() {
        let mut seeded = HashMap::new();
        seeded.insert(3, Arc::new("seeded".to_string()));
        let cache = ObjectCache::with_entries(seeded);

        let value = cache
            .get_or_fetch(3, || async { Err::<String, _>("should not fetch") })
            .await
            .unwrap();
        assert_eq!(value.as_str(), "seeded");
    }
}
