use std::collections::{HashMap, VecDeque};

use tokio::sync::RwLock;

/// Bounded id-to-recipe store. When full, the oldest insert is evicted.
pub struct RecipeCache<T> {
    capacity: usize,
    inner: RwLock<Entries<T>>,
}

struct Entries<T> {
    map: HashMap<String, T>,
    order: VecDeque<String>,
}

impl<T: Clone> RecipeCache<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(Entries {
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub async fn insert(&self, id: impl Into<String>, value: T) {
        let id = id.into();
        let mut entries = self.inner.write().await;

        // Replacing keeps the original insertion slot.
        if let Some(existing) = entries.map.get_mut(&id) {
            *existing = value;
            return;
        }

        while entries.order.len() >= self.capacity {
            match entries.order.pop_front() {
                Some(oldest) => {
                    entries.map.remove(&oldest);
                }
                None => break,
            }
        }
        entries.order.push_back(id.clone());
        entries.map.insert(id, value);
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        self.inner.read().await.map.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = RecipeCache::new(4);
        cache.insert("a", 1).await;
        assert_eq!(cache.get("a").await, Some(1));
        assert_eq!(cache.get("b").await, None);
    }

    #[tokio::test]
    async fn test_evicts_oldest_first() {
        let cache = RecipeCache::new(2);
        cache.insert("a", 1).await;
        cache.insert("b", 2).await;
        cache.insert("c", 3).await;
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("b").await, Some(2));
        assert_eq!(cache.get("c").await, Some(3));
    }

    #[tokio::test]
    async fn test_reinsert_keeps_slot() {
        let cache = RecipeCache::new(2);
        cache.insert("a", 1).await;
        cache.insert("b", 2).await;
        cache.insert("a", 10).await;
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("a").await, Some(10));

        cache.insert("c", 3).await;
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("b").await, Some(2));
    }

    #[tokio::test]
    async fn test_zero_capacity_holds_one() {
        let cache = RecipeCache::new(0);
        cache.insert("a", 1).await;
        cache.insert("b", 2).await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("b").await, Some(2));
    }
}
