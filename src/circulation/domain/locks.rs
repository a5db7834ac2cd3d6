use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;
use crate::core::library::{LibraryError, LibraryResult};

type LockTable = Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>;

// AssetLocks hands out one async mutex per asset id. Clones share the same
// table so every engine built on them serializes the same assets.
#[derive(Debug, Clone, Default)]
pub(crate) struct AssetLocks {
    locks: LockTable,
}

// AssetLockGuard releases the asset on drop and removes its entry once nobody
// else holds or waits for it
#[derive(Debug)]
pub(crate) struct AssetLockGuard {
    asset_id: String,
    locks: LockTable,
    guard: Option<OwnedMutexGuard<()>>,
}

impl AssetLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn acquire(&self, asset_id: &str) -> LibraryResult<AssetLockGuard> {
        let lock = {
            let mut locks = self.locks.lock().map_err(|_| LibraryError::runtime(
                format!("asset locks are poisoned while locking {}", asset_id).as_str(), None))?;
            locks.entry(asset_id.to_string()).or_default().clone()
        };
        Ok(AssetLockGuard {
            asset_id: asset_id.to_string(),
            locks: self.locks.clone(),
            guard: Some(lock.lock_owned().await),
        })
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or_default()
    }
}

impl Drop for AssetLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // waiters clone the entry under the table lock, a count of one is the table itself
        if let Ok(mut locks) = self.locks.lock() {
            if locks.get(self.asset_id.as_str()).map(|lock| Arc::strong_count(lock) == 1).unwrap_or(false) {
                locks.remove(self.asset_id.as_str());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use crate::circulation::domain::locks::AssetLocks;

    #[tokio::test]
    async fn test_should_lock_per_asset() {
        let locks = AssetLocks::new();
        let guard = locks.acquire("asset1").await.expect("should lock asset1");
        // another asset is not blocked
        let _other = locks.acquire("asset2").await.expect("should lock asset2");
        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.acquire("asset1")).await;
        assert!(blocked.is_err());
        drop(guard);
        let again = tokio::time::timeout(Duration::from_millis(50), locks.acquire("asset1")).await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn test_should_share_locks_between_clones() {
        let locks = AssetLocks::new();
        let other = locks.clone();
        let _guard = locks.acquire("asset1").await.expect("should lock asset1");
        let blocked = tokio::time::timeout(Duration::from_millis(50), other.acquire("asset1")).await;
        assert!(blocked.is_err());
    }

    #[tokio::test]
    async fn test_should_remove_released_locks() {
        let locks = AssetLocks::new();
        let first = locks.acquire("asset1").await.expect("should lock asset1");
        let second = locks.acquire("asset2").await.expect("should lock asset2");
        assert_eq!(2, locks.len());
        drop(first);
        assert_eq!(1, locks.len());
        drop(second);
        assert_eq!(0, locks.len());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_should_keep_lock_with_waiter() {
        let locks = AssetLocks::new();
        let guard = locks.acquire("asset1").await.expect("should lock asset1");
        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("asset1").await.expect("should lock asset1");
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(guard);
        // the waiter still holds the entry so it is not removed under it
        waiter.await.expect("should join waiter");
        assert_eq!(0, locks.len());
    }
}
