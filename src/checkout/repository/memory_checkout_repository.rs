use std::collections::HashMap;
use async_trait::async_trait;
use crate::checkout::domain::model::CheckoutEntity;
use crate::checkout::repository::CheckoutRepository;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::memory::MemoryStore;

#[derive(Debug, Clone)]
pub(crate) struct MemoryCheckoutRepository {
    store: MemoryStore<CheckoutEntity>,
}

impl MemoryCheckoutRepository {
    pub(crate) fn new() -> Self {
        Self {
            store: MemoryStore::new("checkout"),
        }
    }
}

#[async_trait]
impl Repository<CheckoutEntity> for MemoryCheckoutRepository {
    async fn create(&self, entity: &CheckoutEntity) -> LibraryResult<usize> {
        self.store.create_unique(entity, |c| c.asset_id == entity.asset_id)
    }

    async fn update(&self, entity: &CheckoutEntity) -> LibraryResult<usize> {
        self.store.update(entity)
    }

    async fn get(&self, id: &str) -> LibraryResult<CheckoutEntity> {
        self.store.get(id)
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.store.delete(id)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<CheckoutEntity>> {
        self.store.query(predicate, page, page_size)
    }
}

#[async_trait]
impl CheckoutRepository for MemoryCheckoutRepository {
    async fn find_by_asset_id(&self, asset_id: &str) -> LibraryResult<Option<CheckoutEntity>> {
        Ok(self.store.find(|c| c.asset_id == asset_id)?.into_iter().next())
    }

    async fn delete_by_asset_id(&self, asset_id: &str) -> LibraryResult<usize> {
        self.store.delete_where(|c| c.asset_id == asset_id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use crate::checkout::domain::model::CheckoutEntity;
    use crate::checkout::repository::CheckoutRepository;
    use crate::checkout::repository::memory_checkout_repository::MemoryCheckoutRepository;
    use crate::core::library::LibraryError;
    use crate::core::repository::Repository;

    #[tokio::test]
    async fn test_should_keep_one_checkout_per_asset() {
        let checkout_repo = MemoryCheckoutRepository::new();
        let now = Utc::now().naive_utc();
        let first = CheckoutEntity::new("asset1", "card1", now, now + Duration::days(30));
        checkout_repo.create(&first).await.expect("should create checkout");
        let res = checkout_repo.create(&CheckoutEntity::new("asset1", "card2", now, now)).await;
        assert!(matches!(res, Err(LibraryError::DuplicateKey { .. })));
        checkout_repo.create(&CheckoutEntity::new("asset2", "card1", now, now)).await.expect("should create checkout");

        let loaded = checkout_repo.find_by_asset_id("asset1").await.expect("should find checkout");
        assert_eq!(Some(first.checkout_id.clone()), loaded.map(|c| c.checkout_id));
        assert_eq!(1, checkout_repo.delete_by_asset_id("asset1").await.expect("should delete checkout"));
        assert_eq!(None, checkout_repo.find_by_asset_id("asset1").await.expect("should find checkout"));
        assert_eq!(0, checkout_repo.delete_by_asset_id("asset1").await.expect("should delete checkout"));
        assert!(checkout_repo.find_by_asset_id("asset2").await.expect("should find checkout").is_some());
    }
}
