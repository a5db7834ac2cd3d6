use std::collections::HashMap;
use async_trait::async_trait;
use crate::checkout::domain::model::CheckoutHistoryEntity;
use crate::checkout::repository::CheckoutHistoryRepository;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::memory::MemoryStore;

#[derive(Debug, Clone)]
pub(crate) struct MemoryCheckoutHistoryRepository {
    store: MemoryStore<CheckoutHistoryEntity>,
}

impl MemoryCheckoutHistoryRepository {
    pub(crate) fn new() -> Self {
        Self {
            store: MemoryStore::new("checkout_history"),
        }
    }
}

#[async_trait]
impl Repository<CheckoutHistoryEntity> for MemoryCheckoutHistoryRepository {
    async fn create(&self, entity: &CheckoutHistoryEntity) -> LibraryResult<usize> {
        self.store.create(entity)
    }

    async fn update(&self, entity: &CheckoutHistoryEntity) -> LibraryResult<usize> {
        self.store.update(entity)
    }

    async fn get(&self, id: &str) -> LibraryResult<CheckoutHistoryEntity> {
        self.store.get(id)
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.store.delete(id)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<CheckoutHistoryEntity>> {
        self.store.query(predicate, page, page_size)
    }
}

#[async_trait]
impl CheckoutHistoryRepository for MemoryCheckoutHistoryRepository {
    async fn find_by_asset_id(&self, asset_id: &str) -> LibraryResult<Vec<CheckoutHistoryEntity>> {
        self.store.find(|h| h.asset_id == asset_id)
    }

    async fn find_open_by_asset_id(&self, asset_id: &str) -> LibraryResult<Option<CheckoutHistoryEntity>> {
        let open = self.store.find(|h| h.asset_id == asset_id && h.is_open())?;
        Ok(open.into_iter().next())
    }
}
