use std::collections::HashMap;
use async_trait::async_trait;
use crate::assets::domain::model::AssetEntity;
use crate::assets::repository::AssetRepository;
use crate::core::library::{AssetStatus, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::memory::MemoryStore;

#[derive(Debug, Clone)]
pub(crate) struct MemoryAssetRepository {
    store: MemoryStore<AssetEntity>,
}

impl MemoryAssetRepository {
    pub(crate) fn new() -> Self {
        Self {
            store: MemoryStore::new("assets"),
        }
    }
}

#[async_trait]
impl Repository<AssetEntity> for MemoryAssetRepository {
    async fn create(&self, entity: &AssetEntity) -> LibraryResult<usize> {
        self.store.create(entity)
    }

    async fn update(&self, entity: &AssetEntity) -> LibraryResult<usize> {
        self.store.update(entity)
    }

    async fn get(&self, id: &str) -> LibraryResult<AssetEntity> {
        self.store.get(id)
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.store.delete(id)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<AssetEntity>> {
        self.store.query(predicate, page, page_size)
    }
}

#[async_trait]
impl AssetRepository for MemoryAssetRepository {
    async fn update_status(&self, asset_id: &str, status: AssetStatus) -> LibraryResult<usize> {
        let mut asset = self.store.get(asset_id)?;
        asset.asset_status = status;
        self.store.update(&asset)
    }
}
