use std::collections::HashMap;
use async_trait::async_trait;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::hold::domain::model::HoldEntity;
use crate::hold::repository::HoldRepository;
use crate::utils::memory::MemoryStore;

#[derive(Debug, Clone)]
pub(crate) struct MemoryHoldRepository {
    store: MemoryStore<HoldEntity>,
}

impl MemoryHoldRepository {
    pub(crate) fn new() -> Self {
        Self {
            store: MemoryStore::new("hold"),
        }
    }
}

#[async_trait]
impl Repository<HoldEntity> for MemoryHoldRepository {
    async fn create(&self, entity: &HoldEntity) -> LibraryResult<usize> {
        self.store.create(entity)
    }

    async fn update(&self, entity: &HoldEntity) -> LibraryResult<usize> {
        self.store.update(entity)
    }

    async fn get(&self, id: &str) -> LibraryResult<HoldEntity> {
        self.store.get(id)
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.store.delete(id)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<HoldEntity>> {
        self.store.query(predicate, page, page_size)
    }
}

#[async_trait]
impl HoldRepository for MemoryHoldRepository {
    async fn find_by_asset_id(&self, asset_id: &str) -> LibraryResult<Vec<HoldEntity>> {
        let mut holds = self.store.find(|h| h.asset_id == asset_id)?;
        // stable sort, equal hold_placed keep insertion order
        holds.sort_by(|a, b| a.hold_placed.cmp(&b.hold_placed));
        Ok(holds)
    }

    async fn delete_hold(&self, hold: &HoldEntity) -> LibraryResult<usize> {
        self.store.delete(hold.hold_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use crate::core::repository::Repository;
    use crate::hold::domain::model::HoldEntity;
    use crate::hold::repository::HoldRepository;
    use crate::hold::repository::memory_hold_repository::MemoryHoldRepository;

    #[tokio::test]
    async fn test_should_order_holds_by_placement() {
        let hold_repo = MemoryHoldRepository::new();
        let now = Utc::now().naive_utc();
        let late = HoldEntity::new("asset1", "card1", now + Duration::minutes(5));
        let early = HoldEntity::new("asset1", "card2", now);
        hold_repo.create(&late).await.expect("should create hold");
        hold_repo.create(&early).await.expect("should create hold");

        let holds = hold_repo.find_by_asset_id("asset1").await.expect("should find holds");
        assert_eq!(vec!["card2".to_string(), "card1".to_string()],
                   holds.iter().map(|h| h.library_card_id.clone()).collect::<Vec<String>>());
    }

    #[tokio::test]
    async fn test_should_break_ties_by_insertion_order() {
        let hold_repo = MemoryHoldRepository::new();
        let now = Utc::now().naive_utc();
        for card in ["card3", "card1", "card2"] {
            hold_repo.create(&HoldEntity::new("asset1", card, now)).await.expect("should create hold");
        }
        let holds = hold_repo.find_by_asset_id("asset1").await.expect("should find holds");
        assert_eq!(vec!["card3".to_string(), "card1".to_string(), "card2".to_string()],
                   holds.iter().map(|h| h.library_card_id.clone()).collect::<Vec<String>>());
        assert!(hold_repo.find_by_asset_id("asset2").await.expect("should find holds").is_empty());

        assert_eq!(1, hold_repo.delete_hold(&holds[0]).await.expect("should delete hold"));
        assert_eq!(2, hold_repo.find_by_asset_id("asset1").await.expect("should find holds").len());
    }
}
