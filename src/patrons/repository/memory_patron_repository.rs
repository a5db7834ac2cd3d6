use std::collections::HashMap;
use async_trait::async_trait;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::repository::PatronRepository;
use crate::utils::memory::MemoryStore;

#[derive(Debug, Clone)]
pub(crate) struct MemoryPatronRepository {
    store: MemoryStore<PatronEntity>,
}

impl MemoryPatronRepository {
    pub(crate) fn new() -> Self {
        Self {
            store: MemoryStore::new("patrons"),
        }
    }
}

#[async_trait]
impl Repository<PatronEntity> for MemoryPatronRepository {
    async fn create(&self, entity: &PatronEntity) -> LibraryResult<usize> {
        self.store.create(entity)
    }

    async fn update(&self, entity: &PatronEntity) -> LibraryResult<usize> {
        self.store.update(entity)
    }

    async fn get(&self, id: &str) -> LibraryResult<PatronEntity> {
        self.store.get(id)
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        self.store.delete(id)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<PatronEntity>> {
        self.store.query(predicate, page, page_size)
    }
}

#[async_trait]
impl PatronRepository for MemoryPatronRepository {
    async fn find_by_library_card_id(&self, library_card_id: &str) -> LibraryResult<Option<PatronEntity>> {
        let patrons = self.store.find(|p| p.library_card_id == library_card_id)?;
        Ok(patrons.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use crate::core::repository::Repository;
    use crate::patrons::domain::model::PatronEntity;
    use crate::patrons::repository::memory_patron_repository::MemoryPatronRepository;
    use crate::patrons::repository::PatronRepository;

    #[tokio::test]
    async fn test_should_find_by_library_card() {
        let patron_repo = MemoryPatronRepository::new();
        let patron = PatronEntity::new("card1", "Ada", "Lovelace");
        patron_repo.create(&patron).await.expect("should create patron");
        patron_repo.create(&PatronEntity::new("card2", "Alan", "Turing")).await.expect("should create patron");

        let loaded = patron_repo.find_by_library_card_id("card1").await.expect("should find patron");
        assert_eq!(Some(patron), loaded);
        assert_eq!(None, patron_repo.find_by_library_card_id("card3").await.expect("should find patron"));
    }
}
