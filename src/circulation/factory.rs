use lazy_static::lazy_static;

use crate::assets::factory::create_asset_repository;
use crate::checkout::factory::{create_checkout_history_repository, create_checkout_repository};
use crate::circulation::domain::CirculationService;
use crate::circulation::domain::locks::AssetLocks;
use crate::circulation::domain::service::CirculationServiceImpl;
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::gateway::factory::{create_publisher, register_circulation_topics};
use crate::hold::factory::create_hold_repository;
use crate::patrons::factory::create_patron_repository;

// every service of the process takes the same asset locks
lazy_static! {
    static ref ASSET_LOCKS: AssetLocks = AssetLocks::new();
}

pub async fn create_circulation_service(config: &Configuration, store: RepositoryStore) -> Box<dyn CirculationService> {
    let asset_repo = create_asset_repository(store).await;
    let patron_repo = create_patron_repository(store).await;
    let checkout_repo = create_checkout_repository(store).await;
    let history_repo = create_checkout_history_repository(store).await;
    let hold_repo = create_hold_repository(store).await;
    let mut publisher = create_publisher(store.gateway_publisher()).await;
    register_circulation_topics(&mut publisher).await;
    Box::new(CirculationServiceImpl::new(config, asset_repo, patron_repo, checkout_repo,
                                         history_repo, hold_repo, publisher, ASSET_LOCKS.clone()))
}

#[cfg(test)]
mod tests {
    use crate::assets::domain::model::AssetEntity;
    use crate::assets::factory::create_asset_repository;
    use crate::circulation::domain::CirculationService;
    use crate::circulation::factory::create_circulation_service;
    use crate::core::domain::Configuration;
    use crate::core::repository::{Repository, RepositoryStore};
    use crate::patrons::domain::model::PatronEntity;
    use crate::patrons::factory::create_patron_repository;

    #[tokio::test]
    async fn test_should_create_memory_circulation_service() {
        let svc = create_circulation_service(&Configuration::new("test"), RepositoryStore::Memory).await;
        let err = svc.check_out("missing", "B1").await.expect_err("should fail for unknown asset");
        assert!(err.is_not_found());
        assert!(svc.current_holds("missing").await.expect("should find holds").is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_should_share_memory_state_between_services() {
        let config = Configuration::new("test");
        let asset = AssetEntity::new("Dune");
        create_asset_repository(RepositoryStore::Memory).await.create(&asset).await.expect("should create asset");
        let patrons = create_patron_repository(RepositoryStore::Memory).await;
        let cards: Vec<String> = (0..4).map(|_| uuid::Uuid::new_v4().to_string()).collect();
        for card in cards.iter() {
            patrons.create(&PatronEntity::new(card.as_str(), "Shared", "Reader")).await.expect("should create patron");
        }

        // one service per command, as the command layer builds them
        let mut handles = vec![];
        for card in cards {
            let asset_id = asset.asset_id.clone();
            handles.push(tokio::spawn(async move {
                let svc = create_circulation_service(&Configuration::new("test"), RepositoryStore::Memory).await;
                svc.check_out(asset_id.as_str(), card.as_str()).await
            }));
        }
        let mut applied = 0;
        for handle in handles {
            if handle.await.expect("should join").expect("should check out").applied {
                applied += 1;
            }
        }
        assert_eq!(1, applied);

        let other = create_circulation_service(&config, RepositoryStore::Memory).await;
        let summary = other.summary(asset.asset_id.as_str()).await.expect("should build summary");
        assert!(summary.is_checked_out);
        assert_eq!(1, summary.history.len());
        assert_eq!("Shared Reader", summary.checkout_patron.as_str());
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_create_local_circulation_service() {
        let svc = create_circulation_service(&Configuration::new("test"), RepositoryStore::LocalDynamoDB).await;
        let summary = svc.summary("missing").await;
        assert!(summary.expect_err("should fail for unknown asset").is_not_found());
    }
}
