use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use crate::assets::domain::model::AssetEntity;
use crate::assets::repository::memory_asset_repository::MemoryAssetRepository;
use crate::checkout::repository::CheckoutRepository;
use crate::checkout::repository::memory_checkout_history_repository::MemoryCheckoutHistoryRepository;
use crate::checkout::repository::memory_checkout_repository::MemoryCheckoutRepository;
use crate::circulation::domain::locks::AssetLocks;
use crate::circulation::domain::service::CirculationServiceImpl;
use crate::core::domain::Configuration;
use crate::core::events::DomainEvent;
use crate::core::library::{AssetStatus, LibraryError};
use crate::core::repository::Repository;
use crate::gateway::events::EventPublisher;
use crate::hold::repository::memory_hold_repository::MemoryHoldRepository;
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::repository::memory_patron_repository::MemoryPatronRepository;

// CapturingPublisher keeps published events so tests can assert on them
#[derive(Debug, Clone, Default)]
pub(crate) struct CapturingPublisher {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl CapturingPublisher {
    pub(crate) fn names(&self) -> Vec<String> {
        self.events.lock().expect("events lock").iter().map(|e| e.name.clone()).collect()
    }

    pub(crate) fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().expect("events lock").clone()
    }
}

#[async_trait]
impl EventPublisher for CapturingPublisher {
    async fn create_topic(&mut self, topic: &str) -> Result<String, LibraryError> {
        Ok(topic.to_string())
    }

    async fn get_topics(&mut self) -> Result<Vec<String>, LibraryError> {
        Ok(vec![])
    }

    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError> {
        self.events.lock().expect("events lock").push(event.clone());
        Ok(())
    }
}

// CirculationFixture wires the engine to memory repositories that tests can seed and inspect
pub(crate) struct CirculationFixture {
    pub config: Configuration,
    pub assets: MemoryAssetRepository,
    pub patrons: MemoryPatronRepository,
    pub checkouts: MemoryCheckoutRepository,
    pub history: MemoryCheckoutHistoryRepository,
    pub holds: MemoryHoldRepository,
    pub publisher: CapturingPublisher,
    pub locks: AssetLocks,
}

impl CirculationFixture {
    pub(crate) fn new() -> Self {
        Self::with_config(Configuration::new("test"))
    }

    pub(crate) fn with_config(config: Configuration) -> Self {
        Self {
            config,
            assets: MemoryAssetRepository::new(),
            patrons: MemoryPatronRepository::new(),
            checkouts: MemoryCheckoutRepository::new(),
            history: MemoryCheckoutHistoryRepository::new(),
            holds: MemoryHoldRepository::new(),
            publisher: CapturingPublisher::default(),
            locks: AssetLocks::new(),
        }
    }

    // every service shares the records and the asset locks of the fixture
    pub(crate) fn service(&self) -> CirculationServiceImpl {
        self.service_with(Box::new(self.checkouts.clone()), self.locks.clone())
    }

    pub(crate) fn service_with(&self, checkouts: Box<dyn CheckoutRepository>, locks: AssetLocks) -> CirculationServiceImpl {
        CirculationServiceImpl::new(&self.config,
                                    Box::new(self.assets.clone()),
                                    Box::new(self.patrons.clone()),
                                    checkouts,
                                    Box::new(self.history.clone()),
                                    Box::new(self.holds.clone()),
                                    Box::new(self.publisher.clone()),
                                    locks)
    }

    pub(crate) async fn add_asset(&self, title: &str) -> String {
        self.add_asset_with_status(title, AssetStatus::Available).await
    }

    pub(crate) async fn add_asset_with_status(&self, title: &str, status: AssetStatus) -> String {
        let mut asset = AssetEntity::new(title);
        asset.asset_status = status;
        self.assets.create(&asset).await.expect("should create asset");
        asset.asset_id
    }

    pub(crate) async fn add_patron(&self, library_card_id: &str, first_name: &str, last_name: &str) {
        let patron = PatronEntity::new(library_card_id, first_name, last_name);
        self.patrons.create(&patron).await.expect("should create patron");
    }

    pub(crate) async fn asset_status(&self, asset_id: &str) -> AssetStatus {
        self.assets.get(asset_id).await.expect("should get asset").asset_status
    }
}
