use lazy_static::lazy_static;

use crate::checkout::repository::{CheckoutHistoryRepository, CheckoutRepository};
use crate::checkout::repository::ddb_checkout_history_repository::{CHECKOUT_HISTORY_TABLE, DDBCheckoutHistoryRepository};
use crate::checkout::repository::ddb_checkout_repository::{CHECKOUT_TABLE, DDBCheckoutRepository};
use crate::checkout::repository::memory_checkout_history_repository::MemoryCheckoutHistoryRepository;
use crate::checkout::repository::memory_checkout_repository::MemoryCheckoutRepository;
use crate::core::repository::RepositoryStore;
use crate::utils::ddb::{build_db_client, create_table};

// memory repositories of the process, every service built for Memory sees the same records
lazy_static! {
    static ref MEMORY_CHECKOUTS: MemoryCheckoutRepository = MemoryCheckoutRepository::new();
    static ref MEMORY_HISTORY: MemoryCheckoutHistoryRepository = MemoryCheckoutHistoryRepository::new();
}

pub(crate) async fn create_checkout_repository(store: RepositoryStore) -> Box<dyn CheckoutRepository> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await;
            Box::new(DDBCheckoutRepository::new(client, CHECKOUT_TABLE.table_name, CHECKOUT_TABLE.index_name().as_str()))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            let _ = create_table(&client, &CHECKOUT_TABLE).await;
            Box::new(DDBCheckoutRepository::new(client, CHECKOUT_TABLE.table_name, CHECKOUT_TABLE.index_name().as_str()))
        }
        RepositoryStore::Memory => {
            Box::new(MEMORY_CHECKOUTS.clone())
        }
    }
}

pub(crate) async fn create_checkout_history_repository(store: RepositoryStore) -> Box<dyn CheckoutHistoryRepository> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await;
            Box::new(DDBCheckoutHistoryRepository::new(
                client, CHECKOUT_HISTORY_TABLE.table_name, CHECKOUT_HISTORY_TABLE.index_name().as_str()))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            let _ = create_table(&client, &CHECKOUT_HISTORY_TABLE).await;
            Box::new(DDBCheckoutHistoryRepository::new(
                client, CHECKOUT_HISTORY_TABLE.table_name, CHECKOUT_HISTORY_TABLE.index_name().as_str()))
        }
        RepositoryStore::Memory => {
            Box::new(MEMORY_HISTORY.clone())
        }
    }
}
