use lazy_static::lazy_static;

use crate::core::repository::RepositoryStore;
use crate::hold::repository::HoldRepository;
use crate::hold::repository::ddb_hold_repository::{DDBHoldRepository, HOLD_TABLE};
use crate::hold::repository::memory_hold_repository::MemoryHoldRepository;
use crate::utils::ddb::{build_db_client, create_table};

lazy_static! {
    static ref MEMORY_HOLDS: MemoryHoldRepository = MemoryHoldRepository::new();
}

pub(crate) async fn create_hold_repository(store: RepositoryStore) -> Box<dyn HoldRepository> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await;
            Box::new(DDBHoldRepository::new(client, HOLD_TABLE.table_name, HOLD_TABLE.index_name().as_str()))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            let _ = create_table(&client, &HOLD_TABLE).await;
            Box::new(DDBHoldRepository::new(client, HOLD_TABLE.table_name, HOLD_TABLE.index_name().as_str()))
        }
        RepositoryStore::Memory => {
            Box::new(MEMORY_HOLDS.clone())
        }
    }
}
