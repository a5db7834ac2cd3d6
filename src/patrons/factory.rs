use lazy_static::lazy_static;

use crate::core::repository::RepositoryStore;
use crate::patrons::repository::PatronRepository;
use crate::patrons::repository::ddb_patron_repository::{DDBPatronRepository, PATRON_TABLE};
use crate::patrons::repository::memory_patron_repository::MemoryPatronRepository;
use crate::utils::ddb::{build_db_client, create_table};

lazy_static! {
    static ref MEMORY_PATRONS: MemoryPatronRepository = MemoryPatronRepository::new();
}

pub(crate) async fn create_patron_repository(store: RepositoryStore) -> Box<dyn PatronRepository> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await;
            Box::new(DDBPatronRepository::new(client, "patrons", "patrons_ndx"))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            let _ = create_table(&client, &PATRON_TABLE).await;
            Box::new(DDBPatronRepository::new(client, "patrons", "patrons_ndx"))
        }
        RepositoryStore::Memory => {
            Box::new(MEMORY_PATRONS.clone())
        }
    }
}
