use lazy_static::lazy_static;

use crate::assets::repository::AssetRepository;
use crate::assets::repository::ddb_asset_repository::{ASSET_TABLE, DDBAssetRepository};
use crate::assets::repository::memory_asset_repository::MemoryAssetRepository;
use crate::core::repository::RepositoryStore;
use crate::utils::ddb::{build_db_client, create_table};

lazy_static! {
    static ref MEMORY_ASSETS: MemoryAssetRepository = MemoryAssetRepository::new();
}

pub(crate) async fn create_asset_repository(store: RepositoryStore) -> Box<dyn AssetRepository> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await;
            Box::new(DDBAssetRepository::new(client, "assets", "assets_ndx"))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            let _ = create_table(&client, &ASSET_TABLE).await;
            Box::new(DDBAssetRepository::new(client, "assets", "assets_ndx"))
        }
        RepositoryStore::Memory => {
            Box::new(MEMORY_ASSETS.clone())
        }
    }
}
