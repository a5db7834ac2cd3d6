pub mod ddb_checkout_history_repository;
pub mod ddb_checkout_repository;
pub mod memory_checkout_history_repository;
pub mod memory_checkout_repository;

use async_trait::async_trait;
use crate::checkout::domain::model::{CheckoutEntity, CheckoutHistoryEntity};
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;

// An asset has at most one active checkout, `create` fails with DuplicateKey
// while another checkout of the asset is stored.
#[async_trait]
pub(crate) trait CheckoutRepository: Repository<CheckoutEntity> {
    // the active checkout of the asset, read from the latest write
    async fn find_by_asset_id(&self, asset_id: &str) -> LibraryResult<Option<CheckoutEntity>>;

    async fn delete_by_asset_id(&self, asset_id: &str) -> LibraryResult<usize>;
}

#[async_trait]
pub(crate) trait CheckoutHistoryRepository: Repository<CheckoutHistoryEntity> {
    // every history record of the asset in the order it was written
    async fn find_by_asset_id(&self, asset_id: &str) -> LibraryResult<Vec<CheckoutHistoryEntity>>;

    async fn find_open_by_asset_id(&self, asset_id: &str) -> LibraryResult<Option<CheckoutHistoryEntity>>;
}
