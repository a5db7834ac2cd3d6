pub mod ddb_hold_repository;
pub mod memory_hold_repository;

use async_trait::async_trait;
use crate::hold::domain::model::HoldEntity;
use crate::core::library::LibraryResult;
use crate::core::repository::Repository;

#[async_trait]
pub(crate) trait HoldRepository: Repository<HoldEntity> {
    // holds of the asset in queue order, earliest hold_placed first
    async fn find_by_asset_id(&self, asset_id: &str) -> LibraryResult<Vec<HoldEntity>>;

    // removes a hold returned by find_by_asset_id
    async fn delete_hold(&self, hold: &HoldEntity) -> LibraryResult<usize>;
}
