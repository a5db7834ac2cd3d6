pub mod ddb_asset_repository;
pub mod memory_asset_repository;

use async_trait::async_trait;
use crate::assets::domain::model::AssetEntity;
use crate::core::library::{AssetStatus, LibraryResult};
use crate::core::repository::Repository;

#[async_trait]
pub(crate) trait AssetRepository: Repository<AssetEntity> {
    // sets the circulation status whatever the stored version is, concurrent
    // check-outs of an asset are settled by the checkout claim before this write
    async fn update_status(&self, asset_id: &str, status: AssetStatus) -> LibraryResult<usize>;
}
