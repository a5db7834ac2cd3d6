use std::cmp;
use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;

use crate::assets::domain::model::AssetEntity;
use crate::assets::repository::AssetRepository;
use crate::core::library::{AssetStatus, LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::ddb::{add_filter_expr, from_ddb, parse_date_attribute, parse_item, parse_number_attribute, parse_string_attribute, string_date, TableSchema, to_ddb_page};

pub(crate) const ASSET_TABLE: TableSchema = TableSchema {
    table_name: "assets",
    partition_key: "asset_id",
    sort_key: None,
    index_key: "asset_status",
    index_sort_key: "title",
};

#[derive(Debug)]
pub(crate) struct DDBAssetRepository {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DDBAssetRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }
}

#[async_trait]
impl Repository<AssetEntity> for DDBAssetRepository {
    async fn create(&self, entity: &AssetEntity) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        let val = serde_json::to_value(entity)?;
        self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(asset_id)")
            .set_item(Some(parse_item(val)?))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn update(&self, entity: &AssetEntity) -> LibraryResult<usize> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();

        self.client
            .update_item()
            .table_name(table_name)
            .key("asset_id", AttributeValue::S(entity.asset_id.clone()))
            .update_expression("SET version = :version, title = :title, asset_status = :asset_status, updated_at = :updated_at")
            .expression_attribute_values(":old_version", AttributeValue::N(entity.version.to_string()))
            .expression_attribute_values(":version", AttributeValue::N((entity.version + 1).to_string()))
            .expression_attribute_values(":title", AttributeValue::S(entity.title.to_string()))
            .expression_attribute_values(":asset_status", AttributeValue::S(entity.asset_status.to_string()))
            .expression_attribute_values(":updated_at", string_date(now))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn get(&self, id: &str) -> LibraryResult<AssetEntity> {
        let table_name: &str = self.table_name.as_ref();
        let res = self.client
            .query()
            .table_name(table_name)
            .limit(2)
            .consistent_read(true)
            .key_condition_expression(
                "asset_id = :asset_id",
            )
            .expression_attribute_values(
                ":asset_id",
                AttributeValue::S(id.to_string()),
            )
            .send()
            .await.map_err(LibraryError::from)?;
        let items = res.items().unwrap_or_default();
        if items.len() > 1 {
            return Err(LibraryError::database(format!("too many assets for {}", id).as_str(), None, false));
        }
        match items.first() {
            Some(map) => AssetEntity::try_from(map),
            None => Err(LibraryError::not_found(format!("asset not found for {}", id).as_str())),
        }
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        self.client.delete_item()
            .table_name(table_name)
            .key("asset_id", AttributeValue::S(id.to_string()))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    // the index is keyed by asset_status, other predicate keys become filters
    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<AssetEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let index_name: &str = self.index_name.as_ref();
        let exclusive_start_key = to_ddb_page(page, predicate);
        let mut request = self.client
            .query()
            .table_name(table_name)
            .index_name(index_name)
            .limit(cmp::min(page_size, 500) as i32)
            .consistent_read(false)
            .set_exclusive_start_key(exclusive_start_key)
            .key_condition_expression("asset_status = :asset_status")
            .expression_attribute_values(":asset_status", AttributeValue::S(
                predicate.get("asset_status").cloned().unwrap_or_else(|| AssetStatus::Available.to_string())
            ));
        let mut filter_expr = String::new();
        for (k, v) in predicate {
            if k != "asset_status" {
                let ks = add_filter_expr(k.as_str(), &mut filter_expr);
                request = request.expression_attribute_values(format!(":{}", ks).as_str(), AttributeValue::S(v.to_string()));
            }
        }
        if !filter_expr.is_empty() {
            request = request.filter_expression(filter_expr);
        }
        let res = request.send().await.map_err(LibraryError::from)?;
        let mut records = vec![];
        for map in res.items().unwrap_or_default() {
            records.push(AssetEntity::try_from(map)?);
        }
        Ok(from_ddb(page, page_size, res.last_evaluated_key(), records))
    }
}

#[async_trait]
impl AssetRepository for DDBAssetRepository {
    async fn update_status(&self, asset_id: &str, status: AssetStatus) -> LibraryResult<usize> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();

        self.client
            .update_item()
            .table_name(table_name)
            .key("asset_id", AttributeValue::S(asset_id.to_string()))
            .update_expression("SET version = version + :one, asset_status = :asset_status, updated_at = :updated_at")
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .expression_attribute_values(":asset_status", AttributeValue::S(status.to_string()))
            .expression_attribute_values(":updated_at", string_date(now))
            .condition_expression("attribute_exists(asset_id)")
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }
}

impl TryFrom<&HashMap<String, AttributeValue>> for AssetEntity {
    type Error = LibraryError;

    fn try_from(map: &HashMap<String, AttributeValue>) -> Result<Self, Self::Error> {
        let status = parse_string_attribute("asset_status", map)
            .ok_or_else(|| LibraryError::serialization("asset_status is missing"))?;
        Ok(AssetEntity {
            asset_id: parse_string_attribute("asset_id", map).unwrap_or_default(),
            version: parse_number_attribute("version", map),
            title: parse_string_attribute("title", map).unwrap_or_default(),
            asset_status: AssetStatus::from_str(status.as_str())?,
            created_at: parse_date_attribute("created_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
            updated_at: parse_date_attribute("updated_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use async_once::AsyncOnce;
    use aws_sdk_dynamodb::Client;
    use aws_sdk_dynamodb::types::AttributeValue;
    use lazy_static::lazy_static;

    use crate::assets::domain::model::AssetEntity;
    use crate::assets::repository::AssetRepository;
    use crate::assets::repository::ddb_asset_repository::{ASSET_TABLE, DDBAssetRepository};
    use crate::core::library::AssetStatus;
    use crate::core::repository::{Repository, RepositoryStore};
    use crate::utils::ddb::{build_db_client, create_table, delete_table};

    lazy_static! {
        static ref CLIENT: AsyncOnce<Client> = AsyncOnce::new(async {
                let client = build_db_client(RepositoryStore::LocalDynamoDB).await;
                let _ = delete_table(&client, "assets").await;
                let _ = create_table(&client, &ASSET_TABLE).await;
                client
            });
    }

    #[tokio::test]
    async fn test_should_parse_legacy_status() {
        let map = HashMap::from([
            ("asset_id".to_string(), AttributeValue::S("a1".to_string())),
            ("asset_status".to_string(), AttributeValue::S("Checked Out".to_string())),
        ]);
        let asset = AssetEntity::try_from(&map).expect("should parse asset");
        assert_eq!(AssetStatus::CheckedOut, asset.asset_status);

        let map = HashMap::from([("asset_id".to_string(), AttributeValue::S("a1".to_string()))]);
        assert!(AssetEntity::try_from(&map).is_err());
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_create_get_asset() {
        let asset_repo = DDBAssetRepository::new(CLIENT.get().await.clone(), "assets", "assets_ndx");
        let asset = AssetEntity::new("Dune");
        let size = asset_repo.create(&asset).await.expect("should create asset");
        assert_eq!(1, size);

        let loaded = asset_repo.get(asset.asset_id.as_str()).await.expect("should return asset");
        assert_eq!(asset.asset_id, loaded.asset_id);
        assert_eq!(AssetStatus::Available, loaded.asset_status);
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_update_asset_status() {
        let asset_repo = DDBAssetRepository::new(CLIENT.get().await.clone(), "assets", "assets_ndx");
        let asset = AssetEntity::new("Emma");
        asset_repo.create(&asset).await.expect("should create asset");

        let size = asset_repo.update_status(asset.asset_id.as_str(), AssetStatus::Lost).await.expect("should update status");
        assert_eq!(1, size);
        let loaded = asset_repo.get(asset.asset_id.as_str()).await.expect("should return asset");
        assert_eq!(AssetStatus::Lost, loaded.asset_status);
        assert_eq!(1, loaded.version);

        assert!(asset_repo.update_status("missing", AssetStatus::Lost).await.is_err());
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_query_assets_by_status() {
        let asset_repo = DDBAssetRepository::new(CLIENT.get().await.clone(), "assets", "assets_ndx");
        for i in 0..10 {
            let mut asset = AssetEntity::new(format!("title{}", i).as_str());
            asset.asset_status = AssetStatus::OnHold;
            asset_repo.create(&asset).await.expect("should create asset");
        }
        let predicate = HashMap::from([("asset_status".to_string(), AssetStatus::OnHold.to_string())]);
        let res = asset_repo.query(&predicate, None, 100).await.expect("should query assets");
        assert_eq!(10, res.records.len());
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_create_delete_asset() {
        let asset_repo = DDBAssetRepository::new(CLIENT.get().await.clone(), "assets", "assets_ndx");
        let asset = AssetEntity::new("Ulysses");
        asset_repo.create(&asset).await.expect("should create asset");
        let deleted = asset_repo.delete(asset.asset_id.as_str()).await.expect("should delete asset");
        assert_eq!(1, deleted);
        assert!(asset_repo.get(asset.asset_id.as_str()).await.is_err());
    }
}
