use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use chrono::Utc;

use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::hold::domain::model::HoldEntity;
use crate::hold::repository::HoldRepository;
use crate::utils::ddb::{add_filter_expr, find_by_index_key, from_ddb, parse_date_attribute, parse_item, parse_number_attribute, parse_string_attribute, query_partition, string_date, TableSchema, to_ddb_page};

// the queue of an asset is one partition, read consistently before serving a hold
pub(crate) const HOLD_TABLE: TableSchema = TableSchema {
    table_name: "hold",
    partition_key: "asset_id",
    sort_key: Some("hold_id"),
    index_key: "hold_id",
    index_sort_key: "hold_placed",
};

#[derive(Debug)]
pub(crate) struct DDBHoldRepository {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DDBHoldRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }
}

#[async_trait]
impl Repository<HoldEntity> for DDBHoldRepository {
    async fn create(&self, entity: &HoldEntity) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        let val = serde_json::to_value(entity)?;
        self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(hold_id)")
            .set_item(Some(parse_item(val)?))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn update(&self, entity: &HoldEntity) -> LibraryResult<usize> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();

        self.client
            .update_item()
            .table_name(table_name)
            .key("asset_id", AttributeValue::S(entity.asset_id.clone()))
            .key("hold_id", AttributeValue::S(entity.hold_id.clone()))
            .update_expression("SET version = :version, library_card_id = :library_card_id, hold_placed = :hold_placed, updated_at = :updated_at")
            .expression_attribute_values(":old_version", AttributeValue::N(entity.version.to_string()))
            .expression_attribute_values(":version", AttributeValue::N((entity.version + 1).to_string()))
            .expression_attribute_values(":library_card_id", AttributeValue::S(entity.library_card_id.to_string()))
            .expression_attribute_values(":hold_placed", string_date(entity.hold_placed))
            .expression_attribute_values(":updated_at", string_date(now))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn get(&self, id: &str) -> LibraryResult<HoldEntity> {
        find_by_index_key(&self.client, self.table_name.as_str(), self.index_name.as_str(), "hold_id", id).await?
            .as_ref().map(HoldEntity::from)
            .ok_or_else(|| LibraryError::not_found(format!("hold not found for {}", id).as_str()))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        match self.get(id).await {
            Ok(hold) => self.delete_hold(&hold).await,
            Err(err) if err.is_not_found() => Ok(0),
            Err(err) => Err(err),
        }
    }

    // Note you cannot use certain reserved words per https://docs.aws.amazon.com/amazondynamodb/latest/developerguide/ReservedWords.html
    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<HoldEntity>> {
        let asset_id = predicate.get("asset_id").ok_or_else(|| LibraryError::validation(
            "asset_id is required to query holds", Some("400".to_string())))?;
        let table_name: &str = self.table_name.as_ref();
        let exclusive_start_key = to_ddb_page(page, predicate);
        let mut request = self.client
            .query()
            .table_name(table_name)
            .limit(cmp::min(page_size, 500) as i32)
            .consistent_read(true)
            .set_exclusive_start_key(exclusive_start_key)
            .key_condition_expression("asset_id = :asset_id")
            .expression_attribute_values(":asset_id", AttributeValue::S(asset_id.to_string()));
        let mut filter_expr = String::new();
        for (k, v) in predicate {
            if k != "asset_id" {
                let ks = add_filter_expr(k.as_str(), &mut filter_expr);
                request = request.expression_attribute_values(format!(":{}", ks).as_str(), AttributeValue::S(v.to_string()));
            }
        }
        if !filter_expr.is_empty() {
            request = request.filter_expression(filter_expr);
        }
        request
            .send()
            .await.map_err(LibraryError::from).map(|res| {
            let records = res.items().unwrap_or_default().iter()
                .map(HoldEntity::from).collect();
            from_ddb(page, page_size, res.last_evaluated_key(), records)
        })
    }
}

#[async_trait]
impl HoldRepository for DDBHoldRepository {
    async fn find_by_asset_id(&self, asset_id: &str) -> LibraryResult<Vec<HoldEntity>> {
        let items = query_partition(&self.client, self.table_name.as_str(), None, "asset_id", asset_id).await?;
        let mut holds: Vec<HoldEntity> = items.iter().map(HoldEntity::from).collect();
        // the partition is ordered by hold_id, created_at stands in for insertion order
        holds.sort_by(|a, b| a.hold_placed.cmp(&b.hold_placed).then(a.created_at.cmp(&b.created_at)));
        Ok(holds)
    }

    async fn delete_hold(&self, hold: &HoldEntity) -> LibraryResult<usize> {
        self.client.delete_item()
            .table_name(self.table_name.as_str())
            .key("asset_id", AttributeValue::S(hold.asset_id.clone()))
            .key("hold_id", AttributeValue::S(hold.hold_id.clone()))
            .return_values(ReturnValue::AllOld)
            .send()
            .await.map(|res| res.attributes().map_or(0, |_| 1)).map_err(LibraryError::from)
    }
}

impl From<&HashMap<String, AttributeValue>> for HoldEntity {
    fn from(map: &HashMap<String, AttributeValue>) -> Self {
        HoldEntity {
            hold_id: parse_string_attribute("hold_id", map).unwrap_or_default(),
            version: parse_number_attribute("version", map),
            asset_id: parse_string_attribute("asset_id", map).unwrap_or_default(),
            library_card_id: parse_string_attribute("library_card_id", map).unwrap_or_default(),
            hold_placed: parse_date_attribute("hold_placed", map).unwrap_or_else(|| Utc::now().naive_utc()),
            created_at: parse_date_attribute("created_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
            updated_at: parse_date_attribute("updated_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use async_once::AsyncOnce;
    use aws_sdk_dynamodb::Client;
    use chrono::NaiveDateTime;
    use lazy_static::lazy_static;

    use crate::core::repository::{Repository, RepositoryStore};
    use crate::hold::domain::model::HoldEntity;
    use crate::hold::repository::ddb_hold_repository::{DDBHoldRepository, HOLD_TABLE};
    use crate::hold::repository::HoldRepository;
    use crate::utils::date::DATE_FMT;
    use crate::utils::ddb::{build_db_client, create_table, delete_table};

    lazy_static! {
        static ref CLIENT: AsyncOnce<Client> = AsyncOnce::new(async {
                let client = build_db_client(RepositoryStore::LocalDynamoDB).await;
                let _ = delete_table(&client, "hold").await;
                let _ = create_table(&client, &HOLD_TABLE).await;
                client
            });
    }

    fn test_date(str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(str, DATE_FMT).expect("should parse date")
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_create_get_hold() {
        let hold_repo = DDBHoldRepository::new(CLIENT.get().await.clone(), "hold", "hold_ndx");
        let hold = HoldEntity::new("asset1", "card1", test_date("2023-04-11T11:11:11"));
        let size = hold_repo.create(&hold).await.expect("should create hold");
        assert_eq!(1, size);

        let loaded = hold_repo.get(hold.hold_id.as_str()).await.expect("should return hold");
        assert_eq!(hold.library_card_id, loaded.library_card_id);
        assert_eq!(hold.hold_placed, loaded.hold_placed);
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_find_holds_in_queue_order() {
        let hold_repo = DDBHoldRepository::new(CLIENT.get().await.clone(), "hold", "hold_ndx");
        let late = HoldEntity::new("asset2", "card1", test_date("2023-04-12T11:11:11"));
        let early = HoldEntity::new("asset2", "card2", test_date("2023-04-11T11:11:11"));
        hold_repo.create(&late).await.expect("should create hold");
        hold_repo.create(&early).await.expect("should create hold");

        let holds = hold_repo.find_by_asset_id("asset2").await.expect("should find holds");
        assert_eq!(vec![early.hold_id.clone(), late.hold_id.clone()],
                   holds.iter().map(|h| h.hold_id.clone()).collect::<Vec<String>>());

        let predicate = HashMap::from([
            ("asset_id".to_string(), "asset2".to_string()),
            ("hold_placed:<=".to_string(), "2023-04-11T23:59:59".to_string()),
        ]);
        let res = hold_repo.query(&predicate, None, 10).await.expect("should query holds");
        assert_eq!(1, res.records.len());
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_create_delete_hold() {
        let hold_repo = DDBHoldRepository::new(CLIENT.get().await.clone(), "hold", "hold_ndx");
        let hold = HoldEntity::new("asset3", "card1", test_date("2023-04-11T11:11:11"));
        hold_repo.create(&hold).await.expect("should create hold");
        let deleted = hold_repo.delete(hold.hold_id.as_str()).await.expect("should delete hold");
        assert_eq!(1, deleted);
        assert!(hold_repo.get(hold.hold_id.as_str()).await.is_err());
        assert_eq!(0, hold_repo.delete_hold(&hold).await.expect("should delete hold"));
    }
}
