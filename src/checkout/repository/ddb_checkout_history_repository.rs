use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;

use crate::checkout::domain::model::CheckoutHistoryEntity;
use crate::checkout::repository::CheckoutHistoryRepository;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::ddb::{add_filter_expr, find_by_index_key, from_ddb, opt_string_date, parse_date_attribute, parse_item, parse_number_attribute, parse_string_attribute, query_partition, string_date, TableSchema, to_ddb_page};

// history of an asset lives in the partition of the asset so the open entry is read consistently
pub(crate) const CHECKOUT_HISTORY_TABLE: TableSchema = TableSchema {
    table_name: "checkout_history",
    partition_key: "asset_id",
    sort_key: Some("history_id"),
    index_key: "history_id",
    index_sort_key: "checked_out_at",
};

#[derive(Debug)]
pub(crate) struct DDBCheckoutHistoryRepository {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DDBCheckoutHistoryRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }
}

#[async_trait]
impl Repository<CheckoutHistoryEntity> for DDBCheckoutHistoryRepository {
    async fn create(&self, entity: &CheckoutHistoryEntity) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        let val = serde_json::to_value(entity)?;
        self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(history_id)")
            .set_item(Some(parse_item(val)?))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn update(&self, entity: &CheckoutHistoryEntity) -> LibraryResult<usize> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();

        self.client
            .update_item()
            .table_name(table_name)
            .key("asset_id", AttributeValue::S(entity.asset_id.clone()))
            .key("history_id", AttributeValue::S(entity.history_id.clone()))
            .update_expression("SET version = :version, checked_in_at = :checked_in_at, updated_at = :updated_at")
            .expression_attribute_values(":old_version", AttributeValue::N(entity.version.to_string()))
            .expression_attribute_values(":version", AttributeValue::N((entity.version + 1).to_string()))
            .expression_attribute_values(":checked_in_at", opt_string_date(entity.checked_in_at))
            .expression_attribute_values(":updated_at", string_date(now))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn get(&self, id: &str) -> LibraryResult<CheckoutHistoryEntity> {
        find_by_index_key(&self.client, self.table_name.as_str(), self.index_name.as_str(), "history_id", id).await?
            .as_ref().map(CheckoutHistoryEntity::from)
            .ok_or_else(|| LibraryError::not_found(format!("checkout history not found for {}", id).as_str()))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let history = match self.get(id).await {
            Ok(history) => history,
            Err(err) if err.is_not_found() => return Ok(0),
            Err(err) => return Err(err),
        };
        self.client.delete_item()
            .table_name(self.table_name.as_str())
            .key("asset_id", AttributeValue::S(history.asset_id))
            .key("history_id", AttributeValue::S(history.history_id))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<CheckoutHistoryEntity>> {
        let asset_id = predicate.get("asset_id").ok_or_else(|| LibraryError::validation(
            "asset_id is required to query checkout history", Some("400".to_string())))?;
        let exclusive_start_key = to_ddb_page(page, predicate);
        let mut request = self.client
            .query()
            .table_name(self.table_name.as_str())
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
                .map(CheckoutHistoryEntity::from).collect();
            from_ddb(page, page_size, res.last_evaluated_key(), records)
        })
    }
}

#[async_trait]
impl CheckoutHistoryRepository for DDBCheckoutHistoryRepository {
    async fn find_by_asset_id(&self, asset_id: &str) -> LibraryResult<Vec<CheckoutHistoryEntity>> {
        let items = query_partition(&self.client, self.table_name.as_str(), None, "asset_id", asset_id).await?;
        let mut history: Vec<CheckoutHistoryEntity> = items.iter().map(CheckoutHistoryEntity::from).collect();
        history.sort_by(|a, b| a.checked_out_at.cmp(&b.checked_out_at).then(a.created_at.cmp(&b.created_at)));
        Ok(history)
    }

    async fn find_open_by_asset_id(&self, asset_id: &str) -> LibraryResult<Option<CheckoutHistoryEntity>> {
        let history = self.find_by_asset_id(asset_id).await?;
        Ok(history.into_iter().find(|h| h.is_open()))
    }
}

impl From<&HashMap<String, AttributeValue>> for CheckoutHistoryEntity {
    fn from(map: &HashMap<String, AttributeValue>) -> Self {
        CheckoutHistoryEntity {
            history_id: parse_string_attribute("history_id", map).unwrap_or_default(),
            version: parse_number_attribute("version", map),
            asset_id: parse_string_attribute("asset_id", map).unwrap_or_default(),
            library_card_id: parse_string_attribute("library_card_id", map).unwrap_or_default(),
            checked_out_at: parse_date_attribute("checked_out_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
            checked_in_at: parse_date_attribute("checked_in_at", map),
            created_at: parse_date_attribute("created_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
            updated_at: parse_date_attribute("updated_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use aws_sdk_dynamodb::Client;
    use chrono::NaiveDateTime;
    use lazy_static::lazy_static;

    use crate::checkout::domain::model::CheckoutHistoryEntity;
    use crate::checkout::repository::CheckoutHistoryRepository;
    use crate::checkout::repository::ddb_checkout_history_repository::{CHECKOUT_HISTORY_TABLE, DDBCheckoutHistoryRepository};
    use crate::core::repository::{Repository, RepositoryStore};
    use crate::utils::date::DATE_FMT;
    use crate::utils::ddb::{build_db_client, create_table, delete_table};

    lazy_static! {
        static ref CLIENT: AsyncOnce<Client> = AsyncOnce::new(async {
                let client = build_db_client(RepositoryStore::LocalDynamoDB).await;
                let _ = delete_table(&client, "checkout_history").await;
                let _ = create_table(&client, &CHECKOUT_HISTORY_TABLE).await;
                client
            });
    }

    fn test_date(str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(str, DATE_FMT).expect("should parse date")
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_create_close_history() {
        let history_repo = DDBCheckoutHistoryRepository::new(
            CLIENT.get().await.clone(), "checkout_history", "checkout_history_ndx");
        let mut history = CheckoutHistoryEntity::open("asset1", "card1", test_date("2023-04-11T11:11:11"));
        let size = history_repo.create(&history).await.expect("should create history");
        assert_eq!(1, size);
        let loaded = history_repo.find_open_by_asset_id("asset1").await.expect("should find history");
        assert_eq!(Some(history.history_id.clone()), loaded.map(|h| h.history_id));

        history.checked_in_at = Some(test_date("2023-04-25T22:22:22"));
        history_repo.update(&history).await.expect("should update history");
        assert_eq!(None, history_repo.find_open_by_asset_id("asset1").await.expect("should find history"));
        // a stale version is rejected
        assert!(history_repo.update(&history).await.is_err());
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_find_open_history_by_asset() {
        let history_repo = DDBCheckoutHistoryRepository::new(
            CLIENT.get().await.clone(), "checkout_history", "checkout_history_ndx");
        let mut closed = CheckoutHistoryEntity::open("asset2", "card1", test_date("2023-04-11T11:11:11"));
        closed.checked_in_at = Some(test_date("2023-04-12T11:11:11"));
        let open = CheckoutHistoryEntity::open("asset2", "card2", test_date("2023-04-13T11:11:11"));
        history_repo.create(&open).await.expect("should create history");
        history_repo.create(&closed).await.expect("should create history");

        let all = history_repo.find_by_asset_id("asset2").await.expect("should find history");
        assert_eq!(vec![closed.history_id.clone(), open.history_id.clone()],
                   all.iter().map(|h| h.history_id.clone()).collect::<Vec<String>>());
        let loaded = history_repo.find_open_by_asset_id("asset2").await.expect("should find history");
        assert_eq!(Some(open.history_id.clone()), loaded.map(|h| h.history_id));

        assert_eq!(1, history_repo.delete(closed.history_id.as_str()).await.expect("should delete history"));
        assert_eq!(0, history_repo.delete(closed.history_id.as_str()).await.expect("should delete history"));
    }
}
