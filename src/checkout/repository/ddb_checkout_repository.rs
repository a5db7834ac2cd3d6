use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use chrono::Utc;

use crate::checkout::domain::model::CheckoutEntity;
use crate::checkout::repository::CheckoutRepository;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::ddb::{add_filter_expr, find_by_index_key, from_ddb, parse_date_attribute, parse_item, parse_number_attribute, parse_string_attribute, string_date, TableSchema, to_ddb_page};

// keyed by asset so that a second checkout of the same asset fails its put
pub(crate) const CHECKOUT_TABLE: TableSchema = TableSchema {
    table_name: "checkout",
    partition_key: "asset_id",
    sort_key: None,
    index_key: "checkout_id",
    index_sort_key: "since",
};

#[derive(Debug)]
pub(crate) struct DDBCheckoutRepository {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DDBCheckoutRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }
}

#[async_trait]
impl Repository<CheckoutEntity> for DDBCheckoutRepository {
    async fn create(&self, entity: &CheckoutEntity) -> LibraryResult<usize> {
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

    // until is a reserved word so it goes through an attribute name
    async fn update(&self, entity: &CheckoutEntity) -> LibraryResult<usize> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();

        self.client
            .update_item()
            .table_name(table_name)
            .key("asset_id", AttributeValue::S(entity.asset_id.clone()))
            .update_expression("SET version = :version, library_card_id = :library_card_id, #until = :until, updated_at = :updated_at")
            .expression_attribute_names("#until", "until")
            .expression_attribute_values(":old_version", AttributeValue::N(entity.version.to_string()))
            .expression_attribute_values(":version", AttributeValue::N((entity.version + 1).to_string()))
            .expression_attribute_values(":library_card_id", AttributeValue::S(entity.library_card_id.to_string()))
            .expression_attribute_values(":until", string_date(entity.until))
            .expression_attribute_values(":updated_at", string_date(now))
            .condition_expression("attribute_exists(version) AND version = :old_version AND checkout_id = :checkout_id")
            .expression_attribute_values(":checkout_id", AttributeValue::S(entity.checkout_id.clone()))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn get(&self, id: &str) -> LibraryResult<CheckoutEntity> {
        find_by_index_key(&self.client, self.table_name.as_str(), self.index_name.as_str(), "checkout_id", id).await?
            .as_ref().map(CheckoutEntity::from)
            .ok_or_else(|| LibraryError::not_found(format!("checkout not found for {}", id).as_str()))
    }

    // only removes the checkout of the asset while it is still the same checkout
    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let checkout = match self.get(id).await {
            Ok(checkout) => checkout,
            Err(err) if err.is_not_found() => return Ok(0),
            Err(err) => return Err(err),
        };
        match self.client.delete_item()
            .table_name(self.table_name.as_str())
            .key("asset_id", AttributeValue::S(checkout.asset_id))
            .condition_expression("checkout_id = :checkout_id")
            .expression_attribute_values(":checkout_id", AttributeValue::S(checkout.checkout_id))
            .return_values(ReturnValue::AllOld)
            .send()
            .await {
            Ok(res) => Ok(res.attributes().map_or(0, |_| 1)),
            // the asset moved on to another checkout
            Err(err) if (match &err { aws_sdk_dynamodb::error::SdkError::ServiceError(e) => Some(e.err()), _ => None }).map_or(false, |e| e.is_conditional_check_failed_exception()) => Ok(0),
            Err(err) => Err(LibraryError::from(err)),
        }
    }

    // Note you cannot use certain reserved words per https://docs.aws.amazon.com/amazondynamodb/latest/developerguide/ReservedWords.html
    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<CheckoutEntity>> {
        let asset_id = predicate.get("asset_id").ok_or_else(|| LibraryError::validation(
            "asset_id is required to query checkout", Some("400".to_string())))?;
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
                .map(CheckoutEntity::from).collect();
            from_ddb(page, page_size, res.last_evaluated_key(), records)
        })
    }
}

#[async_trait]
impl CheckoutRepository for DDBCheckoutRepository {
    async fn find_by_asset_id(&self, asset_id: &str) -> LibraryResult<Option<CheckoutEntity>> {
        let res = self.client
            .get_item()
            .table_name(self.table_name.as_str())
            .key("asset_id", AttributeValue::S(asset_id.to_string()))
            .consistent_read(true)
            .send()
            .await.map_err(LibraryError::from)?;
        Ok(res.item().map(CheckoutEntity::from))
    }

    async fn delete_by_asset_id(&self, asset_id: &str) -> LibraryResult<usize> {
        self.client.delete_item()
            .table_name(self.table_name.as_str())
            .key("asset_id", AttributeValue::S(asset_id.to_string()))
            .return_values(ReturnValue::AllOld)
            .send()
            .await.map(|res| res.attributes().map_or(0, |_| 1)).map_err(LibraryError::from)
    }
}

impl From<&HashMap<String, AttributeValue>> for CheckoutEntity {
    fn from(map: &HashMap<String, AttributeValue>) -> Self {
        CheckoutEntity {
            checkout_id: parse_string_attribute("checkout_id", map).unwrap_or_default(),
            version: parse_number_attribute("version", map),
            asset_id: parse_string_attribute("asset_id", map).unwrap_or_default(),
            library_card_id: parse_string_attribute("library_card_id", map).unwrap_or_default(),
            since: parse_date_attribute("since", map).unwrap_or_else(|| Utc::now().naive_utc()),
            until: parse_date_attribute("until", map).unwrap_or_else(|| Utc::now().naive_utc()),
            created_at: parse_date_attribute("created_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
            updated_at: parse_date_attribute("updated_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
        }
    }
}
