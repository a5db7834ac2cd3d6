use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;
use tracing::warn;

use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::repository::PatronRepository;
use crate::utils::ddb::{add_filter_expr, from_ddb, parse_date_attribute, parse_item, parse_number_attribute, parse_string_attribute, query_partition, string_date, TableSchema, to_ddb_page};

pub(crate) const PATRON_TABLE: TableSchema = TableSchema {
    table_name: "patrons",
    partition_key: "patron_id",
    sort_key: None,
    index_key: "library_card_id",
    index_sort_key: "last_name",
};

#[derive(Debug)]
pub(crate) struct DDBPatronRepository {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DDBPatronRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }
}

#[async_trait]
impl Repository<PatronEntity> for DDBPatronRepository {
    async fn create(&self, entity: &PatronEntity) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        let val = serde_json::to_value(entity)?;
        self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(patron_id)")
            .set_item(Some(parse_item(val)?))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn update(&self, entity: &PatronEntity) -> LibraryResult<usize> {
        let now = Utc::now().naive_utc();
        let table_name: &str = self.table_name.as_ref();

        self.client
            .update_item()
            .table_name(table_name)
            .key("patron_id", AttributeValue::S(entity.patron_id.clone()))
            .update_expression("SET version = :version, library_card_id = :library_card_id, first_name = :first, last_name = :last, updated_at = :updated_at")
            .expression_attribute_values(":old_version", AttributeValue::N(entity.version.to_string()))
            .expression_attribute_values(":version", AttributeValue::N((entity.version + 1).to_string()))
            .expression_attribute_values(":library_card_id", AttributeValue::S(entity.library_card_id.to_string()))
            .expression_attribute_values(":first", AttributeValue::S(entity.first_name.to_string()))
            .expression_attribute_values(":last", AttributeValue::S(entity.last_name.to_string()))
            .expression_attribute_values(":updated_at", string_date(now))
            .condition_expression("attribute_exists(version) AND version = :old_version")
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn get(&self, id: &str) -> LibraryResult<PatronEntity> {
        let table_name: &str = self.table_name.as_ref();
        let res = self.client
            .query()
            .table_name(table_name)
            .limit(2)
            .consistent_read(true)
            .key_condition_expression(
                "patron_id = :patron_id",
            )
            .expression_attribute_values(
                ":patron_id",
                AttributeValue::S(id.to_string()),
            )
            .send()
            .await.map_err(LibraryError::from)?;
        let items = res.items().unwrap_or_default();
        if items.len() > 1 {
            return Err(LibraryError::database(format!("too many patrons for {}", id).as_str(), None, false));
        }
        items.first().map(PatronEntity::from)
            .ok_or_else(|| LibraryError::not_found(format!("patron not found for {}", id).as_str()))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        self.client.delete_item()
            .table_name(table_name)
            .key("patron_id", AttributeValue::S(id.to_string()))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    // Note you cannot use certain reserved words per https://docs.aws.amazon.com/amazondynamodb/latest/developerguide/ReservedWords.html
    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<PatronEntity>> {
        let library_card_id = predicate.get("library_card_id").ok_or_else(|| LibraryError::validation(
            "library_card_id is required to query patrons", Some("400".to_string())))?;
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
            .expression_attribute_values(":library_card_id", AttributeValue::S(library_card_id.to_string()));
        // handle GSI keys first
        let mut key_cond = String::new();
        key_cond.push_str("library_card_id = :library_card_id");
        if let Some(last_name) = predicate.get("last_name") {
            key_cond.push_str(" AND last_name = :last_name");
            request = request.expression_attribute_values(":last_name", AttributeValue::S(last_name.to_string()));
        }
        request = request.key_condition_expression(key_cond);
        let mut filter_expr = String::new();
        // then handle other filters
        for (k, v) in predicate {
            if k != "library_card_id" && k != "last_name" {
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
                .map(PatronEntity::from).collect();
            from_ddb(page, page_size, res.last_evaluated_key(), records)
        })
    }
}

#[async_trait]
impl PatronRepository for DDBPatronRepository {
    async fn find_by_library_card_id(&self, library_card_id: &str) -> LibraryResult<Option<PatronEntity>> {
        let items = query_partition(&self.client, self.table_name.as_str(), Some(self.index_name.as_str()),
                                    "library_card_id", library_card_id).await?;
        if items.len() > 1 {
            warn!(library_card_id, count = items.len(), "library card is shared by several patrons");
        }
        Ok(items.first().map(PatronEntity::from))
    }
}

impl From<&HashMap<String, AttributeValue>> for PatronEntity {
    fn from(map: &HashMap<String, AttributeValue>) -> Self {
        PatronEntity {
            patron_id: parse_string_attribute("patron_id", map).unwrap_or_default(),
            version: parse_number_attribute("version", map),
            library_card_id: parse_string_attribute("library_card_id", map).unwrap_or_default(),
            first_name: parse_string_attribute("first_name", map).unwrap_or_default(),
            last_name: parse_string_attribute("last_name", map).unwrap_or_default(),
            created_at: parse_date_attribute("created_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
            updated_at: parse_date_attribute("updated_at", map).unwrap_or_else(|| Utc::now().naive_utc()),
        }
    }
}
