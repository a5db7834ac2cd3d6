use std::collections::HashMap;
use std::time::Duration;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeDefinition, AttributeValue, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection, ProjectionType, ProvisionedThroughput, ScalarAttributeType, TableStatus};
use chrono::NaiveDateTime;
use serde_json::Value;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::RepositoryStore;
use crate::utils::date::{format_date, parse_date};

const DEFAULT_LOCAL_ENDPOINT: &str = "http://localhost:8000";

type Item = HashMap<String, AttributeValue>;

// TableSchema is the key layout of a circulation table. Records of one asset
// share a partition when the asset id is the partition key, so they can be
// read back consistently. The index serves lookups by record id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TableSchema {
    pub table_name: &'static str,
    pub partition_key: &'static str,
    pub sort_key: Option<&'static str>,
    pub index_key: &'static str,
    pub index_sort_key: &'static str,
}

impl TableSchema {
    pub(crate) fn index_name(&self) -> String {
        format!("{}_ndx", self.table_name)
    }

    fn key_attributes(&self) -> Vec<&'static str> {
        let mut names = vec![self.partition_key];
        names.extend(self.sort_key);
        names.extend([self.index_key, self.index_sort_key]);
        let mut unique: Vec<&'static str> = vec![];
        for name in names {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        unique
    }
}

fn key_element(name: &str, key_type: KeyType) -> KeySchemaElement {
    KeySchemaElement::builder().attribute_name(name).key_type(key_type).build()
}

fn throughput() -> ProvisionedThroughput {
    ProvisionedThroughput::builder().read_capacity_units(10).write_capacity_units(10).build()
}

pub(crate) async fn create_table(client: &Client, schema: &TableSchema) -> LibraryResult<()> {
    let index = GlobalSecondaryIndex::builder()
        .index_name(schema.index_name())
        .key_schema(key_element(schema.index_key, KeyType::Hash))
        .key_schema(key_element(schema.index_sort_key, KeyType::Range))
        .projection(Projection::builder().projection_type(ProjectionType::All).build())
        .provisioned_throughput(throughput())
        .build();

    let mut request = client
        .create_table()
        .table_name(schema.table_name)
        .global_secondary_indexes(index)
        .key_schema(key_element(schema.partition_key, KeyType::Hash))
        .provisioned_throughput(throughput());
    if let Some(sort_key) = schema.sort_key {
        request = request.key_schema(key_element(sort_key, KeyType::Range));
    }
    for name in schema.key_attributes() {
        request = request.attribute_definitions(AttributeDefinition::builder()
            .attribute_name(name)
            .attribute_type(ScalarAttributeType::S)
            .build());
    }
    request.send().await.map_err(|err| LibraryError::database_or_unavailable(
        format!("failed to create {} table due to {}", schema.table_name, err).as_str(), None, false))?;
    wait_while_table_status(client, schema.table_name, TableStatus::Creating).await;
    Ok(())
}

#[cfg(test)]
pub(crate) async fn delete_table(client: &Client, table_name: &str) -> LibraryResult<()> {
    client.delete_table().table_name(table_name).send().await.map_err(|err| LibraryError::database_or_unavailable(
        format!("failed to delete {} table due to {}", table_name, err).as_str(), None, false))?;
    wait_while_table_status(client, table_name, TableStatus::Deleting).await;
    Ok(())
}

async fn wait_while_table_status(client: &Client, table_name: &str, status: TableStatus) {
    for _ in 0..30 {
        let current = client.describe_table().table_name(table_name).send().await.ok()
            .and_then(|out| out.table().and_then(|table| table.table_status().cloned()));
        // a deleted table has no status left to describe
        if current.as_ref() != Some(&status) {
            return;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

// reads every item of a partition, following the pagination keys. Without an
// index the base table is read consistently.
pub(crate) async fn query_partition(client: &Client, table_name: &str, index_name: Option<&str>,
                                    key_name: &str, key_value: &str) -> LibraryResult<Vec<Item>> {
    let mut items = vec![];
    let mut exclusive_start_key: Option<Item> = None;
    loop {
        let res = client
            .query()
            .table_name(table_name)
            .set_index_name(index_name.map(str::to_string))
            .consistent_read(index_name.is_none())
            .key_condition_expression(format!("{} = :{}", key_name, key_name))
            .expression_attribute_values(format!(":{}", key_name), AttributeValue::S(key_value.to_string()))
            .set_exclusive_start_key(exclusive_start_key)
            .send()
            .await.map_err(LibraryError::from)?;
        items.extend(res.items().unwrap_or_default().iter().cloned());
        exclusive_start_key = res.last_evaluated_key().cloned();
        if exclusive_start_key.is_none() {
            return Ok(items);
        }
    }
}

// looks up a single record by its id through the index of the table
pub(crate) async fn find_by_index_key(client: &Client, table_name: &str, index_name: &str,
                                      key_name: &str, id: &str) -> LibraryResult<Option<Item>> {
    let items = query_partition(client, table_name, Some(index_name), key_name, id).await?;
    if items.len() > 1 {
        return Err(LibraryError::database(
            format!("too many {} records for {}", table_name, id).as_str(), None, false));
    }
    Ok(items.into_iter().next())
}

pub(crate) fn parse_item(value: Value) -> Result<Item, String> {
    match value_to_item(value) {
        AttributeValue::M(map) => Ok(map),
        other => Err(format!("expected an object but found {:?}", other)),
    }
}

fn value_to_item(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(a) => AttributeValue::L(a.into_iter().map(value_to_item).collect()),
        Value::Object(o) => AttributeValue::M(o.into_iter().map(|(k, v)| (k, value_to_item(v))).collect()),
    }
}

pub(crate) fn parse_string_attribute(name: &str, map: &Item) -> Option<String> {
    match map.get(name) {
        Some(AttributeValue::S(str)) => Some(str.clone()),
        _ => None,
    }
}

// e.g. 2022-09-24T04:40:35.726029, an empty string is a cleared timestamp
pub(crate) fn parse_date_attribute(name: &str, map: &Item) -> Option<NaiveDateTime> {
    parse_string_attribute(name, map).and_then(|str| parse_date(str.as_str()))
}

pub(crate) fn parse_number_attribute(name: &str, map: &Item) -> i64 {
    match map.get(name) {
        Some(AttributeValue::N(str)) => str.parse::<i64>().unwrap_or_default(),
        _ => 0,
    }
}

pub(crate) fn string_date(date: NaiveDateTime) -> AttributeValue {
    AttributeValue::S(format_date(date))
}

pub(crate) fn opt_string_date(opt_date: Option<NaiveDateTime>) -> AttributeValue {
    opt_date.map(string_date).unwrap_or_else(|| AttributeValue::S(String::new()))
}

// appends `field op :field` for a predicate key of the form `field` or `field:op`
// and returns the field name
pub(crate) fn add_filter_expr(k: &str, filter_expr: &mut String) -> String {
    let (field, op) = k.split_once(':').unwrap_or((k, "="));
    if !filter_expr.is_empty() {
        filter_expr.push_str(" AND ");
    }
    filter_expr.push_str(format!("{} {} :{}", field, op, field).as_str());
    field.to_string()
}

// a page token is the json of the last evaluated key
pub(crate) fn to_ddb_page(page: Option<&str>, predicate: &HashMap<String, String>) -> Option<Item> {
    let str_map = serde_json::from_str::<HashMap<String, String>>(page?).ok()?;
    let key_values = predicate.iter().filter(|(k, _)| !k.contains(':'));
    Some(str_map.into_iter()
        .chain(key_values.map(|(k, v)| (k.to_string(), v.to_string())))
        .map(|(k, v)| (k, AttributeValue::S(v)))
        .collect())
}

pub(crate) fn from_ddb<T>(page: Option<&str>, page_size: usize,
                          last_evaluated_key: Option<&Item>, records: Vec<T>) -> PaginatedResult<T> {
    let next_page = last_evaluated_key.and_then(|attr_map| {
        let str_map: HashMap<&String, &String> = attr_map.iter()
            .filter_map(|(k, v)| v.as_s().ok().map(|val| (k, val)))
            .collect();
        serde_json::to_string(&str_map).ok()
    });
    PaginatedResult::new(page, page_size, next_page, records)
}

// memory store never reaches here
pub(crate) async fn build_db_client(store: RepositoryStore) -> Client {
    match store {
        RepositoryStore::LocalDynamoDB => {
            // See https://docs.aws.amazon.com/sdk-for-rust/latest/dg/dynamodb-local.html
            let endpoint = std::env::var("DYNAMODB_LOCAL_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_LOCAL_ENDPOINT.to_string());
            let local_config = aws_sdk_dynamodb::Config::builder()
                .region(Region::new("local"))
                .credentials_provider(
                    Credentials::new("AKIDLOCALSTACK", "localstacksecret", None, None, "faked"))
                .endpoint_url(endpoint)
                .build();
            Client::from_conf(local_config)
        }
        RepositoryStore::DynamoDB | RepositoryStore::Memory => {
            Client::new(&aws_config::load_from_env().await)
        }
    }
}

pub async fn build_sns_client() -> aws_sdk_sns::Client {
    aws_sdk_sns::Client::new(&aws_config::load_from_env().await)
}

fn sdk_error<T: std::fmt::Debug>(err: &SdkError<T>) -> LibraryError {
    let (retryable, reason) = retryable_sdk_error(err);
    LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
}

// a failed put condition means the record, or the checkout of its asset, already exists
impl From<SdkError<PutItemError>> for LibraryError {
    fn from(err: SdkError<PutItemError>) -> Self {
        let service_error = match &err { SdkError::ServiceError(e) => Some(e.err()), _ => None };
        match service_error {
            Some(service_err) if service_err.is_conditional_check_failed_exception() => {
                LibraryError::duplicate_key(format!("{:?}", service_err).as_str())
            }
            _ => sdk_error(&err),
        }
    }
}

// a failed update condition is a stale version
impl From<SdkError<UpdateItemError>> for LibraryError {
    fn from(err: SdkError<UpdateItemError>) -> Self {
        let service_error = match &err { SdkError::ServiceError(e) => Some(e.err()), _ => None };
        match service_error {
            Some(service_err) if service_err.is_conditional_check_failed_exception() => {
                LibraryError::unavailable(format!("stale version {:?}", service_err).as_str(),
                                          Some("ConditionalCheckFailed".to_string()), true)
            }
            _ => sdk_error(&err),
        }
    }
}

impl From<SdkError<DeleteItemError>> for LibraryError {
    fn from(err: SdkError<DeleteItemError>) -> Self {
        sdk_error(&err)
    }
}

impl From<SdkError<GetItemError>> for LibraryError {
    fn from(err: SdkError<GetItemError>) -> Self {
        sdk_error(&err)
    }
}

impl From<SdkError<QueryError>> for LibraryError {
    fn from(err: SdkError<QueryError>) -> Self {
        sdk_error(&err)
    }
}

fn retryable_sdk_error<T>(err: &SdkError<T>) -> (bool, Option<String>) {
    match err {
        SdkError::ConstructionFailure(_) => (false, Some("ConstructionFailure".to_string())),
        SdkError::TimeoutError(_) => (true, Some("TimeoutError".to_string())),
        SdkError::DispatchFailure(_) => (true, Some("DispatchFailure".to_string())),
        SdkError::ResponseError { .. } => (true, Some("ResponseError".to_string())),
        SdkError::ServiceError(ctx) => {
            let http = ctx.raw().http();
            (http.status().is_server_error() || has_exceeded_limit(http.body().bytes()), Some(http.status().to_string()))
        }
        _ => (true, Some("Unknown".to_string())),
    }
}

// throughput errors carry "...LimitExceeded" or "...exceeded" in the body
fn has_exceeded_limit(opts: Option<&[u8]>) -> bool {
    opts.map(|b| b.windows(6).any(|w| w == b"ceeded")).unwrap_or(false)
}
