use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};

// MemoryRecord is implemented by entities that can be kept in a MemoryStore
pub(crate) trait MemoryRecord: Identifiable + Serialize + Clone {
    fn touch(&mut self, version: i64, updated_at: NaiveDateTime);
}

// MemoryStore keeps records in insertion order and mirrors the conditional
// writes of the ddb repositories. Clones share the same records.
#[derive(Debug)]
pub(crate) struct MemoryStore<T> {
    name: String,
    records: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            records: self.records.clone(),
        }
    }
}

impl<T: MemoryRecord> MemoryStore<T> {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            records: Arc::new(Mutex::new(vec![])),
        }
    }

    fn lock(&self) -> LibraryResult<MutexGuard<'_, Vec<T>>> {
        self.records.lock().map_err(|_| LibraryError::runtime(
            format!("{} store is poisoned", self.name).as_str(), None))
    }

    pub(crate) fn create(&self, entity: &T) -> LibraryResult<usize> {
        self.create_unique(entity, |_| false)
    }

    // creates the record unless its id or a record matching `conflicts` is already stored
    pub(crate) fn create_unique<F: Fn(&T) -> bool>(&self, entity: &T, conflicts: F) -> LibraryResult<usize> {
        let mut records = self.lock()?;
        let id = entity.id();
        if records.iter().any(|r| r.id() == id || conflicts(r)) {
            return Err(LibraryError::duplicate_key(format!("{} conflicts with a record in {}", id, self.name).as_str()));
        }
        records.push(entity.clone());
        Ok(1)
    }

    pub(crate) fn update(&self, entity: &T) -> LibraryResult<usize> {
        let mut records = self.lock()?;
        let id = entity.id();
        let existing = records.iter_mut().find(|r| r.id() == id)
            .ok_or_else(|| LibraryError::not_found(format!("{} not found in {}", id, self.name).as_str()))?;
        if existing.version() != entity.version() {
            return Err(LibraryError::database(
                format!("stale version {} of {} in {}", entity.version(), id, self.name).as_str(),
                Some("ConditionalCheckFailed".to_string()), false));
        }
        let mut updated = entity.clone();
        updated.touch(entity.version() + 1, Utc::now().naive_utc());
        *existing = updated;
        Ok(1)
    }

    pub(crate) fn get(&self, id: &str) -> LibraryResult<T> {
        self.lock()?.iter().find(|r| r.id() == id).cloned()
            .ok_or_else(|| LibraryError::not_found(format!("{} not found for {}", self.name, id).as_str()))
    }

    pub(crate) fn delete(&self, id: &str) -> LibraryResult<usize> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        Ok(before - records.len())
    }

    pub(crate) fn delete_where<F: Fn(&T) -> bool>(&self, matches: F) -> LibraryResult<usize> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|r| !matches(r));
        Ok(before - records.len())
    }

    pub(crate) fn find<F: Fn(&T) -> bool>(&self, matches: F) -> LibraryResult<Vec<T>> {
        Ok(self.lock()?.iter().filter(|r| matches(r)).cloned().collect())
    }

    // predicate keys follow the ddb repositories, `field` or `field:op`
    pub(crate) fn query(&self, predicate: &HashMap<String, String>,
                        page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<T>> {
        let records = self.lock()?;
        let mut matched = vec![];
        for record in records.iter() {
            if matches_predicate(&serde_json::to_value(record)?, predicate)? {
                matched.push(record.clone());
            }
        }
        let start = page.and_then(|p| p.parse::<usize>().ok()).unwrap_or(0);
        let end = std::cmp::min(start.saturating_add(page_size), matched.len());
        let next_page = if end < matched.len() { Some(end.to_string()) } else { None };
        let page_records = if start < end { matched[start..end].to_vec() } else { vec![] };
        Ok(PaginatedResult::new(page, page_size, next_page, page_records))
    }
}

fn matches_predicate(value: &Value, predicate: &HashMap<String, String>) -> LibraryResult<bool> {
    for (k, expected) in predicate {
        let mut parts = k.splitn(2, ':');
        let field = parts.next().unwrap_or_default();
        let op = parts.next().unwrap_or("=");
        let actual = match value.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let matched = match op {
            "=" => actual == *expected,
            "<>" => actual != *expected,
            "<" => actual < *expected,
            "<=" => actual <= *expected,
            ">" => actual > *expected,
            ">=" => actual >= *expected,
            _ => {
                return Err(LibraryError::validation(
                    format!("unsupported operator {} for {}", op, field).as_str(), Some("400".to_string())));
            }
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}
