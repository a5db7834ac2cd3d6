use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::utils::date::{opt_serializer, serializer};
use crate::utils::memory::MemoryRecord;

// CheckoutEntity abstracts the active loan of an asset to a library card.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct CheckoutEntity {
    pub checkout_id: String,
    pub version: i64,
    pub asset_id: String,
    pub library_card_id: String,
    #[serde(with = "serializer")]
    pub since: NaiveDateTime,
    #[serde(with = "serializer")]
    pub until: NaiveDateTime,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl CheckoutEntity {
    pub fn new(asset_id: &str, library_card_id: &str, since: NaiveDateTime, until: NaiveDateTime) -> Self {
        Self {
            checkout_id: Uuid::new_v4().to_string(),
            version: 0,
            asset_id: asset_id.to_string(),
            library_card_id: library_card_id.to_string(),
            since,
            until,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for CheckoutEntity {
    fn id(&self) -> String {
        self.checkout_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl MemoryRecord for CheckoutEntity {
    fn touch(&mut self, version: i64, updated_at: NaiveDateTime) {
        self.version = version;
        self.updated_at = updated_at;
    }
}

// CheckoutHistoryEntity records a loan from check-out to check-in, it is
// open until checked_in_at is set and is never deleted.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct CheckoutHistoryEntity {
    pub history_id: String,
    pub version: i64,
    pub asset_id: String,
    pub library_card_id: String,
    #[serde(with = "serializer")]
    pub checked_out_at: NaiveDateTime,
    #[serde(with = "opt_serializer")]
    pub checked_in_at: Option<NaiveDateTime>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl CheckoutHistoryEntity {
    pub fn open(asset_id: &str, library_card_id: &str, checked_out_at: NaiveDateTime) -> Self {
        Self {
            history_id: Uuid::new_v4().to_string(),
            version: 0,
            asset_id: asset_id.to_string(),
            library_card_id: library_card_id.to_string(),
            checked_out_at,
            checked_in_at: None,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.checked_in_at.is_none()
    }
}

impl Identifiable for CheckoutHistoryEntity {
    fn id(&self) -> String {
        self.history_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl MemoryRecord for CheckoutHistoryEntity {
    fn touch(&mut self, version: i64, updated_at: NaiveDateTime) {
        self.version = version;
        self.updated_at = updated_at;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use crate::checkout::domain::model::{CheckoutEntity, CheckoutHistoryEntity};

    #[tokio::test]
    async fn test_should_build_checkout() {
        let now = Utc::now().naive_utc();
        let checkout = CheckoutEntity::new("asset1", "card1", now, now + Duration::days(30));
        assert_eq!("asset1", checkout.asset_id.as_str());
        assert_eq!("card1", checkout.library_card_id.as_str());
        assert_eq!(Duration::days(30), checkout.until - checkout.since);
    }

    #[tokio::test]
    async fn test_should_open_and_close_history() {
        let now = Utc::now().naive_utc();
        let mut history = CheckoutHistoryEntity::open("asset1", "card1", now);
        assert!(history.is_open());
        history.checked_in_at = Some(now);
        assert!(!history.is_open());
    }
}
