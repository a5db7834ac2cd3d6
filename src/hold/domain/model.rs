use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;
use crate::utils::memory::MemoryRecord;

// HoldEntity abstracts a reservation queued against an asset, holds are
// served in hold_placed order.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct HoldEntity {
    pub hold_id: String,
    pub version: i64,
    pub asset_id: String,
    pub library_card_id: String,
    #[serde(with = "serializer")]
    pub hold_placed: NaiveDateTime,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl HoldEntity {
    pub fn new(asset_id: &str, library_card_id: &str, hold_placed: NaiveDateTime) -> Self {
        Self {
            hold_id: Uuid::new_v4().to_string(),
            version: 0,
            asset_id: asset_id.to_string(),
            library_card_id: library_card_id.to_string(),
            hold_placed,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for HoldEntity {
    fn id(&self) -> String {
        self.hold_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl MemoryRecord for HoldEntity {
    fn touch(&mut self, version: i64, updated_at: NaiveDateTime) {
        self.version = version;
        self.updated_at = updated_at;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use crate::hold::domain::model::HoldEntity;

    #[tokio::test]
    async fn test_should_build_hold() {
        let now = Utc::now().naive_utc();
        let hold = HoldEntity::new("asset1", "card1", now);
        assert_eq!("asset1", hold.asset_id.as_str());
        assert_eq!("card1", hold.library_card_id.as_str());
        assert_eq!(now, hold.hold_placed);
    }
}
