use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::AssetStatus;
use crate::utils::date::serializer;
use crate::utils::memory::MemoryRecord;

// AssetEntity abstracts a circulating copy of a book or media item. Only the
// circulation engine changes its status.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct AssetEntity {
    pub asset_id: String,
    pub version: i64,
    pub title: String,
    pub asset_status: AssetStatus,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl AssetEntity {
    pub fn new(title: &str) -> Self {
        Self {
            asset_id: Uuid::new_v4().to_string(),
            version: 0,
            title: title.to_string(),
            asset_status: AssetStatus::Available,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

impl Identifiable for AssetEntity {
    fn id(&self) -> String {
        self.asset_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl MemoryRecord for AssetEntity {
    fn touch(&mut self, version: i64, updated_at: NaiveDateTime) {
        self.version = version;
        self.updated_at = updated_at;
    }
}
