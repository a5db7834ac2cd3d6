use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::utils::date::serializer;
use crate::utils::memory::MemoryRecord;

// PatronEntity is the borrower behind a library card, it is read-only to circulation.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub(crate) struct PatronEntity {
    pub patron_id: String,
    pub version: i64,
    pub library_card_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl PatronEntity {
    pub fn new(library_card_id: &str, first_name: &str, last_name: &str) -> Self {
        Self {
            patron_id: Uuid::new_v4().to_string(),
            version: 0,
            library_card_id: library_card_id.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

impl Identifiable for PatronEntity {
    fn id(&self) -> String {
        self.patron_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl MemoryRecord for PatronEntity {
    fn touch(&mut self, version: i64, updated_at: NaiveDateTime) {
        self.version = version;
        self.updated_at = updated_at;
    }
}

#[cfg(test)]
mod tests {
    use crate::patrons::domain::model::PatronEntity;

    #[tokio::test]
    async fn test_should_build_patron() {
        let patron = PatronEntity::new("card1", "Ada", "Lovelace");
        assert_eq!("card1", patron.library_card_id.as_str());
        assert_eq!("Ada Lovelace", patron.full_name().as_str());
    }

    #[tokio::test]
    async fn test_should_trim_full_name() {
        let patron = PatronEntity::new("card1", "", "Lovelace");
        assert_eq!("Lovelace", patron.full_name().as_str());
    }
}
