use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::checkout::domain::model::{CheckoutEntity, CheckoutHistoryEntity};
use crate::utils::date::{opt_serializer, serializer};

// CheckoutDto is the active loan of an asset as seen by callers
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CheckoutDto {
    pub checkout_id: String,
    pub asset_id: String,
    pub library_card_id: String,
    #[serde(with = "serializer")]
    pub since: NaiveDateTime,
    #[serde(with = "serializer")]
    pub until: NaiveDateTime,
}

// CheckoutHistoryDto is one entry of the loan audit trail of an asset
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CheckoutHistoryDto {
    pub history_id: String,
    pub asset_id: String,
    pub library_card_id: String,
    #[serde(with = "serializer")]
    pub checked_out_at: NaiveDateTime,
    #[serde(with = "opt_serializer")]
    pub checked_in_at: Option<NaiveDateTime>,
}

impl From<&CheckoutEntity> for CheckoutDto {
    fn from(other: &CheckoutEntity) -> CheckoutDto {
        CheckoutDto {
            checkout_id: other.checkout_id.to_string(),
            asset_id: other.asset_id.to_string(),
            library_card_id: other.library_card_id.to_string(),
            since: other.since,
            until: other.until,
        }
    }
}

impl From<&CheckoutHistoryEntity> for CheckoutHistoryDto {
    fn from(other: &CheckoutHistoryEntity) -> CheckoutHistoryDto {
        CheckoutHistoryDto {
            history_id: other.history_id.to_string(),
            asset_id: other.asset_id.to_string(),
            library_card_id: other.library_card_id.to_string(),
            checked_out_at: other.checked_out_at,
            checked_in_at: other.checked_in_at,
        }
    }
}
