use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::checkout::dto::{CheckoutDto, CheckoutHistoryDto};
use crate::core::library::{AssetStatus, TransitionKind};
use crate::utils::date::serializer;

// TransitionDto reports the outcome of a circulation transition of an asset
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct TransitionDto {
    pub asset_id: String,
    pub transition: TransitionKind,
    pub from_status: AssetStatus,
    pub to_status: AssetStatus,
    pub library_card_id: Option<String>,
    // false when the asset was left untouched
    pub applied: bool,
    #[serde(with = "serializer")]
    pub occurred_at: NaiveDateTime,
}

impl TransitionDto {
    pub(crate) fn new(transition: TransitionKind, asset_id: &str, from_status: AssetStatus, to_status: AssetStatus,
                      library_card_id: Option<&str>, occurred_at: NaiveDateTime) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            transition,
            from_status,
            to_status,
            library_card_id: library_card_id.map(str::to_string),
            applied: true,
            occurred_at,
        }
    }

    pub(crate) fn unchanged(transition: TransitionKind, asset_id: &str, status: AssetStatus,
                            library_card_id: Option<&str>, occurred_at: NaiveDateTime) -> Self {
        Self {
            applied: false,
            ..Self::new(transition, asset_id, status, status, library_card_id, occurred_at)
        }
    }
}

// HoldSummaryDto is a queued hold with the name of its patron, empty if unknown
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct HoldSummaryDto {
    pub hold_id: String,
    pub library_card_id: String,
    pub patron_name: String,
    #[serde(with = "serializer")]
    pub hold_placed: NaiveDateTime,
}

// CirculationSummaryDto is the circulation detail view of an asset
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CirculationSummaryDto {
    pub asset_id: String,
    pub title: String,
    pub asset_status: AssetStatus,
    pub is_checked_out: bool,
    pub latest_checkout: Option<CheckoutDto>,
    // empty when nobody holds the asset
    pub checkout_patron: String,
    pub history: Vec<CheckoutHistoryDto>,
    pub holds: Vec<HoldSummaryDto>,
}
