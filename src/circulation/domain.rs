use async_trait::async_trait;
use chrono::NaiveDateTime;
use crate::checkout::dto::{CheckoutDto, CheckoutHistoryDto};
use crate::circulation::dto::{CirculationSummaryDto, TransitionDto};
use crate::core::library::LibraryResult;
use crate::hold::dto::HoldDto;

pub mod locks;
pub mod service;

/// Circulation desk of a branch. Transitions of one asset are serialized,
/// queries read without locking.
#[async_trait]
pub trait CirculationService: Sync + Send {
    /// Lends the asset to the library card. Asset and borrower must exist; an
    /// asset that is already lent is left as is and reported with `applied == false`.
    async fn check_out(&self, asset_id: &str, library_card_id: &str) -> LibraryResult<TransitionDto>;

    /// Returns the asset and hands it to the earliest hold, if any.
    async fn check_in(&self, asset_id: &str) -> LibraryResult<TransitionDto>;

    async fn place_hold(&self, asset_id: &str, library_card_id: &str) -> LibraryResult<TransitionDto>;

    async fn mark_lost(&self, asset_id: &str) -> LibraryResult<TransitionDto>;

    async fn mark_found(&self, asset_id: &str) -> LibraryResult<TransitionDto>;

    async fn latest_checkout(&self, asset_id: &str) -> LibraryResult<Option<CheckoutDto>>;

    async fn checkout_history(&self, asset_id: &str) -> LibraryResult<Vec<CheckoutHistoryDto>>;

    async fn current_holds(&self, asset_id: &str) -> LibraryResult<Vec<HoldDto>>;

    async fn is_checked_out(&self, asset_id: &str) -> LibraryResult<bool>;

    async fn find_checkout_by_id(&self, checkout_id: &str) -> LibraryResult<Option<CheckoutDto>>;

    // full name of the current borrower
    async fn current_checkout_patron(&self, asset_id: &str) -> LibraryResult<Option<String>>;

    // full name of the patron behind the hold
    async fn current_hold_patron(&self, hold_id: &str) -> LibraryResult<Option<String>>;

    async fn current_hold_placed(&self, hold_id: &str) -> LibraryResult<Option<NaiveDateTime>>;

    async fn summary(&self, asset_id: &str) -> LibraryResult<CirculationSummaryDto>;
}
