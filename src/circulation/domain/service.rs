use std::collections::HashMap;
use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use tracing::{debug, info, warn};
use crate::assets::repository::AssetRepository;
use crate::checkout::domain::model::{CheckoutEntity, CheckoutHistoryEntity};
use crate::checkout::dto::{CheckoutDto, CheckoutHistoryDto};
use crate::checkout::repository::{CheckoutHistoryRepository, CheckoutRepository};
use crate::circulation::domain::CirculationService;
use crate::circulation::domain::locks::AssetLocks;
use crate::circulation::dto::{CirculationSummaryDto, HoldSummaryDto, TransitionDto};
use crate::core::domain::Configuration;
use crate::core::events::DomainEvent;
use crate::core::library::{AssetStatus, CirculationEvent, found, LibraryError, LibraryResult, TransitionKind};
use crate::gateway::events::EventPublisher;
use crate::hold::domain::model::HoldEntity;
use crate::hold::dto::HoldDto;
use crate::hold::repository::HoldRepository;
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::repository::PatronRepository;

const EVENT_GROUP: &str = "circulation";

pub(crate) struct CirculationServiceImpl {
    branch_id: String,
    loan_days: i64,
    asset_repository: Box<dyn AssetRepository>,
    patron_repository: Box<dyn PatronRepository>,
    checkout_repository: Box<dyn CheckoutRepository>,
    history_repository: Box<dyn CheckoutHistoryRepository>,
    hold_repository: Box<dyn HoldRepository>,
    events_publisher: Box<dyn EventPublisher>,
    locks: AssetLocks,
}

impl CirculationServiceImpl {
    pub(crate) fn new(config: &Configuration,
                      asset_repository: Box<dyn AssetRepository>,
                      patron_repository: Box<dyn PatronRepository>,
                      checkout_repository: Box<dyn CheckoutRepository>,
                      history_repository: Box<dyn CheckoutHistoryRepository>,
                      hold_repository: Box<dyn HoldRepository>,
                      events_publisher: Box<dyn EventPublisher>,
                      locks: AssetLocks) -> Self {
        Self {
            branch_id: config.branch_id.to_string(),
            loan_days: config.checkout_loan_days,
            asset_repository,
            patron_repository,
            checkout_repository,
            history_repository,
            hold_repository,
            events_publisher,
            locks,
        }
    }

    async fn find_patron(&self, library_card_id: &str) -> LibraryResult<PatronEntity> {
        self.patron_repository.find_by_library_card_id(library_card_id).await?
            .ok_or_else(|| LibraryError::not_found(
                format!("patron with library card {} not found", library_card_id).as_str()))
    }

    async fn patron_name(&self, library_card_id: &str) -> LibraryResult<Option<String>> {
        Ok(self.patron_repository.find_by_library_card_id(library_card_id).await?
            .map(|patron| patron.full_name()))
    }

    // claims the checkout of the asset and opens its history. None when another
    // checkout already holds the asset. The caller sets the asset status.
    async fn open_loan(&self, asset_id: &str, library_card_id: &str,
                       now: NaiveDateTime) -> LibraryResult<Option<CheckoutEntity>> {
        let checkout = CheckoutEntity::new(asset_id, library_card_id, now, now + Duration::days(self.loan_days));
        match self.checkout_repository.create(&checkout).await {
            Ok(_) => {}
            Err(LibraryError::DuplicateKey { .. }) => return Ok(None),
            Err(err) => return Err(err),
        }
        if let Some(dangling) = self.history_repository.find_open_by_asset_id(asset_id).await? {
            warn!(asset_id, history_id = dangling.history_id.as_str(),
                "closing open history without an active checkout");
            self.close_history(dangling, now).await?;
        }
        self.history_repository.create(&CheckoutHistoryEntity::open(asset_id, library_card_id, now)).await?;
        Ok(Some(checkout))
    }

    async fn close_history(&self, mut history: CheckoutHistoryEntity, now: NaiveDateTime) -> LibraryResult<()> {
        history.checked_in_at = Some(now);
        self.history_repository.update(&history).await?;
        Ok(())
    }

    // removes the active checkout and closes the open history of the asset
    async fn end_loan(&self, asset_id: &str, now: NaiveDateTime) -> LibraryResult<()> {
        let removed = self.checkout_repository.delete_by_asset_id(asset_id).await?;
        debug!(asset_id, removed, "ended active checkout");
        if let Some(history) = self.history_repository.find_open_by_asset_id(asset_id).await? {
            self.close_history(history, now).await?;
        }
        Ok(())
    }

    async fn publish(&self, transition: &TransitionDto) -> LibraryResult<()> {
        let metadata = HashMap::from([("branch_id".to_string(), self.branch_id.to_string())]);
        let name = transition.transition.event_name();
        let key = transition.asset_id.as_str();
        let event = match transition.transition {
            TransitionKind::CheckOut | TransitionKind::PlaceHold => {
                DomainEvent::added(name, EVENT_GROUP, key, &metadata, transition)?
            }
            TransitionKind::CheckIn | TransitionKind::MarkLost | TransitionKind::MarkFound => {
                DomainEvent::updated(name, EVENT_GROUP, key, &metadata, transition)?
            }
        };
        self.events_publisher.publish(&event).await
    }
}

#[async_trait]
impl CirculationService for CirculationServiceImpl {
    async fn check_out(&self, asset_id: &str, library_card_id: &str) -> LibraryResult<TransitionDto> {
        let _guard = self.locks.acquire(asset_id).await?;
        let asset = self.asset_repository.get(asset_id).await?;
        let now = Utc::now().naive_utc();
        let unchanged = TransitionDto::unchanged(TransitionKind::CheckOut, asset_id,
                                                 asset.asset_status, Some(library_card_id), now);
        if self.checkout_repository.find_by_asset_id(asset_id).await?.is_some() {
            debug!(asset_id, library_card_id, "asset is already checked out");
            return Ok(unchanged);
        }
        let _ = self.find_patron(library_card_id).await?;
        let checkout = match self.open_loan(asset_id, library_card_id, now).await? {
            Some(checkout) => checkout,
            None => {
                // another engine claimed the asset after the lookup above
                debug!(asset_id, library_card_id, "asset was checked out concurrently");
                return Ok(unchanged);
            }
        };

        let from_status = asset.asset_status;
        let to_status = from_status.on(CirculationEvent::CheckOut);
        self.asset_repository.update_status(asset_id, to_status).await?;
        info!(asset_id, library_card_id, from = %from_status, to = %to_status,
            until = %checkout.until, "checked out");
        let transition = TransitionDto::new(TransitionKind::CheckOut, asset_id,
                                            from_status, to_status, Some(library_card_id), now);
        self.publish(&transition).await?;
        Ok(transition)
    }

    async fn check_in(&self, asset_id: &str) -> LibraryResult<TransitionDto> {
        let _guard = self.locks.acquire(asset_id).await?;
        let asset = self.asset_repository.get(asset_id).await?;
        let now = Utc::now().naive_utc();
        let holds = self.hold_repository.find_by_asset_id(asset_id).await?;
        self.end_loan(asset_id, now).await?;

        let from_status = asset.asset_status;
        if let Some(next) = holds.first() {
            // the asset goes straight to the next borrower while the lock is held
            let card = next.library_card_id.as_str();
            let to_status = from_status.on(CirculationEvent::CheckIn { holds_pending: true });
            if self.open_loan(asset_id, card, now).await?.is_none() {
                warn!(asset_id, hold_id = next.hold_id.as_str(), "asset was checked out concurrently, hold stays queued");
                let transition = TransitionDto::new(TransitionKind::CheckIn, asset_id, from_status, to_status, None, now);
                self.publish(&transition).await?;
                return Ok(transition);
            }
            self.hold_repository.delete_hold(next).await?;
            self.asset_repository.update_status(asset_id, to_status).await?;
            info!(asset_id, hold_id = next.hold_id.as_str(), library_card_id = card, from = %from_status,
                to = %to_status, pending = holds.len() - 1, "checked in to next hold");
            let transition = TransitionDto::new(TransitionKind::CheckIn, asset_id, from_status, to_status, Some(card), now);
            let cascaded = TransitionDto::new(TransitionKind::CheckOut, asset_id, from_status, to_status, Some(card), now);
            self.publish(&transition).await?;
            self.publish(&cascaded).await?;
            return Ok(transition);
        }

        let to_status = from_status.on(CirculationEvent::CheckIn { holds_pending: false });
        self.asset_repository.update_status(asset_id, to_status).await?;
        info!(asset_id, from = %from_status, to = %to_status, "checked in");
        let transition = TransitionDto::new(TransitionKind::CheckIn, asset_id, from_status, to_status, None, now);
        self.publish(&transition).await?;
        Ok(transition)
    }

    async fn place_hold(&self, asset_id: &str, library_card_id: &str) -> LibraryResult<TransitionDto> {
        let _guard = self.locks.acquire(asset_id).await?;
        let asset = self.asset_repository.get(asset_id).await?;
        let _ = self.find_patron(library_card_id).await?;
        let now = Utc::now().naive_utc();

        let from_status = asset.asset_status;
        let to_status = from_status.on(CirculationEvent::PlaceHold);
        if to_status != from_status {
            self.asset_repository.update_status(asset_id, to_status).await?;
        }
        let hold = HoldEntity::new(asset_id, library_card_id, now);
        self.hold_repository.create(&hold).await?;
        info!(asset_id, library_card_id, hold_id = hold.hold_id.as_str(), from = %from_status, to = %to_status,
            "hold placed");
        let transition = TransitionDto::new(TransitionKind::PlaceHold, asset_id, from_status, to_status,
                                            Some(library_card_id), now);
        self.publish(&transition).await?;
        Ok(transition)
    }

    async fn mark_lost(&self, asset_id: &str) -> LibraryResult<TransitionDto> {
        let _guard = self.locks.acquire(asset_id).await?;
        let asset = self.asset_repository.get(asset_id).await?;
        let now = Utc::now().naive_utc();
        let from_status = asset.asset_status;
        if from_status == AssetStatus::Lost {
            debug!(asset_id, "asset is already lost");
            return Ok(TransitionDto::unchanged(TransitionKind::MarkLost, asset_id, from_status, None, now));
        }

        // the active checkout and open history stay in place
        let to_status = from_status.on(CirculationEvent::MarkLost);
        self.asset_repository.update_status(asset_id, to_status).await?;
        info!(asset_id, from = %from_status, to = %to_status, "marked lost");
        let transition = TransitionDto::new(TransitionKind::MarkLost, asset_id, from_status, to_status, None, now);
        self.publish(&transition).await?;
        Ok(transition)
    }

    async fn mark_found(&self, asset_id: &str) -> LibraryResult<TransitionDto> {
        let _guard = self.locks.acquire(asset_id).await?;
        let asset = self.asset_repository.get(asset_id).await?;
        let now = Utc::now().naive_utc();
        let from_status = asset.asset_status;

        // holds are not consulted here
        let to_status = from_status.on(CirculationEvent::MarkFound);
        self.asset_repository.update_status(asset_id, to_status).await?;
        self.end_loan(asset_id, now).await?;
        info!(asset_id, from = %from_status, to = %to_status, "marked found");
        let transition = TransitionDto::new(TransitionKind::MarkFound, asset_id, from_status, to_status, None, now);
        self.publish(&transition).await?;
        Ok(transition)
    }

    async fn latest_checkout(&self, asset_id: &str) -> LibraryResult<Option<CheckoutDto>> {
        let checkout = self.checkout_repository.find_by_asset_id(asset_id).await?;
        Ok(checkout.as_ref().map(CheckoutDto::from))
    }

    async fn checkout_history(&self, asset_id: &str) -> LibraryResult<Vec<CheckoutHistoryDto>> {
        let history = self.history_repository.find_by_asset_id(asset_id).await?;
        Ok(history.iter().map(CheckoutHistoryDto::from).collect())
    }

    async fn current_holds(&self, asset_id: &str) -> LibraryResult<Vec<HoldDto>> {
        let holds = self.hold_repository.find_by_asset_id(asset_id).await?;
        Ok(holds.iter().map(HoldDto::from).collect())
    }

    async fn is_checked_out(&self, asset_id: &str) -> LibraryResult<bool> {
        Ok(self.checkout_repository.find_by_asset_id(asset_id).await?.is_some())
    }

    async fn find_checkout_by_id(&self, checkout_id: &str) -> LibraryResult<Option<CheckoutDto>> {
        let checkout = found(self.checkout_repository.get(checkout_id).await)?;
        Ok(checkout.as_ref().map(CheckoutDto::from))
    }

    async fn current_checkout_patron(&self, asset_id: &str) -> LibraryResult<Option<String>> {
        match self.checkout_repository.find_by_asset_id(asset_id).await? {
            Some(checkout) => self.patron_name(checkout.library_card_id.as_str()).await,
            None => Ok(None),
        }
    }

    async fn current_hold_patron(&self, hold_id: &str) -> LibraryResult<Option<String>> {
        match found(self.hold_repository.get(hold_id).await)? {
            Some(hold) => self.patron_name(hold.library_card_id.as_str()).await,
            None => Ok(None),
        }
    }

    async fn current_hold_placed(&self, hold_id: &str) -> LibraryResult<Option<NaiveDateTime>> {
        Ok(found(self.hold_repository.get(hold_id).await)?.map(|hold| hold.hold_placed))
    }

    async fn summary(&self, asset_id: &str) -> LibraryResult<CirculationSummaryDto> {
        let asset = self.asset_repository.get(asset_id).await?;
        let checkout = self.checkout_repository.find_by_asset_id(asset_id).await?;
        let checkout_patron = match checkout.as_ref() {
            Some(checkout) => self.patron_name(checkout.library_card_id.as_str()).await?.unwrap_or_default(),
            None => String::new(),
        };
        let mut holds = vec![];
        for hold in self.hold_repository.find_by_asset_id(asset_id).await? {
            holds.push(HoldSummaryDto {
                patron_name: self.patron_name(hold.library_card_id.as_str()).await?.unwrap_or_default(),
                hold_id: hold.hold_id,
                library_card_id: hold.library_card_id,
                hold_placed: hold.hold_placed,
            });
        }
        Ok(CirculationSummaryDto {
            asset_id: asset.asset_id,
            title: asset.title,
            asset_status: asset.asset_status,
            is_checked_out: checkout.is_some(),
            latest_checkout: checkout.as_ref().map(CheckoutDto::from),
            checkout_patron,
            history: self.checkout_history(asset_id).await?,
            holds,
        })
    }
}
