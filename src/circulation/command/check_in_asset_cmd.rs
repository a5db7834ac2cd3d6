use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::circulation::domain::CirculationService;
use crate::circulation::dto::TransitionDto;
use crate::core::command::{Command, CommandError};

pub struct CheckInAssetCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl CheckInAssetCommand {
    pub fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckInAssetCommandRequest {
    pub asset_id: String,
}

impl CheckInAssetCommandRequest {
    pub fn new(asset_id: &str) -> Self {
        Self {
            asset_id: asset_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckInAssetCommandResponse {
    pub transition: TransitionDto,
}

impl CheckInAssetCommandResponse {
    pub fn new(transition: TransitionDto) -> Self {
        Self {
            transition,
        }
    }
}

#[async_trait]
impl Command<CheckInAssetCommandRequest, CheckInAssetCommandResponse> for CheckInAssetCommand {
    async fn execute(&self, req: CheckInAssetCommandRequest) -> Result<CheckInAssetCommandResponse, CommandError> {
        self.circulation_service.check_in(req.asset_id.as_str())
            .await.map_err(CommandError::from).map(CheckInAssetCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use crate::circulation::command::check_in_asset_cmd::{CheckInAssetCommand, CheckInAssetCommandRequest};
    use crate::circulation::command::check_out_asset_cmd::{CheckOutAssetCommand, CheckOutAssetCommandRequest};
    use crate::circulation::command::place_hold_cmd::{PlaceHoldCommand, PlaceHoldCommandRequest};
    use crate::circulation::testing::CirculationFixture;
    use crate::core::command::Command;
    use crate::core::library::AssetStatus;

    #[tokio::test]
    async fn test_should_run_check_in_asset() {
        let fixture = CirculationFixture::new();
        fixture.add_patron("B1", "Ada", "Lovelace").await;
        fixture.add_patron("B2", "Alan", "Turing").await;
        let asset_id = fixture.add_asset("Dune").await;
        let checkout_cmd = CheckOutAssetCommand::new(Box::new(fixture.service()));
        let hold_cmd = PlaceHoldCommand::new(Box::new(fixture.service()));
        let checkin_cmd = CheckInAssetCommand::new(Box::new(fixture.service()));

        let _ = checkout_cmd.execute(CheckOutAssetCommandRequest::new(asset_id.as_str(), "B1"))
            .await.expect("should check out asset");
        let _ = hold_cmd.execute(PlaceHoldCommandRequest::new(asset_id.as_str(), "B2"))
            .await.expect("should place hold");

        let res = checkin_cmd.execute(CheckInAssetCommandRequest::new(asset_id.as_str()))
            .await.expect("should check in asset");
        assert_eq!(AssetStatus::CheckedOut, res.transition.to_status);
        assert_eq!(Some("B2".to_string()), res.transition.library_card_id);

        let res = checkin_cmd.execute(CheckInAssetCommandRequest::new(asset_id.as_str()))
            .await.expect("should check in asset");
        assert_eq!(AssetStatus::Available, res.transition.to_status);
        assert_eq!(None, res.transition.library_card_id);
    }
}
