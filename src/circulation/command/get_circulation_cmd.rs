use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::circulation::domain::CirculationService;
use crate::circulation::dto::CirculationSummaryDto;
use crate::core::command::{Command, CommandError};

pub struct GetCirculationCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl GetCirculationCommand {
    pub fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GetCirculationCommandRequest {
    pub asset_id: String,
}

impl GetCirculationCommandRequest {
    pub fn new(asset_id: &str) -> Self {
        Self {
            asset_id: asset_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GetCirculationCommandResponse {
    pub summary: CirculationSummaryDto,
}

impl GetCirculationCommandResponse {
    pub fn new(summary: CirculationSummaryDto) -> Self {
        Self {
            summary,
        }
    }
}

#[async_trait]
impl Command<GetCirculationCommandRequest, GetCirculationCommandResponse> for GetCirculationCommand {
    async fn execute(&self, req: GetCirculationCommandRequest) -> Result<GetCirculationCommandResponse, CommandError> {
        self.circulation_service.summary(req.asset_id.as_str())
            .await.map_err(CommandError::from).map(GetCirculationCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use crate::circulation::command::get_circulation_cmd::{GetCirculationCommand, GetCirculationCommandRequest};
    use crate::circulation::domain::CirculationService;
    use crate::circulation::testing::CirculationFixture;
    use crate::core::command::{Command, CommandError};
    use crate::core::library::AssetStatus;

    #[tokio::test]
    async fn test_should_run_get_circulation() {
        let fixture = CirculationFixture::new();
        fixture.add_patron("B1", "Ada", "Lovelace").await;
        fixture.add_patron("B2", "Alan", "Turing").await;
        let asset_id = fixture.add_asset("Dune").await;
        let svc = fixture.service();
        svc.check_out(asset_id.as_str(), "B1").await.expect("should check out");
        svc.place_hold(asset_id.as_str(), "B2").await.expect("should place hold");
        let cmd = GetCirculationCommand::new(Box::new(svc));

        let res = cmd.execute(GetCirculationCommandRequest::new(asset_id.as_str()))
            .await.expect("should get circulation");
        assert_eq!("Dune", res.summary.title.as_str());
        assert_eq!(AssetStatus::CheckedOut, res.summary.asset_status);
        assert_eq!("Ada Lovelace", res.summary.checkout_patron.as_str());
        assert_eq!(1, res.summary.holds.len());
        assert_eq!("Alan Turing", res.summary.holds[0].patron_name.as_str());

        let json = serde_json::to_string(&res).expect("should serialize response");
        assert!(json.contains("\"summary\""));
    }

    #[tokio::test]
    async fn test_should_fail_get_circulation_for_unknown_asset() {
        let fixture = CirculationFixture::new();
        let cmd = GetCirculationCommand::new(Box::new(fixture.service()));
        let err = cmd.execute(GetCirculationCommandRequest::new("missing"))
            .await.expect_err("should fail for unknown asset");
        assert!(matches!(err, CommandError::NotFound { .. }));
    }
}
