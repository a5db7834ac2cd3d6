use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::circulation::domain::CirculationService;
use crate::circulation::dto::TransitionDto;
use crate::core::command::{Command, CommandError};

pub struct MarkLostCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl MarkLostCommand {
    pub fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MarkLostCommandRequest {
    pub asset_id: String,
}

impl MarkLostCommandRequest {
    pub fn new(asset_id: &str) -> Self {
        Self {
            asset_id: asset_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MarkLostCommandResponse {
    pub transition: TransitionDto,
}

impl MarkLostCommandResponse {
    pub fn new(transition: TransitionDto) -> Self {
        Self {
            transition,
        }
    }
}

#[async_trait]
impl Command<MarkLostCommandRequest, MarkLostCommandResponse> for MarkLostCommand {
    async fn execute(&self, req: MarkLostCommandRequest) -> Result<MarkLostCommandResponse, CommandError> {
        self.circulation_service.mark_lost(req.asset_id.as_str())
            .await.map_err(CommandError::from).map(MarkLostCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use crate::circulation::command::mark_lost_cmd::{MarkLostCommand, MarkLostCommandRequest};
    use crate::circulation::testing::CirculationFixture;
    use crate::core::command::Command;
    use crate::core::library::AssetStatus;

    #[tokio::test]
    async fn test_should_run_mark_lost() {
        let fixture = CirculationFixture::new();
        let asset_id = fixture.add_asset("Dune").await;
        let cmd = MarkLostCommand::new(Box::new(fixture.service()));

        let res = cmd.execute(MarkLostCommandRequest::new(asset_id.as_str()))
            .await.expect("should mark lost");
        assert!(res.transition.applied);
        assert_eq!(AssetStatus::Lost, res.transition.to_status);

        let res = cmd.execute(MarkLostCommandRequest::new(asset_id.as_str()))
            .await.expect("should mark lost");
        assert!(!res.transition.applied);
    }
}
