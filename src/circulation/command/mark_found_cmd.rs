use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::circulation::domain::CirculationService;
use crate::circulation::dto::TransitionDto;
use crate::core::command::{Command, CommandError};

pub struct MarkFoundCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl MarkFoundCommand {
    pub fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MarkFoundCommandRequest {
    pub asset_id: String,
}

impl MarkFoundCommandRequest {
    pub fn new(asset_id: &str) -> Self {
        Self {
            asset_id: asset_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MarkFoundCommandResponse {
    pub transition: TransitionDto,
}

impl MarkFoundCommandResponse {
    pub fn new(transition: TransitionDto) -> Self {
        Self {
            transition,
        }
    }
}

#[async_trait]
impl Command<MarkFoundCommandRequest, MarkFoundCommandResponse> for MarkFoundCommand {
    async fn execute(&self, req: MarkFoundCommandRequest) -> Result<MarkFoundCommandResponse, CommandError> {
        self.circulation_service.mark_found(req.asset_id.as_str())
            .await.map_err(CommandError::from).map(MarkFoundCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use crate::circulation::command::mark_found_cmd::{MarkFoundCommand, MarkFoundCommandRequest};
    use crate::circulation::testing::CirculationFixture;
    use crate::core::command::{Command, CommandError};
    use crate::core::library::AssetStatus;

    #[tokio::test]
    async fn test_should_run_mark_found() {
        let fixture = CirculationFixture::new();
        let asset_id = fixture.add_asset_with_status("Dune", AssetStatus::Lost).await;
        let cmd = MarkFoundCommand::new(Box::new(fixture.service()));

        let res = cmd.execute(MarkFoundCommandRequest::new(asset_id.as_str()))
            .await.expect("should mark found");
        assert_eq!(AssetStatus::Lost, res.transition.from_status);
        assert_eq!(AssetStatus::Available, res.transition.to_status);

        let err = cmd.execute(MarkFoundCommandRequest::new("missing"))
            .await.expect_err("should fail for unknown asset");
        assert!(matches!(err, CommandError::NotFound { .. }));
    }
}
