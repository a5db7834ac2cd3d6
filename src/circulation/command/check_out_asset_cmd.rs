use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::circulation::domain::CirculationService;
use crate::circulation::dto::TransitionDto;
use crate::core::command::{Command, CommandError};

pub struct CheckOutAssetCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl CheckOutAssetCommand {
    pub fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckOutAssetCommandRequest {
    pub asset_id: String,
    pub library_card_id: String,
}

impl CheckOutAssetCommandRequest {
    pub fn new(asset_id: &str, library_card_id: &str) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            library_card_id: library_card_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckOutAssetCommandResponse {
    pub transition: TransitionDto,
}

impl CheckOutAssetCommandResponse {
    pub fn new(transition: TransitionDto) -> Self {
        Self {
            transition,
        }
    }
}

#[async_trait]
impl Command<CheckOutAssetCommandRequest, CheckOutAssetCommandResponse> for CheckOutAssetCommand {
    async fn execute(&self, req: CheckOutAssetCommandRequest) -> Result<CheckOutAssetCommandResponse, CommandError> {
        self.circulation_service.check_out(req.asset_id.as_str(), req.library_card_id.as_str())
            .await.map_err(CommandError::from).map(CheckOutAssetCommandResponse::new)
    }
}
