use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::circulation::domain::CirculationService;
use crate::circulation::dto::TransitionDto;
use crate::core::command::{Command, CommandError};

pub struct PlaceHoldCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl PlaceHoldCommand {
    pub fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PlaceHoldCommandRequest {
    pub asset_id: String,
    pub library_card_id: String,
}

impl PlaceHoldCommandRequest {
    pub fn new(asset_id: &str, library_card_id: &str) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            library_card_id: library_card_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlaceHoldCommandResponse {
    pub transition: TransitionDto,
}

impl PlaceHoldCommandResponse {
    pub fn new(transition: TransitionDto) -> Self {
        Self {
            transition,
        }
    }
}

#[async_trait]
impl Command<PlaceHoldCommandRequest, PlaceHoldCommandResponse> for PlaceHoldCommand {
    async fn execute(&self, req: PlaceHoldCommandRequest) -> Result<PlaceHoldCommandResponse, CommandError> {
        self.circulation_service.place_hold(req.asset_id.as_str(), req.library_card_id.as_str())
            .await.map_err(CommandError::from).map(PlaceHoldCommandResponse::new)
    }
}
