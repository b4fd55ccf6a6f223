use serde::{Deserialize, Serialize};

use crate::catalog::Game;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertGameRequest {
    pub name: Option<String>,
    pub platforms: Option<Vec<String>>,
    pub image_ref: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InsertGameResponse {
    pub message: String,
    pub record: Game,
}
