use axum::{Json, Router, routing::get};
use serde::Serialize;
use topology::datasets::{self, DatasetInfo};
use utils::response::ApiResponse;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DatasetList {
    pub datasets: Vec<DatasetInfo>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/datasets", get(list_datasets))
}

async fn list_datasets() -> Json<ApiResponse<DatasetList>> {
    Json(ApiResponse::success(DatasetList {
        datasets: datasets::catalog(),
    }))
}
