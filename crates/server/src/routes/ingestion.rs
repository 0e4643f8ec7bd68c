use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Deserializer, de};
use topology::{IngestionBatch, IngestionSummary};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    extract::{AppJson, AppPath},
};

/// Either a named sample dataset or an explicit batch
#[derive(Debug)]
pub enum LoadRequest {
    Dataset { dataset: String },
    Batch(IngestionBatch),
}

// A `dataset` key selects the sample form; anything else must parse as a batch
// so its own field errors are reported.
impl<'de> Deserialize<'de> for LoadRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Named {
            dataset: String,
        }

        let value = serde_json::Value::deserialize(deserializer)?;
        if value.get("dataset").is_some() {
            let Named { dataset } = Named::deserialize(value).map_err(de::Error::custom)?;
            Ok(LoadRequest::Dataset { dataset })
        } else {
            IngestionBatch::deserialize(value)
                .map(LoadRequest::Batch)
                .map_err(de::Error::custom)
        }
    }
}

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/networks/{network_id}/load", post(load_network))
        .with_state(state.clone())
}

async fn load_network(
    State(state): State<AppState>,
    AppPath(network_id): AppPath<Uuid>,
    AppJson(request): AppJson<LoadRequest>,
) -> Result<Json<ApiResponse<IngestionSummary>>, ApiError> {
    let summary = match request {
        LoadRequest::Dataset { dataset } => {
            state.topology().load_dataset(network_id, &dataset).await?
        }
        LoadRequest::Batch(batch) => state.topology().ingest(network_id, batch).await?,
    };
    Ok(Json(ApiResponse::success(summary)))
}
