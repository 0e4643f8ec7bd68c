use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};
use chrono::Utc;
use db::{
    models::{
        device::{CreateDevice, DeviceError},
        network::{CreateNetwork, NetworkError},
    },
    repositories::NetworkRepository,
    services::{NetworkOverview, NetworkOverviewService},
};
use serde::{Deserialize, Serialize};
use topology::{Device, Network};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    extract::{AppJson, AppPath, AppQuery},
};

#[derive(Debug, Deserialize)]
pub struct ListNetworksQuery {
    pub owner: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NetworkList {
    pub networks: Vec<Network>,
}

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/networks", get(list_networks).post(create_network))
        .route("/networks/{network_id}", get(get_network).delete(delete_network))
        .route("/networks/{network_id}/devices", post(add_device))
        .route(
            "/networks/{network_id}/devices/{device_id}",
            delete(remove_device),
        )
        .with_state(state.clone())
}

async fn create_network(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateNetwork>,
) -> Result<(StatusCode, Json<ApiResponse<Network>>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Network name must not be empty".into()));
    }
    let row = NetworkRepository::create(&state.db().pool, &payload).await?;
    tracing::info!(network_id = %row.id, "network created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(row.into()))))
}

async fn list_networks(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListNetworksQuery>,
) -> Result<Json<ApiResponse<NetworkList>>, ApiError> {
    let rows = NetworkRepository::list(&state.db().pool, query.owner.as_deref()).await?;
    Ok(Json(ApiResponse::success(NetworkList {
        networks: rows.into_iter().map(Network::from).collect(),
    })))
}

async fn get_network(
    State(state): State<AppState>,
    AppPath(network_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<NetworkOverview>>, ApiError> {
    let overview = NetworkOverviewService::load(
        &state.db().pool,
        network_id,
        state.analysis_config(),
        Utc::now(),
    )
    .await?;
    Ok(Json(ApiResponse::success(overview)))
}

async fn delete_network(
    State(state): State<AppState>,
    AppPath(network_id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if !state.store().delete_network(network_id).await? {
        return Err(NetworkError::NotFound.into());
    }
    tracing::info!(%network_id, "network deleted");
    Ok(Json(ApiResponse::success(())))
}

async fn add_device(
    State(state): State<AppState>,
    AppPath(network_id): AppPath<Uuid>,
    AppJson(payload): AppJson<CreateDevice>,
) -> Result<(StatusCode, Json<ApiResponse<Device>>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Device name must not be empty".into()));
    }
    let device = state
        .store()
        .add_device(network_id, payload)
        .await?
        .ok_or(NetworkError::NotFound)?;
    tracing::info!(%network_id, device_id = %device.id, "device added");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(device))))
}

async fn remove_device(
    State(state): State<AppState>,
    AppPath((network_id, device_id)): AppPath<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if !state.store().remove_device(network_id, device_id).await? {
        return Err(DeviceError::NotFound.into());
    }
    tracing::info!(%network_id, %device_id, "device removed");
    Ok(Json(ApiResponse::success(())))
}
