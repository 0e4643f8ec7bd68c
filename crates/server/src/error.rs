use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::{
    models::{
        analysis::AnalysisError, data_source::DataSourceError, device::DeviceError,
        network::NetworkError,
    },
    services::OverviewError,
};
use thiserror::Error;
use topology::TopologyError;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    /// Body, path or query string the extractors refused
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<OverviewError> for ApiError {
    fn from(err: OverviewError) -> Self {
        match err {
            OverviewError::NotFound => ApiError::NotFound("Network not found".into()),
            OverviewError::Database(e) => ApiError::Database(e),
            OverviewError::Device(e) => ApiError::Device(e),
            OverviewError::DataSource(e) => ApiError::DataSource(e),
            OverviewError::Analysis(e) => ApiError::Analysis(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            ApiError::Topology(err) => match err {
                TopologyError::NetworkNotFound(_) | TopologyError::DatasetNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                TopologyError::EmptyNetwork
                | TopologyError::InvalidTopology(_)
                | TopologyError::InvalidBatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
                TopologyError::IngestionFailure(_) | TopologyError::Storage(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Network(NetworkError::NotFound)
            | ApiError::Device(DeviceError::NotFound)
            | ApiError::DataSource(DataSourceError::NotFound)
            | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status_code.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let error_message = match &self {
            ApiError::Topology(err) => err.to_string(),
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => msg.clone(),
            ApiError::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        };
        let response = ApiResponse::<()>::error(&error_message);
        (status_code, Json(response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn core_errors_map_to_status_codes() {
        let cases = [
            (TopologyError::NetworkNotFound(Uuid::new_v4()), StatusCode::NOT_FOUND),
            (TopologyError::DatasetNotFound("x".into()), StatusCode::NOT_FOUND),
            (TopologyError::EmptyNetwork, StatusCode::UNPROCESSABLE_ENTITY),
            (TopologyError::InvalidBatch("dup".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (TopologyError::IngestionFailure("io".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
    }
}
