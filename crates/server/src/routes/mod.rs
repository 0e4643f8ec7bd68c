use axum::{Router, middleware, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{AppState, middleware as app_middleware};

pub mod analysis;
pub mod data_sources;
pub mod datasets;
pub mod health;
pub mod ingestion;
pub mod networks;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        .merge(datasets::router())
        .merge(networks::router(&state))
        .merge(ingestion::router(&state))
        .merge(analysis::router(&state))
        .merge(data_sources::router(&state))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(app_middleware::request_id_middleware))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use db::DBService;
    use serde_json::{Value, json};
    use topology::AnalysisConfig;
    use tower::ServiceExt;

    use super::*;
    use crate::middleware::REQUEST_ID_HEADER;

    async fn app() -> Router {
        let db = DBService::in_memory().await.unwrap();
        router(AppState::new(db, AnalysisConfig::default()))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn create_network(app: &Router, name: &str) -> String {
        let (status, body) = call(
            app,
            Method::POST,
            "/api/networks",
            Some(json!({"name": name, "owner": "ops"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = app().await;
        let (status, body) = call(&app, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn datasets_are_listed() {
        let app = app().await;
        let (_, body) = call(&app, Method::GET, "/api/datasets", None).await;
        assert_eq!(body["datasets"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn load_then_analyze_a_sample_dataset() {
        let app = app().await;
        let id = create_network(&app, "Home").await;

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/networks/{id}/load"),
            Some(json!({"dataset": "smart_home"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["devices_loaded"], 5);
        assert_eq!(body["connections_loaded"], 5);
        assert_eq!(body["data_sources_loaded"], 1);

        let (status, body) =
            call(&app, Method::POST, &format!("/api/networks/{id}/analyze"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["network_name"], "Home");
        assert_eq!(body["centrality_score"], 0.5);
        assert_eq!(body["isolated_nodes_count"], 0);
        assert_eq!(body["has_issues"], false);

        let (_, body) = call(
            &app,
            Method::GET,
            &format!("/api/networks/{id}/analyses?limit=5"),
            None,
        )
        .await;
        assert_eq!(body["analyses"].as_array().unwrap().len(), 1);

        let (_, body) = call(&app, Method::GET, &format!("/api/networks/{id}"), None).await;
        assert_eq!(body["stats"]["total_devices"], 5);
        assert_eq!(body["analyses"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn explicit_batch_drops_unknown_endpoints() {
        let app = app().await;
        let id = create_network(&app, "Lab").await;

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/networks/{id}/load"),
            Some(json!({
                "devices": [
                    {"id": 1, "name": "Thermo", "type": "sensor"},
                    {"id": 2, "name": "Hub", "type": "gateway"}
                ],
                "connections": [{"from": 1, "to": 2}, {"from": 1, "to": 42}],
                "data_sources": [{"name": "Broker", "type": "stream"}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["devices_loaded"], 2);
        assert_eq!(body["connections_loaded"], 1);
    }

    #[tokio::test]
    async fn empty_network_analysis_is_unprocessable() {
        let app = app().await;
        let id = create_network(&app, "Empty").await;

        let (status, body) =
            call(&app, Method::POST, &format!("/api/networks/{id}/analyze"), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("no devices"));
    }

    #[tokio::test]
    async fn unknown_dataset_and_network_are_not_found() {
        let app = app().await;
        let id = create_network(&app, "Home").await;

        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/api/networks/{id}/load"),
            Some(json!({"dataset": "moon_base"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let missing = uuid::Uuid::new_v4();
        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/networks/{missing}/analyze"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn deleting_network_removes_it() {
        let app = app().await;
        let id = create_network(&app, "Temp").await;

        let (status, _) = call(&app, Method::DELETE, &format!("/api/networks/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, Method::GET, &format!("/api/networks/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = call(&app, Method::GET, "/api/networks?owner=ops", None).await;
        assert!(body["networks"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_batch_body_gets_an_error_envelope() {
        let app = app().await;
        let id = create_network(&app, "Lab").await;

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("/api/networks/{id}/load"),
            Some(json!({"devices": [{"id": 1, "name": "X", "type": "router"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        let error = body["error"].as_str().unwrap();
        assert!(error.contains("router"), "{error}");
        assert!(!error.contains("did not match any variant"));
    }

    #[tokio::test]
    async fn malformed_path_and_query_get_error_envelopes() {
        let app = app().await;

        let (status, body) = call(&app, Method::GET, "/api/networks/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());

        let id = create_network(&app, "Home").await;
        let (status, body) = call(
            &app,
            Method::GET,
            &format!("/api/networks/{id}/analyses?limit=many"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn unparseable_json_gets_an_error_envelope() {
        let app = app().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/networks")
            .header("content-type", "application/json")
            .body(Body::from("{\"name\": "))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn single_device_and_data_source_adds() {
        let app = app().await;
        let id = create_network(&app, "Plant").await;

        let (status, device) = call(
            &app,
            Method::POST,
            &format!("/api/networks/{id}/devices"),
            Some(json!({"name": "Valve", "type": "actuator"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(device["status"], "active");
        assert!(device["connections"].as_array().unwrap().is_empty());

        let (status, source) = call(
            &app,
            Method::POST,
            &format!("/api/networks/{id}/data-sources"),
            Some(json!({"name": "Historian", "type": "database"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(source["needs_update"], false);

        let (_, body) = call(&app, Method::GET, &format!("/api/networks/{id}"), None).await;
        assert_eq!(body["stats"]["total_devices"], 1);
        assert_eq!(body["stats"]["total_data_sources"], 1);

        let source_id = source["id"].as_str().unwrap();
        let (status, _) = call(
            &app,
            Method::DELETE,
            &format!("/api/data-sources/{source_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = call(
            &app,
            Method::DELETE,
            &format!("/api/data-sources/{source_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let missing = uuid::Uuid::new_v4();
        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/api/networks/{missing}/devices"),
            Some(json!({"name": "Ghost", "type": "sensor"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
