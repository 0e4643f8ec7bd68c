use axum::{
    extract::Request,
    http::{HeaderValue, header::HeaderName},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id of the request being handled
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Tag every request with an id, taken from `x-request-id` when the caller
/// sent one. Handler logs run inside a `request` span carrying the id and the
/// id is echoed on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).instrument(span).await;

    match HeaderValue::from_str(&request_id) {
        Ok(value) => {
            response
                .headers_mut()
                .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
        }
        Err(_) => tracing::warn!(%request_id, "request id is not a valid header value"),
    }

    response
}

#[cfg(test)]
mod tests {
    use axum::{Extension, body::Body, http::Request, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app() -> axum::Router {
        axum::Router::new()
            .route(
                "/echo",
                get(|Extension(id): Extension<RequestId>| async move { id.0 }),
            )
            .layer(axum::middleware::from_fn(request_id_middleware))
    }

    #[tokio::test]
    async fn generates_request_id_when_missing() {
        let request = Request::builder().uri("/echo").body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();

        let header = response.headers().get(REQUEST_ID_HEADER).unwrap();
        let id = header.to_str().unwrap().to_string();
        assert!(Uuid::parse_str(&id).is_ok());

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, id.as_bytes());
    }

    #[tokio::test]
    async fn preserves_existing_request_id() {
        let request = Request::builder()
            .uri("/echo")
            .header(REQUEST_ID_HEADER, "sensor-batch-7")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let response_id = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert_eq!(response_id.to_str().unwrap(), "sensor-batch-7");
    }

    #[tokio::test]
    async fn empty_header_gets_a_fresh_id() {
        let request = Request::builder()
            .uri("/echo")
            .header(REQUEST_ID_HEADER, "")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert!(Uuid::parse_str(id.to_str().unwrap()).is_ok());
    }
}
