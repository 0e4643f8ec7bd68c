use serde::{Deserialize, Serialize};

/// JSON envelope shared by the HTTP API and the CLI's `--json` output.
///
/// Successful payloads are flattened next to `success`, so `T` should serialize
/// as an object (or `()` for an empty body).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.to_string()),
        }
    }

    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::error(&e.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct Loaded {
        devices_loaded: usize,
    }

    #[test]
    fn success_flattens_payload() {
        let value = serde_json::to_value(ApiResponse::success(Loaded { devices_loaded: 3 })).unwrap();
        assert_eq!(value, json!({"success": true, "devices_loaded": 3}));
    }

    #[test]
    fn error_carries_message_only() {
        let value = serde_json::to_value(ApiResponse::<()>::error("Network has no devices")).unwrap();
        assert_eq!(value, json!({"success": false, "error": "Network has no devices"}));
    }

    #[test]
    fn from_result_maps_both_arms() {
        let ok: Result<Loaded, String> = Ok(Loaded { devices_loaded: 1 });
        assert!(ApiResponse::from_result(ok).is_success());

        let err: Result<Loaded, String> = Err("boom".into());
        let response = ApiResponse::from_result(err);
        assert!(!response.is_success());
        assert_eq!(response.error.as_deref(), Some("boom"));
    }
}
