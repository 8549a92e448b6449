//! REST handlers.
//!
//! Session endpoints answer with the `{success, data, error}` envelope. The
//! holiday function answers with the bare function response on success so a
//! function host can forward it unchanged.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use holibot_core::holidays::{self, FunctionInvocation, HolidayError};
use holibot_core::session::{lock_session, AgentConfig, SessionError, SessionView};
use serde::{Deserialize, Serialize};

use super::SharedState;

/// Response format for REST calls.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    /// Whether the call succeeded.
    pub success: bool,
    /// The result data (if successful).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Error message (if failed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn ok<T: Serialize>(data: T) -> ApiResult {
    match serde_json::to_value(data) {
        Ok(value) => (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(value),
                error: None,
            }),
        ),
        Err(e) => fail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Malformed or mistyped request bodies get the same envelope as every
/// other failure.
fn bad_body(rejection: JsonRejection) -> ApiResult {
    log::debug!("Rejected request body: {}", rejection.body_text());
    fail(
        StatusCode::BAD_REQUEST,
        format!("Invalid request body: {}", rejection.body_text()),
    )
}

fn fail(status: StatusCode, message: impl Into<String>) -> ApiResult {
    (
        status,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }),
    )
}

// ============================================================================
// SESSIONS
// ============================================================================

/// Request body for POST /api/session.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitSessionRequest {
    /// Id remembered by the browser, if any.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Handler for POST /api/session
pub async fn init_session(
    State(state): State<Arc<SharedState>>,
    payload: Result<Json<InitSessionRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return bad_body(rejection),
    };
    let handle = state.sessions.ensure(request.session_id.as_deref());
    let view: SessionView = lock_session(&handle).view();
    ok(view)
}

/// Handler for GET /api/session/{id}
pub async fn get_session(
    Path(id): Path<String>,
    State(state): State<Arc<SharedState>>,
) -> ApiResult {
    match state.sessions.get(&id) {
        Some(handle) => {
            let view = lock_session(&handle).view();
            ok(view)
        }
        None => fail(
            StatusCode::NOT_FOUND,
            SessionError::NotFound(id).to_string(),
        ),
    }
}

/// Handler for PUT /api/session/{id}/config
pub async fn configure_session(
    Path(id): Path<String>,
    State(state): State<Arc<SharedState>>,
    payload: Result<Json<AgentConfig>, JsonRejection>,
) -> ApiResult {
    let Json(config) = match payload {
        Ok(json) => json,
        Err(rejection) => return bad_body(rejection),
    };
    match state.sessions.configure(&id, config) {
        Ok(view) => {
            log::info!("Session {} configured (can chat: {})", id, view.can_chat);
            ok(view)
        }
        Err(e @ SessionError::NotFound(_)) => fail(StatusCode::NOT_FOUND, e.to_string()),
    }
}

/// Handler for DELETE /api/session/{id}
///
/// Called by the page when it goes away. Drops the history and closes the
/// transcript once no socket holds the session any more.
pub async fn delete_session(
    Path(id): Path<String>,
    State(state): State<Arc<SharedState>>,
) -> ApiResult {
    match state.sessions.remove(&id) {
        Some(_) => {
            log::info!("Session {} removed ({} live)", id, state.sessions.len());
            ok(serde_json::json!({ "sessionId": id }))
        }
        None => fail(
            StatusCode::NOT_FOUND,
            SessionError::NotFound(id).to_string(),
        ),
    }
}

// ============================================================================
// HOLIDAY FUNCTION
// ============================================================================

/// Handler for POST /api/functions/holidays
///
/// The lookup blocks on an outbound HTTP call, so it runs on the blocking
/// pool.
pub async fn invoke_holidays(
    State(state): State<Arc<SharedState>>,
    payload: Result<Json<FunctionInvocation>, JsonRejection>,
) -> Response {
    let Json(event) = match payload {
        Ok(json) => json,
        Err(rejection) => return bad_body(rejection).into_response(),
    };
    let source = Arc::clone(&state.holidays);
    let result =
        tokio::task::spawn_blocking(move || holidays::handle_invocation(&event, &*source))
            .await;

    match result {
        Ok(Ok(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(Err(e)) => {
            let status = match &e {
                HolidayError::MissingParameter(_) | HolidayError::InvalidParameter { .. } => {
                    StatusCode::BAD_REQUEST
                }
                HolidayError::Fetch(_) | HolidayError::Parse(_) => StatusCode::BAD_GATEWAY,
            };
            log::error!("Holiday function failed: {}", e);
            fail(status, e.to_string()).into_response()
        }
        Err(e) => {
            log::error!("Holiday task panicked: {}", e);
            fail(StatusCode::INTERNAL_SERVER_ERROR, "Holiday lookup aborted").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_response_serialization() {
        let (status, Json(response)) = ok(serde_json::json!({"key": "value"}));
        assert_eq!(status, StatusCode::OK);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"key\":\"value\""));
        assert!(!json.contains("error"));
    }

    #[test]
    fn api_response_error_serialization() {
        let (status, Json(response)) = fail(StatusCode::NOT_FOUND, "Something went wrong");
        assert_eq!(status, StatusCode::NOT_FOUND);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("Something went wrong"));
        assert!(!json.contains("data"));
    }

    #[test]
    fn init_request_accepts_empty_body() {
        let request: InitSessionRequest = serde_json::from_str("{}").unwrap();
        assert!(request.session_id.is_none());

        let request: InitSessionRequest =
            serde_json::from_str(r#"{"sessionId": "abc"}"#).unwrap();
        assert_eq!(request.session_id.as_deref(), Some("abc"));
    }
}
