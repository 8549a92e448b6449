//! HTTP server for browser-based access to holibot.
//!
//! REST endpoints manage sessions and expose the holiday function; the
//! WebSocket endpoint streams chat turns.
//!
//! | Method | Path                         | Purpose                       |
//! |--------|------------------------------|-------------------------------|
//! | POST   | `/api/session`               | initialize (idempotent)       |
//! | GET    | `/api/session/{id}`          | current view                  |
//! | DELETE | `/api/session/{id}`          | forget the session            |
//! | PUT    | `/api/session/{id}/config`   | set agent id / alias id       |
//! | POST   | `/api/functions/holidays`    | holiday function              |
//! | GET    | `/ws/chat/{id}`              | streamed turns                |

mod routes;
mod state;
mod websocket;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub use routes::ApiResponse;
pub use state::SharedState;

/// Build the API router. Callers may add a fallback for static files.
pub fn router(state: Arc<SharedState>) -> Router {
    Router::new()
        .route("/api/session", post(routes::init_session))
        .route(
            "/api/session/{id}",
            get(routes::get_session).delete(routes::delete_session),
        )
        .route("/api/session/{id}/config", put(routes::configure_session))
        .route("/api/functions/holidays", post(routes::invoke_holidays))
        .route("/ws/chat/{id}", get(websocket::chat_ws_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use holibot_core::agents::ReplayRuntime;
    use holibot_core::holidays::{HolidayError, HolidaySource, Holidays};
    use holibot_core::SessionStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct StaticHolidays;

    impl HolidaySource for StaticHolidays {
        fn fetch(&self, year: &str) -> Result<Holidays, HolidayError> {
            let mut holidays = Holidays::new();
            holidays.insert(format!("{}-01-01", year), "元日".to_string());
            holidays.insert(format!("{}-02-11", year), "建国記念の日".to_string());
            Ok(holidays)
        }
    }

    struct DownHolidays;

    impl HolidaySource for DownHolidays {
        fn fetch(&self, _year: &str) -> Result<Holidays, HolidayError> {
            Err(HolidayError::Fetch("connection refused".to_string()))
        }
    }

    fn app_with(holidays: Arc<dyn HolidaySource>) -> Router {
        let sessions = SessionStore::new(Arc::new(ReplayRuntime::parse("").unwrap()), None);
        router(Arc::new(SharedState::new(sessions, holidays)))
    }

    fn app() -> Router {
        app_with(Arc::new(StaticHolidays))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    mod sessions {
        use super::*;

        #[tokio::test]
        async fn init_creates_unconfigured_session() {
            let app = app();
            let (status, body) = send(&app, json_request("POST", "/api/session", json!({}))).await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["success"], true);
            assert_eq!(body["data"]["canChat"], false);
            assert_eq!(body["data"]["messages"], json!([]));
            assert!(body["data"]["placeholder"].is_string());
            assert!(body["data"]["sessionId"].is_string());
        }

        #[tokio::test]
        async fn init_is_idempotent() {
            let app = app();
            let (_, first) = send(&app, json_request("POST", "/api/session", json!({}))).await;
            let id = first["data"]["sessionId"].as_str().unwrap().to_string();

            let (_, second) = send(
                &app,
                json_request("POST", "/api/session", json!({"sessionId": id})),
            )
            .await;

            assert_eq!(second["data"]["sessionId"], id.as_str());
        }

        #[tokio::test]
        async fn configure_then_get() {
            let app = app();
            let (_, created) = send(&app, json_request("POST", "/api/session", json!({}))).await;
            let id = created["data"]["sessionId"].as_str().unwrap().to_string();

            let (status, configured) = send(
                &app,
                json_request(
                    "PUT",
                    &format!("/api/session/{}/config", id),
                    json!({"agentId": "AGENT", "agentAliasId": "ALIAS"}),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(configured["data"]["canChat"], true);

            let request = Request::builder()
                .uri(format!("/api/session/{}", id))
                .body(Body::empty())
                .unwrap();
            let (status, fetched) = send(&app, request).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(fetched["data"]["agentId"], "AGENT");
            assert!(fetched["data"].get("placeholder").is_none());
        }

        #[tokio::test]
        async fn unknown_session_is_404() {
            let app = app();
            let request = Request::builder()
                .uri("/api/session/nope")
                .body(Body::empty())
                .unwrap();
            let (status, body) = send(&app, request).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["success"], false);
        }

        #[tokio::test]
        async fn delete_forgets_session() {
            let app = app();
            let (_, created) = send(&app, json_request("POST", "/api/session", json!({}))).await;
            let id = created["data"]["sessionId"].as_str().unwrap().to_string();
            let uri = format!("/api/session/{}", id);

            let request = Request::builder()
                .method("DELETE")
                .uri(&uri)
                .body(Body::empty())
                .unwrap();
            let (status, body) = send(&app, request).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["data"]["sessionId"], id.as_str());

            let request = Request::builder().uri(&uri).body(Body::empty()).unwrap();
            let (status, _) = send(&app, request).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }

        #[tokio::test]
        async fn delete_unknown_session_is_404() {
            let app = app();
            let request = Request::builder()
                .method("DELETE")
                .uri("/api/session/nope")
                .body(Body::empty())
                .unwrap();
            let (status, body) = send(&app, request).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["success"], false);
        }

        #[tokio::test]
        async fn malformed_config_is_400_envelope() {
            let app = app();
            let (_, created) = send(&app, json_request("POST", "/api/session", json!({}))).await;
            let id = created["data"]["sessionId"].as_str().unwrap().to_string();

            let (status, body) = send(
                &app,
                json_request(
                    "PUT",
                    &format!("/api/session/{}/config", id),
                    json!({"agentId": 42}),
                ),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["success"], false);
            assert!(body["error"].is_string());
        }
    }

    mod holidays {
        use super::*;

        fn event(year: Value) -> Value {
            json!({
                "actionGroup": "holidays",
                "function": "get_holidays",
                "messageVersion": "1.0",
                "parameters": [{"name": "year", "type": "string", "value": year}]
            })
        }

        #[tokio::test]
        async fn returns_function_response_envelope() {
            let app = app();
            let (status, body) = send(
                &app,
                json_request("POST", "/api/functions/holidays", event(json!("2025"))),
            )
            .await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["messageVersion"], "1.0");
            assert_eq!(body["response"]["actionGroup"], "holidays");
            assert_eq!(
                body["response"]["functionResponse"]["responseBody"]["TEXT"]["body"],
                "2025年の日本の祝日:\n2025-01-01: 元日\n2025-02-11: 建国記念の日\n"
            );
        }

        #[tokio::test]
        async fn missing_year_is_400() {
            let app = app();
            let (status, body) = send(
                &app,
                json_request(
                    "POST",
                    "/api/functions/holidays",
                    json!({"actionGroup": "holidays", "function": "get_holidays", "parameters": []}),
                ),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"].as_str().unwrap().contains("year"));
        }

        #[tokio::test]
        async fn upstream_failure_is_502() {
            let app = app_with(Arc::new(DownHolidays));
            let (status, body) = send(
                &app,
                json_request("POST", "/api/functions/holidays", event(json!("2025"))),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert_eq!(body["success"], false);
        }

        #[tokio::test]
        async fn body_without_envelope_fields_is_400() {
            let app = app();
            let (status, body) =
                send(&app, json_request("POST", "/api/functions/holidays", json!({}))).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["success"], false);
            assert!(body["error"]
                .as_str()
                .unwrap()
                .starts_with("Invalid request body"));
        }

        #[tokio::test]
        async fn non_json_body_is_400() {
            let app = app();
            let request = Request::builder()
                .method("POST")
                .uri("/api/functions/holidays")
                .header("content-type", "application/json")
                .body(Body::from("not json"))
                .unwrap();
            let (status, body) = send(&app, request).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["success"], false);
        }
    }
}
