//! Browser UI compiled into the binary.

use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "web/"]
struct Assets;

/// Serve an embedded file; unknown paths get `index.html`.
pub async fn static_handler(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    let path = if path.is_empty() { "index.html" } else { path };

    match Assets::get(path) {
        Some(file) => asset_response(path, file.data.into_owned()),
        None => match Assets::get("index.html") {
            Some(file) => asset_response("index.html", file.data.into_owned()),
            None => (StatusCode::NOT_FOUND, "Not found").into_response(),
        },
    }
}

fn asset_response(path: &str, data: Vec<u8>) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    ([(header::CONTENT_TYPE, mime.as_ref().to_string())], data).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::Router;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new().fallback(static_handler)
    }

    async fn get(path: &str) -> Response {
        app()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn root_serves_index_html() {
        let response = get("/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
    }

    #[tokio::test]
    async fn script_has_javascript_mime() {
        let response = get("/app.js").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .contains("javascript"));
    }

    #[tokio::test]
    async fn unknown_path_falls_back_to_index() {
        let response = get("/some/client/route").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    fn script() -> String {
        let file = Assets::get("app.js").unwrap();
        String::from_utf8(file.data.into_owned()).unwrap()
    }

    #[test]
    fn script_deletes_session_on_pagehide() {
        let script = script();
        let hook = &script[script.find("\"pagehide\"").unwrap()..];
        assert!(hook.contains("method: \"DELETE\""));
        assert!(hook.contains("keepalive: true"));
    }

    #[test]
    fn script_clears_busy_when_socket_closes() {
        let script = script();
        let start = script.find("socket.onclose").unwrap();
        let handler = &script[start..start + script[start..].find("};").unwrap()];
        assert!(handler.contains("busy = false"));
    }

    #[test]
    fn embedded_files_present() {
        assert!(Assets::get("index.html").is_some());
        assert!(Assets::get("app.js").is_some());
        assert!(Assets::get("style.css").is_some());
    }
}
