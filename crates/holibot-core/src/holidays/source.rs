//! Where holiday data comes from.

use super::{HolidayError, Holidays};

/// Public holiday API for Japan.
pub const DEFAULT_BASE_URL: &str = "https://holidays-jp.github.io/api/v1";

/// Fetches the holidays of one year. Implementations block.
pub trait HolidaySource: Send + Sync {
    fn fetch(&self, year: &str) -> Result<Holidays, HolidayError>;
}

/// Fetches `{base_url}/{year}/date.json` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpHolidaySource {
    base_url: String,
}

impl HttpHolidaySource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, year: &str) -> String {
        format!("{}/{}/date.json", self.base_url, year)
    }
}

impl Default for HttpHolidaySource {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl HolidaySource for HttpHolidaySource {
    fn fetch(&self, year: &str) -> Result<Holidays, HolidayError> {
        let url = self.url_for(year);
        log::debug!("Fetching holidays from {}", url);

        let response = ureq::get(&url)
            .set("Accept", "application/json")
            .call()
            .map_err(|e| HolidayError::Fetch(format!("{}: {}", url, e)))?;

        response
            .into_json::<Holidays>()
            .map_err(|e| HolidayError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn fetch_blocking(base: String, year: &str) -> Result<Holidays, HolidayError> {
        let year = year.to_string();
        tokio::task::spawn_blocking(move || HttpHolidaySource::new(base).fetch(&year))
            .await
            .unwrap()
    }

    #[test]
    fn url_joins_base_and_year() {
        let source = HttpHolidaySource::new("http://localhost:9000/api/");
        assert_eq!(source.url_for("2025"), "http://localhost:9000/api/2025/date.json");
    }

    #[test]
    fn default_points_at_public_api() {
        assert_eq!(
            HttpHolidaySource::default().url_for("2024"),
            "https://holidays-jp.github.io/api/v1/2024/date.json"
        );
    }

    #[tokio::test]
    async fn fetch_parses_date_map_sorted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2025/date.json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"2025-02-11":"建国記念の日","2025-01-01":"元日","2025-01-13":"成人の日"}"#,
                "application/json",
            ))
            .mount(&server)
            .await;

        let holidays = fetch_blocking(server.uri(), "2025").await.unwrap();

        let dates: Vec<&str> = holidays.keys().map(String::as_str).collect();
        assert_eq!(dates, vec!["2025-01-01", "2025-01-13", "2025-02-11"]);
        assert_eq!(holidays["2025-01-01"], "元日");
    }

    #[tokio::test]
    async fn non_success_status_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetch_blocking(server.uri(), "1800").await.unwrap_err();
        assert!(matches!(err, HolidayError::Fetch(_)));
    }

    #[tokio::test]
    async fn invalid_json_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = fetch_blocking(server.uri(), "2025").await.unwrap_err();
        assert!(matches!(err, HolidayError::Parse(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_fetch_error() {
        let err = fetch_blocking("http://127.0.0.1:1".to_string(), "2025")
            .await
            .unwrap_err();
        assert!(matches!(err, HolidayError::Fetch(_)));
    }
}
