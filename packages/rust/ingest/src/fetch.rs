//! Bounded-timeout page fetcher.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use linkdex_shared::{LinkdexError, Result};

/// HTTP fetcher for bookmark pages. One per pool member, built once and
/// reused for every URL that member processes.
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

/// A completed fetch. Non-success statuses are data, not errors: the worker
/// decides what a 404 means.
#[derive(Debug)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub body: String,
}

impl Fetcher {
    /// Build a fetcher with the configured user-agent and per-request timeout.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()
            .map_err(|e| LinkdexError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    /// GET `url`, returning status and body. Transport failures (DNS,
    /// connection, timeout) are [`LinkdexError::Network`]; a timeout names
    /// itself in the message so it survives into the run report.
    pub async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                LinkdexError::Network(format!(
                    "{url}: timed out after {}s",
                    self.timeout.as_secs()
                ))
            } else {
                LinkdexError::Network(format!("{url}: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LinkdexError::Network(format!("{url}: body read failed: {e}")))?;

        Ok(FetchResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetch_returns_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>hi</html>"))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new("test-agent", Duration::from_secs(5)).unwrap();
        let resp = fetcher.fetch(&format!("{}/page", server.uri())).await.unwrap();

        assert_eq!(resp.status.as_u16(), 200);
        assert_eq!(resp.body, "<html>hi</html>");
    }

    #[tokio::test]
    async fn fetch_sends_configured_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "linkdex-test/1.0"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = Fetcher::new("linkdex-test/1.0", Duration::from_secs(5)).unwrap();
        fetcher.fetch(&server.uri()).await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new("test-agent", Duration::from_secs(5)).unwrap();
        let resp = fetcher.fetch(&server.uri()).await.unwrap();
        assert_eq!(resp.status.as_u16(), 404);
    }

    #[tokio::test]
    async fn timeout_names_itself() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let fetcher = Fetcher::new("test-agent", Duration::from_millis(200)).unwrap();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();
        assert!(err.to_string().contains("timed out"), "got: {err}");
    }
}
