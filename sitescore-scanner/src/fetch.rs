use crate::error::Result;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Status and body of a completed request. Any status is a successful fetch at this layer;
/// the traversal decides what to do with non-200 responses.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status_code: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchResponse {
    pub fn is_ok(&self) -> bool {
        self.status_code == 200
    }
}

/// The network seam of the crawler. An `Err` means the transport failed (connection,
/// timeout, unreadable body).
pub trait Fetch {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchResponse>> + Send;
}

impl<T: Fetch + Sync> Fetch for &T {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchResponse>> + Send {
        (**self).fetch(url)
    }
}

pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    retry_backoff: Duration,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("Sitescore/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            max_retries: 2,
            retry_backoff: Duration::from_millis(250),
        })
    }

    /// Extra attempts after a transport failure. Status codes are never retried.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    async fn fetch_once(&self, url: &str) -> Result<FetchResponse> {
        let response = self.client.get(url).send().await?;

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.text().await?;

        Ok(FetchResponse {
            status_code,
            content_type,
            body,
        })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let mut attempt = 0;
        loop {
            debug!("Fetching {} (attempt {})", url, attempt + 1);
            match self.fetch_once(url).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!("Fetch of {} failed, retrying ({}/{}): {}", url, attempt, self.max_retries, e);
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    #[tokio::test]
    async fn test_fetch_returns_status_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body>hi</body></html>", "text/html"),
            )
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let response = fetcher.fetch(&mock_server.uri()).await.unwrap();

        assert!(response.is_ok());
        assert_eq!(response.body, "<html><body>hi</body></html>");
        assert_eq!(response.content_type.as_deref(), Some("text/html"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_an_error_or_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new().unwrap().with_max_retries(3);
        let response = fetcher
            .fetch(&format!("{}/missing", mock_server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status_code, 404);
        assert!(!response.is_ok());
    }

    #[tokio::test]
    async fn test_transport_failure_is_an_error() {
        // Nothing listens on port 9 locally.
        let fetcher = HttpFetcher::with_timeout(2)
            .unwrap()
            .with_max_retries(1)
            .with_retry_backoff(Duration::from_millis(1));

        let result = fetcher.fetch("http://127.0.0.1:9/").await;
        assert!(result.is_err());
    }
}
