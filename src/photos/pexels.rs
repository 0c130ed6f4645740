use super::PhotoService;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio_retry::Retry;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.pexels.com";

const SEARCH_USER_AGENT: &str = "DeckAgent/1.0";
// Some photo CDNs reject requests without a browser user agent.
const DOWNLOAD_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const FETCH_ATTEMPTS: u32 = 3;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: PhotoSources,
}

#[derive(Debug, Deserialize)]
struct PhotoSources {
    landscape: String,
}

/// Pexels photo search client.
pub struct PexelsClient {
    client: Client,
    api_key: String,
    base_url: String,
    search_timeout: Duration,
    fetch_timeout: Duration,
    retry_delay: Duration,
}

impl PexelsClient {
    pub fn new(api_key: String) -> Self {
        Self::new_with_client(api_key, Client::new())
    }

    pub fn new_with_client(api_key: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            search_timeout: Duration::from_secs(10),
            fetch_timeout: Duration::from_secs(30),
            retry_delay: Duration::from_secs(1),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Base delay between download attempts; attempt `n` waits `n * delay`.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    async fn fetch_once(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .timeout(self.fetch_timeout)
            .header("User-Agent", DOWNLOAD_USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::ImageSearch(format!(
                "Image download failed (status {})",
                response.status()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl PhotoService for PexelsClient {
    async fn search(&self, query: &str) -> Result<Option<String>> {
        info!("Searching Pexels for: '{}'", query);

        let response = self
            .client
            .get(format!("{}/v1/search", self.base_url))
            .timeout(self.search_timeout)
            .header("Authorization", &self.api_key)
            .header("User-Agent", SEARCH_USER_AGENT)
            .query(&[
                ("query", query),
                ("per_page", "1"),
                ("orientation", "landscape"),
                ("size", "large"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(Error::ImageSearch(format!(
                "Pexels API error (status {}): {}",
                status, error_text
            )));
        }

        let body: SearchResponse = response.json().await?;
        let url = body.photos.into_iter().next().map(|p| p.src.landscape);
        if let Some(ref url) = url {
            debug!("Image found: {}", url);
        }
        Ok(url)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        info!("Downloading image from: {}", url);

        let delay = self.retry_delay;
        let strategy = (1..FETCH_ATTEMPTS).map(move |n| delay * n);
        let mut attempt = 0;

        Retry::spawn(strategy, || {
            attempt += 1;
            let current = attempt;
            async move {
                self.fetch_once(url).await.map_err(|e| {
                    warn!(
                        "Image download error (attempt {}/{}): {}",
                        current, FETCH_ATTEMPTS, e
                    );
                    e
                })
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(server: &MockServer) -> PexelsClient {
        PexelsClient::new("pexels-key".to_string())
            .with_base_url(server.uri())
            .with_retry_delay(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_search_returns_first_landscape_url() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(header("Authorization", "pexels-key"))
            .and(query_param("query", "mountain lake"))
            .and(query_param("per_page", "1"))
            .and(query_param("orientation", "landscape"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total_results": 2,
                "photos": [
                    { "src": { "landscape": "https://images.test/1.jpg", "original": "x" } },
                    { "src": { "landscape": "https://images.test/2.jpg", "original": "y" } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = make_client(&server).search("mountain lake").await.unwrap();
        assert_eq!(url.as_deref(), Some("https://images.test/1.jpg"));
    }

    #[tokio::test]
    async fn test_search_without_results_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "total_results": 0, "photos": [] })),
            )
            .mount(&server)
            .await;

        assert!(make_client(&server).search("nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = make_client(&server).search("cats").await.unwrap_err();
        assert!(matches!(err, Error::ImageSearch(ref msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_fetch_retries_then_succeeds() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/img.jpg"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/img.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let bytes = make_client(&server)
            .fetch(&format!("{}/img.jpg", server.uri()))
            .await
            .unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_gives_up_after_three_attempts() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/img.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .expect(3)
            .mount(&server)
            .await;

        let result = make_client(&server)
            .fetch(&format!("{}/img.jpg", server.uri()))
            .await;
        assert!(matches!(result, Err(Error::ImageSearch(_))));
    }

    #[tokio::test]
    async fn test_find_image_chains_search_and_fetch() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "photos": [{ "src": { "landscape": format!("{}/photo.jpg", server.uri()) } }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/photo.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![9u8; 4]))
            .mount(&server)
            .await;

        let bytes = make_client(&server).find_image("anything").await;
        assert_eq!(bytes, Some(vec![9, 9, 9, 9]));
    }
}
