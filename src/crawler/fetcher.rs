//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests of a crawl, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - GET requests for page markup, assets and the stylesheet
//! - Retry logic for transient failures
//! - Extraction of the rendered page from content-API responses

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::MirrorError;
use reqwest::{Client, Response};
use scraper::{Html, Selector};
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent sent with every request
/// * `crawler` - Timeout settings
///
/// # Example
///
/// ```no_run
/// use offline_manual::config::{CrawlerConfig, UserAgentConfig};
/// use offline_manual::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     value: "OfflineManualBot/1.0 (+https://example.com/about)".to_string(),
/// };
///
/// let client = build_http_client(&user_agent, &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.value.clone())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP fetcher with bounded retries
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Success |
/// | HTTP 5xx | Retry up to `max-retries` times |
/// | Timeout | Retry up to `max-retries` times |
/// | Connection error | Retry up to `max-retries` times |
/// | Other HTTP status | Immediate failure |
/// | Other client error | Immediate failure |
///
/// The pause before retry `n` is `n * retry-delay-ms`.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl Fetcher {
    /// Creates a fetcher from the crawl configuration
    pub fn new(user_agent: &UserAgentConfig, crawler: &CrawlerConfig) -> Result<Self, MirrorError> {
        Ok(Self {
            client: build_http_client(user_agent, crawler)?,
            max_retries: crawler.max_retries,
            retry_delay: Duration::from_millis(crawler.retry_delay_ms),
        })
    }

    /// Fetches a URL as text
    pub async fn fetch_text(&self, url: &str) -> Result<String, MirrorError> {
        let response = self.get(url).await?;
        response.text().await.map_err(|source| MirrorError::Http {
            url: url.to_string(),
            source,
        })
    }

    /// Fetches a URL as raw bytes
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, MirrorError> {
        let response = self.get(url).await?;
        let bytes = response.bytes().await.map_err(|source| MirrorError::Http {
            url: url.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    }

    /// Fetches the rendered markup of a page from the content API
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The page HTML
    /// * `Err(MirrorError::EmptyPage)` - The response held no markup
    /// * `Err(MirrorError)` - The request failed
    pub async fn fetch_page(&self, api_url: &str) -> Result<String, MirrorError> {
        let body = self.fetch_text(api_url).await?;
        extract_page_markup(&body).ok_or_else(|| MirrorError::EmptyPage {
            url: api_url.to_string(),
        })
    }

    /// Sends a GET request, retrying transient failures
    async fn get(&self, url: &str) -> Result<Response, MirrorError> {
        let mut attempt = 0;

        loop {
            let error = match self.client.get(url).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => MirrorError::HttpStatus {
                    url: url.to_string(),
                    status: response.status().as_u16(),
                },
                Err(source) => MirrorError::Http {
                    url: url.to_string(),
                    source,
                },
            };

            if attempt >= self.max_retries || !is_transient(&error) {
                return Err(error);
            }

            attempt += 1;
            tracing::debug!(
                "Retrying {} (attempt {}/{}) after: {}",
                url,
                attempt,
                self.max_retries,
                error
            );
            tokio::time::sleep(self.retry_delay * attempt).await;
        }
    }
}

/// Returns true for failures worth another attempt
fn is_transient(error: &MirrorError) -> bool {
    match error {
        MirrorError::HttpStatus { status, .. } => (500..600).contains(status),
        MirrorError::Http { source, .. } => source.is_timeout() || source.is_connect(),
        _ => false,
    }
}

/// Extracts the rendered page HTML from a content-API response
///
/// The XML API wraps the page as escaped text inside `<parse><text>`; the
/// markup is the text content of that element. A body without the wrapper
/// is taken as page HTML itself.
///
/// # Returns
///
/// `None` when no markup is left after trimming
pub fn extract_page_markup(body: &str) -> Option<String> {
    let document = Html::parse_document(body);

    let markup = match Selector::parse("parse > text") {
        Ok(selector) => match document.select(&selector).next() {
            Some(text) => text.text().collect::<String>(),
            None => body.to_string(),
        },
        Err(_) => body.to_string(),
    };

    let markup = markup.trim();
    if markup.is_empty() {
        None
    } else {
        Some(markup.to_string())
    }
}
