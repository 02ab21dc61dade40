//! HTTP fetcher implementation
//!
//! One GET per URL, no retries. Every failure is classified into a
//! `FetchResult` variant and logged; none of them is an error for the caller.

use crate::LarderError;
use reqwest::Client;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (DNS failure, connection refused, timeout, unreadable body)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Builds an HTTP client that sends the given User-Agent header
///
/// Redirects are followed with reqwest's default policy. No cookies are kept.
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sends one GET request and classifies the outcome
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                format!("Connection failed: {}", e)
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().to_string();
    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => FetchResult::NetworkError {
            error: format!("Failed to read body: {}", e),
        },
    }
}

/// Fetches pages and reports failures instead of raising them
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(user_agent: &str) -> Result<Self, LarderError> {
        Ok(Self {
            client: build_http_client(user_agent)?,
        })
    }

    /// Fetches a page body, or `None` if the request failed for any reason
    pub async fn fetch(&self, url: &str) -> Option<String> {
        tracing::debug!("Fetching {}", url);

        match fetch_url(&self.client, url).await {
            FetchResult::Success {
                final_url,
                status_code,
                body,
            } => {
                if final_url != url {
                    tracing::debug!("{} redirected to {}", url, final_url);
                }
                tracing::trace!("{} -> HTTP {} ({} bytes)", url, status_code, body.len());
                Some(body)
            }
            FetchResult::HttpError { status_code } => {
                tracing::warn!("Error fetching {}: HTTP {}", url, status_code);
                None
            }
            FetchResult::NetworkError { error } => {
                tracing::warn!("Error fetching {}: {}", url, error);
                None
            }
        }
    }
}
