//! HTTP client for the forum
//!
//! Wraps a reqwest client with browser-like headers, a session cookie jar,
//! and the mandatory fixed delay before every request.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::Client as ReqwestClient;
use tracing::{debug, instrument, warn};
use url::Url;

use super::config::FetcherConfig;
use super::error::FetchError;
use super::page::{current_page_number, latest_post_date};
use super::{FetchedPage, PageRef};

type Result<T> = std::result::Result<T, FetchError>;

/// HTTP client for fetching thread pages
#[derive(Debug, Clone)]
pub struct ForumClient {
    /// The underlying reqwest client
    client: ReqwestClient,

    /// Fetcher configuration
    config: FetcherConfig,
}

impl ForumClient {
    /// Create a new client from a fetcher configuration
    pub fn new(config: FetcherConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.5"),
        );
        if let Ok(referer) = HeaderValue::from_str(&config.thread_url) {
            headers.insert(REFERER, referer);
        }

        let client = ReqwestClient::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Build the URL for a given page of the thread
    fn page_url(&self, page: PageRef) -> Result<Url> {
        let mut url = Url::parse(&self.config.thread_url)?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    /// Visit the forum root once so the cookie jar holds a session.
    ///
    /// Failure is non-fatal; page fetches work without a warmed session,
    /// they are just more likely to be rate-limited.
    #[instrument(skip(self))]
    pub async fn warm_up(&self) {
        let root = match Url::parse(&self.config.thread_url).and_then(|u| u.join("/")) {
            Ok(u) => u,
            Err(e) => {
                warn!("Could not derive forum root from thread URL: {}", e);
                return;
            }
        };

        tokio::time::sleep(self.config.rate_limit()).await;
        match self.client.get(root).send().await {
            Ok(_) => debug!("Session initialized"),
            Err(e) => warn!("Could not initialize session: {}", e),
        }
    }

    /// Fetch the raw HTML of a thread page.
    ///
    /// Sleeps for the configured rate limit before the request goes out;
    /// callers that skip already-scraped pages therefore pay no delay.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_html(&self, page: PageRef) -> Result<String> {
        let url = self.page_url(page)?;

        tokio::time::sleep(self.config.rate_limit()).await;

        debug!("Sending GET request to {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                page: page.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    /// Fetch a numbered page together with its latest post date
    pub async fn fetch_page(&self, number: u32) -> Result<FetchedPage> {
        let html = self.fetch_html(PageRef::Number(number)).await?;
        let last_post_date = latest_post_date(&html);
        Ok(FetchedPage {
            number,
            html,
            last_post_date,
        })
    }

    /// Fetch the "last" page redirect and read the thread's current last
    /// page number from its pagination marker
    pub async fn last_page_number(&self) -> Result<u32> {
        let html = self.fetch_html(PageRef::Last).await?;
        current_page_number(&html).ok_or(FetchError::LastPageUnknown)
    }

    /// Fetch only the latest post date of a page.
    ///
    /// Used by cache reconciliation to repopulate a missing date without
    /// re-extracting the page's records.
    pub async fn page_date(&self, number: u32) -> Result<Option<chrono::DateTime<chrono::Utc>>> {
        let html = self.fetch_html(PageRef::Number(number)).await?;
        Ok(latest_post_date(&html))
    }

    /// Rate limit as a Duration, exposed for progress estimation
    pub fn rate_limit(&self) -> Duration {
        self.config.rate_limit()
    }
}
