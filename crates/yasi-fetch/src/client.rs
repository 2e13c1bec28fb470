//! HTTP client for the Steam Community inventory.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use yasi_types::{AppId, IdleConfig};

use crate::inventory::count_cards;
use crate::url::{APP_DETAILS_URL, inventory_url};
use crate::wire::{InventoryPage, decode_page};
use crate::{CardSource, FetchError, PageFetcher, PageRequest};

/// Browser user agent; the community inventory endpoint rejects unknown agents.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Number of body bytes included in debug logs for undecodable responses.
const BODY_PREVIEW_BYTES: usize = 200;

/// Configuration for the Steam clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// SteamID64 whose inventory is read.
    pub steam_id: String,
    /// App id of the community inventory (753).
    pub community_app_id: u32,
    /// Inventory context holding trading cards (6).
    pub context_id: u32,
    /// Maximum items per inventory page.
    pub page_size: u32,
    /// Timeout for one inventory page.
    pub page_timeout: Duration,
    /// Timeout for store metadata lookups.
    pub metadata_timeout: Duration,
    /// Pause between successive inventory pages.
    pub page_delay: Duration,
    /// User agent string.
    pub user_agent: String,
    /// Store app details endpoint used for name lookups.
    pub app_details_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_idle_config(&IdleConfig::default())
    }
}

impl ClientConfig {
    /// Builds the client configuration from the idler configuration.
    #[must_use]
    pub fn from_idle_config(config: &IdleConfig) -> Self {
        Self {
            steam_id: config.steam_id_64.clone(),
            community_app_id: config.steam_community_appid,
            context_id: config.trading_card_context_id,
            page_size: config.inventory_page_size,
            page_timeout: config.timeouts.page(),
            metadata_timeout: config.timeouts.metadata(),
            page_delay: config.page_delay(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            app_details_url: APP_DETAILS_URL.to_string(),
        }
    }

    /// Builds the shared HTTP client.
    ///
    /// Per-request timeouts are set on each request, since inventory pages and
    /// metadata lookups use different limits.
    pub(crate) fn build_http(&self) -> Result<Client, reqwest::Error> {
        Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
    }
}

/// Reads trading card counts from a Steam Community inventory.
#[derive(Debug, Clone)]
pub struct InventoryClient {
    client: Client,
    config: ClientConfig,
}

impl InventoryClient {
    /// Creates a new inventory client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = config.build_http()?;
        Ok(Self { client, config })
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn get_page(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(self.config.page_timeout)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }
        if !status.is_success() {
            if let Ok(body) = response.text().await {
                debug!(status = status.as_u16(), body = %preview(body.as_bytes()), "Inventory error response");
            }
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?)
    }
}

#[async_trait]
impl PageFetcher for InventoryClient {
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<InventoryPage, FetchError> {
        let url = inventory_url(
            &self.config.steam_id,
            self.config.community_app_id,
            self.config.context_id,
            self.config.page_size,
            request.start_assetid,
        );
        debug!(page = request.page, %url, "Fetching inventory page");

        let body = self.get_page(&url).await?;
        decode_page(&body).inspect_err(|e| {
            debug!(page = request.page, error = %e, body = %preview(&body), "Undecodable inventory page");
        })
    }
}

#[async_trait]
impl CardSource for InventoryClient {
    async fn card_count(&self, app_id: AppId) -> Result<u32, FetchError> {
        debug!(%app_id, steam_id = %self.config.steam_id, "Starting paginated inventory fetch");
        count_cards(self, app_id, self.config.page_delay).await
    }
}

/// Returns the start of a response body for logging.
pub(crate) fn preview(body: &[u8]) -> String {
    let end = body.len().min(BODY_PREVIEW_BYTES);
    String::from_utf8_lossy(&body[..end]).into_owned()
}
