//! Data source traits consumed by the idle controller.

use async_trait::async_trait;
use yasi_types::AppId;

use crate::FetchError;
use crate::wire::InventoryPage;

/// A source of the current trading card count for a game.
#[async_trait]
pub trait CardSource: Send + Sync {
    /// Returns the number of trading cards currently held for `app_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if no reliable count could be obtained.
    async fn card_count(&self, app_id: AppId) -> Result<u32, FetchError>;
}

/// A best-effort source of game display names.
#[async_trait]
pub trait NameSource: Send + Sync {
    /// Returns the display name for `app_id`, or the id itself if unknown.
    async fn display_name(&self, app_id: AppId) -> String;
}

/// A request for one inventory page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<'a> {
    /// 1-based page number, for logging.
    pub page: u32,
    /// Continuation cursor from the previous page; `None` for the first page.
    pub start_assetid: Option<&'a str>,
}

/// Fetches raw inventory pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches and decodes one page.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] on timeout, transport failure, error status or
    /// an undecodable body.
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<InventoryPage, FetchError>;
}
