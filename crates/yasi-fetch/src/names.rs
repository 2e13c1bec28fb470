//! Game name lookup through the Steam Store.

use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use yasi_types::AppId;

use crate::client::preview;
use crate::url::app_details_url;
use crate::wire::decode_app_name;
use crate::{ClientConfig, FetchError, NameSource};

/// Resolves app ids to store names, caching results for the process lifetime.
///
/// Lookups never fail: any problem falls back to the app id itself, and the
/// fallback is cached like a real name.
#[derive(Debug)]
pub struct NameResolver {
    client: Client,
    timeout: Duration,
    base_url: String,
    cache: Mutex<HashMap<AppId, String>>,
}

impl NameResolver {
    /// Creates a resolver using the metadata timeout from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: config.build_http()?,
            timeout: config.metadata_timeout,
            base_url: config.app_details_url.clone(),
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Returns the cached name for `app_id`, if it was looked up before.
    pub async fn cached(&self, app_id: AppId) -> Option<String> {
        self.cache.lock().await.get(&app_id).cloned()
    }

    async fn fetch_name(&self, app_id: AppId) -> Result<Option<String>, FetchError> {
        let url = app_details_url(&self.base_url, app_id);
        debug!(%app_id, "Fetching game name from the Steam Store");

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| match e.status() {
                Some(status) => FetchError::Status {
                    status: status.as_u16(),
                },
                None => FetchError::from(e),
            })?;
        let body = response.bytes().await?;

        decode_app_name(&body, app_id).inspect_err(|e| {
            debug!(%app_id, error = %e, body = %preview(&body), "Undecodable app details");
        })
    }
}

#[async_trait]
impl NameSource for NameResolver {
    async fn display_name(&self, app_id: AppId) -> String {
        if let Some(name) = self.cached(app_id).await {
            return name;
        }

        let name = match self.fetch_name(app_id).await {
            Ok(Some(name)) => {
                debug!(%app_id, %name, "Fetched game name");
                name
            }
            Ok(None) => {
                warn!(%app_id, "Game not found in the Steam Store (likely delisted), using app id as name");
                app_id.to_string()
            }
            Err(e) => {
                warn!(%app_id, error = %e, "Could not fetch game name, using app id as name");
                app_id.to_string()
            }
        };

        self.cache.lock().await.insert(app_id, name.clone());
        name
    }
}
