//! Steam URL construction.

use yasi_types::AppId;

/// Base URL for Steam Community inventories.
pub const INVENTORY_BASE_URL: &str = "https://steamcommunity.com/inventory";

/// Base URL for the Steam Store app details API.
pub const APP_DETAILS_URL: &str = "https://store.steampowered.com/api/appdetails";

/// Builds the URL for one page of a community inventory.
///
/// URL format: `{INVENTORY_BASE_URL}/{STEAM_ID}/{APP}/{CONTEXT}?l=english&count={N}[&start_assetid={CURSOR}]`
///
/// # Example
///
/// ```
/// use yasi_fetch::url::inventory_url;
///
/// let url = inventory_url("76561198000000000", 753, 6, 2500, Some("1234"));
/// assert_eq!(
///     url,
///     "https://steamcommunity.com/inventory/76561198000000000/753/6?l=english&count=2500&start_assetid=1234"
/// );
/// ```
#[must_use]
pub fn inventory_url(
    steam_id: &str,
    community_app_id: u32,
    context_id: u32,
    page_size: u32,
    start_assetid: Option<&str>,
) -> String {
    let base = format!(
        "{INVENTORY_BASE_URL}/{steam_id}/{community_app_id}/{context_id}?l=english&count={page_size}"
    );
    match start_assetid {
        Some(cursor) => format!("{base}&start_assetid={cursor}"),
        None => base,
    }
}

/// Builds the app details URL for a single app under `base`.
///
/// # Example
///
/// ```
/// use yasi_fetch::url::{APP_DETAILS_URL, app_details_url};
/// use yasi_types::AppId;
///
/// assert_eq!(
///     app_details_url(APP_DETAILS_URL, AppId::new(440)),
///     "https://store.steampowered.com/api/appdetails?appids=440"
/// );
/// ```
#[must_use]
pub fn app_details_url(base: &str, app_id: AppId) -> String {
    format!("{base}?appids={app_id}")
}
