//! Paginated trading card counting.

use std::time::Duration;
use tracing::{debug, info, warn};
use yasi_types::AppId;

use crate::wire::PageFailure;
use crate::{FetchError, PageFetcher, PageRequest};

/// Counts the trading cards for `app_id` across all inventory pages.
///
/// Pages are requested one at a time, each after the cursor of the previous
/// one, with `page_delay` between requests. Pagination stops when a page does
/// not declare more items, declares more items without a cursor, or comes
/// back empty. An empty first page and Steam's "no match" error both mean the
/// inventory holds nothing, which is a count of zero and not a failure.
///
/// # Errors
///
/// Returns the first page's [`FetchError`], or [`FetchError::Source`] when
/// Steam reports any error other than "no match".
pub async fn count_cards<P>(
    fetcher: &P,
    app_id: AppId,
    page_delay: Duration,
) -> Result<u32, FetchError>
where
    P: PageFetcher + ?Sized,
{
    let mut total = 0u32;
    let mut items_seen = 0usize;
    let mut cursor: Option<String> = None;
    let mut page = 1u32;

    loop {
        let request = PageRequest {
            page,
            start_assetid: cursor.as_deref(),
        };
        let data = fetcher.fetch_page(&request).await.inspect_err(|e| {
            warn!(%app_id, page, error = %e, "Inventory page fetch failed");
            if e.is_rate_limited() {
                warn!("Rate limited by Steam, increase the monitoring interval if this persists");
            } else if e.is_private_hint() {
                warn!("The inventory might be private or inaccessible");
            }
        })?;

        match data.failure() {
            Some(PageFailure::NoMatch) => {
                info!(%app_id, "No matching items in the inventory context, assuming 0 cards");
                return Ok(0);
            }
            Some(PageFailure::Error(message)) => {
                let error = FetchError::Source { message };
                warn!(%app_id, page, error = %error, "Inventory request rejected");
                if error.is_private_hint() {
                    warn!("The inventory might be private");
                }
                return Err(error);
            }
            None => {}
        }

        if data.is_empty() {
            if page == 1 {
                info!(%app_id, "Inventory context is empty, assuming 0 cards");
                return Ok(0);
            }
            break;
        }

        let page_cards = data.count_cards(app_id)?;
        total = total.saturating_add(page_cards);
        items_seen += data.assets.len();
        debug!(
            %app_id,
            page,
            page_cards,
            items = data.assets.len(),
            "Processed inventory page"
        );

        if !data.has_more() {
            break;
        }
        let Some(next) = data.next_cursor() else {
            warn!(page, "Inventory declares more items but no cursor, stopping pagination");
            break;
        };

        cursor = Some(next);
        page += 1;
        tokio::time::sleep(page_delay).await;
    }

    debug!(
        %app_id,
        pages = page,
        items = items_seen,
        cards = total,
        "Completed inventory fetch"
    );
    Ok(total)
}
