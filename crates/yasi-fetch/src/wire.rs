//! Typed Steam inventory and store API responses.
//!
//! Steam is loose about JSON types (`amount` is a string, `success` may be a
//! bool or an integer, arrays may be `null`), so these structs absorb that
//! once at the fetch boundary and expose plain values to the rest of the crate.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use yasi_types::AppId;

use crate::FetchError;

/// Category of the tag naming the game an item belongs to.
const GAME_CATEGORY: &str = "Game";
/// Category, internal name and label of the trading card item class tag.
const CARD_CATEGORY: &str = "item_class";
const CARD_INTERNAL_NAME: &str = "item_class_2";
const CARD_LABEL: &str = "Trading Card";

/// Substrings in an inventory error that mean "nothing matched", i.e. an empty inventory.
const NO_MATCH_MARKERS: [&str; 2] = ["k_EResultNoMatch", "42"];

/// Deserializes `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A flag Steam sends as either a JSON bool or an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    /// `true` / `false`.
    Bool(bool),
    /// `1` / `0` and friends.
    Int(i64),
}

impl Flag {
    /// Returns true only for the truthy sentinel (`true` or `1`).
    #[must_use]
    pub const fn is_set(self) -> bool {
        matches!(self, Self::Bool(true) | Self::Int(1))
    }

    /// Returns true for an explicit `false` or `0`.
    #[must_use]
    pub const fn is_cleared(self) -> bool {
        matches!(self, Self::Bool(false) | Self::Int(0))
    }
}

/// An identifier or count Steam sends as either a string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LooseId {
    /// Numeric form.
    Int(u64),
    /// String form.
    Str(String),
}

impl LooseId {
    /// Returns the value as a string key.
    #[must_use]
    pub fn as_key(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Str(s) => s.clone(),
        }
    }

    /// Returns the value as an integer, if it is one.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(s) => s.trim().parse().ok(),
        }
    }
}

/// One item stack in the inventory.
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    /// Reference to the item's description.
    pub classid: LooseId,
    /// Number of items in the stack; absent means 1.
    #[serde(default)]
    pub amount: Option<LooseId>,
}

impl Asset {
    /// Returns the stack size.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Malformed`] if the amount is not a number.
    pub fn amount(&self) -> Result<u32, FetchError> {
        match &self.amount {
            None => Ok(1),
            Some(amount) => amount
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| FetchError::Malformed(format!("invalid amount {amount:?}"))),
        }
    }
}

/// A tag attached to an item description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tag {
    /// Tag category, e.g. `Game` or `item_class`.
    #[serde(default)]
    pub category: Option<String>,
    /// Machine name, e.g. `appid_440` or `item_class_2`.
    #[serde(default)]
    pub internal_name: Option<String>,
    /// Display name, e.g. `Trading Card`.
    #[serde(default)]
    pub localized_tag_name: Option<String>,
}

impl Tag {
    fn is(&self, category: &str, internal_name: &str) -> bool {
        self.category.as_deref() == Some(category)
            && self.internal_name.as_deref() == Some(internal_name)
    }
}

/// Shared metadata for all assets of one class.
#[derive(Debug, Clone, Deserialize)]
pub struct Description {
    /// Key assets refer to.
    pub classid: LooseId,
    /// App id of the game the item belongs to.
    #[serde(default)]
    pub market_fee_app: Option<LooseId>,
    /// Item tags.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
}

impl Description {
    /// Returns true if the item belongs to `app_id`.
    ///
    /// The owning app hint wins; the `Game` tag is the fallback.
    #[must_use]
    pub fn belongs_to(&self, app_id: AppId) -> bool {
        if self
            .market_fee_app
            .as_ref()
            .is_some_and(|app| app.as_key() == app_id.to_string())
        {
            return true;
        }
        let game_tag = app_id.game_tag();
        self.tags.iter().any(|tag| tag.is(GAME_CATEGORY, &game_tag))
    }

    /// Returns true if the item is a trading card.
    #[must_use]
    pub fn is_trading_card(&self) -> bool {
        self.tags.iter().any(|tag| {
            tag.is(CARD_CATEGORY, CARD_INTERNAL_NAME)
                && tag.localized_tag_name.as_deref() == Some(CARD_LABEL)
        })
    }
}

/// One page of a community inventory response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryPage {
    /// Success flag; absent on most successful responses.
    #[serde(default)]
    pub success: Option<Flag>,
    /// Error message when `success` is false.
    #[serde(default, rename = "Error", alias = "error")]
    pub error: Option<String>,
    /// Item stacks on this page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub assets: Vec<Asset>,
    /// Descriptions for the assets on this page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub descriptions: Vec<Description>,
    /// Set to the truthy sentinel when another page follows.
    #[serde(default)]
    pub more_items: Option<Flag>,
    /// Continuation cursor for the next page.
    #[serde(default)]
    pub last_assetid: Option<LooseId>,
}

/// Outcome of an inventory error reported in the response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFailure {
    /// Nothing matched the request: the inventory context is empty.
    NoMatch,
    /// Any other error, with Steam's message.
    Error(String),
}

impl InventoryPage {
    /// Returns the failure Steam reported in the body, if any.
    #[must_use]
    pub fn failure(&self) -> Option<PageFailure> {
        if !self.success.is_some_and(Flag::is_cleared) {
            return None;
        }
        let message = self
            .error
            .clone()
            .unwrap_or_else(|| "Unknown error".to_string());
        if NO_MATCH_MARKERS.iter().any(|marker| message.contains(marker)) {
            Some(PageFailure::NoMatch)
        } else {
            Some(PageFailure::Error(message))
        }
    }

    /// Returns true if the page carries neither assets nor descriptions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.descriptions.is_empty()
    }

    /// Returns the continuation cursor if another page follows.
    ///
    /// Anything other than the truthy `more_items` sentinel means this is the
    /// last page. An empty cursor counts as missing.
    #[must_use]
    pub fn next_cursor(&self) -> Option<String> {
        self.has_more()
            .then(|| self.last_assetid.as_ref().map(LooseId::as_key))
            .flatten()
            .filter(|cursor| !cursor.is_empty())
    }

    /// Returns true if the page declares that more items follow.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.more_items.is_some_and(Flag::is_set)
    }

    /// Sums the trading cards for `app_id` on this page.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Malformed`] if a matching asset has an invalid amount.
    pub fn count_cards(&self, app_id: AppId) -> Result<u32, FetchError> {
        let descriptions: HashMap<String, &Description> = self
            .descriptions
            .iter()
            .map(|desc| (desc.classid.as_key(), desc))
            .collect();

        let mut cards = 0u32;
        for asset in &self.assets {
            let Some(desc) = descriptions.get(&asset.classid.as_key()) else {
                continue;
            };
            if desc.belongs_to(app_id) && desc.is_trading_card() {
                cards = cards.saturating_add(asset.amount()?);
            }
        }
        Ok(cards)
    }
}

/// Decodes an inventory page body.
///
/// # Errors
///
/// Returns [`FetchError::Malformed`] if the body is not an inventory object.
pub fn decode_page(body: &[u8]) -> Result<InventoryPage, FetchError> {
    serde_json::from_slice(body).map_err(|e| FetchError::Malformed(e.to_string()))
}

/// Store `appdetails` entry for one app.
#[derive(Debug, Clone, Default, Deserialize)]
struct AppDetails {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<AppData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AppData {
    #[serde(default)]
    name: Option<String>,
}

/// Extracts the game name from a store `appdetails` body.
///
/// Returns `Ok(None)` if the store does not know the app (delisted or removed)
/// or the entry has no name.
///
/// # Errors
///
/// Returns [`FetchError::Malformed`] if the body cannot be decoded.
pub fn decode_app_name(body: &[u8], app_id: AppId) -> Result<Option<String>, FetchError> {
    let mut details: HashMap<String, AppDetails> =
        serde_json::from_slice(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    Ok(details
        .remove(&app_id.to_string())
        .filter(|entry| entry.success)
        .and_then(|entry| entry.data)
        .and_then(|data| data.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    const APP: AppId = AppId::new(440);

    fn card_description(classid: &str, tags: &str, market_fee_app: Option<u32>) -> String {
        let fee = market_fee_app.map_or_else(String::new, |id| format!(r#""market_fee_app": {id},"#));
        format!(r#"{{ "classid": "{classid}", {fee} "tags": [{tags}] }}"#)
    }

    const CARD_TAG: &str = r#"{ "category": "item_class", "internal_name": "item_class_2", "localized_tag_name": "Trading Card" }"#;
    const EMOTICON_TAG: &str = r#"{ "category": "item_class", "internal_name": "item_class_4", "localized_tag_name": "Emoticon" }"#;
    const GAME_TAG: &str = r#"{ "category": "Game", "internal_name": "appid_440" }"#;

    #[test]
    fn test_count_cards_inclusion_policy() {
        let body = format!(
            r#"{{
                "assets": [
                    {{ "classid": "1", "amount": "2" }},
                    {{ "classid": "2" }},
                    {{ "classid": "3", "amount": "5" }},
                    {{ "classid": "4", "amount": "7" }},
                    {{ "classid": "99", "amount": "1" }}
                ],
                "descriptions": [{}, {}, {}, {}],
                "total_inventory_count": 5,
                "success": 1
            }}"#,
            card_description("1", CARD_TAG, Some(440)),
            card_description("2", &format!("{GAME_TAG}, {CARD_TAG}"), None),
            card_description("3", EMOTICON_TAG, Some(440)),
            card_description("4", CARD_TAG, Some(570)),
        );
        let page = decode_page(body.as_bytes()).unwrap();

        assert!(page.failure().is_none());
        assert_eq!(page.count_cards(APP).unwrap(), 3);
        assert_eq!(page.count_cards(AppId::new(570)).unwrap(), 7);
    }

    #[test]
    fn test_invalid_amount_is_malformed() {
        let body = format!(
            r#"{{ "assets": [{{ "classid": 1, "amount": "lots" }}], "descriptions": [{}] }}"#,
            card_description("1", CARD_TAG, Some(440))
        );
        let page = decode_page(body.as_bytes()).unwrap();
        assert!(matches!(page.count_cards(APP), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_pagination_fields() {
        let page = decode_page(br#"{ "assets": [], "more_items": 1, "last_assetid": "123" }"#).unwrap();
        assert_eq!(page.next_cursor().as_deref(), Some("123"));

        let page = decode_page(br#"{ "more_items": true, "last_assetid": 456 }"#).unwrap();
        assert_eq!(page.next_cursor().as_deref(), Some("456"));

        let page = decode_page(br#"{ "more_items": 1 }"#).unwrap();
        assert!(page.has_more());
        assert_eq!(page.next_cursor(), None);

        let page = decode_page(br#"{ "more_items": 2, "last_assetid": "1" }"#).unwrap();
        assert!(!page.has_more());

        let page = decode_page(br#"{ "last_assetid": "1" }"#).unwrap();
        assert_eq!(page.next_cursor(), None);
    }

    #[test]
    fn test_null_arrays() {
        let page = decode_page(br#"{ "assets": null, "descriptions": null }"#).unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_failure_classification() {
        let page =
            decode_page(br#"{ "success": false, "Error": "EResult 42 (k_EResultNoMatch)" }"#).unwrap();
        assert_eq!(page.failure(), Some(PageFailure::NoMatch));

        let page = decode_page(br#"{ "success": 0, "error": "This profile is private." }"#).unwrap();
        assert_eq!(
            page.failure(),
            Some(PageFailure::Error("This profile is private.".to_string()))
        );

        let page = decode_page(br#"{ "success": false }"#).unwrap();
        assert_eq!(
            page.failure(),
            Some(PageFailure::Error("Unknown error".to_string()))
        );
    }

    #[test]
    fn test_non_object_body_is_malformed() {
        assert!(matches!(decode_page(b"null"), Err(FetchError::Malformed(_))));
        assert!(matches!(decode_page(b"<html>"), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_decode_app_name() {
        let body = br#"{ "440": { "success": true, "data": { "name": "Team Fortress 2" } } }"#;
        assert_eq!(
            decode_app_name(body, APP).unwrap().as_deref(),
            Some("Team Fortress 2")
        );

        let delisted = br#"{ "440": { "success": false } }"#;
        assert_eq!(decode_app_name(delisted, APP).unwrap(), None);

        assert!(decode_app_name(b"[]", APP).is_err());
    }
}
