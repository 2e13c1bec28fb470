//! Steam application identifiers.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A Steam application (game) identifier.
///
/// This is the subject every idle run is keyed by: the game being idled, the
/// game whose cards are counted, and the owner of the resumable state record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    From,
    Into,
)]
#[serde(transparent)]
pub struct AppId(u32);

impl AppId {
    /// Creates an app id from its numeric value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the internal tag name Steam uses to mark items belonging to this game.
    #[must_use]
    pub fn game_tag(self) -> String {
        format!("appid_{}", self.0)
    }
}

impl FromStr for AppId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}
