//! Card target expressions and the absolute target they resolve to.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::TargetSpecError;

/// How a target magnitude is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetMode {
    /// Idle until the inventory holds this many cards in total.
    Total,
    /// Idle until this many more cards have dropped.
    Remaining,
}

impl TargetMode {
    /// Returns the single-letter prefix used in target expressions.
    #[must_use]
    pub const fn prefix(&self) -> char {
        match self {
            Self::Total => 't',
            Self::Remaining => 'r',
        }
    }
}

/// A parsed card target such as `t5` (five cards in total) or `r2` (two more cards).
///
/// Parsing is done through [`FromStr`]; the [`Display`](std::fmt::Display)
/// form round-trips to the compact expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetSpec {
    mode: TargetMode,
    magnitude: u32,
}

impl TargetSpec {
    /// Creates a remaining-mode target for `cards` more cards.
    ///
    /// Returns `None` when `cards` is zero.
    #[must_use]
    pub const fn remaining(cards: u32) -> Option<Self> {
        if cards == 0 {
            None
        } else {
            Some(Self {
                mode: TargetMode::Remaining,
                magnitude: cards,
            })
        }
    }

    /// Returns the target mode.
    #[must_use]
    pub const fn mode(&self) -> TargetMode {
        self.mode
    }

    /// Returns the number of cards named by the target.
    #[must_use]
    pub const fn magnitude(&self) -> u32 {
        self.magnitude
    }

    /// Resolves the target against the card count measured at startup.
    #[must_use]
    pub const fn resolve(&self, initial_count: u32) -> EffectiveTarget {
        match self.mode {
            TargetMode::Total => EffectiveTarget {
                absolute_count: self.magnitude,
                is_relative: false,
            },
            TargetMode::Remaining => EffectiveTarget {
                absolute_count: initial_count.saturating_add(self.magnitude),
                is_relative: true,
            },
        }
    }

    /// Returns a human readable description, e.g. `total of 5 card(s)`.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.mode {
            TargetMode::Total => format!("total of {} card(s)", self.magnitude),
            TargetMode::Remaining => format!("{} remaining card(s)", self.magnitude),
        }
    }
}

impl std::fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.mode.prefix(), self.magnitude)
    }
}

impl FromStr for TargetSpec {
    type Err = TargetSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(prefix), Some(_)) = (chars.next(), chars.clone().next()) else {
            return Err(TargetSpecError::TooShort(s.to_string()));
        };

        let mode = match prefix.to_ascii_lowercase() {
            't' => TargetMode::Total,
            'r' => TargetMode::Remaining,
            _ => return Err(TargetSpecError::InvalidMode(prefix)),
        };

        let digits = chars.as_str();
        let value: i64 = digits
            .parse()
            .map_err(|_| TargetSpecError::InvalidNumber(digits.to_string()))?;
        if value <= 0 {
            return Err(TargetSpecError::NonPositiveMagnitude(value));
        }
        let magnitude =
            u32::try_from(value).map_err(|_| TargetSpecError::InvalidNumber(digits.to_string()))?;

        Ok(Self { mode, magnitude })
    }
}

/// The absolute card count a session idles toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveTarget {
    /// Card count at which the session is complete.
    pub absolute_count: u32,
    /// Whether the target was derived from the measured baseline.
    ///
    /// Relative targets never count as met before idling starts.
    pub is_relative: bool,
}

impl EffectiveTarget {
    /// Returns true if `initial_count` already satisfies an absolute target.
    #[must_use]
    pub const fn already_met(&self, initial_count: u32) -> bool {
        !self.is_relative && initial_count >= self.absolute_count
    }

    /// Returns how many cards still need to drop from `count`.
    #[must_use]
    pub const fn cards_needed(&self, count: u32) -> u32 {
        self.absolute_count.saturating_sub(count)
    }
}
