//! Drop estimation logic.

use std::time::Duration;

/// Estimates card drops from idle time at a fixed minutes-per-card rate.
///
/// All methods are pure functions of their arguments and the configured rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropEstimator {
    /// Idle minutes assumed per card drop.
    minutes_per_card: f64,
}

impl DropEstimator {
    /// Creates an estimator for the given rate.
    ///
    /// The rate is expected to be positive; configuration validation
    /// guarantees this before an estimator is built.
    #[must_use]
    pub const fn new(minutes_per_card: f64) -> Self {
        Self { minutes_per_card }
    }

    /// Returns the configured minutes per card.
    #[must_use]
    pub const fn minutes_per_card(&self) -> f64 {
        self.minutes_per_card
    }

    /// Returns the idle time per card in seconds.
    #[must_use]
    pub const fn seconds_per_card(&self) -> f64 {
        self.minutes_per_card * 60.0
    }

    /// Returns the number of drops assumed after `elapsed` idle time.
    ///
    /// Computed as `floor((elapsed / 60) / minutes_per_card)`; never decreases
    /// as `elapsed` grows.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn drops(&self, elapsed: Duration) -> u32 {
        let minutes = elapsed.as_secs_f64() / 60.0;
        (minutes / self.minutes_per_card).floor() as u32
    }

    /// Returns how many whole seconds of `elapsed` count toward the next drop.
    ///
    /// This is the offset persisted when a timed session stops early, so a
    /// resumed session continues exactly where the previous one left off.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn seconds_into_current_drop(&self, elapsed: Duration) -> u64 {
        (elapsed.as_secs_f64() % self.seconds_per_card()) as u64
    }

    /// Returns the idle budget for waiting on `cards` drops.
    ///
    /// Returns `None` when the budget is too large to represent, which callers
    /// treat as no limit.
    #[must_use]
    pub fn budget(&self, cards: u32) -> Option<Duration> {
        Duration::try_from_secs_f64(f64::from(cards) * self.seconds_per_card()).ok()
    }

    /// Returns true if `elapsed` is less than one card period.
    ///
    /// Saved offsets outside this range cannot come from a real session.
    #[must_use]
    pub fn within_one_drop(&self, elapsed: Duration) -> bool {
        elapsed.as_secs_f64() < self.seconds_per_card()
    }

    /// Returns the session minute at which the `drops`-th assumed drop happened.
    ///
    /// `resumed` is the progress carried over from a previous session, which
    /// makes the first drop of a resumed session arrive early.
    #[must_use]
    pub fn drop_minute(&self, drops: u32, resumed: Duration) -> f64 {
        f64::from(drops) * self.minutes_per_card - resumed.as_secs_f64() / 60.0
    }
}
