//! The idle loop.
//!
//! A run moves through `prepare` (name lookup, initial reading, resume
//! record, effective target) and `run`, which either completes immediately
//! because a total target is already met or opens the game session and idles
//! until the target is met, the idle budget runs out, or the caller signals
//! shutdown. Every path that opened the session closes it exactly once.

use chrono::{DateTime, Local};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use yasi_estimate::DropEstimator;
use yasi_fetch::{CardSource, NameSource};
use yasi_state::{SavedProgress, StateStore};
use yasi_types::{AppId, EffectiveTarget, IdleConfig, TargetSpec};

use crate::{GameSession, IdleError, Result};

/// Resolution of the idle loop.
const TICK: Duration = Duration::from_secs(1);

/// Where progress readings come from.
pub enum ProgressSource {
    /// Read the real card count from the inventory.
    Inventory(Arc<dyn CardSource>),
    /// Assume drops from elapsed idle time.
    Timed,
}

impl ProgressSource {
    /// Returns true when drops are estimated from time.
    #[must_use]
    pub const fn is_timed(&self) -> bool {
        matches!(self, Self::Timed)
    }
}

impl fmt::Debug for ProgressSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inventory(_) => f.write_str("Inventory"),
            Self::Timed => f.write_str("Timed"),
        }
    }
}

/// Everything decided before idling starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdlePlan {
    /// The game to idle.
    pub app_id: AppId,
    /// Display name, or the app id when the name is unknown.
    pub game_name: String,
    /// The target in effect; a saved target replaces the requested one.
    pub target_spec: TargetSpec,
    /// The resolved absolute target.
    pub target: EffectiveTarget,
    /// Card count at startup (always 0 in timed mode).
    pub initial_count: u32,
    /// Idle time toward the next drop carried over from a previous run.
    pub resumed: Duration,
}

impl IdlePlan {
    /// Returns true if the target is met without idling at all.
    #[must_use]
    pub const fn is_target_met(&self) -> bool {
        self.target.already_met(self.initial_count)
    }

    /// Returns the number of cards still to drop.
    #[must_use]
    pub const fn cards_to_wait(&self) -> u32 {
        self.target.cards_needed(self.initial_count)
    }
}

/// How an idle run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleOutcome {
    /// The target card count was reached.
    Completed,
    /// The idle budget ran out before the target was reached.
    BudgetExhausted,
    /// The caller asked the run to stop.
    Interrupted,
}

impl IdleOutcome {
    /// Returns a short label for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::BudgetExhausted => "budget exhausted",
            Self::Interrupted => "interrupted",
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdleReport {
    /// How the run ended.
    pub outcome: IdleOutcome,
    /// Whether the game session was opened and the loop entered.
    pub entered_idling: bool,
    /// Cards gained (or assumed) during this run.
    pub cards_this_session: u32,
    /// Last known card count.
    pub final_count: u32,
    /// Time spent idling in this run, including the sync grace.
    pub idled: Duration,
    /// Wall clock time the run started.
    pub started_at: DateTime<Local>,
}

/// Mutable state of one idle loop.
#[derive(Debug)]
struct IdleSession<'a> {
    plan: &'a IdlePlan,
    started: Instant,
    max_idle: Option<Duration>,
    current_count: u32,
    cards_this_session: u32,
    cycle: u32,
}

impl<'a> IdleSession<'a> {
    const fn new(plan: &'a IdlePlan, started: Instant, max_idle: Option<Duration>) -> Self {
        Self {
            plan,
            started,
            max_idle,
            current_count: plan.initial_count,
            cards_this_session: 0,
            cycle: 0,
        }
    }

    const fn target_met(&self) -> bool {
        self.current_count >= self.plan.target.absolute_count
    }

    fn budget_spent(&self) -> bool {
        self.max_idle
            .is_some_and(|max_idle| self.started.elapsed() >= max_idle)
    }

    fn apply_reading(&mut self, count: u32) {
        let app_id = self.plan.app_id;
        if count < self.current_count {
            warn!(
                %app_id,
                cycle = self.cycle,
                previous = self.current_count,
                count,
                "Card count went down since the last check, using the new value"
            );
        } else if count > self.current_count {
            info!(
                %app_id,
                cycle = self.cycle,
                gained = count - self.current_count,
                "New card drop(s) detected"
            );
        }
        self.current_count = count;
        self.cards_this_session = count.saturating_sub(self.plan.initial_count);
        info!(
            %app_id,
            cycle = self.cycle,
            count,
            target = self.plan.target.absolute_count,
            "Card count"
        );
    }
}

/// Drives one idle run for a single game.
///
/// The controller owns the configuration, the progress source, the state
/// store and the game session. It is single-threaded: readings are awaited
/// one at a time and applied in order.
pub struct IdleController<S> {
    config: IdleConfig,
    source: ProgressSource,
    names: Arc<dyn NameSource>,
    store: StateStore,
    session: S,
    estimator: DropEstimator,
}

impl<S: fmt::Debug> fmt::Debug for IdleController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdleController")
            .field("source", &self.source)
            .field("store", &self.store)
            .field("session", &self.session)
            .field("estimator", &self.estimator)
            .finish_non_exhaustive()
    }
}

impl<S: GameSession> IdleController<S> {
    /// Creates a controller.
    ///
    /// `source` should agree with `config.enable_inventory_checking`.
    pub fn new(
        config: IdleConfig,
        source: ProgressSource,
        names: Arc<dyn NameSource>,
        store: StateStore,
        session: S,
    ) -> Self {
        let estimator = DropEstimator::new(config.max_idle_minutes_per_card);
        Self {
            config,
            source,
            names,
            store,
            session,
            estimator,
        }
    }

    /// Returns the game session.
    #[must_use]
    pub const fn session(&self) -> &S {
        &self.session
    }

    /// Returns the state store.
    #[must_use]
    pub const fn store(&self) -> &StateStore {
        &self.store
    }

    /// Resolves the game name, reads the starting point and the effective target.
    ///
    /// # Errors
    ///
    /// Returns [`IdleError::Config`] for a total target without inventory
    /// checking and [`IdleError::InitialCount`] if the startup reading fails.
    pub async fn prepare(&self, app_id: AppId, requested: TargetSpec) -> Result<IdlePlan> {
        self.config.check_target(requested)?;

        let game_name = self.names.display_name(app_id).await;
        info!(%app_id, game = %game_name, "Preparing idle run");

        let plan = match &self.source {
            ProgressSource::Inventory(cards) => {
                info!(%app_id, "Performing initial card count check");
                let initial_count = cards
                    .card_count(app_id)
                    .await
                    .map_err(|source| IdleError::InitialCount { app_id, source })?;
                info!(%app_id, initial_count, "Initial card count");
                IdlePlan {
                    app_id,
                    game_name,
                    target_spec: requested,
                    target: requested.resolve(initial_count),
                    initial_count,
                    resumed: Duration::ZERO,
                }
            }
            ProgressSource::Timed => {
                let (target_spec, resumed) = self.resume_point(app_id, requested)?;
                IdlePlan {
                    app_id,
                    game_name,
                    target_spec,
                    target: target_spec.resolve(0),
                    initial_count: 0,
                    resumed,
                }
            }
        };

        info!(
            %app_id,
            target = %plan.target_spec.describe(),
            absolute = plan.target.absolute_count,
            "Card target"
        );
        Ok(plan)
    }

    /// Picks the saved target and offset over the requested target, if any.
    fn resume_point(&self, app_id: AppId, requested: TargetSpec) -> Result<(TargetSpec, Duration)> {
        let Some(saved) = self.store.load(app_id) else {
            return Ok((requested, Duration::ZERO));
        };
        self.config.check_target(saved.target)?;

        let resumed = Duration::from_secs(saved.seconds_idled);
        if !self.estimator.within_one_drop(resumed) {
            warn!(
                %app_id,
                seconds_idled = saved.seconds_idled,
                seconds_per_card = self.estimator.seconds_per_card(),
                "Saved progress exceeds one card period, starting over"
            );
            return Ok((requested, Duration::ZERO));
        }

        if saved.target != requested {
            info!(
                %app_id,
                saved = %saved.target,
                %requested,
                "Saved target takes priority over the requested one"
            );
        }
        info!(
            %app_id,
            target = %saved.target,
            seconds_idled = saved.seconds_idled,
            "Resuming from saved progress"
        );
        Ok((saved.target, resumed))
    }

    /// Runs the plan until completion, budget exhaustion or `shutdown` resolves.
    ///
    /// A total target that is already met completes without opening the
    /// session. Otherwise the session is opened, the loop runs, saved
    /// progress is written or cleared, and the session is closed.
    ///
    /// # Errors
    ///
    /// Returns [`IdleError::Session`] if the game session cannot be opened.
    pub async fn run<F>(&mut self, plan: &IdlePlan, shutdown: F) -> Result<IdleReport>
    where
        F: Future<Output = ()>,
    {
        let started_at = Local::now();

        if plan.is_target_met() {
            info!(
                app_id = %plan.app_id,
                initial = plan.initial_count,
                target = plan.target.absolute_count,
                "Target already met, nothing to idle"
            );
            self.clear_record();
            return Ok(IdleReport {
                outcome: IdleOutcome::Completed,
                entered_idling: false,
                cards_this_session: 0,
                final_count: plan.initial_count,
                idled: Duration::ZERO,
                started_at,
            });
        }

        self.session.open(plan.app_id, &plan.game_name)?;
        let report = self.idle(plan, shutdown, started_at).await;
        self.session.close();

        info!(
            app_id = %plan.app_id,
            outcome = report.outcome.as_str(),
            cards = report.cards_this_session,
            minutes = %format!("{:.1}", report.idled.as_secs_f64() / 60.0),
            "Idle run finished"
        );
        Ok(report)
    }

    /// Opens the session for `duration`, keeping it alive, then closes it.
    ///
    /// # Errors
    ///
    /// Returns [`IdleError::Session`] if the game session cannot be opened.
    pub async fn fast_check<F>(&mut self, app_id: AppId, duration: Duration, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let game_name = self.names.display_name(app_id).await;
        info!(%app_id, game = %game_name, seconds = duration.as_secs(), "Fast check");

        self.session.open(app_id, &game_name)?;
        tokio::pin!(shutdown);
        let finished = self.hold(duration, shutdown.as_mut()).await;
        self.session.close();

        if finished {
            info!(%app_id, "Fast check complete");
        } else {
            info!(%app_id, "Fast check interrupted");
        }
        Ok(())
    }

    async fn idle<F>(&mut self, plan: &IdlePlan, shutdown: F, started_at: DateTime<Local>) -> IdleReport
    where
        F: Future<Output = ()>,
    {
        let cards_to_wait = plan.cards_to_wait();
        let max_idle = if cards_to_wait > 0 {
            self.estimator.budget(cards_to_wait)
        } else {
            None
        };
        let interval = self.config.monitoring_interval();
        let mut progress = IdleSession::new(plan, Instant::now(), max_idle);

        info!(
            app_id = %plan.app_id,
            game = %plan.game_name,
            cards_to_wait,
            max_idle_minutes = max_idle.map_or(0, |d| d.as_secs() / 60),
            interval_seconds = interval.as_secs(),
            started_at = %started_at.format("%H:%M:%S"),
            "Started idling"
        );

        let mut ticker = tokio::time::interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut last_check = progress.started;
        let mut wait = interval;

        let outcome = loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!(app_id = %plan.app_id, "Interrupted, stopping idle run");
                    break IdleOutcome::Interrupted;
                }
                _ = ticker.tick() => {}
            }
            self.session.keep_alive();

            let now = Instant::now();
            if now.duration_since(last_check) >= wait {
                last_check = now;
                progress.cycle += 1;
                wait = self.check_progress(&mut progress).await;
            }

            if progress.target_met() {
                info!(
                    app_id = %plan.app_id,
                    count = progress.current_count,
                    target = plan.target.absolute_count,
                    "Target reached"
                );
                break IdleOutcome::Completed;
            }

            if progress.budget_spent() {
                if self.source.is_timed() {
                    self.estimate_drops(&mut progress);
                }
                warn!(
                    app_id = %plan.app_id,
                    count = progress.current_count,
                    target = plan.target.absolute_count,
                    "Maximum idle time reached"
                );
                let grace = self.config.sync_grace();
                if !grace.is_zero() {
                    info!(seconds = grace.as_secs(), "Keeping the game running so Steam can sync playtime");
                    self.hold(grace, shutdown.as_mut()).await;
                }
                break IdleOutcome::BudgetExhausted;
            }
        };

        self.finish(&mut progress, outcome);

        IdleReport {
            outcome,
            entered_idling: true,
            cards_this_session: progress.cards_this_session,
            final_count: progress.current_count,
            idled: progress.started.elapsed(),
            started_at,
        }
    }

    /// Takes one reading and returns how long to wait before the next one.
    async fn check_progress(&self, progress: &mut IdleSession<'_>) -> Duration {
        let interval = self.config.monitoring_interval();
        match &self.source {
            ProgressSource::Inventory(cards) => match cards.card_count(progress.plan.app_id).await {
                Ok(count) => {
                    progress.apply_reading(count);
                    interval
                }
                Err(e) => {
                    if e.is_source_reported() {
                        error!(
                            app_id = %progress.plan.app_id,
                            cycle = progress.cycle,
                            error = %e,
                            private = e.is_private_hint(),
                            "Steam rejected the card count check, retrying next interval"
                        );
                    } else {
                        warn!(
                            app_id = %progress.plan.app_id,
                            cycle = progress.cycle,
                            error = %e,
                            "Card count check failed, retrying next interval"
                        );
                    }
                    if e.is_rate_limited() {
                        interval * 2
                    } else {
                        interval
                    }
                }
            },
            ProgressSource::Timed => {
                self.estimate_drops(progress);
                interval
            }
        }
    }

    /// Updates the assumed drops and returns the total idle time they were derived from.
    fn estimate_drops(&self, progress: &mut IdleSession<'_>) -> Duration {
        let resumed = progress.plan.resumed;
        let total = progress.started.elapsed().saturating_add(resumed);
        let drops = self.estimator.drops(total);

        if drops > progress.cards_this_session {
            progress.cards_this_session = drops;
            progress.current_count = progress.plan.initial_count.saturating_add(drops);
            info!(
                app_id = %progress.plan.app_id,
                cycle = progress.cycle,
                drops,
                minute = %format!("{:.1}", self.estimator.drop_minute(drops, resumed)),
                "Assumed card drop"
            );
        }
        debug!(
            cycle = progress.cycle,
            total_minutes = %format!("{:.1}", total.as_secs_f64() / 60.0),
            drops,
            "Estimated progress"
        );
        total
    }

    /// Keeps the session alive for `duration`. Returns false if `shutdown` fired first.
    async fn hold<F>(&mut self, duration: Duration, mut shutdown: Pin<&mut F>) -> bool
    where
        F: Future<Output = ()>,
    {
        let deadline = Instant::now() + duration;
        while Instant::now() < deadline {
            tokio::select! {
                biased;
                () = &mut shutdown => return false,
                () = tokio::time::sleep_until((Instant::now() + TICK).min(deadline)) => {}
            }
            self.session.keep_alive();
        }
        true
    }

    /// Writes or clears the saved progress for the way the run ended.
    ///
    /// In timed mode the drop estimate is refreshed first, so the saved target
    /// and offset describe the same instant.
    fn finish(&self, progress: &mut IdleSession<'_>, outcome: IdleOutcome) {
        match outcome {
            IdleOutcome::Completed => self.clear_record(),
            IdleOutcome::BudgetExhausted | IdleOutcome::Interrupted if self.source.is_timed() => {
                let total = self.estimate_drops(progress);
                self.save_remaining(progress, total);
            }
            IdleOutcome::BudgetExhausted | IdleOutcome::Interrupted => {}
        }
    }

    fn save_remaining(&self, progress: &IdleSession<'_>, total: Duration) {
        let plan = progress.plan;
        let remaining = plan.target.cards_needed(progress.current_count);
        let Some(target) = TargetSpec::remaining(remaining) else {
            info!(app_id = %plan.app_id, "No cards remaining, clearing saved progress");
            self.clear_record();
            return;
        };

        let record = SavedProgress::new(
            plan.app_id,
            target,
            self.estimator.seconds_into_current_drop(total),
        );
        match self.store.save(&record) {
            Ok(()) => info!(
                app_id = %plan.app_id,
                target = %record.target,
                seconds_idled = record.seconds_idled,
                "Saved progress for the next run"
            ),
            Err(e) => warn!(
                app_id = %plan.app_id,
                error = %e,
                "Failed to save progress, the next run will start over"
            ),
        }
    }

    fn clear_record(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear saved progress");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use yasi_fetch::FetchError;
    use yasi_types::ConfigError;

    const APP: AppId = AppId::new(440);

    #[derive(Debug, Default)]
    struct CountingSession {
        opened: Vec<AppId>,
        keep_alives: u64,
        closes: u32,
    }

    impl GameSession for CountingSession {
        fn open(&mut self, app_id: AppId, _game_name: &str) -> std::result::Result<(), SessionError> {
            self.opened.push(app_id);
            Ok(())
        }

        fn keep_alive(&mut self) {
            self.keep_alives += 1;
        }

        fn close(&mut self) {
            self.closes += 1;
        }
    }

    #[derive(Debug)]
    struct BrokenSession;

    impl GameSession for BrokenSession {
        fn open(&mut self, app_id: AppId, _game_name: &str) -> std::result::Result<(), SessionError> {
            Err(SessionError::AlreadyOpen(app_id))
        }

        fn keep_alive(&mut self) {}

        fn close(&mut self) {}
    }

    struct FixedName;

    #[async_trait]
    impl NameSource for FixedName {
        async fn display_name(&self, _app_id: AppId) -> String {
            "Team Fortress 2".to_string()
        }
    }

    #[derive(Debug, Clone, Copy)]
    enum Reading {
        Count(u32),
        Fail,
        RateLimited,
        Private,
    }

    /// Replays readings in order, repeating the last one forever.
    struct ScriptedCards {
        readings: Mutex<VecDeque<Reading>>,
        calls: Mutex<Vec<Instant>>,
    }

    impl ScriptedCards {
        fn new(readings: &[Reading]) -> Arc<Self> {
            Arc::new(Self {
                readings: Mutex::new(readings.iter().copied().collect()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CardSource for ScriptedCards {
        async fn card_count(&self, _app_id: AppId) -> std::result::Result<u32, FetchError> {
            self.calls.lock().unwrap().push(Instant::now());
            let mut readings = self.readings.lock().unwrap();
            let reading = if readings.len() > 1 {
                readings.pop_front().unwrap()
            } else {
                *readings.front().unwrap()
            };
            match reading {
                Reading::Count(count) => Ok(count),
                Reading::Fail => Err(FetchError::Timeout),
                Reading::RateLimited => Err(FetchError::RateLimited),
                Reading::Private => Err(FetchError::Source {
                    message: "This profile is private.".to_string(),
                }),
            }
        }
    }

    fn config(inventory: bool, interval: u64, minutes_per_card: f64) -> IdleConfig {
        IdleConfig {
            steam_id_64: "76561198000000000".to_string(),
            enable_inventory_checking: inventory,
            default_monitoring_interval_seconds: interval,
            max_idle_minutes_per_card: minutes_per_card,
            ..Default::default()
        }
    }

    fn controller<S: GameSession>(
        config: IdleConfig,
        source: ProgressSource,
        dir: &TempDir,
        session: S,
    ) -> IdleController<S> {
        let store = StateStore::new(dir.path().to_path_buf()).unwrap();
        IdleController::new(config, source, Arc::new(FixedName), store, session)
    }

    fn timed(dir: &TempDir) -> IdleController<CountingSession> {
        controller(
            config(false, 60, 30.0),
            ProgressSource::Timed,
            dir,
            CountingSession::default(),
        )
    }

    fn spec(text: &str) -> TargetSpec {
        text.parse().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_target_already_met() {
        let dir = TempDir::new().unwrap();
        let cards = ScriptedCards::new(&[Reading::Count(10)]);
        let mut controller = controller(
            config(true, 60, 30.0),
            ProgressSource::Inventory(cards.clone()),
            &dir,
            CountingSession::default(),
        );

        let plan = controller.prepare(APP, spec("t5")).await.unwrap();
        assert_eq!(plan.target.absolute_count, 5);
        assert!(plan.is_target_met());

        let report = controller.run(&plan, std::future::pending()).await.unwrap();
        assert_eq!(report.outcome, IdleOutcome::Completed);
        assert!(!report.entered_idling);
        assert!(controller.session().opened.is_empty());
        assert_eq!(controller.session().closes, 0);
        assert_eq!(cards.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_target_resolves_from_initial_count() {
        let dir = TempDir::new().unwrap();
        let cards = ScriptedCards::new(&[Reading::Count(3)]);
        let controller = controller(
            config(true, 60, 30.0),
            ProgressSource::Inventory(cards),
            &dir,
            CountingSession::default(),
        );

        let plan = controller.prepare(APP, spec("r2")).await.unwrap();
        assert_eq!(plan.game_name, "Team Fortress 2");
        assert_eq!(plan.initial_count, 3);
        assert_eq!(plan.target.absolute_count, 5);
        assert!(plan.target.is_relative);
        assert!(!plan.is_target_met());
        assert_eq!(plan.cards_to_wait(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inventory_run_tolerates_failures_and_decreases() {
        let dir = TempDir::new().unwrap();
        let cards = ScriptedCards::new(&[
            Reading::Count(3),
            Reading::Fail,
            Reading::Count(4),
            Reading::Count(2),
            Reading::Count(5),
        ]);
        let mut controller = controller(
            config(true, 60, 30.0),
            ProgressSource::Inventory(cards.clone()),
            &dir,
            CountingSession::default(),
        );

        let plan = controller.prepare(APP, spec("r2")).await.unwrap();
        let report = controller.run(&plan, std::future::pending()).await.unwrap();

        assert_eq!(report.outcome, IdleOutcome::Completed);
        assert!(report.entered_idling);
        assert_eq!(report.final_count, 5);
        assert_eq!(report.cards_this_session, 2);
        assert_eq!(report.idled, Duration::from_secs(240));
        assert_eq!(cards.calls(), 5);

        let session = controller.session();
        assert_eq!(session.opened, vec![APP]);
        assert_eq!(session.closes, 1);
        assert!(session.keep_alives >= 240);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_doubles_next_wait() {
        let dir = TempDir::new().unwrap();
        let cards = ScriptedCards::new(&[
            Reading::Count(0),
            Reading::RateLimited,
            Reading::Count(1),
        ]);
        let mut controller = controller(
            config(true, 60, 30.0),
            ProgressSource::Inventory(cards.clone()),
            &dir,
            CountingSession::default(),
        );

        let plan = controller.prepare(APP, spec("r1")).await.unwrap();
        let report = controller.run(&plan, std::future::pending()).await.unwrap();

        assert_eq!(report.outcome, IdleOutcome::Completed);
        assert_eq!(report.idled, Duration::from_secs(180));
        assert_eq!(cards.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_check_keeps_regular_interval() {
        let dir = TempDir::new().unwrap();
        let cards = ScriptedCards::new(&[
            Reading::Count(0),
            Reading::Private,
            Reading::Count(1),
        ]);
        let mut controller = controller(
            config(true, 60, 30.0),
            ProgressSource::Inventory(cards.clone()),
            &dir,
            CountingSession::default(),
        );

        let plan = controller.prepare(APP, spec("r1")).await.unwrap();
        let report = controller.run(&plan, std::future::pending()).await.unwrap();

        assert_eq!(report.outcome, IdleOutcome::Completed);
        assert_eq!(report.idled, Duration::from_secs(120));
        assert_eq!(cards.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inventory_budget_exhaustion() {
        let dir = TempDir::new().unwrap();
        let cards = ScriptedCards::new(&[Reading::Count(3)]);
        let mut controller = controller(
            config(true, 30, 1.0),
            ProgressSource::Inventory(cards),
            &dir,
            CountingSession::default(),
        );

        let plan = controller.prepare(APP, spec("r1")).await.unwrap();
        let report = controller.run(&plan, std::future::pending()).await.unwrap();

        assert_eq!(report.outcome, IdleOutcome::BudgetExhausted);
        assert_eq!(report.final_count, 3);
        assert_eq!(report.idled, Duration::from_secs(65));
        assert_eq!(controller.store().read_record().unwrap(), None);
        assert_eq!(controller.session().closes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_initial_count_is_fatal() {
        let dir = TempDir::new().unwrap();
        let cards = ScriptedCards::new(&[Reading::Fail]);
        let controller = controller(
            config(true, 60, 30.0),
            ProgressSource::Inventory(cards),
            &dir,
            CountingSession::default(),
        );

        assert!(matches!(
            controller.prepare(APP, spec("r2")).await,
            Err(IdleError::InitialCount { app_id, .. }) if app_id == APP
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_target_rejected_in_timed_mode() {
        let dir = TempDir::new().unwrap();
        let controller = timed(&dir);

        assert!(matches!(
            controller.prepare(APP, spec("t5")).await,
            Err(IdleError::Config(ConfigError::TotalTargetWithoutInventory(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_open_failure() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(
            config(false, 60, 30.0),
            ProgressSource::Timed,
            &dir,
            BrokenSession,
        );

        let plan = controller.prepare(APP, spec("r1")).await.unwrap();
        let err = controller.run(&plan, std::future::pending()).await.unwrap_err();

        assert!(err.is_session());
        assert_eq!(controller.store().read_record().unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupted_timed_run_saves_progress() {
        let dir = TempDir::new().unwrap();
        let mut controller = timed(&dir);

        let plan = controller.prepare(APP, spec("r3")).await.unwrap();
        let shutdown = tokio::time::sleep(Duration::from_secs(40 * 60));
        let report = controller.run(&plan, shutdown).await.unwrap();

        assert_eq!(report.outcome, IdleOutcome::Interrupted);
        assert_eq!(report.cards_this_session, 1);
        assert_eq!(report.idled, Duration::from_secs(40 * 60));
        assert_eq!(controller.session().closes, 1);
        assert_eq!(
            controller.store().load(APP),
            Some(SavedProgress::new(APP, spec("r2"), 600))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_between_checks_counts_passed_drop() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(
            config(false, 420, 30.0),
            ProgressSource::Timed,
            &dir,
            CountingSession::default(),
        );

        let plan = controller.prepare(APP, spec("r3")).await.unwrap();
        let shutdown = tokio::time::sleep(Duration::from_secs(33 * 60));
        let report = controller.run(&plan, shutdown).await.unwrap();

        assert_eq!(report.outcome, IdleOutcome::Interrupted);
        assert_eq!(report.cards_this_session, 1);
        assert_eq!(
            controller.store().load(APP),
            Some(SavedProgress::new(APP, spec("r2"), 180))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupted_run_with_target_met_clears_record() {
        let dir = TempDir::new().unwrap();
        let mut controller = timed(&dir);
        controller
            .store()
            .save(&SavedProgress::new(APP, spec("r1"), 1700))
            .unwrap();

        let plan = controller.prepare(APP, spec("r1")).await.unwrap();
        assert_eq!(plan.resumed, Duration::from_secs(1700));
        let shutdown = tokio::time::sleep(Duration::from_secs(110));
        let report = controller.run(&plan, shutdown).await.unwrap();

        assert_eq!(report.outcome, IdleOutcome::Interrupted);
        assert_eq!(report.cards_this_session, 1);
        assert_eq!(controller.store().read_record().unwrap(), None);
        assert_eq!(controller.session().closes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_failure_still_closes_session() {
        let dir = TempDir::new().unwrap();
        let mut controller = timed(&dir);
        std::fs::create_dir(controller.store().record_path().with_extension("txt.tmp")).unwrap();

        let plan = controller.prepare(APP, spec("r3")).await.unwrap();
        let shutdown = tokio::time::sleep(Duration::from_secs(40 * 60));
        let report = controller.run(&plan, shutdown).await.unwrap();

        assert_eq!(report.outcome, IdleOutcome::Interrupted);
        assert_eq!(report.cards_this_session, 1);
        assert_eq!(controller.store().read_record().unwrap(), None);
        assert_eq!(controller.session().opened, vec![APP]);
        assert_eq!(controller.session().closes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_saved_offset_starts_over() {
        let dir = TempDir::new().unwrap();
        let mut controller = timed(&dir);
        std::fs::write(
            controller.store().record_path(),
            "440 r1 18446744073709551615\n",
        )
        .unwrap();

        let plan = controller.prepare(APP, spec("r3")).await.unwrap();
        assert_eq!(plan.target_spec, spec("r3"));
        assert_eq!(plan.resumed, Duration::ZERO);

        let shutdown = tokio::time::sleep(Duration::from_secs(10 * 60));
        let report = controller.run(&plan, shutdown).await.unwrap();

        assert_eq!(report.outcome, IdleOutcome::Interrupted);
        assert_eq!(
            controller.store().load(APP),
            Some(SavedProgress::new(APP, spec("r3"), 600))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_resumed_run_matches_uninterrupted_run() {
        let dir = TempDir::new().unwrap();

        let mut first = timed(&dir);
        let plan = first.prepare(APP, spec("r3")).await.unwrap();
        let interrupted = first
            .run(&plan, tokio::time::sleep(Duration::from_secs(40 * 60)))
            .await
            .unwrap();

        let mut second = timed(&dir);
        let plan = second.prepare(APP, spec("r3")).await.unwrap();
        assert_eq!(plan.target_spec, spec("r2"));
        assert_eq!(plan.resumed, Duration::from_secs(600));
        let resumed = second.run(&plan, std::future::pending()).await.unwrap();

        assert_eq!(resumed.outcome, IdleOutcome::Completed);
        assert_eq!(resumed.cards_this_session, 2);
        assert_eq!(second.store().read_record().unwrap(), None);

        let fresh_dir = TempDir::new().unwrap();
        let mut uninterrupted = timed(&fresh_dir);
        let plan = uninterrupted.prepare(APP, spec("r3")).await.unwrap();
        let full = uninterrupted.run(&plan, std::future::pending()).await.unwrap();

        assert_eq!(full.outcome, IdleOutcome::Completed);
        assert_eq!(
            interrupted.cards_this_session + resumed.cards_this_session,
            full.cards_this_session
        );
        assert_eq!(interrupted.idled + resumed.idled, full.idled);
        assert_eq!(full.idled, Duration::from_secs(90 * 60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_budget_exhaustion_clears_finished_record() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(
            config(false, 2000, 30.0),
            ProgressSource::Timed,
            &dir,
            CountingSession::default(),
        );
        controller
            .store()
            .save(&SavedProgress::new(APP, spec("r2"), 600))
            .unwrap();

        let plan = controller.prepare(APP, spec("r2")).await.unwrap();
        let report = controller.run(&plan, std::future::pending()).await.unwrap();

        assert_eq!(report.outcome, IdleOutcome::BudgetExhausted);
        assert_eq!(report.cards_this_session, 2);
        assert_eq!(report.idled, Duration::from_secs(3605));
        assert_eq!(controller.store().read_record().unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_saved_record_for_other_game_is_ignored() {
        let dir = TempDir::new().unwrap();
        let controller = timed(&dir);
        controller
            .store()
            .save(&SavedProgress::new(AppId::new(570), spec("r1"), 100))
            .unwrap();

        let plan = controller.prepare(APP, spec("r3")).await.unwrap();
        assert_eq!(plan.target_spec, spec("r3"));
        assert_eq!(plan.resumed, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_check() {
        let dir = TempDir::new().unwrap();
        let mut controller = timed(&dir);
        let start = Instant::now();

        controller
            .fast_check(APP, Duration::from_secs(5), std::future::pending())
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::from_secs(5));
        let session = controller.session();
        assert_eq!(session.opened, vec![APP]);
        assert_eq!(session.keep_alives, 5);
        assert_eq!(session.closes, 1);
    }
}
