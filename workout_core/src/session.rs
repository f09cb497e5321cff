//! Step-by-step workout session state machine.
//!
//! A session walks one workout day set by set:
//! - `Active`: the user performs the current set
//! - `Resting`: skippable pause before the next set of the same exercise
//! - `TransitioningExercise`: mandatory pause before the next exercise
//! - `Complete`: terminal, the summary is available
//!
//! Index changes are applied only when a pause ends, so the exercise and
//! set indices always describe the same (exercise, set) pair. Exactly one
//! [`Countdown`] is owned by the session and it is re-armed or cancelled
//! on every transition.

use crate::calories::{fat_burner_calories, fat_burner_rest, fat_burner_sets};
use crate::catalog::CatalogProvider;
use crate::timer::{Countdown, TimerEvent, DEFAULT_WARNING_THRESHOLDS};
use crate::{
    CaloriePolicy, Config, Error, Exercise, Result, SessionPhase, SessionSummary, WorkoutDay,
};
use chrono::{DateTime, Utc};

/// Parameters fixed for the lifetime of a session
#[derive(Clone, Debug, PartialEq)]
pub struct SessionOptions {
    pub calorie_policy: CaloriePolicy,
    pub fat_burner: bool,
    pub fat_burner_multiplier: f64,
    pub rest_seconds: u32,
    pub transition_seconds: u32,
    /// Used for timed exercises that carry no duration
    pub default_timed_seconds: u32,
    pub warning_thresholds: Vec<u32>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            calorie_policy: CaloriePolicy::Average,
            fat_burner: false,
            fat_burner_multiplier: crate::calories::DEFAULT_FAT_BURNER_MULTIPLIER,
            rest_seconds: 30,
            transition_seconds: 30,
            default_timed_seconds: 60,
            warning_thresholds: DEFAULT_WARNING_THRESHOLDS.to_vec(),
        }
    }
}

impl SessionOptions {
    /// Options from user configuration, with the fat-burner choice made now
    pub fn from_config(config: &Config, fat_burner: bool) -> Self {
        Self {
            calorie_policy: config.session.calorie_policy,
            fat_burner,
            fat_burner_multiplier: config.fat_burner.calorie_multiplier,
            rest_seconds: config.session.rest_seconds,
            transition_seconds: config.session.transition_seconds,
            default_timed_seconds: config.session.default_timed_seconds,
            warning_thresholds: config.session.warning_thresholds.clone(),
        }
    }

    fn pause_seconds(&self, base: u32) -> u32 {
        if self.fat_burner {
            fat_burner_rest(base)
        } else {
            base
        }
    }
}

/// Fire-and-forget notifications for the host (haptics, sound, animation)
pub trait SessionHooks {
    fn on_timer_warning(&mut self, _seconds_remaining: u32) {}
    fn on_set_complete(&mut self, _calories_earned: u32) {}
}

/// Hooks that do nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl SessionHooks for NoHooks {}

/// Result of feeding one input to the session
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// Input not valid in the current phase; state unchanged
    Ignored,
    /// A countdown second elapsed
    Tick { remaining: u32 },
    /// A countdown second elapsed and hit a warning threshold
    Warning { remaining: u32 },
    /// Set done, rest pause started
    Resting { calories: u32, seconds: u32 },
    /// Last set of an exercise done, transition pause started
    Transitioning { calories: u32, seconds: u32 },
    /// Last set of the day done
    Completed { calories: u32 },
    /// Pause over, back to `Active` on the given set
    Resumed {
        exercise_index: usize,
        set_index: u32,
    },
}

/// How the session ended, for the host's navigation
#[derive(Clone, Debug, PartialEq)]
pub enum SessionOutcome {
    /// Workout completed and the summary was dismissed
    Finished(SessionSummary),
    /// User left before completion
    Cancelled {
        completed_sets: u32,
        accumulated_calories: u32,
    },
}

/// A running workout session
#[derive(Debug)]
pub struct WorkoutSession<H = NoHooks> {
    day_index: usize,
    day: WorkoutDay,
    set_counts: Vec<u32>,
    exercise_index: usize,
    set_index: u32,
    phase: SessionPhase,
    accumulated_calories: u32,
    completed_sets: Vec<u32>,
    options: SessionOptions,
    countdown: Countdown,
    started_at: DateTime<Utc>,
    summary: Option<SessionSummary>,
    hooks: H,
}

impl WorkoutSession<NoHooks> {
    /// Start a session on `day_index` of `catalog`
    ///
    /// Fat-burner mode is taken from `options` and cannot change afterwards.
    pub fn start<C>(catalog: &C, day_index: usize, options: SessionOptions) -> Result<Self>
    where
        C: CatalogProvider + ?Sized,
    {
        let day = catalog
            .get_day(day_index)
            .ok_or(Error::UnknownDay {
                index: day_index,
                count: catalog.day_count(),
            })?
            .clone();

        if day.exercises.is_empty() {
            return Err(Error::CatalogValidation(format!(
                "Day '{}' has no exercises",
                day.title
            )));
        }

        let set_counts: Vec<u32> = day
            .exercises
            .iter()
            .map(|exercise| {
                let sets = exercise.set_count();
                if options.fat_burner {
                    fat_burner_sets(sets)
                } else {
                    sets
                }
            })
            .collect();

        tracing::info!(
            "Starting '{}' ({} exercises, {} sets, fat burner: {})",
            day.title,
            day.exercises.len(),
            saturating_sum(&set_counts),
            options.fat_burner
        );

        let mut session = Self {
            day_index,
            completed_sets: vec![0; day.exercises.len()],
            day,
            set_counts,
            exercise_index: 0,
            set_index: 0,
            phase: SessionPhase::Active,
            accumulated_calories: 0,
            countdown: Countdown::new(0).with_warnings(&options.warning_thresholds),
            options,
            started_at: Utc::now(),
            summary: None,
            hooks: NoHooks,
        };
        session.enter_active();
        Ok(session)
    }
}

impl<H: SessionHooks> WorkoutSession<H> {
    /// Attach host hooks
    pub fn with_hooks<H2: SessionHooks>(self, hooks: H2) -> WorkoutSession<H2> {
        WorkoutSession {
            day_index: self.day_index,
            day: self.day,
            set_counts: self.set_counts,
            exercise_index: self.exercise_index,
            set_index: self.set_index,
            phase: self.phase,
            accumulated_calories: self.accumulated_calories,
            completed_sets: self.completed_sets,
            options: self.options,
            countdown: self.countdown,
            started_at: self.started_at,
            summary: self.summary,
            hooks,
        }
    }

    /// User tapped "done" on the current set
    ///
    /// Ignored outside `Active` and for timed exercises, whose set ends when
    /// their countdown expires.
    pub fn complete_set(&mut self) -> SessionEvent {
        if self.phase != SessionPhase::Active || self.current_exercise().is_timed {
            return SessionEvent::Ignored;
        }
        self.finish_set()
    }

    /// User asked to skip the current pause
    ///
    /// Only rest between sets is skippable; the pause before a new exercise
    /// is not, and skipping it leaves the session unchanged.
    pub fn skip_rest(&mut self) -> SessionEvent {
        if self.phase != SessionPhase::Resting {
            tracing::debug!("Skip ignored in phase {:?}", self.phase);
            return SessionEvent::Ignored;
        }
        tracing::debug!("Rest skipped");
        self.end_pause()
    }

    /// One second elapsed
    pub fn tick(&mut self) -> SessionEvent {
        match self.countdown.tick() {
            None => SessionEvent::Ignored,
            Some(TimerEvent::Tick { remaining }) => SessionEvent::Tick { remaining },
            Some(TimerEvent::Warning { remaining }) => {
                self.hooks.on_timer_warning(remaining);
                SessionEvent::Warning { remaining }
            }
            Some(TimerEvent::Completed) => match self.phase {
                SessionPhase::Active => self.finish_set(),
                SessionPhase::Resting | SessionPhase::TransitioningExercise => self.end_pause(),
                SessionPhase::Complete => SessionEvent::Ignored,
            },
        }
    }

    /// Close the session and report how it ended
    ///
    /// Dropping the session also drops its countdown, so nothing can fire
    /// afterwards.
    pub fn close(self) -> SessionOutcome {
        match self.summary {
            Some(summary) => SessionOutcome::Finished(summary),
            None => {
                tracing::info!("Session '{}' cancelled", self.day.title);
                SessionOutcome::Cancelled {
                    completed_sets: saturating_sum(&self.completed_sets),
                    accumulated_calories: self.accumulated_calories,
                }
            }
        }
    }

    fn finish_set(&mut self) -> SessionEvent {
        self.countdown.cancel();

        let exercise = &self.day.exercises[self.exercise_index];
        let mut calories = self.options.calorie_policy.per_set(exercise.calories_per_set);
        if self.options.fat_burner {
            calories = fat_burner_calories(calories, self.options.fat_burner_multiplier);
        }

        self.accumulated_calories = self.accumulated_calories.saturating_add(calories);
        self.completed_sets[self.exercise_index] += 1;
        self.hooks.on_set_complete(calories);

        tracing::debug!(
            "Completed set {}/{} of '{}' (+{} kcal, total {})",
            self.set_index + 1,
            self.current_set_count(),
            exercise.name,
            calories,
            self.accumulated_calories
        );

        let is_last_set = self.set_index + 1 >= self.current_set_count();
        let is_last_exercise = self.exercise_index + 1 >= self.day.exercises.len();

        if !is_last_set {
            let seconds = self.options.pause_seconds(self.options.rest_seconds);
            self.phase = SessionPhase::Resting;
            self.countdown.start(seconds);
            SessionEvent::Resting { calories, seconds }
        } else if !is_last_exercise {
            let seconds = self.options.pause_seconds(self.options.transition_seconds);
            self.phase = SessionPhase::TransitioningExercise;
            self.countdown.start(seconds);
            SessionEvent::Transitioning { calories, seconds }
        } else {
            self.phase = SessionPhase::Complete;
            let summary = crate::summary::build_summary(
                self.day_index,
                &self.day,
                &self.completed_sets,
                self.accumulated_calories,
                self.options.fat_burner,
                self.started_at,
                Utc::now(),
            );
            tracing::info!(
                "Workout '{}' complete: {} kcal, ~{:.0} kg lifted",
                summary.title,
                summary.total_calories,
                summary.estimated_weight_lifted
            );
            self.summary = Some(summary);
            SessionEvent::Completed { calories }
        }
    }

    fn end_pause(&mut self) -> SessionEvent {
        self.countdown.cancel();

        match self.phase {
            SessionPhase::Resting => {
                self.set_index += 1;
            }
            SessionPhase::TransitioningExercise => {
                self.exercise_index += 1;
                self.set_index = 0;
            }
            SessionPhase::Active | SessionPhase::Complete => return SessionEvent::Ignored,
        }

        self.phase = SessionPhase::Active;
        self.enter_active();

        SessionEvent::Resumed {
            exercise_index: self.exercise_index,
            set_index: self.set_index,
        }
    }

    fn enter_active(&mut self) {
        let exercise = self.current_exercise();
        if exercise.is_timed {
            let seconds = exercise
                .duration_seconds
                .filter(|s| *s > 0)
                .unwrap_or(self.options.default_timed_seconds);
            self.countdown.start(seconds);
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn day_index(&self) -> usize {
        self.day_index
    }

    pub fn day(&self) -> &WorkoutDay {
        &self.day
    }

    pub fn exercise_index(&self) -> usize {
        self.exercise_index
    }

    pub fn set_index(&self) -> u32 {
        self.set_index
    }

    pub fn current_exercise(&self) -> &Exercise {
        &self.day.exercises[self.exercise_index]
    }

    /// Effective set count of the current exercise
    pub fn current_set_count(&self) -> u32 {
        self.set_counts[self.exercise_index]
    }

    /// Effective set counts for every exercise, fixed at start
    pub fn set_counts(&self) -> &[u32] {
        &self.set_counts
    }

    /// Total sets the day requires under this session's regime
    pub fn total_sets(&self) -> u32 {
        saturating_sum(&self.set_counts)
    }

    pub fn completed_set_total(&self) -> u32 {
        saturating_sum(&self.completed_sets)
    }

    pub fn accumulated_calories(&self) -> u32 {
        self.accumulated_calories
    }

    pub fn fat_burner(&self) -> bool {
        self.options.fat_burner
    }

    /// Seconds left on the armed countdown, if any
    pub fn timer_remaining(&self) -> Option<u32> {
        self.countdown
            .is_running()
            .then(|| self.countdown.remaining())
    }

    /// Available once the session is `Complete`
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }
}

/// Totals clamp at `u32::MAX` instead of overflowing
fn saturating_sum(values: &[u32]) -> u32 {
    values.iter().fold(0u32, |acc, v| acc.saturating_add(*v))
}
