//! Calorie accrual and fat-burner adjustments.
//!
//! A single [`CaloriePolicy`] is chosen per session and applied to every
//! set. Fat-burner mode scales calories, halves set counts and shortens
//! rest pauses.

use serde::{Deserialize, Serialize};

/// Calorie multiplier applied in fat-burner mode unless configured otherwise
pub const DEFAULT_FAT_BURNER_MULTIPLIER: f64 = 1.5;

/// How a per-set `(min, max)` calorie range becomes a single value
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaloriePolicy {
    /// Midpoint of the range, rounded half-up
    #[default]
    Average,
    /// Upper bound
    Max,
    /// Lower bound
    Min,
}

impl CaloriePolicy {
    /// Calories credited for one set under this policy
    pub fn per_set(self, (min, max): (u32, u32)) -> u32 {
        match self {
            CaloriePolicy::Average => ((min as f64 + max as f64) / 2.0).round() as u32,
            CaloriePolicy::Max => min.max(max),
            CaloriePolicy::Min => min.min(max),
        }
    }
}

/// Scale a per-set value by the fat-burner multiplier (rounded half-up)
pub fn fat_burner_calories(calories: u32, multiplier: f64) -> u32 {
    (calories as f64 * multiplier).round().max(0.0) as u32
}

/// Set count under fat-burner mode: half, rounded down, at least one
pub fn fat_burner_sets(total_sets: u32) -> u32 {
    (total_sets / 2).max(1)
}

/// Rest pause under fat-burner mode: one third shorter, at least one second
pub fn fat_burner_rest(rest_seconds: u32) -> u32 {
    (rest_seconds - rest_seconds / 3).max(1)
}
