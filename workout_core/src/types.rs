//! Core domain types for the step workout system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and workout days (the program catalog)
//! - Session phases
//! - Session summaries handed to persistence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Catalog Types
// ============================================================================

/// A single exercise within a workout day (e.g., "Dumbbell Press, 4 × 12-15")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub name: String,
    /// Display text such as "4 × 12-15" or "3 × 30 sec"
    pub sets_label: String,
    pub equipment: Option<String>,
    pub description: Option<String>,
    /// Calorie estimate for one set, as `(min, max)`
    pub calories_per_set: (u32, u32),
    /// Canonical set count. The label is only parsed when this is absent.
    pub total_sets: Option<u32>,
    #[serde(default)]
    pub is_timed: bool,
    pub duration_seconds: Option<u32>,
    pub video_ref: Option<String>,
}

impl Exercise {
    /// Number of sets prescribed for this exercise
    ///
    /// Falls back to parsing the label, then to a single set.
    pub fn set_count(&self) -> u32 {
        match self.total_sets {
            Some(n) if n > 0 => n,
            _ => crate::sets::parse_set_count(&self.sets_label).unwrap_or_else(|| {
                tracing::debug!(
                    "No set count for '{}' (label {:?}), defaulting to 1",
                    self.name,
                    self.sets_label
                );
                1
            }),
        }
    }
}

/// One day of the training program
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutDay {
    pub title: String,
    pub exercises: Vec<Exercise>,
}

/// The ordered list of workout days
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Catalog {
    pub days: Vec<WorkoutDay>,
}

// ============================================================================
// Session Types
// ============================================================================

/// Phase of a running session
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// User is performing the current set
    Active,
    /// Skippable pause between two sets of the same exercise
    Resting,
    /// Mandatory pause before the next exercise
    TransitioningExercise,
    /// Terminal
    Complete,
}

/// Per-exercise line of a session summary
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseSummary {
    pub name: String,
    pub completed_sets: u32,
    /// Best-effort estimate in kg, see [`crate::summary`]
    pub weight: f64,
}

/// Record of a finished session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub id: Uuid,
    pub title: String,
    pub day_index: usize,
    pub date: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub duration_seconds: u32,
    pub fat_burner: bool,
    pub total_calories: u32,
    pub exercise_count: usize,
    pub estimated_weight_lifted: f64,
    pub per_exercise: Vec<ExerciseSummary>,
}
