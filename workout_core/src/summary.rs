//! Session summary assembly.
//!
//! The weight figures are a lossy, decorative estimate: the load is the
//! first `<number> kg` found in the equipment text and the rep count is
//! the first integer after the multiplication sign in the set label.
//! Timed exercises and anything unparsable count as zero.

use crate::sets::{parse_equipment_kg, parse_rep_estimate};
use crate::{Exercise, ExerciseSummary, SessionSummary, WorkoutDay};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Estimated kilograms moved for `completed_sets` sets of `exercise`
pub fn estimate_exercise_weight(exercise: &Exercise, completed_sets: u32) -> f64 {
    if exercise.is_timed || completed_sets == 0 {
        return 0.0;
    }

    let load = exercise
        .equipment
        .as_deref()
        .and_then(parse_equipment_kg)
        .unwrap_or(0.0);
    let reps = parse_rep_estimate(&exercise.sets_label).unwrap_or(0);

    load * completed_sets as f64 * reps as f64
}

/// Build the summary for a finished session
///
/// `completed_sets[i]` is the number of sets finished for exercise `i`.
pub fn build_summary(
    day_index: usize,
    day: &WorkoutDay,
    completed_sets: &[u32],
    total_calories: u32,
    fat_burner: bool,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
) -> SessionSummary {
    let per_exercise: Vec<ExerciseSummary> = day
        .exercises
        .iter()
        .enumerate()
        .map(|(i, exercise)| {
            let sets = completed_sets.get(i).copied().unwrap_or(0);
            ExerciseSummary {
                name: exercise.name.clone(),
                completed_sets: sets,
                weight: estimate_exercise_weight(exercise, sets),
            }
        })
        .collect();

    let estimated_weight_lifted = per_exercise.iter().map(|e| e.weight).sum();
    let duration_seconds = (completed_at - started_at).num_seconds().max(0) as u32;

    SessionSummary {
        id: Uuid::new_v4(),
        title: day.title.clone(),
        day_index,
        date: completed_at,
        started_at,
        duration_seconds,
        fat_burner,
        total_calories,
        exercise_count: day.exercises.len(),
        estimated_weight_lifted,
        per_exercise,
    }
}
