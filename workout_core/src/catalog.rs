//! Default training program and catalog access.
//!
//! This module provides the built-in seven-day program and the
//! [`CatalogProvider`] seam through which sessions read workout days.

use crate::types::*;
use once_cell::sync::Lazy;

/// Read access to workout days
///
/// Sessions receive a provider explicitly; nothing reads the program from
/// ambient storage.
pub trait CatalogProvider {
    fn get_day(&self, index: usize) -> Option<&WorkoutDay>;
    fn day_count(&self) -> usize;
}

impl CatalogProvider for Catalog {
    fn get_day(&self, index: usize) -> Option<&WorkoutDay> {
        self.days.get(index)
    }

    fn day_count(&self) -> usize {
        self.days.len()
    }
}

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

fn lift(
    name: &str,
    sets_label: &str,
    equipment: &str,
    description: &str,
    calories: (u32, u32),
    total_sets: u32,
) -> Exercise {
    Exercise {
        name: name.into(),
        sets_label: sets_label.into(),
        equipment: Some(equipment.into()),
        description: Some(description.into()),
        calories_per_set: calories,
        total_sets: Some(total_sets),
        is_timed: false,
        duration_seconds: None,
        video_ref: None,
    }
}

fn timed(
    name: &str,
    sets_label: &str,
    equipment: &str,
    description: &str,
    calories: (u32, u32),
    total_sets: u32,
    duration_seconds: u32,
) -> Exercise {
    Exercise {
        is_timed: true,
        duration_seconds: Some(duration_seconds),
        ..lift(name, sets_label, equipment, description, calories, total_sets)
    }
}

/// Builds the built-in push/pull/legs program
///
/// **Note**: prefer `get_default_catalog()` which returns a cached
/// reference. This function is retained for tests and custom plans.
pub fn build_default_catalog() -> Catalog {
    let days = vec![
        // ====================================================================
        // Day 1: Push
        // ====================================================================
        WorkoutDay {
            title: "DAY 1: PUSH (Chest, Shoulders, Triceps)".into(),
            exercises: vec![
                lift(
                    "Dumbbell Press",
                    "4 × 12-15",
                    "Dumbbells 15 kg",
                    "Seated or lying, press the dumbbells up with elbows in line with the shoulders.",
                    (10, 12),
                    4,
                ),
                lift(
                    "Lateral Raises",
                    "4 × 12",
                    "Dumbbells 10 kg",
                    "Standing, raise the dumbbells sideways to shoulder height.",
                    (6, 8),
                    4,
                ),
                lift(
                    "Incline Dumbbell Press",
                    "3 × 12",
                    "Dumbbells 15 kg",
                    "On a 30-45° incline bench, press the dumbbells up.",
                    (8, 10),
                    3,
                ),
                lift(
                    "Front Raises",
                    "3 × 12",
                    "Dumbbells 10 kg",
                    "Standing, raise the dumbbells in front of you to shoulder height.",
                    (6, 8),
                    3,
                ),
                lift(
                    "Triceps Extensions",
                    "3 × 15",
                    "Dumbbell 15 kg (two hands)",
                    "Dumbbell held overhead with both hands, bend then straighten the elbows.",
                    (8, 10),
                    3,
                ),
                lift(
                    "Weighted Dips",
                    "3 × max",
                    "Weighted vest 10 kg",
                    "Hands on a bench, lower the body by bending the elbows, then push back up.",
                    (10, 12),
                    3,
                ),
                lift(
                    "Weighted Crunches",
                    "3 × 25",
                    "Dumbbell 10 kg",
                    "Lying on your back, dumbbell on the chest, lift the shoulders off the floor.",
                    (6, 8),
                    3,
                ),
                timed(
                    "Weighted Plank",
                    "3 × 30-60 sec",
                    "Weighted vest 10 kg",
                    "On forearms and toes, hold the body in a straight line.",
                    (4, 6),
                    3,
                    60,
                ),
            ],
        },
        // ====================================================================
        // Day 2: Pull
        // ====================================================================
        WorkoutDay {
            title: "DAY 2: PULL (Back, Biceps)".into(),
            exercises: vec![
                lift(
                    "One-Arm Dumbbell Row",
                    "4 × 12",
                    "Dumbbell 15 kg",
                    "Knee and hand on a bench, pull the dumbbell to the hip.",
                    (8, 10),
                    4,
                ),
                lift(
                    "Barbell Row",
                    "4 × 10-12",
                    "Barbell 30 kg",
                    "Hinged forward with a flat back, pull the bar to the stomach.",
                    (10, 13),
                    4,
                ),
                lift(
                    "Two-Arm Dumbbell Row",
                    "3 × 12",
                    "Dumbbells 10 kg",
                    "Hinged forward, pull the dumbbells to the hips.",
                    (8, 10),
                    3,
                ),
                lift(
                    "Dumbbell Biceps Curl",
                    "3 × 12",
                    "Dumbbells 15 kg",
                    "Standing, curl the dumbbells towards the shoulders.",
                    (6, 8),
                    3,
                ),
                lift(
                    "Hammer Curl",
                    "3 × 12",
                    "Dumbbells 15 kg",
                    "Like the biceps curl with palms facing each other.",
                    (6, 8),
                    3,
                ),
                lift(
                    "Shrugs",
                    "3 × 15",
                    "Dumbbells 15 kg or barbell 30 kg",
                    "Standing, lift the shoulders towards the ears without bending the elbows.",
                    (5, 7),
                    3,
                ),
                timed(
                    "Weighted Mountain Climbers",
                    "3 × 30 sec",
                    "Weighted vest 10 kg",
                    "In a plank, drive the knees to the chest alternately at pace.",
                    (12, 15),
                    3,
                    30,
                ),
                lift(
                    "Russian Twists",
                    "3 × 20",
                    "Dumbbell 10 kg",
                    "Seated, feet raised, rotate the dumbbell from side to side.",
                    (8, 10),
                    3,
                ),
            ],
        },
        // ====================================================================
        // Day 3: Legs
        // ====================================================================
        WorkoutDay {
            title: "DAY 3: LEGS (Legs, Glutes)".into(),
            exercises: vec![
                lift(
                    "Squats",
                    "4 × 15",
                    "Barbell 30 kg",
                    "Feet shoulder-width apart, sit back and down, then stand up.",
                    (12, 15),
                    4,
                ),
                lift(
                    "Alternating Forward Lunges",
                    "4 × 12/leg",
                    "Dumbbells 15 kg",
                    "Step forward and lower the back knee towards the floor, alternating legs.",
                    (14, 18),
                    4,
                ),
                lift(
                    "Romanian Deadlift",
                    "3 × 12",
                    "Barbell 30 kg",
                    "Knees soft, hinge at the hips and lower the bar along the legs.",
                    (10, 13),
                    3,
                ),
                lift(
                    "Step-ups",
                    "3 × 15/leg",
                    "Dumbbells 10 kg",
                    "Step up onto a bench, drive through the front heel.",
                    (10, 12),
                    3,
                ),
                lift(
                    "Hip Thrust",
                    "3 × 15",
                    "Barbell 30 kg",
                    "Upper back on a bench, bar on the hips, drive the hips up.",
                    (12, 15),
                    3,
                ),
                lift(
                    "Standing Calf Raises",
                    "4 × 20",
                    "Dumbbells 15 kg",
                    "Rise onto the toes, pause, lower slowly.",
                    (8, 10),
                    4,
                ),
                lift(
                    "Weighted Reverse Crunches",
                    "3 × 15",
                    "Weighted vest 10 kg",
                    "Lying on your back, bring the knees to the chest and lift the hips.",
                    (8, 10),
                    3,
                ),
                lift(
                    "Leg Raises",
                    "3 × 15",
                    "Ankle weights (optional)",
                    "Lying on your back, raise straight legs to vertical.",
                    (6, 8),
                    3,
                ),
            ],
        },
        // ====================================================================
        // Day 4: Push variation
        // ====================================================================
        WorkoutDay {
            title: "DAY 4: PUSH (Variation)".into(),
            exercises: vec![
                lift(
                    "Weighted Push-ups",
                    "4 × max",
                    "Weighted vest 10 kg",
                    "Body straight, lower the chest to the floor and push back up.",
                    (10, 12),
                    4,
                ),
                lift(
                    "Arnold Press",
                    "4 × 12",
                    "Dumbbells 10 kg",
                    "Press overhead while rotating the palms from facing you to facing forward.",
                    (8, 10),
                    4,
                ),
                lift(
                    "Dumbbell Flyes",
                    "3 × 15",
                    "Dumbbells 10 kg",
                    "Lying on a bench, open the arms wide then bring the dumbbells together.",
                    (6, 8),
                    3,
                ),
                lift(
                    "Bent-over Lateral Raises",
                    "3 × 12",
                    "Dumbbells 10 kg",
                    "Hinged forward, raise the dumbbells out to the sides.",
                    (6, 8),
                    3,
                ),
                lift(
                    "Overhead Triceps Extensions",
                    "3 × 15",
                    "Dumbbell 15 kg (two hands)",
                    "Dumbbell behind the head, straighten the arms overhead.",
                    (8, 10),
                    3,
                ),
                lift(
                    "Skull Crushers",
                    "3 × 15",
                    "Barbell 30 kg",
                    "Lying on a bench, lower the bar to the forehead and extend.",
                    (8, 10),
                    3,
                ),
                lift(
                    "Oblique Crunches",
                    "3 × 25",
                    "Dumbbell 10 kg",
                    "Lying on your side, crunch the ribs towards the hip.",
                    (6, 8),
                    3,
                ),
                timed(
                    "Hollow Hold",
                    "3 × 30 sec",
                    "Weighted vest 10 kg",
                    "Lower back pressed to the floor, hold arms and legs just off the ground.",
                    (4, 6),
                    3,
                    30,
                ),
            ],
        },
        // ====================================================================
        // Day 5: Pull variation
        // ====================================================================
        WorkoutDay {
            title: "DAY 5: PULL (Variation)".into(),
            exercises: vec![
                lift(
                    "Deadlift",
                    "4 × 10",
                    "Barbell 30 kg",
                    "Flat back, drive through the floor to stand with the bar.",
                    (12, 15),
                    4,
                ),
                lift(
                    "Dumbbell Pull-over",
                    "3 × 15",
                    "Dumbbell 15 kg",
                    "Lying across a bench, lower the dumbbell behind the head and pull it back over.",
                    (8, 10),
                    3,
                ),
                lift(
                    "Good Morning",
                    "3 × 15",
                    "Barbell 30 kg",
                    "Bar on the back, hinge forward with a flat back and return.",
                    (10, 13),
                    3,
                ),
                lift(
                    "Concentration Curl",
                    "3 × 12",
                    "Dumbbell 15 kg",
                    "Seated, elbow braced on the thigh, curl the dumbbell.",
                    (6, 8),
                    3,
                ),
                // Label carries no multiplication sign; the structured count is authoritative
                lift(
                    "21s Curl",
                    "3 series",
                    "Barbell 30 kg",
                    "Seven lower half reps, seven upper half reps, seven full reps.",
                    (8, 10),
                    3,
                ),
                lift(
                    "Reverse Fly",
                    "3 × 15",
                    "Dumbbells 10 kg",
                    "Hinged forward, open the arms to squeeze the shoulder blades.",
                    (6, 8),
                    3,
                ),
                timed(
                    "Side Plank",
                    "3 × 30 sec/side",
                    "Weighted vest 10 kg",
                    "On one forearm, hold the body in a straight line.",
                    (4, 6),
                    3,
                    30,
                ),
                lift(
                    "Bicycle Crunch",
                    "3 × 20",
                    "Weighted (optional)",
                    "Bring opposite elbow and knee together, alternating sides.",
                    (8, 10),
                    3,
                ),
            ],
        },
        // ====================================================================
        // Day 6: Legs variation
        // ====================================================================
        WorkoutDay {
            title: "DAY 6: LEGS (Variation)".into(),
            exercises: vec![
                lift(
                    "Sumo Squats",
                    "4 × 15",
                    "Barbell 30 kg",
                    "Wide stance, toes out, squat down between the heels.",
                    (14, 18),
                    4,
                ),
                lift(
                    "Lateral Lunges",
                    "3 × 12/side",
                    "Dumbbells 15 kg",
                    "Step wide to one side and sit into that hip.",
                    (12, 15),
                    3,
                ),
                lift(
                    "Weighted Glute Bridge",
                    "4 × 15",
                    "Barbell 30 kg",
                    "Lying on your back, bar on the hips, drive the hips up.",
                    (12, 15),
                    4,
                ),
                lift(
                    "Hip Extensions",
                    "3 × 15/leg",
                    "Dumbbell 10 kg (behind the knee)",
                    "On all fours, drive one heel towards the ceiling.",
                    (10, 12),
                    3,
                ),
                lift(
                    "Bulgarian Split Squats",
                    "3 × 12/leg",
                    "Dumbbells 10 kg",
                    "Rear foot on a bench, lower the back knee towards the floor.",
                    (12, 15),
                    3,
                ),
                lift(
                    "Seated Calf Raises",
                    "4 × 20",
                    "Barbell 30 kg on the knees",
                    "Seated, raise the heels against the load on the knees.",
                    (8, 10),
                    4,
                ),
                lift(
                    "Weighted Crunches",
                    "3 × 25",
                    "Dumbbell 10 kg",
                    "Lying on your back, dumbbell on the chest, lift the shoulders off the floor.",
                    (6, 8),
                    3,
                ),
                lift(
                    "Dead Bug",
                    "3 × 10/side",
                    "Weighted with a 10 kg dumbbell",
                    "Lying on your back, extend opposite arm and leg while bracing the core.",
                    (6, 8),
                    3,
                ),
            ],
        },
        // ====================================================================
        // Day 7: Cardio & recovery
        // ====================================================================
        WorkoutDay {
            title: "DAY 7: CARDIO & RECOVERY".into(),
            exercises: vec![
                timed(
                    "Cycling",
                    "30-45 min at moderate intensity",
                    "Weighted vest 10 kg (optional)",
                    "Hold the heart rate at 60-70% of maximum.",
                    (20, 25),
                    1,
                    2700,
                ),
                timed(
                    "Cardio of Choice",
                    "20-30 min",
                    "Weighted vest 10 kg (optional)",
                    "Extra activity to raise weekly energy expenditure.",
                    (15, 20),
                    1,
                    1800,
                ),
                timed(
                    "Full Stretching",
                    "15-20 min",
                    "None",
                    "Improves flexibility and reduces soreness.",
                    (4, 6),
                    1,
                    900,
                ),
                timed(
                    "Joint Mobility",
                    "10 min",
                    "None",
                    "Maintains range of motion in the joints.",
                    (2, 4),
                    1,
                    600,
                ),
            ],
        },
    ];

    Catalog { days }
}

impl Catalog {
    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or an empty list if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.days.is_empty() {
            errors.push("Catalog has no workout days".to_string());
        }

        for (day_idx, day) in self.days.iter().enumerate() {
            if day.exercises.is_empty() {
                errors.push(format!("Day {} '{}': has no exercises", day_idx, day.title));
            }

            for exercise in &day.exercises {
                let (min, max) = exercise.calories_per_set;
                if min > max {
                    errors.push(format!(
                        "Day {} exercise '{}': min calories {} > max {}",
                        day_idx, exercise.name, min, max
                    ));
                }

                if exercise.total_sets == Some(0) {
                    errors.push(format!(
                        "Day {} exercise '{}': total_sets is zero",
                        day_idx, exercise.name
                    ));
                }

                if exercise.is_timed && exercise.duration_seconds.unwrap_or(0) == 0 {
                    errors.push(format!(
                        "Day {} exercise '{}': timed exercise without a duration",
                        day_idx, exercise.name
                    ));
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.day_count(), 7);
        assert_eq!(catalog.get_day(0).unwrap().exercises.len(), 8);
        assert_eq!(catalog.get_day(6).unwrap().exercises.len(), 4);
    }

    #[test]
    fn test_get_day_out_of_range() {
        let catalog = build_default_catalog();
        assert!(catalog.get_day(7).is_none());
    }

    #[test]
    fn test_structured_set_count_wins_over_label() {
        let catalog = build_default_catalog();
        let curl = catalog.days[4]
            .exercises
            .iter()
            .find(|e| e.name == "21s Curl")
            .unwrap();
        // "3 series" has no multiplication sign
        assert_eq!(curl.set_count(), 3);
    }

    #[test]
    fn test_timed_exercises_have_durations() {
        let catalog = build_default_catalog();
        for day in &catalog.days {
            for exercise in day.exercises.iter().filter(|e| e.is_timed) {
                assert!(
                    exercise.duration_seconds.unwrap_or(0) > 0,
                    "{} is timed without a duration",
                    exercise.name
                );
            }
        }
    }

    #[test]
    fn test_cached_catalog_matches_built() {
        assert_eq!(get_default_catalog(), &build_default_catalog());
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut catalog = build_default_catalog();
        catalog.days[0].exercises[0].calories_per_set = (20, 10);
        catalog.days[0].exercises[1].total_sets = Some(0);
        catalog.days[0].exercises[7].duration_seconds = None;
        catalog.days[1].exercises.clear();

        let errors = catalog.validate();
        assert_eq!(errors.len(), 4, "{:?}", errors);
    }

    #[test]
    fn test_empty_catalog_invalid() {
        let errors = Catalog::default().validate();
        assert_eq!(errors, vec!["Catalog has no workout days".to_string()]);
    }
}
