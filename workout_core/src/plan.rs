//! User-customised workout plan.
//!
//! A plan file, when present and valid, replaces the built-in program.
//! Every edit starts from the current effective plan and is saved
//! atomically.

use crate::catalog::build_default_catalog;
use crate::{Catalog, Error, Exercise, Result};
use std::path::{Path, PathBuf};

/// Custom plan stored as JSON next to the session data
pub struct PlanStore {
    path: PathBuf,
}

impl PlanStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a custom plan file exists
    pub fn is_customised(&self) -> bool {
        self.path.exists()
    }

    /// The effective plan: the custom file if usable, else the built-in one
    pub fn load(&self) -> Result<Catalog> {
        match crate::state::load_json::<Catalog>(&self.path)? {
            Some(catalog) => {
                let errors = catalog.validate();
                if errors.is_empty() {
                    Ok(catalog)
                } else {
                    tracing::warn!(
                        "Custom plan {:?} is invalid ({}), using built-in program",
                        self.path,
                        errors.join("; ")
                    );
                    Ok(build_default_catalog())
                }
            }
            None => Ok(build_default_catalog()),
        }
    }

    /// Persist `catalog` as the custom plan
    pub fn save(&self, catalog: &Catalog) -> Result<()> {
        let errors = catalog.validate();
        if !errors.is_empty() {
            return Err(Error::CatalogValidation(errors.join("; ")));
        }
        crate::state::save_json(catalog, &self.path)?;
        tracing::info!("Saved custom plan to {:?}", self.path);
        Ok(())
    }

    /// Drop the custom plan and return to the built-in program
    ///
    /// Returns whether a custom plan existed.
    pub fn reset(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path)?;
        tracing::info!("Removed custom plan {:?}", self.path);
        Ok(true)
    }

    /// Replace one exercise
    pub fn update_exercise(
        &self,
        day_index: usize,
        exercise_index: usize,
        exercise: Exercise,
    ) -> Result<Catalog> {
        self.edit(|catalog| {
            let slot = exercise_slot(catalog, day_index, exercise_index)?;
            *slot = exercise;
            Ok(())
        })
    }

    /// Append an exercise to a day
    pub fn add_exercise(&self, day_index: usize, exercise: Exercise) -> Result<Catalog> {
        self.edit(|catalog| {
            let count = catalog.days.len();
            let day = catalog
                .days
                .get_mut(day_index)
                .ok_or_else(|| Error::Plan(format!("no day {} (plan has {})", day_index, count)))?;
            day.exercises.push(exercise);
            Ok(())
        })
    }

    /// Remove an exercise, returning it
    ///
    /// The last exercise of a day cannot be removed.
    pub fn remove_exercise(&self, day_index: usize, exercise_index: usize) -> Result<Exercise> {
        let mut removed = None;
        self.edit(|catalog| {
            exercise_slot(catalog, day_index, exercise_index)?;
            let day = &mut catalog.days[day_index];
            if day.exercises.len() == 1 {
                return Err(Error::Plan(format!(
                    "cannot remove the only exercise of '{}'",
                    day.title
                )));
            }
            removed = Some(day.exercises.remove(exercise_index));
            Ok(())
        })?;
        removed.ok_or_else(|| Error::Plan("exercise was not removed".into()))
    }

    fn edit<F>(&self, f: F) -> Result<Catalog>
    where
        F: FnOnce(&mut Catalog) -> Result<()>,
    {
        let mut catalog = self.load()?;
        f(&mut catalog)?;
        self.save(&catalog)?;
        Ok(catalog)
    }
}

fn exercise_slot(
    catalog: &mut Catalog,
    day_index: usize,
    exercise_index: usize,
) -> Result<&mut Exercise> {
    let count = catalog.days.len();
    let day = catalog
        .days
        .get_mut(day_index)
        .ok_or_else(|| Error::Plan(format!("no day {} (plan has {})", day_index, count)))?;
    let title = day.title.clone();
    day.exercises
        .get_mut(exercise_index)
        .ok_or_else(|| Error::Plan(format!("no exercise {} in '{}'", exercise_index, title)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogProvider;

    fn store() -> (tempfile::TempDir, PlanStore) {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = PlanStore::new(temp_dir.path().join("plan.json"));
        (temp_dir, store)
    }

    #[test]
    fn test_missing_plan_uses_default() {
        let (_dir, store) = store();
        assert!(!store.is_customised());
        assert_eq!(store.load().unwrap(), build_default_catalog());
    }

    #[test]
    fn test_update_exercise_persists() {
        let (_dir, store) = store();
        let mut exercise = build_default_catalog().days[0].exercises[0].clone();
        exercise.sets_label = "5 × 10".into();
        exercise.total_sets = Some(5);

        store.update_exercise(0, 0, exercise.clone()).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.get_day(0).unwrap().exercises[0], exercise);
        assert!(store.is_customised());
    }

    #[test]
    fn test_add_and_remove_exercise() {
        let (_dir, store) = store();
        let extra = build_default_catalog().days[2].exercises[0].clone();

        let catalog = store.add_exercise(0, extra.clone()).unwrap();
        assert_eq!(catalog.days[0].exercises.len(), 9);

        let removed = store.remove_exercise(0, 8).unwrap();
        assert_eq!(removed, extra);
        assert_eq!(store.load().unwrap().days[0].exercises.len(), 8);
    }

    #[test]
    fn test_bad_indices_rejected() {
        let (_dir, store) = store();
        let exercise = build_default_catalog().days[0].exercises[0].clone();

        assert!(matches!(store.update_exercise(9, 0, exercise.clone()), Err(Error::Plan(_))));
        assert!(matches!(store.update_exercise(0, 99, exercise.clone()), Err(Error::Plan(_))));
        assert!(matches!(store.add_exercise(7, exercise), Err(Error::Plan(_))));
        assert!(matches!(store.remove_exercise(0, 99), Err(Error::Plan(_))));
        // Nothing was written
        assert!(!store.is_customised());
    }

    #[test]
    fn test_cannot_remove_last_exercise() {
        let (_dir, store) = store();
        let mut catalog = build_default_catalog();
        catalog.days[6].exercises.truncate(1);
        store.save(&catalog).unwrap();

        assert!(matches!(store.remove_exercise(6, 0), Err(Error::Plan(_))));
    }

    #[test]
    fn test_invalid_custom_plan_falls_back() {
        let (_dir, store) = store();
        std::fs::write(store.path(), r#"{"days": []}"#).unwrap();
        assert_eq!(store.load().unwrap(), build_default_catalog());

        std::fs::write(store.path(), "not json").unwrap();
        assert_eq!(store.load().unwrap(), build_default_catalog());
    }

    #[test]
    fn test_reset() {
        let (_dir, store) = store();
        assert!(!store.reset().unwrap());

        store.save(&build_default_catalog()).unwrap();
        assert!(store.reset().unwrap());
        assert!(!store.is_customised());
    }

    #[test]
    fn test_save_rejects_invalid_plan() {
        let (_dir, store) = store();
        assert!(matches!(
            store.save(&Catalog::default()),
            Err(Error::CatalogValidation(_))
        ));
    }
}
