//! Body-weight log.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightRecord {
    pub id: Uuid,
    pub weight_kg: f64,
    pub recorded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Parse a user-entered weight such as `"82.5"`, `"82,5"` or `"82.5 kg"`
pub fn parse_weight(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    let number = trimmed
        .strip_suffix("kg")
        .or_else(|| trimmed.strip_suffix("KG"))
        .unwrap_or(trimmed)
        .trim()
        .replace(',', ".");

    let weight: f64 = number
        .parse()
        .map_err(|_| Error::InvalidWeight(format!("'{}' is not a number", input.trim())))?;

    check_weight(weight)
}

/// A weight must be a finite, positive number of kilograms
fn check_weight(weight: f64) -> Result<f64> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(Error::InvalidWeight(format!(
            "{} kg is not a positive weight",
            weight
        )));
    }
    Ok(weight)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeightStats {
    pub current: f64,
    pub initial: f64,
    pub change: f64,
    pub change_percentage: f64,
    pub lowest: f64,
    pub highest: f64,
}

/// Weight records, oldest first, backed by a JSON file
pub struct WeightLog {
    path: PathBuf,
    records: Vec<WeightRecord>,
}

impl WeightLog {
    /// Load the log; a missing or corrupt file yields an empty log
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut records: Vec<WeightRecord> = crate::state::load_json(&path)?.unwrap_or_default();
        records.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at));
        Ok(Self { path, records })
    }

    pub fn save(&self) -> Result<()> {
        crate::state::save_json(&self.records, &self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[WeightRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record a weight and persist the log
    pub fn add(
        &mut self,
        weight_kg: f64,
        recorded_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<WeightRecord> {
        check_weight(weight_kg)?;

        let record = WeightRecord {
            id: Uuid::new_v4(),
            weight_kg,
            recorded_at,
            notes: notes.filter(|n| !n.trim().is_empty()),
        };

        let pos = self
            .records
            .partition_point(|r| r.recorded_at <= record.recorded_at);
        self.records.insert(pos, record.clone());
        self.save()?;

        tracing::info!("Recorded weight {:.1} kg", weight_kg);
        Ok(record)
    }

    /// Remove a record by id, returning it if it existed
    pub fn remove(&mut self, id: Uuid) -> Result<Option<WeightRecord>> {
        let Some(pos) = self.records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        let removed = self.records.remove(pos);
        self.save()?;
        Ok(Some(removed))
    }

    pub fn stats(&self) -> Option<WeightStats> {
        let first = self.records.first()?;
        let last = self.records.last()?;

        let (lowest, highest) = self
            .records
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
                (lo.min(r.weight_kg), hi.max(r.weight_kg))
            });

        let change = last.weight_kg - first.weight_kg;
        Some(WeightStats {
            current: last.weight_kg,
            initial: first.weight_kg,
            change,
            change_percentage: change / first.weight_kg * 100.0,
            lowest,
            highest,
        })
    }
}
