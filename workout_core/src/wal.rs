//! Write-Ahead Log (WAL) for session summaries.
//!
//! Summaries are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access.

use crate::{Error, Result, SessionSummary};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Storage collaborator for finished sessions
///
/// A failed save leaves the summary with the caller, who may retry.
pub trait SummarySink {
    fn save_session_summary(&mut self, summary: &SessionSummary) -> Result<()>;
}

/// In-memory sink, mostly useful in tests
impl SummarySink for Vec<SessionSummary> {
    fn save_session_summary(&mut self, summary: &SessionSummary) -> Result<()> {
        self.push(summary.clone());
        Ok(())
    }
}

/// JSONL-based summary sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn append(&self, summary: &SessionSummary) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(summary)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;
        Ok(())
    }
}

impl SummarySink for JsonlSink {
    fn save_session_summary(&mut self, summary: &SessionSummary) -> Result<()> {
        self.append(summary).map_err(|e| {
            tracing::warn!("Failed to append summary {} to WAL: {}", summary.id, e);
            Error::Persistence(format!("{}: {}", self.path.display(), e))
        })?;

        tracing::debug!("Appended summary {} to WAL", summary.id);
        Ok(())
    }
}

/// Read all summaries from a WAL file
///
/// Unparsable lines are logged and skipped.
pub fn read_summaries(path: &Path) -> Result<Vec<SessionSummary>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut summaries = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<SessionSummary>(&line) {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                tracing::warn!("Failed to parse summary at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} summaries from WAL", summaries.len());
    Ok(summaries)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{ExerciseSummary, SessionSummary};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    pub fn summary(title: &str, days_ago: i64, calories: u32) -> SessionSummary {
        let date = Utc::now() - Duration::days(days_ago);
        SessionSummary {
            id: Uuid::new_v4(),
            title: title.into(),
            day_index: 0,
            date,
            started_at: date - Duration::minutes(40),
            duration_seconds: 40 * 60,
            fat_burner: false,
            total_calories: calories,
            exercise_count: 2,
            estimated_weight_lifted: 900.0,
            per_exercise: vec![
                ExerciseSummary {
                    name: "Squats".into(),
                    completed_sets: 4,
                    weight: 600.0,
                },
                ExerciseSummary {
                    name: "Lunges".into(),
                    completed_sets: 3,
                    weight: 300.0,
                },
            ],
        }
    }
}
