//! Session history and aggregate statistics.
//!
//! History is read from both the live WAL and the archived CSV, so totals
//! stay correct after a rollup.

use crate::csv_rollup::CsvRow;
use crate::{Error, Result, SessionSummary};
use chrono::{DateTime, Duration, Utc};
use csv::ReaderBuilder;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

impl TryFrom<CsvRow> for SessionSummary {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| Error::Persistence(format!("Invalid UUID: {}", e)))?;

        let parse_date = |s: &str| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| Error::Persistence(format!("Invalid date: {}", e)))
        };

        Ok(SessionSummary {
            id,
            title: row.title,
            day_index: row.day_index,
            date: parse_date(&row.date)?,
            started_at: parse_date(&row.started_at)?,
            duration_seconds: row.duration_seconds,
            fat_burner: row.fat_burner,
            total_calories: row.total_calories,
            exercise_count: row.exercise_count,
            estimated_weight_lifted: row.estimated_weight_lifted,
            per_exercise: vec![], // Not stored in CSV
        })
    }
}

/// Load summaries from the last `days` days from both WAL and CSV
///
/// Pass `None` to load everything. Returns summaries sorted newest first,
/// deduplicated by id.
pub fn load_recent_summaries(
    wal_path: &Path,
    csv_path: &Path,
    days: Option<i64>,
) -> Result<Vec<SessionSummary>> {
    let cutoff = days.map(|d| Utc::now() - Duration::days(d));
    load_summaries_in_range(wal_path, csv_path, cutoff, None)
}

/// Load summaries dated in `[from, until)` from both WAL and CSV
///
/// Either bound may be open. Same ordering and deduplication as
/// [`load_recent_summaries`].
pub fn load_summaries_in_range(
    wal_path: &Path,
    csv_path: &Path,
    from: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
) -> Result<Vec<SessionSummary>> {
    let in_window = |s: &SessionSummary| {
        from.map_or(true, |f| s.date >= f) && until.map_or(true, |u| s.date < u)
    };

    let mut summaries = Vec::new();
    let mut seen_ids = HashSet::new();

    // WAL first: it carries per-exercise detail
    for summary in crate::wal::read_summaries(wal_path)? {
        if in_window(&summary) && seen_ids.insert(summary.id) {
            summaries.push(summary);
        }
    }

    if csv_path.exists() {
        let mut csv_count = 0;
        for summary in load_summaries_from_csv(csv_path)? {
            if in_window(&summary) && seen_ids.insert(summary.id) {
                summaries.push(summary);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} summaries from CSV", csv_count);
    }

    summaries.sort_by(|a, b| b.date.cmp(&a.date));

    tracing::info!("Loaded {} summaries from history", summaries.len());
    Ok(summaries)
}

fn load_summaries_from_csv(path: &Path) -> Result<Vec<SessionSummary>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut summaries = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result.map_err(Error::from).and_then(SessionSummary::try_from) {
            Ok(summary) => summaries.push(summary),
            Err(e) => tracing::warn!("Skipping CSV row: {}", e),
        }
    }

    Ok(summaries)
}

/// Delete a logged session from the live WAL and the CSV archive
///
/// Returns whether a session with `id` was found. Unparsable WAL lines are
/// left in place.
pub fn delete_summary(wal_path: &Path, csv_path: &Path, id: Uuid) -> Result<bool> {
    let from_wal = remove_from_wal(wal_path, id)?;
    let from_csv = remove_from_csv(csv_path, id)?;

    let removed = from_wal || from_csv;
    if removed {
        tracing::info!("Deleted session {}", id);
    } else {
        tracing::debug!("No session {} to delete", id);
    }
    Ok(removed)
}

#[derive(Deserialize)]
struct SummaryId {
    id: Uuid,
}

fn remove_from_wal(path: &Path, id: Uuid) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }

    let mut file = OpenOptions::new().read(true).write(true).open(path)?;
    file.lock_exclusive()?;
    let result = rewrite_wal_without(&mut file, id);
    file.unlock()?;
    result
}

fn rewrite_wal_without(file: &mut File, id: Uuid) -> Result<bool> {
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let mut kept = String::with_capacity(contents.len());
    let mut removed = false;
    for line in contents.lines().filter(|l| !l.trim().is_empty()) {
        let matches = serde_json::from_str::<SummaryId>(line).is_ok_and(|s| s.id == id);
        if matches {
            removed = true;
        } else {
            kept.push_str(line);
            kept.push('\n');
        }
    }

    if removed {
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(kept.as_bytes())?;
        file.sync_all()?;
    }
    Ok(removed)
}

fn remove_from_csv(path: &Path, id: Uuid) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let headers = reader.headers()?.clone();
    let id_column = headers.iter().position(|h| h == "id").unwrap_or(0);
    let target = id.to_string();

    let mut kept = Vec::new();
    let mut removed = false;
    for record in reader.records() {
        let record = record?;
        if record.get(id_column) == Some(target.as_str()) {
            removed = true;
        } else {
            kept.push(record);
        }
    }

    if !removed {
        return Ok(false);
    }

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = csv::Writer::from_writer(temp.as_file());
        writer.write_record(&headers)?;
        for record in &kept {
            writer.write_record(record)?;
        }
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(true)
}

/// Aggregate figures over a set of sessions
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct WorkoutStats {
    pub total_workouts: usize,
    pub total_calories: u64,
    pub total_duration_seconds: u64,
    pub total_weight_lifted: f64,
    pub last_workout_date: Option<DateTime<Utc>>,
}

impl WorkoutStats {
    pub fn from_summaries(summaries: &[SessionSummary]) -> Self {
        summaries.iter().fold(Self::default(), |mut stats, s| {
            stats.total_workouts += 1;
            stats.total_calories += u64::from(s.total_calories);
            stats.total_duration_seconds += u64::from(s.duration_seconds);
            stats.total_weight_lifted += s.estimated_weight_lifted;
            if stats.last_workout_date.map_or(true, |last| s.date > last) {
                stats.last_workout_date = Some(s.date);
            }
            stats
        })
    }
}

/// Estimated kilograms lifted per exercise name, across sessions
pub fn weight_lifted_by_exercise(summaries: &[SessionSummary]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for exercise in summaries.iter().flat_map(|s| &s.per_exercise) {
        if exercise.weight > 0.0 {
            *totals.entry(exercise.name.clone()).or_insert(0.0) += exercise.weight;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wal::test_support::summary;
    use crate::wal::{JsonlSink, SummarySink};

    #[test]
    fn test_load_recent_summaries_from_wal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSink::new(&wal_path);
        sink.save_session_summary(&summary("a", 1, 100)).unwrap();
        sink.save_session_summary(&summary("b", 3, 100)).unwrap();
        sink.save_session_summary(&summary("old", 10, 100)).unwrap();

        assert_eq!(load_recent_summaries(&wal_path, &csv_path, Some(7)).unwrap().len(), 2);
        assert_eq!(load_recent_summaries(&wal_path, &csv_path, None).unwrap().len(), 3);
    }

    #[test]
    fn test_csv_rows_loaded_after_rollup() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let record = summary("legs", 1, 321);
        let mut sink = JsonlSink::new(&wal_path);
        sink.save_session_summary(&record).unwrap();
        crate::csv_rollup::wal_to_csv_and_archive(&wal_path, &csv_path).unwrap();

        let loaded = load_recent_summaries(&wal_path, &csv_path, None).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, record.id);
        assert_eq!(loaded[0].total_calories, 321);
        assert_eq!(loaded[0].date, record.date);
        assert!(loaded[0].per_exercise.is_empty());
    }

    #[test]
    fn test_deduplication_across_wal_and_csv() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let record = summary("legs", 1, 100);
        let mut sink = JsonlSink::new(&wal_path);
        sink.save_session_summary(&record).unwrap();
        crate::csv_rollup::wal_to_csv_and_archive(&wal_path, &csv_path).unwrap();

        // Same summary lands in the new WAL again
        let mut sink = JsonlSink::new(&wal_path);
        sink.save_session_summary(&record).unwrap();

        let loaded = load_recent_summaries(&wal_path, &csv_path, None).unwrap();
        assert_eq!(loaded.iter().filter(|s| s.id == record.id).count(), 1);
        // The WAL copy wins and keeps its detail
        assert_eq!(loaded[0].per_exercise.len(), 2);
    }

    #[test]
    fn test_summaries_sorted_newest_first() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSink::new(&wal_path);
        sink.save_session_summary(&summary("old", 5, 100)).unwrap();
        sink.save_session_summary(&summary("new", 1, 100)).unwrap();

        let loaded = load_recent_summaries(&wal_path, &csv_path, Some(7)).unwrap();
        assert_eq!(loaded[0].title, "new");
        assert_eq!(loaded[1].title, "old");
    }

    #[test]
    fn test_load_summaries_in_range() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSink::new(&wal_path);
        sink.save_session_summary(&summary("recent", 1, 100)).unwrap();
        sink.save_session_summary(&summary("middle", 5, 100)).unwrap();
        sink.save_session_summary(&summary("old", 20, 100)).unwrap();

        let now = Utc::now();
        let titles = |from, until| -> Vec<String> {
            load_summaries_in_range(&wal_path, &csv_path, from, until)
                .unwrap()
                .into_iter()
                .map(|s| s.title)
                .collect()
        };

        assert_eq!(
            titles(Some(now - Duration::days(10)), Some(now - Duration::days(2))),
            vec!["middle"]
        );
        assert_eq!(titles(None, Some(now - Duration::days(10))), vec!["old"]);
        assert_eq!(titles(Some(now - Duration::days(2)), None), vec!["recent"]);
        assert_eq!(titles(None, None).len(), 3);
        assert!(titles(Some(now), Some(now - Duration::days(30))).is_empty());
    }

    #[test]
    fn test_delete_summary_from_wal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let keep = summary("keep", 1, 100);
        let gone = summary("gone", 2, 100);
        let mut sink = JsonlSink::new(&wal_path);
        sink.save_session_summary(&keep).unwrap();
        sink.save_session_summary(&gone).unwrap();
        let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
        writeln!(file, "{{ not json").unwrap();
        drop(file);

        assert!(delete_summary(&wal_path, &csv_path, gone.id).unwrap());

        let remaining = crate::wal::read_summaries(&wal_path).unwrap();
        assert_eq!(remaining, vec![keep]);
        // Unparsable lines are not touched
        let contents = std::fs::read_to_string(&wal_path).unwrap();
        assert!(contents.contains("{ not json"));

        // Appends still work after the rewrite
        sink.save_session_summary(&summary("later", 0, 100)).unwrap();
        assert_eq!(crate::wal::read_summaries(&wal_path).unwrap().len(), 2);
    }

    #[test]
    fn test_delete_summary_from_csv() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let keep = summary("keep", 1, 100);
        let gone = summary("gone", 2, 200);
        let mut sink = JsonlSink::new(&wal_path);
        sink.save_session_summary(&keep).unwrap();
        sink.save_session_summary(&gone).unwrap();
        crate::csv_rollup::wal_to_csv_and_archive(&wal_path, &csv_path).unwrap();

        assert!(delete_summary(&wal_path, &csv_path, gone.id).unwrap());

        let loaded = load_recent_summaries(&wal_path, &csv_path, None).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, keep.id);

        // The rewritten CSV keeps its header and still accepts appends
        sink.save_session_summary(&summary("new", 0, 50)).unwrap();
        crate::csv_rollup::wal_to_csv_and_archive(&wal_path, &csv_path).unwrap();
        assert_eq!(load_recent_summaries(&wal_path, &csv_path, None).unwrap().len(), 2);
    }

    #[test]
    fn test_delete_unknown_summary() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        assert!(!delete_summary(&wal_path, &csv_path, Uuid::new_v4()).unwrap());

        let mut sink = JsonlSink::new(&wal_path);
        sink.save_session_summary(&summary("keep", 0, 100)).unwrap();
        assert!(!delete_summary(&wal_path, &csv_path, Uuid::new_v4()).unwrap());
        assert_eq!(crate::wal::read_summaries(&wal_path).unwrap().len(), 1);
    }

    #[test]
    fn test_workout_stats() {
        let summaries = vec![summary("a", 0, 300), summary("b", 2, 200)];
        let stats = WorkoutStats::from_summaries(&summaries);

        assert_eq!(stats.total_workouts, 2);
        assert_eq!(stats.total_calories, 500);
        assert_eq!(stats.total_duration_seconds, 2 * 40 * 60);
        assert_eq!(stats.total_weight_lifted, 1800.0);
        assert_eq!(stats.last_workout_date, Some(summaries[0].date));
    }

    #[test]
    fn test_empty_stats() {
        let stats = WorkoutStats::from_summaries(&[]);
        assert_eq!(stats, WorkoutStats::default());
    }

    #[test]
    fn test_weight_by_exercise() {
        let summaries = vec![summary("a", 0, 300), summary("b", 1, 300)];
        let totals = weight_lifted_by_exercise(&summaries);

        assert_eq!(totals.get("Squats"), Some(&1200.0));
        assert_eq!(totals.get("Lunges"), Some(&600.0));
    }
}
