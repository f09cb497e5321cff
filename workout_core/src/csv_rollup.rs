//! CSV rollup functionality for archiving WAL summaries.
//!
//! This module implements atomic WAL-to-CSV conversion with proper error handling
//! to prevent data loss. The CSV keeps one row per session; per-exercise detail
//! stays in the archived WAL. Every rollup archives to its own
//! `<stem>.<timestamp>.wal.processed` file.

use crate::{Result, SessionSummary};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// A row in the CSV output
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CsvRow {
    pub id: String,
    pub title: String,
    pub day_index: usize,
    pub date: String,
    pub started_at: String,
    pub duration_seconds: u32,
    pub fat_burner: bool,
    pub total_calories: u32,
    pub exercise_count: usize,
    pub estimated_weight_lifted: f64,
}

impl From<&SessionSummary> for CsvRow {
    fn from(summary: &SessionSummary) -> Self {
        CsvRow {
            id: summary.id.to_string(),
            title: summary.title.clone(),
            day_index: summary.day_index,
            date: summary.date.to_rfc3339(),
            started_at: summary.started_at.to_rfc3339(),
            duration_seconds: summary.duration_seconds,
            fat_burner: summary.fat_burner,
            total_calories: summary.total_calories,
            exercise_count: summary.exercise_count,
            estimated_weight_lifted: summary.estimated_weight_lifted,
        }
    }
}

/// Roll up WAL summaries into CSV and archive the WAL atomically
///
/// This function:
/// 1. Reads all summaries from the WAL
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the WAL to a uniquely named .processed archive
/// 5. Returns the number of summaries processed
pub fn wal_to_csv_and_archive(wal_path: &Path, csv_path: &Path) -> Result<usize> {
    let summaries = crate::wal::read_summaries(wal_path)?;

    if summaries.is_empty() {
        tracing::info!("No summaries in WAL to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Only a fresh file gets a header row
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for summary in &summaries {
        writer.serialize(CsvRow::from(summary))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Wrote {} summaries to CSV", summaries.len());

    let processed_path = archive_path(wal_path);
    std::fs::rename(wal_path, &processed_path)?;

    tracing::info!("Archived WAL to {:?}", processed_path);

    Ok(summaries.len())
}

/// Fresh archive name next to the WAL, never reusing an existing file
fn archive_path(wal_path: &Path) -> PathBuf {
    let dir = wal_path.parent().unwrap_or_else(|| Path::new("."));
    let stem = wal_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sessions".into());
    let stamp = Utc::now().format("%Y%m%dT%H%M%S%6f");

    let mut candidate = dir.join(format!("{}.{}.wal.processed", stem, stamp));
    let mut n = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{}.{}-{}.wal.processed", stem, stamp, n));
        n += 1;
    }
    candidate
}

/// All processed WAL archives in `dir`, oldest name first
pub fn processed_wals(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut archives = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "processed") {
            archives.push(path);
        }
    }
    archives.sort();
    Ok(archives)
}

/// Clean up old processed WAL files
///
/// This removes all .wal.processed files in the given directory.
pub fn cleanup_processed_wals(dir: &Path) -> Result<usize> {
    let mut count = 0;
    for path in processed_wals(dir)? {
        std::fs::remove_file(&path)?;
        tracing::debug!("Removed processed WAL: {:?}", path);
        count += 1;
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed WAL files", count);
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wal::test_support::summary;
    use crate::wal::{JsonlSink, SummarySink};
    use std::fs::File;

    #[test]
    fn test_wal_to_csv_creates_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSink::new(&wal_path);
        for i in 0..3 {
            sink.save_session_summary(&summary(&format!("day_{}", i), 0, 100))
                .unwrap();
        }

        let count = wal_to_csv_and_archive(&wal_path, &csv_path).unwrap();
        assert_eq!(count, 3);

        assert!(csv_path.exists());
        assert!(!wal_path.exists());
        assert_eq!(processed_wals(temp_dir.path()).unwrap().len(), 1);
    }

    #[test]
    fn test_repeated_rollups_keep_every_archive() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSink::new(&wal_path);
        sink.save_session_summary(&summary("first", 1, 100)).unwrap();
        wal_to_csv_and_archive(&wal_path, &csv_path).unwrap();

        sink.save_session_summary(&summary("second", 0, 100)).unwrap();
        wal_to_csv_and_archive(&wal_path, &csv_path).unwrap();

        let archives = processed_wals(temp_dir.path()).unwrap();
        assert_eq!(archives.len(), 2);

        let mut archived: Vec<SessionSummary> = Vec::new();
        for archive in &archives {
            archived.extend(crate::wal::read_summaries(archive).unwrap());
        }
        let mut titles: Vec<&str> = archived.iter().map(|s| s.title.as_str()).collect();
        titles.sort();
        assert_eq!(titles, vec!["first", "second"]);

        // Per-exercise detail survives in the archives
        assert!(archived.iter().all(|s| s.per_exercise.len() == 2));
    }

    #[test]
    fn test_wal_to_csv_appends() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("sessions.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        let mut sink = JsonlSink::new(&wal_path);
        sink.save_session_summary(&summary("first", 1, 100)).unwrap();
        assert_eq!(wal_to_csv_and_archive(&wal_path, &csv_path).unwrap(), 1);

        let mut sink = JsonlSink::new(&wal_path);
        sink.save_session_summary(&summary("second", 0, 100)).unwrap();
        assert_eq!(wal_to_csv_and_archive(&wal_path, &csv_path).unwrap(), 1);

        // Header written once, two data rows
        let reader = csv::Reader::from_path(&csv_path).unwrap();
        assert_eq!(reader.into_records().count(), 2);
        let content = std::fs::read_to_string(&csv_path).unwrap();
        assert_eq!(content.matches("id,title").count(), 1);
    }

    #[test]
    fn test_empty_wal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("empty.wal");
        let csv_path = temp_dir.path().join("sessions.csv");

        File::create(&wal_path).unwrap();

        assert_eq!(wal_to_csv_and_archive(&wal_path, &csv_path).unwrap(), 0);
        assert!(!csv_path.exists());
    }

    #[test]
    fn test_cleanup_processed_wals() {
        let temp_dir = tempfile::tempdir().unwrap();

        File::create(temp_dir.path().join("s1.wal.processed")).unwrap();
        File::create(temp_dir.path().join("s2.wal.processed")).unwrap();
        File::create(temp_dir.path().join("keep.wal")).unwrap();

        assert_eq!(cleanup_processed_wals(temp_dir.path()).unwrap(), 2);

        assert!(!temp_dir.path().join("s1.wal.processed").exists());
        assert!(!temp_dir.path().join("s2.wal.processed").exists());
        assert!(temp_dir.path().join("keep.wal").exists());
    }
}
