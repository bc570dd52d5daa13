//! Where trajectory records come from.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use log::trace;

use crate::record::read_plt;
use crate::{TrajectoryError, TrajectoryRecord, TrajectoryResult};

/// A forward-only supplier of trajectory segments (one segment per file).
///
/// Implementations hand out segments in chronological order and never
/// revisit one.  `Send` so agents owning a source can step on worker threads.
pub trait TrajectorySource: Send {
    /// Load the next segment, or `None` once every segment has been handed out.
    fn next_segment(&mut self) -> TrajectoryResult<Option<Vec<TrajectoryRecord>>>;

    /// Human-readable name of the source (e.g. the person's directory name).
    fn label(&self) -> &str;
}

// ── PltDirectory ──────────────────────────────────────────────────────────────

/// One person's directory of trajectory files, read in file-name order.
///
/// Accepts both layouts:
///
/// ```text
/// <person>/Trajectory/20081023025304.plt    (Geolife)
/// <person>/20081023025304.plt
/// ```
pub struct PltDirectory {
    label: String,
    files: VecDeque<PathBuf>,
}

impl PltDirectory {
    /// List and sort the trajectory files under `person_dir`.
    ///
    /// # Errors
    ///
    /// [`TrajectoryError::Empty`] if the directory holds no files.
    pub fn open(person_dir: &Path) -> TrajectoryResult<Self> {
        let nested = person_dir.join("Trajectory");
        let dir = if nested.is_dir() { nested } else { person_dir.to_path_buf() };

        let io_err = |source| TrajectoryError::Io { path: dir.clone(), source };
        let mut files: Vec<PathBuf> = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        if files.is_empty() {
            return Err(TrajectoryError::Empty(dir));
        }
        // File names are timestamps, so lexical order is chronological.
        files.sort();

        let label = person_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| person_dir.display().to_string());
        Ok(Self { label, files: files.into() })
    }

    /// Files not yet handed out.
    pub fn remaining_files(&self) -> usize {
        self.files.len()
    }
}

impl TrajectorySource for PltDirectory {
    fn next_segment(&mut self) -> TrajectoryResult<Option<Vec<TrajectoryRecord>>> {
        let Some(path) = self.files.pop_front() else {
            return Ok(None);
        };
        let records = read_plt(&path)?;
        trace!("{}: loaded {} records from {}", self.label, records.len(), path.display());
        Ok(Some(records))
    }

    fn label(&self) -> &str {
        &self.label
    }
}

// ── MemorySource ──────────────────────────────────────────────────────────────

/// Segments held in memory.  Used by synthetic scenarios and tests.
pub struct MemorySource {
    label:    String,
    segments: VecDeque<Vec<TrajectoryRecord>>,
}

impl MemorySource {
    pub fn new(label: impl Into<String>, segments: Vec<Vec<TrajectoryRecord>>) -> Self {
        Self { label: label.into(), segments: segments.into() }
    }

    /// A single-segment source.
    pub fn single(label: impl Into<String>, records: Vec<TrajectoryRecord>) -> Self {
        Self::new(label, vec![records])
    }
}

impl TrajectorySource for MemorySource {
    fn next_segment(&mut self) -> TrajectoryResult<Option<Vec<TrajectoryRecord>>> {
        Ok(self.segments.pop_front())
    }

    fn label(&self) -> &str {
        &self.label
    }
}
