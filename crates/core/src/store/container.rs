//! The cycle data container.

use crate::store::error::PersistenceError;
use chrono::{DateTime, Utc};
use dp_protocol::{Cycle, CycleFilter, CycleStatus, SortOrder, StoreStats};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// On-disk document shape: the ordered cycle sequence plus bookkeeping
/// metadata.
#[derive(Serialize, Deserialize, Debug, Default)]
struct StoreDocument {
    cycles: Vec<Cycle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    total_cycles: usize,
}

/// Durable, queryable log of all cycles.
///
/// Write path: append-only, atomic with respect to the persisted document.
/// Each append serializes the whole document to a temp file in the store's
/// directory, fsyncs it, and renames it over the store path, so a crash at
/// any point leaves either the old or the new document, never a torn one.
///
/// Read path: served from the in-memory cache, which mirrors the persisted
/// form after every append; `reload()` re-reads the document when another
/// process may have observed or replaced it.
pub struct CycleStore {
    path: PathBuf,
    cycles: Vec<Cycle>,
}

impl CycleStore {
    /// Open the store, loading the persisted document if present.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the document exists but cannot be read
    /// or parsed.
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        let cycles = Self::load(path)?;
        info!(path = %path.display(), cycles = cycles.len(), "cycle store opened");
        Ok(Self {
            path: path.to_path_buf(),
            cycles,
        })
    }

    fn load(path: &Path) -> Result<Vec<Cycle>, PersistenceError> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(path).map_err(|source| PersistenceError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let document: StoreDocument =
            serde_json::from_str(&content).map_err(|source| PersistenceError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(document.cycles)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Next cycle id: one past the highest id ever appended (1 for an empty
    /// store).
    pub fn next_id(&self) -> u64 {
        self.cycles.iter().map(|c| c.id).max().unwrap_or(0) + 1
    }

    /// Durably append one finalized cycle.
    ///
    /// The cycle becomes visible to reads only after the document has been
    /// flushed and renamed into place; on any persistence failure the
    /// in-memory cache is rolled back and the cycle is not visible.
    ///
    /// # Errors
    ///
    /// - `PersistenceError::DuplicateId` if the id is already present
    /// - `PersistenceError::Write` if the document cannot be persisted
    pub fn append(&mut self, cycle: Cycle) -> Result<(), PersistenceError> {
        if self.cycles.iter().any(|c| c.id == cycle.id) {
            return Err(PersistenceError::DuplicateId { id: cycle.id });
        }

        self.cycles.push(cycle);

        if let Err(error) = self.persist() {
            // Roll back: an unpersisted cycle must not be readable.
            self.cycles.pop();
            return Err(error);
        }

        Ok(())
    }

    fn persist(&self) -> Result<(), PersistenceError> {
        let document = StoreDocument {
            cycles: self.cycles.clone(),
            last_updated: Some(Utc::now()),
            total_cycles: self.cycles.len(),
        };

        let json = serde_json::to_string_pretty(&document).map_err(|e| {
            PersistenceError::Write {
                path: self.path.clone(),
                message: e.to_string(),
            }
        })?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        // Temp file must live in the same directory for the rename to be
        // atomic.
        let mut tmp = tempfile::Builder::new()
            .prefix(".cycles-")
            .suffix(".json.tmp")
            .tempfile_in(dir)
            .map_err(|e| PersistenceError::Write {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| PersistenceError::Write {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        tmp.persist(&self.path).map_err(|e| PersistenceError::Write {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        Ok(())
    }

    /// Look up one cycle by id.
    pub fn get(&self, id: u64) -> Option<&Cycle> {
        self.cycles.iter().find(|c| c.id == id)
    }

    /// All cycles matching the filter, ordered by `started_at`.
    pub fn list(&self, filter: &CycleFilter, sort: SortOrder) -> Vec<Cycle> {
        let mut matched: Vec<Cycle> = self
            .cycles
            .iter()
            .filter(|c| Self::matches(c, filter))
            .cloned()
            .collect();

        matched.sort_by_key(|c| c.started_at);
        if sort == SortOrder::Desc {
            matched.reverse();
        }
        matched
    }

    fn matches(cycle: &Cycle, filter: &CycleFilter) -> bool {
        if let Some(status) = filter.status {
            if cycle.status != status {
                return false;
            }
        }
        if let Some(since) = filter.since {
            if cycle.started_at < since {
                return false;
            }
        }
        if let Some(until) = filter.until {
            if cycle.started_at > until {
                return false;
            }
        }
        if let Some(query) = &filter.query {
            let haystack = cycle.search_text().to_lowercase();
            if !haystack.contains(&query.to_lowercase()) {
                return false;
            }
        }
        true
    }

    /// Aggregate statistics over the full history, recomputed on demand.
    pub fn stats(&self) -> StoreStats {
        let total_cycles = self.cycles.len();
        let count = |status: CycleStatus| {
            self.cycles.iter().filter(|c| c.status == status).count()
        };

        let average_processing_time_ms = if total_cycles == 0 {
            None
        } else {
            let total_ms: i64 = self
                .cycles
                .iter()
                .map(|c| c.processing_time().num_milliseconds())
                .sum();
            Some(total_ms as f64 / total_cycles as f64)
        };

        StoreStats {
            total_cycles,
            success_count: count(CycleStatus::Success),
            partial_count: count(CycleStatus::Partial),
            failed_count: count(CycleStatus::Failed),
            average_processing_time_ms,
        }
    }

    /// Narratives of the most recent cycles, oldest first: the history
    /// context handed to inference.
    pub fn recent_narratives(&self, limit: usize) -> Vec<String> {
        let mut with_time: Vec<&Cycle> = self.cycles.iter().collect();
        with_time.sort_by_key(|c| c.started_at);
        with_time
            .iter()
            .rev()
            .filter_map(|c| c.recommendation.as_ref().map(|r| r.narrative.clone()))
            .take(limit)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect()
    }

    /// Re-read the persisted document, discarding the in-memory cache.
    ///
    /// Used on process start and to recover after external modification.
    /// On failure the previous cache is kept so a reader can tolerate a
    /// transient bad read and retry on its next poll.
    pub fn reload(&mut self) -> Result<(), PersistenceError> {
        match Self::load(&self.path) {
            Ok(cycles) => {
                self.cycles = cycles;
                Ok(())
            }
            Err(error) => {
                warn!(path = %self.path.display(), error = %error, "store reload failed; keeping cached view");
                Err(error)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }
}
