//! Query parameters and aggregate statistics for the store's read path.
//!
//! These types are shared between the in-process store API and the viewer's
//! HTTP boundary, so the viewer's query string maps 1:1 onto `CycleFilter`.

use crate::cycle_models::CycleStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sort order for `list()` results, keyed by `started_at`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Optional predicate for `list()`.
///
/// All present fields must match (conjunction). `query` is a
/// case-insensitive substring match over the cycle's narrative, error
/// message, and extracted text.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CycleFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CycleStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl CycleFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.since.is_none()
            && self.until.is_none()
            && self.query.is_none()
    }
}

/// Aggregate statistics over the full cycle history.
///
/// Recomputed on demand from the in-memory cache; cheap at the scale of a
/// single-host cycle log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoreStats {
    pub total_cycles: usize,
    pub success_count: usize,
    pub partial_count: usize,
    pub failed_count: usize,
    /// Mean wall-clock duration per cycle in milliseconds, None when the
    /// store is empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_processing_time_ms: Option<f64>,
}
