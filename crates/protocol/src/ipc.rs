//! Driving protocol between the CLI frontend and the orchestrator loop.
//!
//! The protocol follows an Operation/Event pattern:
//! - `Op`: start/stop signals sent from the frontend to the driving loop
//! - `Event`: progress updates sent from the orchestrator to the frontend
//!
//! Both the interactive key trigger and the interval timer reduce to the
//! same `Op::TriggerCycle` feeding one serial entry point, so the
//! orchestrator stays single-flight regardless of signal source.

use crate::cycle_models::CycleStatus;
use serde::{Deserialize, Serialize};

/// Operations sent from the frontend to the driving loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Op {
    /// Request one analysis cycle.
    ///
    /// Triggers arriving while a cycle is in flight are coalesced: at most
    /// one queued run survives them.
    TriggerCycle,

    /// Stop the driving loop between cycles.
    ///
    /// A cycle already in flight always runs to completion and is appended
    /// before the loop exits.
    Shutdown,
}

/// Pipeline stage names used in progress events.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Capture,
    Extraction,
    Inference,
    Action,
    Persistence,
}

/// Events sent from the orchestrator to the frontend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A new cycle has been assigned an id and started.
    CycleStarted { cycle_id: u64 },

    /// A stage finished. `ok == false` means the stage degraded the cycle
    /// (the cycle itself continues unless the stage was capture).
    StageCompleted {
        cycle_id: u64,
        stage: Stage,
        ok: bool,
    },

    /// The cycle was finalized and durably appended.
    CycleCompleted {
        cycle_id: u64,
        status: CycleStatus,
        summary: String,
    },

    /// The cycle could not be durably recorded. Fatal to the driving loop.
    PersistenceFailed { cycle_id: u64, error: String },
}
