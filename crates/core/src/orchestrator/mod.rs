//! Analysis cycle orchestrator.
//!
//! Drives one cycle end-to-end: capture → extraction → inference → action →
//! persistence. Stage failures are folded into the cycle record and never
//! escape `run_cycle`; only a persistence failure on the final append
//! propagates, because a cycle that cannot be durably recorded must not be
//! reported as persisted.

pub mod driver;

pub use driver::run_loop;

use crate::actions::ActionExecutor;
use crate::capture::{CaptureAdapter, CapturedImage};
use crate::config::AppConfig;
use crate::extract::ExtractionAdapter;
use crate::infer::InferenceAdapter;
use crate::store::{CycleStore, PersistenceError};
use chrono::Utc;
use dp_protocol::{Cycle, CycleStatus, Event, Stage};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tracing::{error, info, warn};

/// Per-cycle settings, extracted from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct CycleOptions {
    pub screenshots_dir: PathBuf,
    pub auto_execute: bool,
    pub action_delay: Duration,
    pub max_actions: usize,
    pub history_context: usize,
}

impl CycleOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            screenshots_dir: config.screenshots_dir.clone(),
            auto_execute: config.auto_execute,
            action_delay: Duration::from_millis(config.action_delay_ms),
            max_actions: config.max_actions,
            history_context: config.history_context,
        }
    }
}

/// Sequences the analysis pipeline and owns the cycle record while it is in
/// flight. Exactly one cycle runs at a time; the orchestrator is driven
/// serially by [`run_loop`] or by a direct `run_cycle` call.
pub struct Orchestrator {
    capture: Arc<dyn CaptureAdapter>,
    extractor: Arc<dyn ExtractionAdapter>,
    inference: Arc<dyn InferenceAdapter>,
    executor: ActionExecutor,
    store: CycleStore,
    options: CycleOptions,
    events_tx: Sender<Event>,
}

impl Orchestrator {
    pub fn new(
        capture: Arc<dyn CaptureAdapter>,
        extractor: Arc<dyn ExtractionAdapter>,
        inference: Arc<dyn InferenceAdapter>,
        executor: ActionExecutor,
        store: CycleStore,
        options: CycleOptions,
        events_tx: Sender<Event>,
    ) -> Self {
        Self {
            capture,
            extractor,
            inference,
            executor,
            store,
            options,
            events_tx,
        }
    }

    /// Read access to the underlying store, mainly for inspection after
    /// `run_cycle` in tests and the `--once` path.
    pub fn store(&self) -> &CycleStore {
        &self.store
    }

    /// Run one complete cycle and append it.
    ///
    /// Every outcome except a persistence failure produces an appended
    /// Cycle: capture failure finalizes the record as `Failed`, later stage
    /// failures degrade it to `Partial`, and all of them are recorded
    /// rather than discarded.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` only when the finalized cycle cannot be
    /// durably appended.
    pub async fn run_cycle(&mut self) -> Result<Cycle, PersistenceError> {
        let id = self.store.next_id();
        let started_at = Utc::now();
        info!(cycle = id, "starting analysis cycle");
        self.emit(Event::CycleStarted { cycle_id: id }).await;

        let mut cycle = Cycle {
            id,
            started_at,
            completed_at: started_at,
            screenshot_path: None,
            scene: None,
            recommendation: None,
            action_results: Vec::new(),
            status: CycleStatus::Failed,
            error: None,
        };

        let image = self.capture_stage(&mut cycle).await;
        self.emit(Event::StageCompleted {
            cycle_id: id,
            stage: Stage::Capture,
            ok: image.is_some(),
        })
        .await;

        if let Some(image) = image {
            self.extraction_stage(&mut cycle, &image).await;
            self.inference_stage(&mut cycle).await;
            self.action_stage(&mut cycle).await;
            cycle.status = Self::final_status(&cycle);
        }

        cycle.completed_at = Utc::now();

        let appended = self.store.append(cycle.clone());
        match appended {
            Ok(()) => {
                self.emit(Event::CycleCompleted {
                    cycle_id: id,
                    status: cycle.status,
                    summary: Self::summarize(&cycle),
                })
                .await;
                info!(cycle = id, status = ?cycle.status, "cycle appended");
                Ok(cycle)
            }
            Err(persistence_error) => {
                error!(cycle = id, error = %persistence_error, "cycle could not be persisted");
                self.emit(Event::PersistenceFailed {
                    cycle_id: id,
                    error: persistence_error.to_string(),
                })
                .await;
                Err(persistence_error)
            }
        }
    }

    /// Capture the screen and persist the image. Returns None on failure,
    /// leaving the cycle finalized as Failed.
    async fn capture_stage(&self, cycle: &mut Cycle) -> Option<CapturedImage> {
        let image = match self.capture.capture().await {
            Ok(image) => image,
            Err(capture_error) => {
                warn!(cycle = cycle.id, error = %capture_error, "capture failed");
                cycle.error = Some(format!("capture failed: {capture_error}"));
                return None;
            }
        };

        match self.save_screenshot(cycle.id, &image).await {
            Ok(path) => {
                cycle.screenshot_path = Some(path);
                Some(image)
            }
            Err(io_error) => {
                warn!(cycle = cycle.id, error = %io_error, "screenshot could not be persisted");
                cycle.error = Some(format!("capture failed: {io_error}"));
                None
            }
        }
    }

    async fn save_screenshot(
        &self,
        id: u64,
        image: &CapturedImage,
    ) -> Result<PathBuf, std::io::Error> {
        let filename = format!(
            "screenshot_{}_{id}.png",
            Utc::now().format("%Y%m%d_%H%M%S")
        );
        let path = self.options.screenshots_dir.join(filename);
        tokio::fs::write(&path, &image.bytes).await?;
        Ok(path)
    }

    async fn extraction_stage(&self, cycle: &mut Cycle, image: &CapturedImage) {
        match self.extractor.extract(image).await {
            Ok(scene) => {
                info!(cycle = cycle.id, spans = scene.text_count(), "extraction complete");
                cycle.scene = Some(scene);
            }
            Err(extraction_error) => {
                warn!(cycle = cycle.id, error = %extraction_error, "extraction failed; continuing degraded");
                Self::note_degradation(cycle, &format!("extraction failed: {extraction_error}"));
            }
        }
        self.emit(Event::StageCompleted {
            cycle_id: cycle.id,
            stage: Stage::Extraction,
            ok: cycle.scene.is_some(),
        })
        .await;
    }

    async fn inference_stage(&self, cycle: &mut Cycle) {
        let history = self.store.recent_narratives(self.options.history_context);
        match self.inference.infer(cycle.scene.as_ref(), &history).await {
            Ok(recommendation) => {
                info!(
                    cycle = cycle.id,
                    actions = recommendation.actions.len(),
                    "inference complete"
                );
                cycle.recommendation = Some(recommendation);
            }
            Err(inference_error) => {
                warn!(cycle = cycle.id, error = %inference_error, "inference failed; continuing degraded");
                Self::note_degradation(cycle, &format!("inference failed: {inference_error}"));
            }
        }
        self.emit(Event::StageCompleted {
            cycle_id: cycle.id,
            stage: Stage::Inference,
            ok: cycle.recommendation.is_some(),
        })
        .await;
    }

    async fn action_stage(&self, cycle: &mut Cycle) {
        let actions: Vec<_> = match &cycle.recommendation {
            Some(recommendation) if recommendation.has_actions() => recommendation
                .actions
                .iter()
                .take(self.options.max_actions)
                .cloned()
                .collect(),
            _ => return,
        };

        let results = self
            .executor
            .execute(&actions, self.options.auto_execute, self.options.action_delay)
            .await;

        let ok = !results
            .iter()
            .any(|r| r.status == dp_protocol::ActionStatus::Failed);
        cycle.action_results = results;

        self.emit(Event::StageCompleted {
            cycle_id: cycle.id,
            stage: Stage::Action,
            ok,
        })
        .await;
    }

    fn note_degradation(cycle: &mut Cycle, message: &str) {
        match &mut cycle.error {
            Some(existing) => {
                existing.push_str("; ");
                existing.push_str(message);
            }
            None => cycle.error = Some(message.to_string()),
        }
    }

    /// Success iff every attempted stage succeeded and no executed action
    /// failed; capture failure is handled before this point.
    fn final_status(cycle: &Cycle) -> CycleStatus {
        if cycle.scene.is_none() || cycle.recommendation.is_none() || cycle.has_failed_action() {
            CycleStatus::Partial
        } else {
            CycleStatus::Success
        }
    }

    fn summarize(cycle: &Cycle) -> String {
        match cycle.status {
            CycleStatus::Failed => cycle
                .error
                .clone()
                .unwrap_or_else(|| "capture failed".to_string()),
            _ => format!(
                "{} text spans, {} actions recorded",
                cycle.scene.as_ref().map_or(0, |s| s.text_count()),
                cycle.action_results.len()
            ),
        }
    }

    async fn emit(&self, event: Event) {
        let _ = self.events_tx.send(event).await;
    }
}
