//! Console rendering of orchestrator events.

use colored::Colorize;
use dp_protocol::{CycleStatus, Event, Stage};
use std::io::Write;
use tokio::sync::mpsc::Receiver;

/// Print events until the channel closes.
///
/// Lines end with `\r\n` because the interactive mode runs with the
/// terminal in raw mode.
pub async fn render_events(mut events_rx: Receiver<Event>) {
    while let Some(event) = events_rx.recv().await {
        let line = match event {
            Event::CycleStarted { cycle_id } => {
                format!("{} cycle {cycle_id} started", "▶".cyan())
            }
            Event::StageCompleted { stage, ok, .. } => {
                let mark = if ok { "✓".green() } else { "⚠".yellow() };
                format!("  {mark} {}", stage_name(stage))
            }
            Event::CycleCompleted {
                cycle_id,
                status,
                summary,
            } => {
                let status_label = match status {
                    CycleStatus::Success => "SUCCESS".green().bold(),
                    CycleStatus::Partial => "PARTIAL".yellow().bold(),
                    CycleStatus::Failed => "FAILED".red().bold(),
                };
                format!("{} cycle {cycle_id} {status_label}: {summary}", "■".cyan())
            }
            Event::PersistenceFailed { cycle_id, error } => {
                format!(
                    "{} cycle {cycle_id} could not be persisted: {error}",
                    "✗".red().bold()
                )
            }
        };

        print!("{line}\r\n");
        let _ = std::io::stdout().flush();
    }
}

fn stage_name(stage: Stage) -> &'static str {
    match stage {
        Stage::Capture => "capture",
        Stage::Extraction => "extraction",
        Stage::Inference => "inference",
        Stage::Action => "actions",
        Stage::Persistence => "persistence",
    }
}
