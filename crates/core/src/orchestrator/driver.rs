//! The serial driving loop.
//!
//! Two external signals can start a cycle: an `Op::TriggerCycle` from the
//! frontend (key trigger) or an optional timer tick. Both feed the same
//! serial entry point, so cycles never overlap. Triggers that arrive while
//! a cycle is in flight are coalesced into at most one queued run.

use crate::orchestrator::Orchestrator;
use anyhow::Result;
use dp_protocol::Op;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, info};

/// Drive the orchestrator until shutdown.
///
/// Returns when:
/// - `Op::Shutdown` is received (between cycles; a cycle in flight always
///   completes and is appended first)
/// - the op channel closes
/// - a cycle fails to persist (the error propagates; no silent data loss)
pub async fn run_loop(
    mut orchestrator: Orchestrator,
    mut ops_rx: Receiver<Op>,
    interval: Option<Duration>,
) -> Result<Orchestrator> {
    let mut ticker = interval.map(|period| {
        let mut t = tokio::time::interval(period);
        t.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        t
    });

    loop {
        let op = match &mut ticker {
            Some(ticker) => tokio::select! {
                maybe_op = ops_rx.recv() => match maybe_op {
                    Some(op) => op,
                    None => break,
                },
                _ = ticker.tick() => Op::TriggerCycle,
            },
            None => match ops_rx.recv().await {
                Some(op) => op,
                None => break,
            },
        };

        match op {
            Op::Shutdown => {
                info!("shutdown requested");
                break;
            }
            Op::TriggerCycle => {
                orchestrator.run_cycle().await?;

                // Coalesce triggers that queued up while the cycle ran; a
                // queued shutdown still wins.
                let mut drained = 0usize;
                loop {
                    match ops_rx.try_recv() {
                        Ok(Op::TriggerCycle) => drained += 1,
                        Ok(Op::Shutdown) => {
                            info!("shutdown requested");
                            return Ok(orchestrator);
                        }
                        Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                    }
                }
                if drained > 0 {
                    debug!(drained, "coalesced queued triggers");
                }
            }
        }
    }

    Ok(orchestrator)
}
