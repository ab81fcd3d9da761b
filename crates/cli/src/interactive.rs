//! Interactive key handling.
//!
//! One task owns the terminal's key events and fans them out: F9 triggers
//! a cycle, Esc requests shutdown (between cycles) or declines a pending
//! confirmation, F10 confirms. Fan-out uses a broadcast channel so the
//! trigger routing and the per-action confirmer can listen independently
//! without competing over the event stream.

use async_trait::async_trait;
use crossterm::event::{Event as TermEvent, EventStream, KeyCode, KeyEventKind};
use crossterm::terminal;
use dp_core::actions::Confirmer;
use dp_protocol::{ActionSpec, Op};
use tokio::sync::{broadcast, mpsc};
use tokio_stream::StreamExt;
use tracing::debug;

/// A live interactive session: raw-mode terminal plus the key fan-out.
///
/// Dropping the session restores the terminal.
pub struct KeySession {
    keys_tx: broadcast::Sender<KeyCode>,
}

impl KeySession {
    /// Enable raw mode and start the key reader task.
    pub fn start() -> color_eyre::Result<Self> {
        terminal::enable_raw_mode()?;

        let (keys_tx, _) = broadcast::channel(32);
        let fanout = keys_tx.clone();

        tokio::spawn(async move {
            let mut events = EventStream::new();
            while let Some(event) = events.next().await {
                let Ok(TermEvent::Key(key)) = event else {
                    continue;
                };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                debug!(?key.code, "key pressed");
                if fanout.send(key.code).is_err() {
                    break;
                }
            }
        });

        Ok(Self { keys_tx })
    }

    /// Route trigger keys onto the driving loop's op channel.
    ///
    /// F9 sends `TriggerCycle`; Esc sends `Shutdown`. A shutdown sent while
    /// a cycle is in flight takes effect when the cycle completes.
    pub fn route_ops(&self, ops_tx: mpsc::Sender<Op>) {
        let mut keys = self.keys_tx.subscribe();
        tokio::spawn(async move {
            loop {
                match keys.recv().await {
                    Ok(KeyCode::F(9)) => {
                        if ops_tx.send(Op::TriggerCycle).await.is_err() {
                            break;
                        }
                    }
                    Ok(KeyCode::Esc) => {
                        let _ = ops_tx.send(Op::Shutdown).await;
                        break;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// Per-action confirmer bound to this session's keys.
    pub fn confirmer(&self) -> KeyConfirmer {
        KeyConfirmer {
            keys_tx: self.keys_tx.clone(),
        }
    }
}

impl Drop for KeySession {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Waits for F10 (confirm) or Esc (decline) before each action.
pub struct KeyConfirmer {
    keys_tx: broadcast::Sender<KeyCode>,
}

#[async_trait]
impl Confirmer for KeyConfirmer {
    async fn confirm(&self, action: &ActionSpec) -> bool {
        // Subscribe before prompting so only keys pressed after the prompt
        // count.
        let mut keys = self.keys_tx.subscribe();
        print!(
            "Confirm action: {} (press F10 to execute, Esc to skip)\r\n",
            action.describe()
        );

        loop {
            match keys.recv().await {
                Ok(KeyCode::F(10)) => return true,
                Ok(KeyCode::Esc) => return false,
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return false,
            }
        }
    }
}
