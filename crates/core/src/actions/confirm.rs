//! Confirmation policies.

use crate::actions::Confirmer;
use async_trait::async_trait;
use dp_protocol::ActionSpec;

/// Confirms every action. Used when `auto_execute` is on, and as the
/// executor-level policy for non-interactive runs.
pub struct AutoConfirmer;

#[async_trait]
impl Confirmer for AutoConfirmer {
    async fn confirm(&self, _action: &ActionSpec) -> bool {
        true
    }
}

/// Declines every action. Used when confirmation is required but no
/// interactive session exists to ask, so actions are recorded as skipped
/// instead of silently executed.
pub struct DeclineConfirmer;

#[async_trait]
impl Confirmer for DeclineConfirmer {
    async fn confirm(&self, _action: &ActionSpec) -> bool {
        false
    }
}
