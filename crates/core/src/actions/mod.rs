//! Action execution.
//!
//! The executor consumes a recommendation's actions, applies the
//! confirmation policy, and invokes the input-synthesis driver. One
//! failing or declined action never aborts the rest of the batch.

pub mod confirm;
pub mod executor;
pub mod mock;
pub mod xdotool;

pub use confirm::{AutoConfirmer, DeclineConfirmer};
pub use executor::ActionExecutor;
pub use mock::{CountingDriver, ScriptedConfirmer};
pub use xdotool::XdotoolDriver;

use async_trait::async_trait;
use dp_protocol::ActionSpec;
use thiserror::Error;

/// Errors from the input-synthesis primitive.
#[derive(Error, Debug)]
pub enum ActionError {
    /// No input-synthesis tool could be found.
    #[error("No input backend available: {0}")]
    NoBackend(String),

    /// The input tool ran but failed.
    #[error("Input command failed: {0}")]
    CommandFailed(String),
}

/// Input-synthesis primitive: applies one action to the desktop.
///
/// Drivers only ever see `Click`, `TypeText`, and `KeyPress`; `Wait` and
/// `None` are handled inside the executor.
#[async_trait]
pub trait InputDriver: Send + Sync {
    async fn apply(&self, action: &ActionSpec) -> Result<(), ActionError>;
}

/// Per-action confirmation policy.
///
/// Returning `false` records the action as skipped without invoking the
/// driver; it never aborts the batch.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, action: &ActionSpec) -> bool;
}
