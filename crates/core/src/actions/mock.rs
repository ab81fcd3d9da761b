//! Test doubles for the action execution seams.

use crate::actions::{ActionError, Confirmer, InputDriver};
use async_trait::async_trait;
use dp_protocol::ActionSpec;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Driver that counts invocations and optionally fails at scripted
/// positions (0-based, counted across the driver's lifetime).
pub struct CountingDriver {
    invocations: AtomicUsize,
    fail_at: Vec<usize>,
}

impl CountingDriver {
    pub fn succeeding() -> Self {
        Self {
            invocations: AtomicUsize::new(0),
            fail_at: Vec::new(),
        }
    }

    pub fn failing_at(positions: &[usize]) -> Self {
        Self {
            invocations: AtomicUsize::new(0),
            fail_at: positions.to_vec(),
        }
    }

    /// Number of `apply` calls observed so far.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InputDriver for CountingDriver {
    async fn apply(&self, _action: &ActionSpec) -> Result<(), ActionError> {
        let position = self.invocations.fetch_add(1, Ordering::SeqCst);
        if self.fail_at.contains(&position) {
            return Err(ActionError::CommandFailed(format!(
                "injected failure at position {position}"
            )));
        }
        Ok(())
    }
}

/// Confirmer answering from a script; answers past the script's end repeat
/// the last entry (or decline when the script is empty).
pub struct ScriptedConfirmer {
    answers: Vec<bool>,
    prompts: AtomicUsize,
    seen: Mutex<Vec<ActionSpec>>,
}

impl ScriptedConfirmer {
    pub fn with_answers(answers: Vec<bool>) -> Self {
        Self {
            answers,
            prompts: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn decline_all() -> Self {
        Self::with_answers(vec![false])
    }

    pub fn accept_all() -> Self {
        Self::with_answers(vec![true])
    }

    /// Number of confirmation prompts shown.
    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    /// Actions the user was prompted about, in order.
    pub fn seen(&self) -> Vec<ActionSpec> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn confirm(&self, action: &ActionSpec) -> bool {
        let index = self.prompts.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(action.clone());
        }
        match self.answers.get(index) {
            Some(answer) => *answer,
            None => *self.answers.last().unwrap_or(&false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counting_driver_scripted_failures() {
        let driver = CountingDriver::failing_at(&[1]);
        assert!(driver.apply(&ActionSpec::None).await.is_ok());
        assert!(driver.apply(&ActionSpec::None).await.is_err());
        assert!(driver.apply(&ActionSpec::None).await.is_ok());
        assert_eq!(driver.invocations(), 3);
    }

    #[tokio::test]
    async fn test_scripted_confirmer_repeats_last_answer() {
        let confirmer = ScriptedConfirmer::with_answers(vec![true, false]);
        assert!(confirmer.confirm(&ActionSpec::None).await);
        assert!(!confirmer.confirm(&ActionSpec::None).await);
        assert!(!confirmer.confirm(&ActionSpec::None).await);
        assert_eq!(confirmer.prompts(), 3);
        assert_eq!(confirmer.seen().len(), 3);
    }
}
