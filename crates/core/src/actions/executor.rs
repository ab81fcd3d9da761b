//! The action executor.

use crate::actions::{Confirmer, InputDriver};
use dp_protocol::{ActionResult, ActionSpec};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Executes a batch of actions under the confirmation policy.
///
/// Guarantees, per batch:
/// - output order and length match the input (one `ActionResult` per spec)
/// - a declined confirmation records `SkippedUnconfirmed` and the driver is
///   not invoked for that action
/// - a driver failure records `Failed` with the underlying message and the
///   batch continues
/// - no action is retried; a retry is a new cycle
pub struct ActionExecutor {
    driver: Arc<dyn InputDriver>,
    confirmer: Arc<dyn Confirmer>,
}

impl ActionExecutor {
    pub fn new(driver: Arc<dyn InputDriver>, confirmer: Arc<dyn Confirmer>) -> Self {
        Self { driver, confirmer }
    }

    /// Run the batch in order.
    ///
    /// # Arguments
    ///
    /// * `actions` - ordered action specs from the recommendation
    /// * `auto_execute` - skip per-action confirmation when true
    /// * `delay` - pacing sleep after each executed action
    pub async fn execute(
        &self,
        actions: &[ActionSpec],
        auto_execute: bool,
        delay: Duration,
    ) -> Vec<ActionResult> {
        let mut results = Vec::with_capacity(actions.len());

        for (index, action) in actions.iter().enumerate() {
            if !auto_execute && !self.confirmer.confirm(action).await {
                info!(index, action = %action.describe(), "action declined");
                results.push(ActionResult::skipped(action.clone()));
                continue;
            }

            let result = self.run_one(action).await;
            let executed = result.error.is_none();
            if let Some(error) = &result.error {
                warn!(index, action = %action.describe(), error, "action failed");
            } else {
                info!(index, action = %action.describe(), "action executed");
            }
            results.push(result);

            // Pacing between executed actions; failures move on immediately.
            if executed && index + 1 < actions.len() && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        results
    }

    async fn run_one(&self, action: &ActionSpec) -> ActionResult {
        match action {
            ActionSpec::Click { .. } | ActionSpec::TypeText { .. } | ActionSpec::KeyPress { .. } => {
                match self.driver.apply(action).await {
                    Ok(()) => ActionResult::executed(action.clone()),
                    Err(error) => ActionResult::failed(action.clone(), error.to_string()),
                }
            }
            ActionSpec::Wait { ms } => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                ActionResult::executed(action.clone())
            }
            ActionSpec::None => ActionResult::executed(action.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::mock::{CountingDriver, ScriptedConfirmer};
    use crate::actions::AutoConfirmer;
    use dp_protocol::ActionStatus;

    fn clicks(n: usize) -> Vec<ActionSpec> {
        (0..n)
            .map(|i| ActionSpec::Click {
                x: i as u32 * 10,
                y: 5,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_length() {
        let driver = Arc::new(CountingDriver::succeeding());
        let executor = ActionExecutor::new(driver.clone(), Arc::new(AutoConfirmer));

        let actions = clicks(3);
        let results = executor
            .execute(&actions, true, Duration::ZERO)
            .await;

        assert_eq!(results.len(), 3);
        for (result, action) in results.iter().zip(&actions) {
            assert_eq!(&result.action, action);
            assert_eq!(result.status, ActionStatus::Executed);
        }
        assert_eq!(driver.invocations(), 3);
    }

    #[tokio::test]
    async fn test_failing_action_does_not_truncate_batch() {
        // 2nd action fails; 1 and 3..N still run
        let driver = Arc::new(CountingDriver::failing_at(&[1]));
        let executor = ActionExecutor::new(driver.clone(), Arc::new(AutoConfirmer));

        let actions = clicks(4);
        let results = executor.execute(&actions, true, Duration::ZERO).await;

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].status, ActionStatus::Executed);
        assert_eq!(results[1].status, ActionStatus::Failed);
        assert!(results[1].error.as_deref().is_some_and(|e| e.contains("injected")));
        assert_eq!(results[2].status, ActionStatus::Executed);
        assert_eq!(results[3].status, ActionStatus::Executed);
        assert_eq!(driver.invocations(), 4);
    }

    #[tokio::test]
    async fn test_declined_actions_never_reach_driver() {
        let driver = Arc::new(CountingDriver::succeeding());
        let confirmer = Arc::new(ScriptedConfirmer::decline_all());
        let executor = ActionExecutor::new(driver.clone(), confirmer);

        let actions = clicks(3);
        let results = executor.execute(&actions, false, Duration::ZERO).await;

        assert_eq!(results.len(), 3);
        assert!(results
            .iter()
            .all(|r| r.status == ActionStatus::SkippedUnconfirmed));
        assert_eq!(driver.invocations(), 0);
    }

    #[tokio::test]
    async fn test_decline_one_continues_with_rest() {
        let driver = Arc::new(CountingDriver::succeeding());
        let confirmer = Arc::new(ScriptedConfirmer::with_answers(vec![true, false, true]));
        let executor = ActionExecutor::new(driver.clone(), confirmer);

        let actions = clicks(3);
        let results = executor.execute(&actions, false, Duration::ZERO).await;

        assert_eq!(results[0].status, ActionStatus::Executed);
        assert_eq!(results[1].status, ActionStatus::SkippedUnconfirmed);
        assert_eq!(results[2].status, ActionStatus::Executed);
        assert_eq!(driver.invocations(), 2);
    }

    #[tokio::test]
    async fn test_auto_execute_bypasses_confirmer() {
        let driver = Arc::new(CountingDriver::succeeding());
        let confirmer = Arc::new(ScriptedConfirmer::decline_all());
        let executor = ActionExecutor::new(driver.clone(), confirmer.clone());

        let results = executor.execute(&clicks(2), true, Duration::ZERO).await;

        assert!(results.iter().all(|r| r.status == ActionStatus::Executed));
        assert_eq!(confirmer.prompts(), 0);
    }

    #[tokio::test]
    async fn test_wait_and_none_do_not_touch_driver() {
        let driver = Arc::new(CountingDriver::succeeding());
        let executor = ActionExecutor::new(driver.clone(), Arc::new(AutoConfirmer));

        let actions = vec![ActionSpec::Wait { ms: 1 }, ActionSpec::None];
        let results = executor.execute(&actions, true, Duration::ZERO).await;

        assert!(results.iter().all(|r| r.status == ActionStatus::Executed));
        assert_eq!(driver.invocations(), 0);
    }
}
