//! Recovery ladder for opening the store.
//!
//! Opening is attempted once per action, in order: first a plain reopen,
//! then delete-and-reopen. A short pause separates attempts so a lock held
//! by another process has time to clear.

use std::fmt;
use std::time::Duration;

/// One rung of the recovery ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Open the existing store as is.
    Reopen,
    /// Delete the store files, then open a fresh one.
    DeleteAndReopen,
}

impl RecoveryAction {
    pub fn is_destructive(self) -> bool {
        matches!(self, Self::DeleteAndReopen)
    }
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reopen => f.write_str("reopen"),
            Self::DeleteAndReopen => f.write_str("delete-and-reopen"),
        }
    }
}

/// Ordered recovery actions with a pause between attempts.
#[derive(Debug, Clone)]
pub struct RecoveryPolicy {
    actions: Vec<RecoveryAction>,
    backoff: Duration,
}

impl RecoveryPolicy {
    /// Build a policy from an ordered list of actions.
    ///
    /// Returns `None` for an empty list: a policy must try at least once.
    pub fn new(actions: Vec<RecoveryAction>, backoff: Duration) -> Option<Self> {
        if actions.is_empty() {
            return None;
        }
        Some(Self { actions, backoff })
    }

    /// Non-destructive attempt first, then one destructive attempt.
    pub fn standard(backoff: Duration) -> Self {
        Self {
            actions: vec![RecoveryAction::Reopen, RecoveryAction::DeleteAndReopen],
            backoff,
        }
    }

    pub fn actions(&self) -> &[RecoveryAction] {
        &self.actions
    }

    pub fn max_attempts(&self) -> usize {
        self.actions.len()
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Run `attempt` once per action until one succeeds.
    ///
    /// Returns the first success, or the error of the last attempt.
    pub fn run<T, E, F>(&self, mut attempt: F) -> Result<T, E>
    where
        E: fmt::Display,
        F: FnMut(RecoveryAction) -> Result<T, E>,
    {
        let last = self.actions.len() - 1;
        let mut index = 0;
        loop {
            let action = self.actions[index];
            match attempt(action) {
                Ok(value) => {
                    if index > 0 {
                        tracing::info!(attempt = index + 1, %action, "Store opened after recovery");
                    }
                    return Ok(value);
                }
                Err(err) if index == last => {
                    tracing::warn!(attempt = index + 1, %action, error = %err, "Recovery exhausted");
                    return Err(err);
                }
                Err(err) => {
                    tracing::warn!(attempt = index + 1, %action, error = %err, "Open attempt failed, retrying");
                }
            }
            if !self.backoff.is_zero() {
                std::thread::sleep(self.backoff);
            }
            index += 1;
        }
    }
}
