//! Per-collection subscription state machine.
//!
//! `Unsubscribed -> Subscribing -> Live`, with failures moving through
//! `Retrying` back to `Subscribing` until the retry budget is spent, at which
//! point the session is `Exhausted` and the collection relies on polling.
//! The machine only decides; the manager performs the I/O.

use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Unsubscribed,
    Subscribing,
    Live,
    Retrying { attempt: u32 },
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub backoff: Duration,
    /// Failed subscribes per episode, the first one included, before falling back
    pub max_attempts: u32,
    pub reset_after_failures: u32,
}

/// What the manager should do after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStep {
    Retry {
        attempt: u32,
        delay: Duration,
        /// Failures have piled up enough to warrant a connection reset
        reset_connection: bool,
    },
    /// Retries are spent; emitted once per episode.
    FallBack,
    Ignore,
}

#[derive(Debug, Clone)]
pub struct SessionMachine {
    state: SessionState,
    policy: RetryPolicy,
    failures: u32,
}

impl SessionMachine {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            state: SessionState::Unsubscribed,
            policy,
            failures: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns true when a subscribe call should be issued.
    pub fn start(&mut self) -> bool {
        if self.state != SessionState::Unsubscribed {
            return false;
        }
        self.state = SessionState::Subscribing;
        true
    }

    pub fn on_subscribed(&mut self) {
        if self.state == SessionState::Subscribing {
            self.state = SessionState::Live;
        }
    }

    /// A delivered update heals the whole retry budget.
    pub fn on_update(&mut self) {
        if self.state == SessionState::Live {
            self.failures = 0;
        }
    }

    pub fn on_failure(&mut self) -> FailureStep {
        if !matches!(self.state, SessionState::Subscribing | SessionState::Live) {
            return FailureStep::Ignore;
        }

        self.failures += 1;
        if self.failures >= self.policy.max_attempts {
            self.state = SessionState::Exhausted;
            return FailureStep::FallBack;
        }

        self.state = SessionState::Retrying {
            attempt: self.failures,
        };
        FailureStep::Retry {
            attempt: self.failures,
            delay: self.policy.backoff,
            reset_connection: self.failures == self.policy.reset_after_failures,
        }
    }

    /// Returns true when the pending retry should subscribe now.
    pub fn on_retry_timer(&mut self) -> bool {
        if !matches!(self.state, SessionState::Retrying { .. }) {
            return false;
        }
        self.state = SessionState::Subscribing;
        true
    }

    /// Manual remediation: re-arms a retrying or exhausted session with a
    /// fresh budget. Returns true when a subscribe call should be issued.
    pub fn rearm(&mut self) -> bool {
        if !matches!(
            self.state,
            SessionState::Retrying { .. } | SessionState::Exhausted
        ) {
            return false;
        }
        self.failures = 0;
        self.state = SessionState::Subscribing;
        true
    }

    pub fn stop(&mut self) {
        self.state = SessionState::Unsubscribed;
        self.failures = 0;
    }
}
