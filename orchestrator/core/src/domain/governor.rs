// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Execution Governor
//!
//! Gates every outbound model call through two checks:
//!
//! 1. a **pause gate** driven by an external [`PauseSignal`] that is re-read on
//!    every poll, and
//! 2. a **hard call ceiling** enforced with count-then-compare ordering.
//!
//! ## Call Start Sequence
//! | Step | Action |
//! |------|--------|
//! | 1 | Poll the pause signal, suspend `poll_interval` while present |
//! | 2 | Increment the call counter |
//! | 3 | Log the counter value and every prompt |
//! | 4 | Fail with [`GovernorError::CallLimitExceeded`] if `count > max_calls` |
//!
//! The (max_calls + 1)-th attempt is the one that fails, and it is still
//! counted. Once breached, every later call fails too until [`ExecutionGovernor::reset`].
//!
//! The pause signal is single-node by nature when backed by a file. Any shared
//! flag store can be substituted behind the same trait.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Ceiling used when nothing is configured.
pub const DEFAULT_MAX_CALLS: u64 = 10;

/// Interval between pause signal polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Shortest accepted poll interval; smaller values are raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Reference name of the pause control file.
pub const DEFAULT_PAUSE_FILE: &str = "pause-agents.txt";

/// External "paused" condition. Implementations must not cache: every call
/// reflects the state of the underlying signal at that moment.
#[async_trait]
pub trait PauseSignal: Send + Sync {
    async fn is_paused(&self) -> bool;

    /// Human-readable location of the signal, used in log records.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GovernorError {
    #[error("Maximum model calls exceeded: call #{call_count} exceeds limit of {max_calls}")]
    CallLimitExceeded { call_count: u64, max_calls: u64 },
}

/// Observable state of the pause gate at the moment it is polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GovernorState {
    Running,
    Paused,
}

pub struct ExecutionGovernor {
    call_count: AtomicU64,
    max_calls: AtomicU64,
    poll_interval: Duration,
    pause_signal: Arc<dyn PauseSignal>,
}

impl ExecutionGovernor {
    pub fn new(max_calls: u64, pause_signal: Arc<dyn PauseSignal>) -> Self {
        Self::with_poll_interval(max_calls, pause_signal, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(
        max_calls: u64,
        pause_signal: Arc<dyn PauseSignal>,
        poll_interval: Duration,
    ) -> Self {
        if poll_interval < MIN_POLL_INTERVAL {
            warn!(
                requested = ?poll_interval,
                minimum = ?MIN_POLL_INTERVAL,
                "Pause poll interval too small, using minimum"
            );
        }
        Self {
            call_count: AtomicU64::new(0),
            max_calls: AtomicU64::new(max_calls),
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            pause_signal,
        }
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn max_calls(&self) -> u64 {
        self.max_calls.load(Ordering::SeqCst)
    }

    /// Change the ceiling. Calls currently waiting at the pause gate are
    /// checked against the new value once released.
    pub fn set_max_calls(&self, max_calls: u64) {
        self.max_calls.store(max_calls, Ordering::SeqCst);
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Zero the counter so the governor admits calls again.
    pub fn reset(&self) {
        self.call_count.store(0, Ordering::SeqCst);
        info!("Model call counter reset");
    }

    pub async fn state(&self) -> GovernorState {
        if self.pause_signal.is_paused().await {
            GovernorState::Paused
        } else {
            GovernorState::Running
        }
    }

    /// Gate one model call. Suspends for as long as the pause signal is
    /// present; there is no timeout.
    pub async fn on_call_start(&self, prompts: &[String]) -> Result<(), GovernorError> {
        self.wait_while_paused().await;

        // Single atomic RMW keeps the count exact under concurrent callers.
        let call_count = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::counter!("overseer_model_calls_total").increment(1);

        info!(call_number = call_count, prompt_count = prompts.len(), "MODEL CALL #{}", call_count);
        for (index, prompt) in prompts.iter().enumerate() {
            info!(call_number = call_count, index, prompt = %prompt, "Prompt");
        }

        let max_calls = self.max_calls();
        if call_count > max_calls {
            metrics::counter!("overseer_call_limit_breaches_total").increment(1);
            error!(
                call_number = call_count,
                max_calls, "Max model call limit reached. Stopping execution."
            );
            return Err(GovernorError::CallLimitExceeded {
                call_count,
                max_calls,
            });
        }

        Ok(())
    }

    /// Record the content of a completed call.
    pub fn on_call_end(&self, response: &impl std::fmt::Display) {
        info!(response = %response, "MODEL RESPONSE");
    }

    async fn wait_while_paused(&self) {
        while self.pause_signal.is_paused().await {
            warn!(
                signal = %self.pause_signal.describe(),
                "Execution paused. Waiting for pause signal to be removed..."
            );
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
