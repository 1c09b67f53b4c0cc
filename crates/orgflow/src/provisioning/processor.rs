/*
 *  Copyright 2025 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! # Reliable Message Processing
//!
//! At-least-once delivery handling with a bounded, linearly backed-off
//! retry budget. One delivery is one attempt; a failed attempt schedules a
//! clone of the message for redelivery (carrying advanced retry metadata)
//! and acknowledges the original, so a crash between the two leaves the
//! original in the queue rather than losing it.
//!
//! The retry decision is an explicit value, not exception control flow:
//! [`ReliableMessageProcessor::decide`] is a pure function from (message
//! metadata, attempt outcome) to [`RetryDecision`], testable without a
//! queue, and `process` is the thin layer that runs the attempt under a
//! cancellation token and applies the decision against the transport.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::{BoxError, ProcessingError};
use crate::provisioning::queue::{ProvisioningQueue, QueuedMessage};

/// Default retry budget: 5 redeliveries, 10/20/30/40/50s apart (150s
/// cumulative) before dead-lettering.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default linear backoff increment.
pub const DEFAULT_DELAY_INCREMENT: Duration = Duration::from_secs(10);

/// Retry budget and backoff shape.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Redeliveries scheduled before the message is dead-lettered.
    pub max_retries: u32,
    /// Linear backoff unit; retry N waits `delay_increment × N`.
    pub delay_increment: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay_increment: DEFAULT_DELAY_INCREMENT,
        }
    }
}

impl RetryPolicy {
    /// Delay before the Nth redelivery.
    pub fn delay_for(&self, retry_count: u32) -> Duration {
        self.delay_increment * retry_count
    }
}

/// What happened when the provisioning action ran.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// The action finished successfully.
    Succeeded,
    /// The action failed; the failure is carried for logging and routing.
    Failed(BoxError),
    /// Shutdown was observed before the action finished. The attempt does
    /// not count against the retry budget.
    Cancelled,
}

impl AttemptOutcome {
    fn into_failure(self) -> BoxError {
        match self {
            AttemptOutcome::Failed(source) => source,
            // Only failed outcomes route through the error paths; this arm
            // keeps the conversion total.
            AttemptOutcome::Succeeded | AttemptOutcome::Cancelled => "attempt did not fail".into(),
        }
    }
}

/// What to do with the delivery after an attempt.
#[derive(Debug)]
pub enum RetryDecision {
    /// Acknowledge the delivery; the work is done.
    Completed,
    /// Schedule `message` (the retry clone) after `delay`, then acknowledge
    /// the original delivery.
    ScheduleRetry {
        delay: Duration,
        message: QueuedMessage,
    },
    /// Move the delivery to the dead-letter destination.
    DeadLetter { reason: String },
    /// Touch nothing; the broker will redeliver after its lock expires.
    NotAttempted,
}

/// Drives delivery attempts and applies retry decisions to the queue.
pub struct ReliableMessageProcessor {
    queue: Arc<dyn ProvisioningQueue>,
    policy: RetryPolicy,
}

impl ReliableMessageProcessor {
    /// Creates a processor with the default retry policy.
    pub fn new(queue: Arc<dyn ProvisioningQueue>) -> Self {
        Self::with_policy(queue, RetryPolicy::default())
    }

    /// Creates a processor with an explicit retry policy.
    pub fn with_policy(queue: Arc<dyn ProvisioningQueue>, policy: RetryPolicy) -> Self {
        Self { queue, policy }
    }

    /// Maps an attempt outcome to the decision for this delivery.
    ///
    /// Pure: reads only the message's retry metadata and the policy. A
    /// failure with remaining budget yields the retry clone and its linear
    /// backoff delay; a failure with the budget spent yields dead-letter;
    /// cancellation touches nothing.
    pub fn decide(&self, message: &QueuedMessage, outcome: &AttemptOutcome) -> RetryDecision {
        match outcome {
            AttemptOutcome::Succeeded => RetryDecision::Completed,
            AttemptOutcome::Cancelled => RetryDecision::NotAttempted,
            AttemptOutcome::Failed(source) => {
                let retry_count = message.retry_count();
                if retry_count < self.policy.max_retries {
                    let new_count = retry_count + 1;
                    RetryDecision::ScheduleRetry {
                        delay: self.policy.delay_for(new_count),
                        message: message.retry_clone(new_count),
                    }
                } else {
                    RetryDecision::DeadLetter {
                        reason: format!(
                            "provisioning failed after {retry_count} retries: {source}"
                        ),
                    }
                }
            }
        }
    }

    /// Runs one delivery attempt and applies the resulting decision.
    ///
    /// The attempt races against the cancellation token; cancellation
    /// observed before or during the attempt leaves the message
    /// unacknowledged for broker redelivery and advances no counters.
    /// Failures are re-raised after the decision has been applied so the
    /// receive loop can log them with full retry context.
    pub async fn process<F>(
        &self,
        message: QueuedMessage,
        cancellation: &CancellationToken,
        attempt: F,
    ) -> Result<(), ProcessingError>
    where
        F: Future<Output = Result<(), BoxError>> + Send,
    {
        if cancellation.is_cancelled() {
            debug!(
                sequence_number = message.sequence_number,
                "Shutdown before attempt; leaving message for redelivery"
            );
            return Ok(());
        }

        let outcome = tokio::select! {
            _ = cancellation.cancelled() => AttemptOutcome::Cancelled,
            result = attempt => match result {
                Ok(()) => AttemptOutcome::Succeeded,
                Err(source) => AttemptOutcome::Failed(source),
            },
        };

        let decision = self.decide(&message, &outcome);
        self.apply(message, outcome, decision).await
    }

    async fn apply(
        &self,
        message: QueuedMessage,
        outcome: AttemptOutcome,
        decision: RetryDecision,
    ) -> Result<(), ProcessingError> {
        match decision {
            RetryDecision::Completed => {
                self.queue.complete(&message).await?;
                debug!(
                    sequence_number = message.sequence_number,
                    retry_count = message.retry_count(),
                    "Provisioning attempt succeeded"
                );
                Ok(())
            }
            RetryDecision::NotAttempted => {
                debug!(
                    sequence_number = message.sequence_number,
                    "Attempt cancelled; message left for redelivery"
                );
                Ok(())
            }
            RetryDecision::ScheduleRetry {
                delay,
                message: retry,
            } => {
                let retry_count = retry.retry_count();
                warn!(
                    sequence_number = message.sequence_number,
                    original_sequence_number = message.original_sequence_number(),
                    retry_count,
                    delay_secs = delay.as_secs(),
                    "Provisioning attempt failed; scheduling redelivery"
                );
                // Schedule before completing: a crash in between leaves a
                // duplicate, never a lost message.
                self.queue.schedule(retry, delay).await?;
                self.queue.complete(&message).await?;
                Err(ProcessingError::RetryScheduled {
                    retry_count,
                    delay_secs: delay.as_secs(),
                    source: outcome.into_failure(),
                })
            }
            RetryDecision::DeadLetter { reason } => {
                let retry_count = message.retry_count();
                error!(
                    sequence_number = message.sequence_number,
                    original_sequence_number = message.original_sequence_number(),
                    retry_count,
                    "Retry budget exhausted; dead-lettering message"
                );
                self.queue.dead_letter(&message, &reason).await?;
                Err(ProcessingError::RetriesExhausted {
                    retry_count,
                    source: outcome.into_failure(),
                })
            }
        }
    }
}
