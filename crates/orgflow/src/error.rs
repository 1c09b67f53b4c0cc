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

//! Error Types
//!
//! This module defines the error taxonomy for the workflow and provisioning
//! subsystem:
//!
//! - `WorkflowError`: illegal state transitions and step sequencing violations.
//!   Deterministic, never retried.
//! - `AccessError`: a principal failed every access clause for a step.
//!   Deterministic, never retried.
//! - `MessageFormatError`: unparseable or unsupported provisioning payloads.
//!   Permanent; routed to dead-letter without consuming a retry attempt.
//! - `QueueError`: transport failures reported by the queue collaborator.
//! - `ProcessingError`: outcome of a delivery attempt, carrying retry count
//!   and scheduling information for caller-side logging.

use thiserror::Error;
use uuid::Uuid;

use crate::workflow::state::RequestState;

/// Boxed error type for provisioning action failures.
///
/// Provisioning handlers talk to external systems and surface arbitrary
/// failures; the processor only needs `Display` and `Error` to log and route
/// them.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the request workflow state machine.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The requested coarse-state transition is not an edge of the legal
    /// graph for the request's kind. Carries the attempted pair and the
    /// full set of allowed successors for diagnostics.
    #[error("illegal state change {from} -> {to} (allowed: {allowed:?})")]
    IllegalStateChange {
        from: RequestState,
        to: RequestState,
        allowed: Vec<RequestState>,
    },

    /// No step in the sequence is currently Pending, so there is nothing
    /// left to approve, reject, or skip.
    #[error("request {request_id} has no actionable step")]
    NoActionableStep { request_id: Uuid },

    /// A step was referenced that does not exist in this request's sequence.
    #[error("unknown workflow step: {step_id}")]
    UnknownStep { step_id: String },

    /// A completion was attempted against a step that already reached a
    /// final state. Completed steps are immutable.
    #[error("workflow step {step_id} is not pending")]
    StepNotPending { step_id: String },

    /// Another processing context mutated the same request concurrently.
    /// Retryable: reload the request and reapply the operation.
    #[error("concurrent modification of request {request_id}")]
    ConcurrencyConflict { request_id: Uuid },
}

/// Errors raised by the step access evaluator.
#[derive(Error, Debug)]
pub enum AccessError {
    /// The acting principal satisfied no access clause for the current step.
    /// This is a hard stop, not a retryable condition.
    #[error("principal {identity} is not authorized to act on step {step_id} of request {request_id}")]
    Unauthorized {
        identity: String,
        request_id: Uuid,
        step_id: String,
    },
}

/// Errors raised while decoding a provisioning message payload.
///
/// These are permanent: retrying cannot change a malformed payload, so
/// consumers route them directly to the dead-letter destination.
#[derive(Error, Debug)]
pub enum MessageFormatError {
    /// The payload was not valid JSON or did not match the message schema.
    #[error("unparseable provisioning message: {0}")]
    Unparseable(#[from] serde_json::Error),

    /// The payload declared a version this consumer does not understand.
    #[error("unsupported provisioning message version {version}")]
    UnsupportedVersion { version: i32 },
}

/// Transport errors reported by the queue collaborator.
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("queue send failed: {0}")]
    Send(String),

    #[error("message completion failed: {0}")]
    Complete(String),

    #[error("scheduling redelivery failed: {0}")]
    Schedule(String),

    #[error("dead-letter move failed: {0}")]
    DeadLetter(String),
}

/// Errors raised while dispatching a provisioning message.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The request carries no org-chart project identifier, so there is no
    /// target to provision into.
    #[error("request {request_id} has no org-chart project to provision into")]
    MissingProjectOrg { request_id: Uuid },

    #[error("failed to serialize provisioning message: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Outcome of a failed delivery attempt, surfaced to the receive loop for
/// logging after the processor has already applied the retry decision.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// The action failed and a redelivery was scheduled. The original
    /// message has been completed; the clone carries the updated metadata.
    #[error("provisioning attempt failed; retry {retry_count} scheduled in {delay_secs}s: {source}")]
    RetryScheduled {
        retry_count: u32,
        delay_secs: u64,
        #[source]
        source: BoxError,
    },

    /// The action failed with the retry budget exhausted; the message was
    /// moved to the dead-letter destination.
    #[error("retry budget exhausted after {retry_count} retries; message dead-lettered: {source}")]
    RetriesExhausted {
        retry_count: u32,
        #[source]
        source: BoxError,
    },

    /// The payload could not be decoded; the message was dead-lettered
    /// without consuming a retry attempt.
    #[error(transparent)]
    Malformed(#[from] MessageFormatError),

    /// The queue collaborator itself failed while applying a decision.
    #[error(transparent)]
    Queue(#[from] QueueError),
}
