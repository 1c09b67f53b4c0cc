/*
 *  Copyright 2025-2026 Colliery Software
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

//! Workflow Events
//!
//! Notification records emitted by the request workflow for downstream
//! listeners: workflow-step completion handlers, second-opinion closure,
//! cleanup of ephemeral artifacts. Events are append-only audit records;
//! listeners observe transitions, they do not veto them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflow::state::{RequestKind, RequestState};
use crate::workflow::step::StepState;

/// Enumeration of workflow event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowEventType {
    /// The request's coarse state moved along its transition graph.
    StateChanged,
    /// The actionable step was approved.
    StepApproved,
    /// The actionable step was rejected.
    StepRejected,
    /// A step was skipped because a predecessor's outcome made it moot.
    StepSkipped,
}

impl WorkflowEventType {
    /// Returns the string representation of the event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowEventType::StateChanged => "state_changed",
            WorkflowEventType::StepApproved => "step_approved",
            WorkflowEventType::StepRejected => "step_rejected",
            WorkflowEventType::StepSkipped => "step_skipped",
        }
    }

    /// Parses an event type from its string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "state_changed" => Some(WorkflowEventType::StateChanged),
            "step_approved" => Some(WorkflowEventType::StepApproved),
            "step_rejected" => Some(WorkflowEventType::StepRejected),
            "step_skipped" => Some(WorkflowEventType::StepSkipped),
            _ => None,
        }
    }
}

impl std::fmt::Display for WorkflowEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record of a coarse-state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateChangedEvent {
    /// The request that transitioned.
    pub request_id: Uuid,
    /// The request's kind.
    pub kind: RequestKind,
    /// State before the transition.
    pub from: RequestState,
    /// State after the transition.
    pub to: RequestState,
    /// When the transition was applied.
    pub occurred_at: DateTime<Utc>,
}

/// Record of a step completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepCompletedEvent {
    /// The request the step belongs to.
    pub request_id: Uuid,
    /// Identifier of the completed step.
    pub step_id: String,
    /// Final state of the step.
    pub outcome: StepState,
    /// Identity of the completing principal, when one acted directly.
    pub completed_by: Option<String>,
    /// When the step completed.
    pub occurred_at: DateTime<Utc>,
}

/// Observer for workflow transitions.
///
/// Listener failures must not block the transition; implementations are
/// expected to handle their own errors.
pub trait WorkflowListener: Send + Sync {
    /// Called after a coarse-state transition has been applied.
    fn on_state_changed(&self, event: &StateChangedEvent);

    /// Called after a step reaches a final state.
    fn on_step_completed(&self, _event: &StepCompletedEvent) {}
}
