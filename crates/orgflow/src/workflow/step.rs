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

//! Workflow Steps
//!
//! A `WorkflowStep` is one named stage inside a request's approval lifecycle.
//! Steps form an ordered sequence fixed per request kind at
//! workflow-initialization time; at most one step is in progress (the first
//! Pending step), and once a step reaches Approved, Rejected, or Skipped it
//! is immutable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::workflow::state::RequestKind;

/// Well-known step identifiers.
pub mod step_ids {
    pub const CREATED: &str = "created";
    pub const CONTRACTOR_APPROVAL: &str = "contractorApproval";
    pub const COMPANY_APPROVAL: &str = "companyApproval";
    pub const PROPOSAL: &str = "proposal";
    pub const ASSIGNMENT: &str = "assignment";
    pub const PROVISIONING: &str = "provisioning";
}

/// Returns the ordered step sequence for a request kind.
///
/// Sequences are fixed: they are materialized once at workflow creation and
/// never change for the lifetime of the request.
pub fn step_sequence(kind: RequestKind) -> &'static [&'static str] {
    match kind {
        RequestKind::ContractorPersonnel => &[
            step_ids::CREATED,
            step_ids::CONTRACTOR_APPROVAL,
            step_ids::COMPANY_APPROVAL,
            step_ids::PROVISIONING,
        ],
        RequestKind::ResourceAllocation => &[
            step_ids::CREATED,
            step_ids::PROPOSAL,
            step_ids::ASSIGNMENT,
            step_ids::PROVISIONING,
        ],
    }
}

/// Per-step completion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepState {
    /// Not yet acted on.
    Pending,
    /// Completed affirmatively.
    Approved,
    /// Completed negatively, with a recorded reason.
    Rejected,
    /// Completed vacuously because a predecessor's outcome made it moot.
    Skipped,
}

impl StepState {
    /// Returns the string representation of the step state.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepState::Pending => "pending",
            StepState::Approved => "approved",
            StepState::Rejected => "rejected",
            StepState::Skipped => "skipped",
        }
    }

    /// True once the step has reached a final state.
    pub fn is_completed(&self) -> bool {
        !matches!(self, StepState::Pending)
    }
}

impl std::fmt::Display for StepState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One named stage of a request's approval lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// Step identifier, one of [`step_ids`].
    pub step_id: String,
    /// Current completion state.
    pub state: StepState,
    /// When the step became the actionable step.
    pub started_at: Option<DateTime<Utc>>,
    /// When the step reached a final state.
    pub completed_at: Option<DateTime<Utc>>,
    /// Identity of the principal that completed the step.
    pub completed_by: Option<String>,
    /// Free-text reason, set only on rejection.
    pub reason: Option<String>,
}

impl WorkflowStep {
    /// Creates a pending step.
    pub fn new(step_id: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            state: StepState::Pending,
            started_at: None,
            completed_at: None,
            completed_by: None,
            reason: None,
        }
    }

    /// Marks the step approved by `principal`.
    pub fn approve(&mut self, principal: &str, now: DateTime<Utc>) -> Result<(), WorkflowError> {
        self.complete(StepState::Approved, Some(principal), None, now)
    }

    /// Marks the step rejected by `principal` with a reason.
    pub fn reject(
        &mut self,
        principal: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        self.complete(StepState::Rejected, Some(principal), Some(reason), now)
    }

    /// Marks the step skipped. No completing principal is recorded; skips
    /// are a consequence of an earlier step's outcome, not a direct action.
    pub fn skip(&mut self, now: DateTime<Utc>) -> Result<(), WorkflowError> {
        self.complete(StepState::Skipped, None, None, now)
    }

    fn complete(
        &mut self,
        state: StepState,
        principal: Option<&str>,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        if self.state.is_completed() {
            return Err(WorkflowError::StepNotPending {
                step_id: self.step_id.clone(),
            });
        }
        self.state = state;
        self.completed_at = Some(now);
        self.completed_by = principal.map(str::to_string);
        self.reason = reason.map(str::to_string);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_sequences_end_in_provisioning() {
        for kind in [RequestKind::ContractorPersonnel, RequestKind::ResourceAllocation] {
            let sequence = step_sequence(kind);
            assert_eq!(sequence.first(), Some(&step_ids::CREATED));
            assert_eq!(sequence.last(), Some(&step_ids::PROVISIONING));
        }
    }

    #[test]
    fn test_approve_records_principal_and_time() {
        let mut step = WorkflowStep::new(step_ids::COMPANY_APPROVAL);
        let now = Utc::now();
        step.approve("alice", now).unwrap();

        assert_eq!(step.state, StepState::Approved);
        assert_eq!(step.completed_by.as_deref(), Some("alice"));
        assert_eq!(step.completed_at, Some(now));
        assert!(step.reason.is_none());
    }

    #[test]
    fn test_reject_records_reason() {
        let mut step = WorkflowStep::new(step_ids::CONTRACTOR_APPROVAL);
        step.reject("bob", "headcount frozen", Utc::now()).unwrap();

        assert_eq!(step.state, StepState::Rejected);
        assert_eq!(step.reason.as_deref(), Some("headcount frozen"));
    }

    #[test]
    fn test_completed_step_is_immutable() {
        let mut step = WorkflowStep::new(step_ids::COMPANY_APPROVAL);
        step.approve("alice", Utc::now()).unwrap();

        let err = step.reject("bob", "too late", Utc::now()).unwrap_err();
        assert!(matches!(err, WorkflowError::StepNotPending { .. }));
        assert_eq!(step.state, StepState::Approved);
    }

    #[test]
    fn test_skip_records_no_principal() {
        let mut step = WorkflowStep::new(step_ids::PROVISIONING);
        step.skip(Utc::now()).unwrap();

        assert_eq!(step.state, StepState::Skipped);
        assert!(step.completed_by.is_none());
    }
}
