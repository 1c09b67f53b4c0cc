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

//! # Request Workflow
//!
//! The step-based state machine governing how a resource-allocation request
//! moves from creation to being written into the external org-chart system.
//!
//! A `RequestWorkflow` owns its request and the ordered step list
//! materialized for the request's kind. It enforces two invariants:
//!
//! - The coarse state only moves along the legal transition graph for its
//!   kind; any other transition fails with
//!   [`WorkflowError::IllegalStateChange`], never a silent no-op.
//! - At most one step is actionable at a time (the first Pending step);
//!   completed steps are immutable, and an early rejection skips the
//!   remaining approval steps rather than leaving them Pending.
//!
//! Transitions and step completions are computation-only; persistence and
//! downstream reactions happen through registered [`WorkflowListener`]s.
//! No two concurrent operations may mutate the same request's steps - the
//! `&mut self` receivers enforce exclusive ownership in-process, and a
//! backing store's optimistic-concurrency failure surfaces as the retryable
//! [`WorkflowError::ConcurrencyConflict`].

pub mod events;
pub mod state;
pub mod step;

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::WorkflowError;
use crate::models::Request;
use events::{StateChangedEvent, StepCompletedEvent, WorkflowListener};
use state::RequestState;
use step::{step_ids, step_sequence, StepState, WorkflowStep};

/// State machine wrapping one request and its ordered step list.
pub struct RequestWorkflow {
    request: Request,
    steps: Vec<WorkflowStep>,
    listeners: Vec<Arc<dyn WorkflowListener>>,
}

impl RequestWorkflow {
    /// Initializes the workflow for a request, materializing the step
    /// sequence for its kind.
    ///
    /// The leading `created` step completes immediately, attributed to the
    /// request's creator; the next step in the sequence becomes actionable.
    pub fn new(request: Request) -> Self {
        let now = Utc::now();
        let mut steps: Vec<WorkflowStep> = step_sequence(request.kind)
            .iter()
            .copied()
            .map(WorkflowStep::new)
            .collect();

        if let Some(first) = steps.first_mut() {
            // Creation is its own completion; the creator already acted.
            first.started_at = Some(now);
            first.state = StepState::Approved;
            first.completed_at = Some(now);
            first.completed_by = Some(request.created_by.clone());
        }
        if let Some(next) = steps.get_mut(1) {
            next.started_at = Some(now);
        }

        debug!(
            request_id = %request.id,
            kind = %request.kind,
            steps = steps.len(),
            "Workflow initialized"
        );

        Self {
            request,
            steps,
            listeners: Vec::new(),
        }
    }

    /// Registers a listener for state-change and step-completion events.
    pub fn register_listener(&mut self, listener: Arc<dyn WorkflowListener>) {
        self.listeners.push(listener);
    }

    /// The request under workflow control.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The full step sequence, in order.
    pub fn steps(&self) -> &[WorkflowStep] {
        &self.steps
    }

    /// The only actionable step: the first Pending one, if any.
    pub fn current_step(&self) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.state == StepState::Pending)
    }

    /// True once the provisioning step is the actionable step.
    pub fn ready_to_provision(&self) -> bool {
        self.current_step()
            .map(|s| s.step_id == step_ids::PROVISIONING)
            .unwrap_or(false)
    }

    /// Moves the request's coarse state to `target`.
    ///
    /// The target must be a direct successor of the current state in the
    /// graph for the request's kind; otherwise this fails with
    /// [`WorkflowError::IllegalStateChange`] carrying the attempted pair and
    /// the allowed successors. On success the state-changed event is
    /// delivered to all registered listeners and returned.
    pub fn transition_to(&mut self, target: RequestState) -> Result<StateChangedEvent, WorkflowError> {
        let from = self.request.state;
        if !from.can_transition_to(self.request.kind, target) {
            return Err(WorkflowError::IllegalStateChange {
                from,
                to: target,
                allowed: from.successors(self.request.kind).to_vec(),
            });
        }

        self.request.state = target;
        info!(
            request_id = %self.request.id,
            kind = %self.request.kind,
            "Request state change: {} -> {}",
            from,
            target
        );

        let event = StateChangedEvent {
            request_id: self.request.id,
            kind: self.request.kind,
            from,
            to: target,
            occurred_at: Utc::now(),
        };
        for listener in &self.listeners {
            listener.on_state_changed(&event);
        }
        Ok(event)
    }

    /// Approves the actionable step and advances the step pointer.
    pub fn approve_current_step(&mut self, principal: &str) -> Result<(), WorkflowError> {
        let now = Utc::now();
        let index = self.current_step_index()?;
        self.steps[index].approve(principal, now)?;
        self.emit_step_completed(index);

        if let Some(next) = self.steps.get_mut(index + 1) {
            next.started_at = Some(now);
        }
        Ok(())
    }

    /// Rejects the actionable step and skips every later Pending step.
    ///
    /// A rejection makes the remaining approvals moot; leaving them Pending
    /// would keep the workflow actionable forever.
    pub fn reject_current_step(
        &mut self,
        principal: &str,
        reason: &str,
    ) -> Result<(), WorkflowError> {
        let now = Utc::now();
        let index = self.current_step_index()?;
        self.steps[index].reject(principal, reason, now)?;
        self.emit_step_completed(index);

        for i in index + 1..self.steps.len() {
            if self.steps[i].state == StepState::Pending {
                self.steps[i].skip(now)?;
                self.emit_step_completed(i);
            }
        }
        Ok(())
    }

    fn current_step_index(&self) -> Result<usize, WorkflowError> {
        self.steps
            .iter()
            .position(|s| s.state == StepState::Pending)
            .ok_or(WorkflowError::NoActionableStep {
                request_id: self.request.id,
            })
    }

    fn emit_step_completed(&self, index: usize) {
        let step = &self.steps[index];
        info!(
            request_id = %self.request.id,
            step_id = %step.step_id,
            "Step state change: pending -> {}",
            step.state
        );
        let event = StepCompletedEvent {
            request_id: self.request.id,
            step_id: step.step_id.clone(),
            outcome: step.state,
            completed_by: step.completed_by.clone(),
            occurred_at: step.completed_at.unwrap_or_else(Utc::now),
        };
        for listener in &self.listeners {
            listener.on_step_completed(&event);
        }
    }
}
