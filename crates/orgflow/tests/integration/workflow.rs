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

//! Full approval lifecycles across the workflow, access, and dispatch
//! modules.

use std::sync::Arc;
use uuid::Uuid;

use orgflow::workflow::step::step_ids;
use orgflow::{
    init_test_logging, AccessPolicy, ProvisioningDispatcher, ProvisioningQueue, QueueSettings,
    Request, RequestKind, RequestState, RequestWorkflow, StepAccessEvaluator, StepState,
    WorkflowError,
};

use crate::fixtures::{ClaimsPrincipal, InMemoryQueue};

#[tokio::test]
async fn test_allocation_request_approved_end_to_end() {
    init_test_logging();

    let project = Uuid::new_v4();
    let request = Request::new(RequestKind::ResourceAllocation, "alice")
        .with_department("Company Engineering Platform")
        .with_project(project);
    let policy = AccessPolicy::default_policy();
    let mut workflow = RequestWorkflow::new(request);

    // Created -> Proposed, proposal step approved by the creator.
    workflow.transition_to(RequestState::Proposed).unwrap();
    let step = workflow.current_step().unwrap();
    assert_eq!(step.step_id, step_ids::PROPOSAL);
    let access = policy.get(RequestKind::ResourceAllocation, &step.step_id);
    let alice = ClaimsPrincipal::new("alice");
    StepAccessEvaluator::evaluate(workflow.request(), &access, &step.step_id, &alice).unwrap();
    workflow.approve_current_step("alice").unwrap();

    // Proposed -> Assigned, assignment step approved by the department owner.
    workflow.transition_to(RequestState::Assigned).unwrap();
    let step = workflow.current_step().unwrap();
    assert_eq!(step.step_id, step_ids::ASSIGNMENT);
    let access = policy.get(RequestKind::ResourceAllocation, &step.step_id);
    let owner = ClaimsPrincipal::owning("bob", &["Company Engineering"]);
    StepAccessEvaluator::evaluate(workflow.request(), &access, &step.step_id, &owner).unwrap();
    workflow.approve_current_step("bob").unwrap();

    // Fully approved: the provisioning step is actionable and dispatch
    // produces a v1 message on the allocation queue.
    assert!(workflow.ready_to_provision());
    assert_eq!(workflow.request().state, RequestState::Assigned);

    let queue = Arc::new(InMemoryQueue::new());
    let dispatcher = ProvisioningDispatcher::new(
        queue.clone() as Arc<dyn ProvisioningQueue>,
        QueueSettings::default(),
    );
    let message = dispatcher.dispatch(workflow.request()).await.unwrap();
    assert_eq!(message.project_org_id, project);
    assert_eq!(queue.sends.lock().len(), 1);
}

#[tokio::test]
async fn test_allocation_cannot_jump_created_to_assigned() {
    init_test_logging();

    let request = Request::new(RequestKind::ResourceAllocation, "alice");
    let mut workflow = RequestWorkflow::new(request);

    let err = workflow.transition_to(RequestState::Assigned).unwrap_err();
    match err {
        WorkflowError::IllegalStateChange { from, to, allowed } => {
            assert_eq!(from, RequestState::Created);
            assert_eq!(to, RequestState::Assigned);
            assert_eq!(allowed, vec![RequestState::Proposed, RequestState::Rejected]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_contractor_rejection_skips_provisioning() {
    init_test_logging();

    let request = Request::new(RequestKind::ContractorPersonnel, "carol")
        .with_department("Company Engineering Platform");
    let mut workflow = RequestWorkflow::new(request);

    workflow
        .transition_to(RequestState::SubmittedToCompany)
        .unwrap();
    workflow.approve_current_step("carol").unwrap();
    workflow
        .transition_to(RequestState::RejectedByCompany)
        .unwrap();
    workflow
        .reject_current_step("company-lead", "budget cut")
        .unwrap();

    let steps = workflow.steps();
    assert_eq!(steps[2].state, StepState::Rejected);
    assert_eq!(steps[3].step_id, step_ids::PROVISIONING);
    assert_eq!(steps[3].state, StepState::Skipped);
    assert!(!workflow.ready_to_provision());
    assert!(workflow.request().state.is_terminal(RequestKind::ContractorPersonnel));
}

#[test]
fn test_unauthorized_principal_is_stopped_before_the_step() {
    init_test_logging();

    let request = Request::new(RequestKind::ResourceAllocation, "alice")
        .with_department("Company Engineering Platform");
    let workflow = RequestWorkflow::new(request);
    let policy = AccessPolicy::default_policy();

    let step = workflow.current_step().unwrap();
    let access = policy.get(RequestKind::ResourceAllocation, &step.step_id);
    let outsider = ClaimsPrincipal::owning("mallory", &["Company Sales"]);

    let result =
        StepAccessEvaluator::evaluate(workflow.request(), &access, &step.step_id, &outsider);
    assert!(result.is_err());
}
