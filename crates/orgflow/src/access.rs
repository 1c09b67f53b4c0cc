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

//! # Step Access Evaluation
//!
//! Decides whether an acting principal may complete the current step of a
//! request. Each workflow step carries a [`WorkflowAccess`] descriptor - a
//! typed capability struct configured per (request kind, step id) - and the
//! evaluator ORs its clauses: the principal needs to satisfy only one.
//!
//! Different kinds legitimately grant access to different organizational
//! roles (a department head may act on requests from any sub-department,
//! while a creator may always withdraw their own request); the descriptor
//! keeps each workflow's policy declarative and independently testable.
//!
//! Department ownership extends downward: a principal whose resource-owner
//! claim names an ancestor of the target department owns the target as well.
//! Exact checks (`parent_resource_owner_allowed`) require the claim to name
//! the target itself.

use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::department::DepartmentPath;
use crate::error::AccessError;
use crate::models::Request;
use crate::workflow::state::RequestKind;
use crate::workflow::step::step_ids;

/// Capability descriptor for one (request kind, step id) pair.
///
/// Configured data; not mutated at runtime. Every flag defaults to false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowAccess {
    /// Resource owner of the assigned department (claims covering it via an
    /// ancestor qualify).
    pub resource_owner_allowed: bool,
    /// Resource owner of exactly the assigned department's parent.
    pub parent_resource_owner_allowed: bool,
    /// Resource owner of the assigned department's parent, with ancestor
    /// claims qualifying. Note: this deliberately preserves legacy behavior
    /// where a direct parent-department owner satisfies a sibling-only rule;
    /// the exact-parent variant exists separately as
    /// `parent_resource_owner_allowed`.
    pub sibling_resource_owner_allowed: bool,
    /// Resource owner anywhere at or above the level-2 truncation of the
    /// assigned department.
    pub all_resource_owners_allowed: bool,
    /// The request's creator.
    pub creator_allowed: bool,
    /// Task owner of the specific org-chart position tied to the request.
    pub direct_task_owner_allowed: bool,
    /// Task owner anywhere in the request's org-chart project.
    pub org_chart_task_owner_allowed: bool,
    /// Holder of the org-chart administrator role.
    pub org_admin_allowed: bool,
}

/// Claims consumed by the evaluator.
///
/// A principal's claim set must expose, at minimum, resource-owner
/// department claims (one per owned department), a stable identity, task
/// ownership predicates against the external org chart, and the trusted
/// application / full-control predicates. These are consumed here, never
/// produced.
pub trait Principal {
    /// Stable identity compared against the request creator.
    fn identity(&self) -> &str;

    /// Department paths this principal is resource owner of (multi-valued).
    fn owned_departments(&self) -> &[String];

    /// True when the principal owns a task anywhere in the given org-chart
    /// project.
    fn is_task_owner_in_project(&self, project_org_id: Uuid) -> bool;

    /// True when the principal owns the specific org-chart task.
    fn is_task_owner(&self, task_org_id: Uuid) -> bool;

    /// Non-human service identity granted blanket access.
    fn is_trusted_application(&self) -> bool {
        false
    }

    /// Holder of the general full-control role.
    fn has_full_control(&self) -> bool {
        false
    }

    /// Holder of the internal full-control role.
    fn has_internal_full_control(&self) -> bool {
        false
    }

    /// Holder of the org-chart administrator role.
    fn is_org_admin(&self) -> bool {
        false
    }
}

/// Evaluates step transitions against access descriptors.
pub struct StepAccessEvaluator;

impl StepAccessEvaluator {
    /// Decides whether `principal` may complete step `step_id` of `request`.
    ///
    /// Clauses are ORed; trusted applications and full-control roles pass
    /// unconditionally, independent of the descriptor. Denial is a hard
    /// stop surfaced as [`AccessError::Unauthorized`], never retried.
    pub fn evaluate(
        request: &Request,
        access: &WorkflowAccess,
        step_id: &str,
        principal: &dyn Principal,
    ) -> Result<(), AccessError> {
        if Self::permits(request, access, principal) {
            debug!(
                request_id = %request.id,
                step_id = %step_id,
                identity = %principal.identity(),
                "Step access granted"
            );
            Ok(())
        } else {
            debug!(
                request_id = %request.id,
                step_id = %step_id,
                identity = %principal.identity(),
                "Step access denied"
            );
            Err(AccessError::Unauthorized {
                identity: principal.identity().to_string(),
                request_id: request.id,
                step_id: step_id.to_string(),
            })
        }
    }

    fn permits(request: &Request, access: &WorkflowAccess, principal: &dyn Principal) -> bool {
        // Unconditional overrides, independent of the descriptor.
        if principal.is_trusted_application()
            || principal.has_full_control()
            || principal.has_internal_full_control()
        {
            return true;
        }

        // Department-scoped clauses apply only when a department is assigned.
        if let Some(department) = request
            .assigned_department
            .as_deref()
            .filter(|d| !d.trim().is_empty())
        {
            let path = DepartmentPath::new(department);

            if access.all_resource_owners_allowed
                && owns_department(principal, &path.to_level(2), true)
            {
                return true;
            }
            if access.parent_resource_owner_allowed
                && owns_department(principal, &path.parent(), false)
            {
                return true;
            }
            if access.sibling_resource_owner_allowed
                && owns_department(principal, &path.parent(), true)
            {
                return true;
            }
            if access.resource_owner_allowed && owns_department(principal, &path, true) {
                return true;
            }
        }

        if access.creator_allowed && principal.identity() == request.created_by {
            return true;
        }

        if access.org_chart_task_owner_allowed {
            if let Some(project) = request.project_org_id {
                if principal.is_task_owner_in_project(project) {
                    return true;
                }
            }
        }

        if access.direct_task_owner_allowed {
            if let Some(task) = request.task_org_id {
                if principal.is_task_owner(task) {
                    return true;
                }
            }
        }

        if access.org_admin_allowed && principal.is_org_admin() {
            return true;
        }

        false
    }
}

/// Resource-owner check against a target department.
///
/// With `include_descendants`, a claim naming the target or any of its
/// ancestors qualifies (ownership extends downward through the hierarchy);
/// without it, the claim must name the target exactly.
fn owns_department(
    principal: &dyn Principal,
    target: &DepartmentPath,
    include_descendants: bool,
) -> bool {
    principal.owned_departments().iter().any(|owned| {
        let owned = DepartmentPath::new(owned.as_str());
        if include_descendants {
            owned.is_parent_of(target)
        } else {
            owned.is_department(target)
        }
    })
}

/// Access descriptors keyed by (request kind, step id).
///
/// Configured once at startup; lookups during evaluation are read-only.
pub struct AccessPolicy {
    descriptors: HashMap<(RequestKind, String), WorkflowAccess>,
}

impl AccessPolicy {
    /// Creates an empty policy.
    pub fn new() -> Self {
        Self {
            descriptors: HashMap::new(),
        }
    }

    /// Builds the stock policy shipped with the workflow shapes.
    pub fn default_policy() -> Self {
        let mut policy = Self::new();

        policy.set(
            RequestKind::ContractorPersonnel,
            step_ids::CONTRACTOR_APPROVAL,
            WorkflowAccess {
                creator_allowed: true,
                resource_owner_allowed: true,
                ..Default::default()
            },
        );
        policy.set(
            RequestKind::ContractorPersonnel,
            step_ids::COMPANY_APPROVAL,
            WorkflowAccess {
                all_resource_owners_allowed: true,
                org_admin_allowed: true,
                ..Default::default()
            },
        );
        policy.set(
            RequestKind::ContractorPersonnel,
            step_ids::PROVISIONING,
            WorkflowAccess {
                org_admin_allowed: true,
                ..Default::default()
            },
        );

        policy.set(
            RequestKind::ResourceAllocation,
            step_ids::PROPOSAL,
            WorkflowAccess {
                creator_allowed: true,
                resource_owner_allowed: true,
                org_chart_task_owner_allowed: true,
                ..Default::default()
            },
        );
        policy.set(
            RequestKind::ResourceAllocation,
            step_ids::ASSIGNMENT,
            WorkflowAccess {
                parent_resource_owner_allowed: true,
                resource_owner_allowed: true,
                org_admin_allowed: true,
                ..Default::default()
            },
        );
        policy.set(
            RequestKind::ResourceAllocation,
            step_ids::PROVISIONING,
            WorkflowAccess {
                org_admin_allowed: true,
                ..Default::default()
            },
        );

        policy
    }

    /// Sets the descriptor for a (kind, step) pair.
    pub fn set(&mut self, kind: RequestKind, step_id: &str, access: WorkflowAccess) {
        self.descriptors.insert((kind, step_id.to_string()), access);
    }

    /// Looks up the descriptor for a (kind, step) pair. Unknown pairs get
    /// the empty descriptor, which denies everything but the overrides.
    pub fn get(&self, kind: RequestKind, step_id: &str) -> WorkflowAccess {
        self.descriptors
            .get(&(kind, step_id.to_string()))
            .copied()
            .unwrap_or_default()
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::default_policy()
    }
}
