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

//! Request Model
//!
//! A `Request` identifies one unit of work moving through approval and
//! provisioning. It is owned exclusively by its [`RequestWorkflow`] during
//! its lifetime: created once, mutated only through guarded transitions,
//! never deleted (terminal states are retained for audit).
//!
//! [`RequestWorkflow`]: crate::workflow::RequestWorkflow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflow::state::{RequestKind, RequestState};

/// A resource-allocation request under workflow control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Opaque request identifier.
    pub id: Uuid,
    /// Discriminates the step sequence and state graph that apply.
    pub kind: RequestKind,
    /// Hierarchy path of the department the request is assigned to, when
    /// known. Department-scoped access clauses are skipped while unset.
    pub assigned_department: Option<String>,
    /// Identity of the creating principal.
    pub created_by: String,
    /// Current coarse workflow state.
    pub state: RequestState,
    /// Project in the external org-chart system this request provisions
    /// into, once known.
    pub project_org_id: Option<Uuid>,
    /// Position/task in the external org-chart system tied to this request,
    /// once known. Consulted by direct-task-owner access clauses.
    pub task_org_id: Option<Uuid>,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
}

impl Request {
    /// Creates a request in the `Created` state.
    pub fn new(kind: RequestKind, created_by: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            assigned_department: None,
            created_by: created_by.into(),
            state: RequestState::Created,
            project_org_id: None,
            task_org_id: None,
            created_at: Utc::now(),
        }
    }

    /// Sets the assigned department path.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.assigned_department = Some(department.into());
        self
    }

    /// Sets the external org-chart project identifier.
    pub fn with_project(mut self, project_org_id: Uuid) -> Self {
        self.project_org_id = Some(project_org_id);
        self
    }

    /// Sets the external org-chart task identifier.
    pub fn with_task(mut self, task_org_id: Uuid) -> Self {
        self.task_org_id = Some(task_org_id);
        self
    }
}
