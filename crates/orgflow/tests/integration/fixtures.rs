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

//! Shared test doubles: an in-memory queue that models scheduling and
//! dead-lettering, and a claims-backed principal.

use async_trait::async_trait;
use orgflow::error::QueueError;
use orgflow::{Principal, ProvisioningQueue, QueuedMessage};
use parking_lot::Mutex;
use std::time::Duration;
use uuid::Uuid;

/// In-memory queue modeling a broker closely enough for scenario tests:
/// scheduled messages become redeliverable (with fresh sequence numbers),
/// completion and dead-lettering are terminal.
pub struct InMemoryQueue {
    pub sends: Mutex<Vec<(String, String)>>,
    pub completed: Mutex<Vec<i64>>,
    pub scheduled: Mutex<Vec<(QueuedMessage, Duration)>>,
    pub dead_lettered: Mutex<Vec<(QueuedMessage, String)>>,
    next_sequence: Mutex<i64>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self {
            sends: Mutex::new(Vec::new()),
            completed: Mutex::new(Vec::new()),
            scheduled: Mutex::new(Vec::new()),
            dead_lettered: Mutex::new(Vec::new()),
            next_sequence: Mutex::new(100),
        }
    }

    /// Takes the next scheduled message, assigning it a fresh broker
    /// sequence number as a redelivery would.
    pub fn pop_scheduled(&self) -> Option<(QueuedMessage, Duration)> {
        let mut scheduled = self.scheduled.lock();
        if scheduled.is_empty() {
            return None;
        }
        let (mut message, delay) = scheduled.remove(0);
        let mut next = self.next_sequence.lock();
        message.sequence_number = *next;
        *next += 1;
        Some((message, delay))
    }
}

#[async_trait]
impl ProvisioningQueue for InMemoryQueue {
    async fn send(&self, queue_path: &str, body: &str) -> Result<(), QueueError> {
        self.sends
            .lock()
            .push((queue_path.to_string(), body.to_string()));
        Ok(())
    }

    async fn complete(&self, message: &QueuedMessage) -> Result<(), QueueError> {
        self.completed.lock().push(message.sequence_number);
        Ok(())
    }

    async fn schedule(&self, message: QueuedMessage, delay: Duration) -> Result<(), QueueError> {
        self.scheduled.lock().push((message, delay));
        Ok(())
    }

    async fn dead_letter(&self, message: &QueuedMessage, reason: &str) -> Result<(), QueueError> {
        self.dead_lettered
            .lock()
            .push((message.clone(), reason.to_string()));
        Ok(())
    }
}

/// A principal backed by explicit claims.
pub struct ClaimsPrincipal {
    pub identity: String,
    pub owned: Vec<String>,
    pub project_tasks: Vec<Uuid>,
    pub tasks: Vec<Uuid>,
}

impl ClaimsPrincipal {
    pub fn new(identity: &str) -> Self {
        Self {
            identity: identity.to_string(),
            owned: Vec::new(),
            project_tasks: Vec::new(),
            tasks: Vec::new(),
        }
    }

    pub fn owning(identity: &str, departments: &[&str]) -> Self {
        let mut principal = Self::new(identity);
        principal.owned = departments.iter().map(|d| d.to_string()).collect();
        principal
    }
}

impl Principal for ClaimsPrincipal {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn owned_departments(&self) -> &[String] {
        &self.owned
    }

    fn is_task_owner_in_project(&self, project_org_id: Uuid) -> bool {
        self.project_tasks.contains(&project_org_id)
    }

    fn is_task_owner(&self, task_org_id: Uuid) -> bool {
        self.tasks.contains(&task_org_id)
    }
}
