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

//! # Provisioning Dispatcher
//!
//! Fire-and-forget hand-off from a fully approved request to the
//! provisioning queues. Dispatching builds the versioned wire message,
//! resolves the destination queue for the request's kind, and sends - the
//! reliability story (retries, dead-letter) lives entirely on the consuming
//! side.

use std::sync::Arc;
use tracing::info;

use crate::config::QueueSettings;
use crate::error::DispatchError;
use crate::models::Request;
use crate::provisioning::message::ProvisioningMessage;
use crate::provisioning::queue::ProvisioningQueue;

/// Sends provisioning messages for approved requests.
pub struct ProvisioningDispatcher {
    queue: Arc<dyn ProvisioningQueue>,
    settings: QueueSettings,
}

impl ProvisioningDispatcher {
    /// Creates a dispatcher over a queue collaborator and settings.
    pub fn new(queue: Arc<dyn ProvisioningQueue>, settings: QueueSettings) -> Self {
        Self { queue, settings }
    }

    /// Builds and sends the provisioning message for `request`.
    ///
    /// The destination is resolved per the request's kind (environment
    /// override, then configured value, then default). Returns the sent
    /// message so callers can record it.
    pub async fn dispatch(&self, request: &Request) -> Result<ProvisioningMessage, DispatchError> {
        let project_org_id =
            request
                .project_org_id
                .ok_or(DispatchError::MissingProjectOrg {
                    request_id: request.id,
                })?;

        let message = ProvisioningMessage::new(request.id, project_org_id, request.kind.into());
        let body = message.to_json()?;
        let queue_path = self.settings.queue_path(request.kind);

        self.queue.send(&queue_path, &body).await?;
        info!(
            request_id = %request.id,
            kind = %request.kind,
            queue_path = %queue_path,
            "Provisioning message dispatched"
        );
        Ok(message)
    }
}
