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

//! # Provisioning Consumer
//!
//! Per-delivery glue between the queue's receive loop and the provisioning
//! handler. Decodes the wire message, short-circuits malformed payloads to
//! dead-letter (retrying cannot fix a bad payload, so no retry attempt is
//! consumed), and otherwise drives the handler through the reliable
//! processor.

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{BoxError, ProcessingError};
use crate::provisioning::message::ProvisioningMessage;
use crate::provisioning::processor::{ReliableMessageProcessor, RetryPolicy};
use crate::provisioning::queue::{ProvisioningQueue, QueuedMessage};

/// The provisioning action itself: writes the request into the external
/// org-chart system. Failures are environmental and retried per the
/// processor's budget.
#[async_trait]
pub trait ProvisioningHandler: Send + Sync {
    /// Performs provisioning for one decoded message.
    async fn handle(&self, message: ProvisioningMessage) -> Result<(), BoxError>;
}

/// Handles deliveries from a provisioning queue.
pub struct ProvisioningConsumer {
    queue: Arc<dyn ProvisioningQueue>,
    processor: ReliableMessageProcessor,
}

impl ProvisioningConsumer {
    /// Creates a consumer with the default retry policy.
    pub fn new(queue: Arc<dyn ProvisioningQueue>) -> Self {
        Self::with_policy(queue, RetryPolicy::default())
    }

    /// Creates a consumer with an explicit retry policy.
    pub fn with_policy(queue: Arc<dyn ProvisioningQueue>, policy: RetryPolicy) -> Self {
        let processor = ReliableMessageProcessor::with_policy(queue.clone(), policy);
        Self { queue, processor }
    }

    /// Handles one delivery end to end.
    ///
    /// Malformed bodies (unparseable JSON, unsupported version) go straight
    /// to the dead-letter destination; well-formed ones run through the
    /// handler under the retry budget. The returned error is for the
    /// receive loop's logging - the queue-side consequences have already
    /// been applied.
    pub async fn handle_delivery(
        &self,
        delivery: QueuedMessage,
        handler: &dyn ProvisioningHandler,
        cancellation: &CancellationToken,
    ) -> Result<(), ProcessingError> {
        let message = match ProvisioningMessage::from_json(&delivery.body) {
            Ok(message) => message,
            Err(err) => {
                warn!(
                    sequence_number = delivery.sequence_number,
                    error = %err,
                    "Malformed provisioning message; dead-lettering without retry"
                );
                self.queue.dead_letter(&delivery, &err.to_string()).await?;
                return Err(ProcessingError::Malformed(err));
            }
        };

        self.processor
            .process(delivery, cancellation, handler.handle(message))
            .await
    }
}
