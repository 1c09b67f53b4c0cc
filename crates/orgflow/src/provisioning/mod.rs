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

//! # Provisioning Pipeline
//!
//! Everything between "the request is fully approved" and "the external
//! org-chart system has been told": the versioned wire message, the queue
//! collaborator seam, the dispatcher that sends, and the consumer-side
//! reliable processor with its bounded linear-backoff retry budget.

pub mod consumer;
pub mod dispatcher;
pub mod message;
pub mod processor;
pub mod queue;

pub use consumer::{ProvisioningConsumer, ProvisioningHandler};
pub use dispatcher::ProvisioningDispatcher;
pub use message::{ProvisioningMessage, ProvisioningRequestType, PROVISIONING_MESSAGE_VERSION};
pub use processor::{AttemptOutcome, ReliableMessageProcessor, RetryDecision, RetryPolicy};
pub use queue::{ProvisioningQueue, QueuedMessage};
