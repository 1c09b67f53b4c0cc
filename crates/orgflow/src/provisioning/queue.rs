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

//! # Queue Collaborator
//!
//! The transport seam for provisioning messages. This crate does not
//! implement a broker; it drives one through [`ProvisioningQueue`], which a
//! deployment backs with its messaging infrastructure (and tests back with
//! an in-memory double).
//!
//! Retry metadata travels as string properties on the queued message, so it
//! survives the clone-and-reschedule cycle that brokers use for delayed
//! redelivery.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::QueueError;

/// Message property keys carried across redeliveries.
pub mod properties {
    /// Number of redeliveries scheduled so far. Absent on the original
    /// delivery (zeroth attempt).
    pub const RETRY_COUNT: &str = "retry-count";

    /// Broker sequence number of the original delivery, captured on the
    /// first retry and never overwritten afterwards. Ties every redelivery
    /// back to the message that started the chain.
    pub const ORIGINAL_SEQUENCE_NUMBER: &str = "original-SequenceNumber";
}

/// A message as delivered from (or sent back to) the queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueuedMessage {
    /// Raw payload body.
    pub body: String,
    /// Broker-assigned sequence number of this delivery.
    pub sequence_number: i64,
    /// Application properties; retry metadata lives here.
    pub properties: HashMap<String, String>,
}

impl QueuedMessage {
    /// Wraps a delivered payload.
    pub fn new(body: impl Into<String>, sequence_number: i64) -> Self {
        Self {
            body: body.into(),
            sequence_number,
            properties: HashMap::new(),
        }
    }

    /// Number of redeliveries scheduled so far. A missing or unreadable
    /// property means this is the zeroth attempt.
    pub fn retry_count(&self) -> u32 {
        self.properties
            .get(properties::RETRY_COUNT)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// Sequence number of the original delivery in this message's retry
    /// chain. Falls back to this delivery's own sequence number when no
    /// retry has happened yet.
    pub fn original_sequence_number(&self) -> i64 {
        self.properties
            .get(properties::ORIGINAL_SEQUENCE_NUMBER)
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.sequence_number)
    }

    /// Builds the redelivery clone carrying `new_retry_count`.
    ///
    /// The body and all properties are preserved; the original sequence
    /// number is captured on the first retry and left untouched on every
    /// later one.
    pub fn retry_clone(&self, new_retry_count: u32) -> QueuedMessage {
        let mut clone = QueuedMessage {
            body: self.body.clone(),
            sequence_number: 0,
            properties: self.properties.clone(),
        };
        clone
            .properties
            .insert(properties::RETRY_COUNT.to_string(), new_retry_count.to_string());
        clone
            .properties
            .entry(properties::ORIGINAL_SEQUENCE_NUMBER.to_string())
            .or_insert_with(|| self.sequence_number.to_string());
        clone
    }
}

/// Transport operations the provisioning pipeline needs from a broker.
///
/// Implementations must be safe to call concurrently; every operation is a
/// single broker round-trip with no ordering assumptions between calls.
#[async_trait]
pub trait ProvisioningQueue: Send + Sync {
    /// Enqueues a payload on the named queue.
    async fn send(&self, queue_path: &str, body: &str) -> Result<(), QueueError>;

    /// Acknowledges a delivery, removing it from the queue.
    async fn complete(&self, message: &QueuedMessage) -> Result<(), QueueError>;

    /// Enqueues a message for redelivery after `delay`.
    async fn schedule(&self, message: QueuedMessage, delay: Duration) -> Result<(), QueueError>;

    /// Moves a delivery to the dead-letter destination with a reason.
    async fn dead_letter(&self, message: &QueuedMessage, reason: &str) -> Result<(), QueueError>;
}
