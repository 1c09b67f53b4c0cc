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

//! Dispatch/consume round trips and the full retry chain against the
//! in-memory queue.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use orgflow::error::{BoxError, ProcessingError};
use orgflow::{
    init_test_logging, ProvisioningConsumer, ProvisioningDispatcher, ProvisioningHandler,
    ProvisioningMessage, ProvisioningQueue, QueueSettings, QueuedMessage, Request, RequestKind,
};

use crate::fixtures::InMemoryQueue;

struct CountingHandler {
    calls: parking_lot::Mutex<u32>,
    fail: bool,
}

impl CountingHandler {
    fn new(fail: bool) -> Self {
        Self {
            calls: parking_lot::Mutex::new(0),
            fail,
        }
    }
}

#[async_trait]
impl ProvisioningHandler for CountingHandler {
    async fn handle(&self, _message: ProvisioningMessage) -> Result<(), BoxError> {
        *self.calls.lock() += 1;
        if self.fail {
            Err("org-chart service unavailable".into())
        } else {
            Ok(())
        }
    }
}

#[tokio::test]
async fn test_dispatch_then_consume_round_trip() {
    init_test_logging();

    let queue = Arc::new(InMemoryQueue::new());
    let dispatcher = ProvisioningDispatcher::new(
        queue.clone() as Arc<dyn ProvisioningQueue>,
        QueueSettings::default(),
    );
    let consumer = ProvisioningConsumer::new(queue.clone() as Arc<dyn ProvisioningQueue>);

    let request = Request::new(RequestKind::ContractorPersonnel, "carol")
        .with_project(Uuid::new_v4());
    dispatcher.dispatch(&request).await.unwrap();

    // Feed the sent body back in as a delivery.
    let (_, body) = queue.sends.lock()[0].clone();
    let handler = CountingHandler::new(false);
    consumer
        .handle_delivery(
            QueuedMessage::new(body, 1),
            &handler,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(*handler.calls.lock(), 1);
    assert_eq!(queue.completed.lock().as_slice(), &[1]);
    assert!(queue.dead_lettered.lock().is_empty());
}

#[tokio::test]
async fn test_persistent_failure_walks_the_full_retry_chain() {
    init_test_logging();

    let queue = Arc::new(InMemoryQueue::new());
    let consumer = ProvisioningConsumer::new(queue.clone() as Arc<dyn ProvisioningQueue>);
    let handler = CountingHandler::new(true);
    let cancellation = CancellationToken::new();

    let body = ProvisioningMessage::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        RequestKind::ContractorPersonnel.into(),
    )
    .to_json()
    .unwrap();

    // Original delivery plus five redeliveries, backed off linearly.
    let mut delivery = QueuedMessage::new(body, 1);
    let mut observed_delays = Vec::new();
    for _ in 0..5 {
        let err = consumer
            .handle_delivery(delivery, &handler, &cancellation)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessingError::RetryScheduled { .. }));

        let (next, delay) = queue.pop_scheduled().expect("a redelivery was scheduled");
        observed_delays.push(delay);
        delivery = next;
    }
    assert_eq!(
        observed_delays,
        [10, 20, 30, 40, 50].map(Duration::from_secs)
    );

    // The sixth attempt exhausts the budget.
    let err = consumer
        .handle_delivery(delivery, &handler, &cancellation)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProcessingError::RetriesExhausted { retry_count: 5, .. }
    ));
    assert_eq!(*handler.calls.lock(), 6);
    assert!(queue.scheduled.lock().is_empty());

    // The dead-lettered message still points at the original delivery.
    let dead = queue.dead_lettered.lock();
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].0.original_sequence_number(), 1);
    assert!(dead[0].1.contains("after 5 retries"));
}

#[tokio::test]
async fn test_shutdown_mid_chain_preserves_retry_state() {
    init_test_logging();

    let queue = Arc::new(InMemoryQueue::new());
    let consumer = ProvisioningConsumer::new(queue.clone() as Arc<dyn ProvisioningQueue>);
    let handler = CountingHandler::new(true);
    let cancellation = CancellationToken::new();

    let body = ProvisioningMessage::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        RequestKind::ResourceAllocation.into(),
    )
    .to_json()
    .unwrap();

    // One failed attempt schedules the first redelivery.
    let _ = consumer
        .handle_delivery(QueuedMessage::new(body, 1), &handler, &cancellation)
        .await;
    let (redelivery, _) = queue.pop_scheduled().unwrap();
    assert_eq!(redelivery.retry_count(), 1);

    // Shutdown before the redelivery is attempted: nothing changes.
    cancellation.cancel();
    consumer
        .handle_delivery(redelivery.clone(), &handler, &cancellation)
        .await
        .unwrap();

    assert_eq!(*handler.calls.lock(), 1);
    assert_eq!(redelivery.retry_count(), 1);
    assert!(queue.scheduled.lock().is_empty());
    assert!(queue.dead_lettered.lock().is_empty());
}
