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

//! # Orgflow
//!
//! Request workflow state machine and reliable provisioning pipeline for
//! organizational resource requests.
//!
//! A request (contractor personnel or internal resource allocation) moves
//! through a fixed, per-kind sequence of approval steps; each step change is
//! validated against a transition graph and an access descriptor; once fully
//! approved, a versioned message is dispatched to a provisioning queue and
//! consumed with bounded, linearly backed-off retries.
//!
//! ## Subsystems
//!
//! - [`workflow`] - per-kind state graphs, ordered step sequences, and the
//!   listener-observable [`RequestWorkflow`] state machine.
//! - [`access`] - OR-of-clauses step authorization over typed capability
//!   descriptors and department-hierarchy ownership.
//! - [`department`] - the hierarchy-path value type and the TTL'd
//!   department-owner cache behind the ownership checks.
//! - [`provisioning`] - wire message, queue collaborator seam, dispatcher,
//!   and the reliable consumer-side processor.
//!
//! Persistence and the message broker are collaborators, not parts of this
//! crate: stores react to [`workflow::events`], and brokers sit behind
//! [`ProvisioningQueue`].
//!
//! ## Example
//!
//! ```rust
//! use orgflow::{Request, RequestKind, RequestState, RequestWorkflow};
//!
//! let request = Request::new(RequestKind::ResourceAllocation, "alice");
//! let mut workflow = RequestWorkflow::new(request);
//!
//! workflow.transition_to(RequestState::Proposed)?;
//! workflow.approve_current_step("alice")?;
//! # Ok::<(), orgflow::error::WorkflowError>(())
//! ```

pub mod access;
pub mod config;
pub mod department;
pub mod error;
pub mod models;
pub mod provisioning;
pub mod workflow;

pub use access::{AccessPolicy, Principal, StepAccessEvaluator, WorkflowAccess};
pub use config::QueueSettings;
pub use department::{DepartmentOwner, DepartmentOwnerCache, DepartmentPath};
pub use error::{
    AccessError, DispatchError, MessageFormatError, ProcessingError, QueueError, WorkflowError,
};
pub use models::Request;
pub use provisioning::{
    ProvisioningConsumer, ProvisioningDispatcher, ProvisioningHandler, ProvisioningMessage,
    ProvisioningQueue, ProvisioningRequestType, QueuedMessage, ReliableMessageProcessor,
    RetryDecision, RetryPolicy,
};
pub use workflow::state::{RequestKind, RequestState};
pub use workflow::step::{StepState, WorkflowStep};
pub use workflow::RequestWorkflow;

use once_cell::sync::OnceCell;

static TEST_LOGGING: OnceCell<()> = OnceCell::new();

/// Initializes tracing output for tests. Safe to call from every test;
/// only the first call installs the subscriber.
pub fn init_test_logging() {
    TEST_LOGGING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_test_writer()
            .try_init();
    });
}
