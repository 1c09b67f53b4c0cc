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

//! # Queue Configuration
//!
//! Destination queue names for provisioning messages, resolved per request
//! kind. Resolution order: environment variable override, then the
//! configured value, then the built-in per-kind default. The environment
//! check happens at resolution time, not at settings construction, so a
//! deployment can repoint queues without rebuilding its settings.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::workflow::state::RequestKind;

/// Environment variable overriding the contractor-personnel queue path.
pub const CONTRACTOR_QUEUE_ENV: &str = "ORGFLOW_CONTRACTOR_QUEUE";

/// Environment variable overriding the resource-allocation queue path.
pub const ALLOCATION_QUEUE_ENV: &str = "ORGFLOW_ALLOCATION_QUEUE";

/// Default queue path for contractor-personnel provisioning.
pub const DEFAULT_CONTRACTOR_QUEUE: &str = "contractor-provisioning";

/// Default queue path for resource-allocation provisioning.
pub const DEFAULT_ALLOCATION_QUEUE: &str = "resource-allocation-provisioning";

/// Destination queue names per request kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSettings {
    /// Configured queue path for contractor-personnel requests.
    pub contractor_queue: String,
    /// Configured queue path for resource-allocation requests.
    pub allocation_queue: String,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            contractor_queue: DEFAULT_CONTRACTOR_QUEUE.to_string(),
            allocation_queue: DEFAULT_ALLOCATION_QUEUE.to_string(),
        }
    }
}

impl QueueSettings {
    /// Resolves the destination queue path for a request kind.
    ///
    /// A non-empty environment variable wins over the configured value;
    /// empty values are treated as unset.
    pub fn queue_path(&self, kind: RequestKind) -> String {
        let (env_var, configured) = match kind {
            RequestKind::ContractorPersonnel => (CONTRACTOR_QUEUE_ENV, &self.contractor_queue),
            RequestKind::ResourceAllocation => (ALLOCATION_QUEUE_ENV, &self.allocation_queue),
        };

        if let Ok(value) = std::env::var(env_var) {
            let value = value.trim();
            if !value.is_empty() {
                debug!(kind = %kind, queue_path = %value, "Queue path overridden by {}", env_var);
                return value.to_string();
            }
        }
        configured.clone()
    }
}
