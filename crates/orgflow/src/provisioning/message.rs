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

//! # Provisioning Wire Message
//!
//! The versioned JSON payload carried on the provisioning queues. Wire names
//! are camelCase. Decoding is forward-tolerant: unknown fields and unknown
//! `type` values are accepted, but an unknown `version` is a permanent
//! format error - a v1 consumer must not half-interpret a future schema.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MessageFormatError;
use crate::workflow::state::RequestKind;

/// The message schema version this consumer understands.
pub const PROVISIONING_MESSAGE_VERSION: i32 = 1;

/// Discriminates what kind of provisioning the message asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProvisioningRequestType {
    ContractorPersonnel,
    ResourceAllocation,
    /// A type value this consumer does not recognize. Decoded, not fatal:
    /// handlers decide whether to act on it or complete it untouched.
    #[serde(other)]
    Unknown,
}

impl From<RequestKind> for ProvisioningRequestType {
    fn from(kind: RequestKind) -> Self {
        match kind {
            RequestKind::ContractorPersonnel => ProvisioningRequestType::ContractorPersonnel,
            RequestKind::ResourceAllocation => ProvisioningRequestType::ResourceAllocation,
        }
    }
}

/// Versioned provisioning message, schema v1.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningMessage {
    /// Schema version; always [`PROVISIONING_MESSAGE_VERSION`] when built
    /// by this crate.
    pub version: i32,
    /// The request being provisioned.
    pub request_id: Uuid,
    /// The org-chart project the request provisions into.
    pub project_org_id: Uuid,
    /// What kind of provisioning is being asked for.
    #[serde(rename = "type")]
    pub request_type: ProvisioningRequestType,
}

impl ProvisioningMessage {
    /// Builds a v1 message.
    pub fn new(request_id: Uuid, project_org_id: Uuid, request_type: ProvisioningRequestType) -> Self {
        Self {
            version: PROVISIONING_MESSAGE_VERSION,
            request_id,
            project_org_id,
            request_type,
        }
    }

    /// Serializes the message to its JSON wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decodes a message from its JSON wire form, validating the version.
    pub fn from_json(body: &str) -> Result<Self, MessageFormatError> {
        let message: Self = serde_json::from_str(body)?;
        if message.version != PROVISIONING_MESSAGE_VERSION {
            return Err(MessageFormatError::UnsupportedVersion {
                version: message.version,
            });
        }
        Ok(message)
    }
}
