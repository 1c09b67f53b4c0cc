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

//! Request States and Transition Graphs
//!
//! Coarse request lifecycle states, distinct from per-step states. Each
//! request kind has its own fixed directed graph of legal transitions; any
//! transition outside the graph is a modeled error, never a silent no-op.
//!
//! The graphs are small and linear by design - this subsystem deliberately
//! does not support arbitrary DAGs.

use serde::{Deserialize, Serialize};

/// Discriminates which state graph and step sequence applies to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// External contractor personnel requests approved by the company.
    ContractorPersonnel,
    /// Internal resource-allocation requests proposed and assigned in-house.
    ResourceAllocation,
}

impl RequestKind {
    /// Returns the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::ContractorPersonnel => "contractor_personnel",
            RequestKind::ResourceAllocation => "resource_allocation",
        }
    }

    /// Parses a kind from its string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "contractor_personnel" => Some(RequestKind::ContractorPersonnel),
            "resource_allocation" => Some(RequestKind::ResourceAllocation),
            _ => None,
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse lifecycle state of a request.
///
/// The variant set covers both kinds; which variants are reachable, and the
/// edges between them, depend on the [`RequestKind`]:
///
/// - Contractor-personnel: `Created -> SubmittedToCompany ->
///   {RejectedByContractor, ApprovedByCompany, RejectedByCompany}`.
/// - Resource-allocation: `Created -> {Proposed, Rejected}`,
///   `Proposed -> {Assigned, Rejected}`.
///
/// Terminal states are retained for audit; requests are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestState {
    /// Initial state for every request kind.
    Created,

    // Contractor-personnel lifecycle
    /// Submitted by the contractor for company review.
    SubmittedToCompany,
    /// Withdrawn by the contractor before a company decision.
    RejectedByContractor,
    /// Accepted by the company; eligible for provisioning.
    ApprovedByCompany,
    /// Declined by the company.
    RejectedByCompany,

    // Resource-allocation lifecycle
    /// A concrete allocation has been proposed.
    Proposed,
    /// The allocation was confirmed; eligible for provisioning.
    Assigned,
    /// The request was rejected.
    Rejected,
}

impl RequestState {
    /// Returns the legal successor states for this state under the given
    /// kind. States outside the kind's graph have no successors.
    pub fn successors(&self, kind: RequestKind) -> &'static [RequestState] {
        use RequestState::*;
        match kind {
            RequestKind::ContractorPersonnel => match self {
                Created => &[SubmittedToCompany],
                SubmittedToCompany => &[RejectedByContractor, ApprovedByCompany, RejectedByCompany],
                _ => &[],
            },
            RequestKind::ResourceAllocation => match self {
                Created => &[Proposed, Rejected],
                Proposed => &[Assigned, Rejected],
                _ => &[],
            },
        }
    }

    /// True when this state has no successors under the given kind.
    pub fn is_terminal(&self, kind: RequestKind) -> bool {
        self.successors(kind).is_empty()
    }

    /// True when `target` is a direct successor of this state under `kind`.
    pub fn can_transition_to(&self, kind: RequestKind, target: RequestState) -> bool {
        self.successors(kind).contains(&target)
    }

    /// Returns the string representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Created => "created",
            RequestState::SubmittedToCompany => "submitted_to_company",
            RequestState::RejectedByContractor => "rejected_by_contractor",
            RequestState::ApprovedByCompany => "approved_by_company",
            RequestState::RejectedByCompany => "rejected_by_company",
            RequestState::Proposed => "proposed",
            RequestState::Assigned => "assigned",
            RequestState::Rejected => "rejected",
        }
    }

    /// Parses a state from its string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(RequestState::Created),
            "submitted_to_company" => Some(RequestState::SubmittedToCompany),
            "rejected_by_contractor" => Some(RequestState::RejectedByContractor),
            "approved_by_company" => Some(RequestState::ApprovedByCompany),
            "rejected_by_company" => Some(RequestState::RejectedByCompany),
            "proposed" => Some(RequestState::Proposed),
            "assigned" => Some(RequestState::Assigned),
            "rejected" => Some(RequestState::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RequestKind::*;
    use RequestState::*;

    #[test]
    fn test_contractor_graph_edges() {
        assert_eq!(Created.successors(ContractorPersonnel), &[SubmittedToCompany]);
        assert_eq!(
            SubmittedToCompany.successors(ContractorPersonnel),
            &[RejectedByContractor, ApprovedByCompany, RejectedByCompany]
        );
        for terminal in [RejectedByContractor, ApprovedByCompany, RejectedByCompany] {
            assert!(terminal.is_terminal(ContractorPersonnel));
        }
    }

    #[test]
    fn test_allocation_graph_edges() {
        assert_eq!(Created.successors(ResourceAllocation), &[Proposed, Rejected]);
        assert_eq!(Proposed.successors(ResourceAllocation), &[Assigned, Rejected]);
        assert!(Assigned.is_terminal(ResourceAllocation));
        assert!(Rejected.is_terminal(ResourceAllocation));
    }

    #[test]
    fn test_cross_kind_states_have_no_successors() {
        // Allocation states are unreachable under the contractor graph.
        assert!(Proposed.successors(ContractorPersonnel).is_empty());
        assert!(SubmittedToCompany.successors(ResourceAllocation).is_empty());
    }

    #[test]
    fn test_every_illegal_pair_is_rejected() {
        let all = [
            Created,
            SubmittedToCompany,
            RejectedByContractor,
            ApprovedByCompany,
            RejectedByCompany,
            Proposed,
            Assigned,
            Rejected,
        ];
        for kind in [ContractorPersonnel, ResourceAllocation] {
            for from in all {
                for to in all {
                    let legal = from.successors(kind).contains(&to);
                    assert_eq!(from.can_transition_to(kind, to), legal);
                }
            }
        }
    }

    #[test]
    fn test_state_string_round_trip() {
        let all = [
            Created,
            SubmittedToCompany,
            RejectedByContractor,
            ApprovedByCompany,
            RejectedByCompany,
            Proposed,
            Assigned,
            Rejected,
        ];
        for state in all {
            assert_eq!(RequestState::parse(state.as_str()), Some(state));
        }
        assert_eq!(RequestState::parse("bogus"), None);
    }
}
