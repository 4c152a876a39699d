// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Flagged review cases and their lifecycle state machine.

use crate::domain::agent::AgentId;
use crate::domain::monitoring::Severity;
use crate::domain::pattern::PatternKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseId(pub String);

impl CaseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CaseId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    Open,
    Approved,
    Rejected,
    Escalated,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Open => "open",
            CaseStatus::Approved => "approved",
            CaseStatus::Rejected => "rejected",
            CaseStatus::Escalated => "escalated",
        }
    }
}

/// A persisted unit awaiting human disposition.
///
/// Transitions are one-directional: only `open` cases move, and the three
/// terminal states are immutable. A transition attempt on a non-open case is
/// a no-op rather than an error — duplicate submissions from a stale view
/// are expected traffic, not a fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggedCase {
    pub id: CaseId,
    pub agent_id: AgentId,
    pub pattern_key: PatternKey,
    pub severity: Severity,
    pub category: String,
    pub question: String,
    pub draft_answer: String,
    pub confidence: u32,
    pub citations_count: u32,
    pub status: CaseStatus,
    pub created_at: DateTime<Utc>,
}

impl FlaggedCase {
    pub fn is_open(&self) -> bool {
        self.status == CaseStatus::Open
    }

    /// Move an open case to `next`. Returns `false` (leaving the case
    /// untouched) when the case is already terminal.
    pub fn transition(&mut self, next: CaseStatus) -> bool {
        if !self.is_open() || next == CaseStatus::Open {
            return false;
        }
        self.status = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pattern::pattern_key;

    fn open_case() -> FlaggedCase {
        FlaggedCase {
            id: CaseId::from("case-1"),
            agent_id: AgentId::from("customer-support-bot"),
            pattern_key: pattern_key("draft"),
            severity: Severity::NeedsReview,
            category: "Policy".to_string(),
            question: "What is the refund window?".to_string(),
            draft_answer: "Thirty days.".to_string(),
            confidence: 80,
            citations_count: 1,
            status: CaseStatus::Open,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn open_case_transitions_once() {
        let mut case = open_case();
        assert!(case.transition(CaseStatus::Approved));
        assert_eq!(case.status, CaseStatus::Approved);
    }

    #[test]
    fn terminal_states_are_immutable() {
        for terminal in [
            CaseStatus::Approved,
            CaseStatus::Rejected,
            CaseStatus::Escalated,
        ] {
            let mut case = open_case();
            assert!(case.transition(terminal));
            for retry in [
                CaseStatus::Approved,
                CaseStatus::Rejected,
                CaseStatus::Escalated,
            ] {
                assert!(!case.transition(retry));
                assert_eq!(case.status, terminal);
            }
        }
    }

    #[test]
    fn reopening_is_not_a_transition() {
        let mut case = open_case();
        assert!(!case.transition(CaseStatus::Open));
        assert!(case.is_open());
    }
}
