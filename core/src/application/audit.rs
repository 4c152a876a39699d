// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Audit Log
//!
//! Append-only ledger service. Assigns identity and timestamp at append
//! time and writes through to the store. There are no update or delete
//! operations; every component that changes reviewable state appends here
//! synchronously as its last step, so callers never observe a state change
//! without a matching ledger entry.

use crate::application::state::GovernanceState;
use crate::domain::agent::AgentId;
use crate::domain::audit::{AuditDraft, AuditEvent};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct AuditLog {
    state: Arc<GovernanceState>,
}

impl AuditLog {
    pub fn new(state: Arc<GovernanceState>) -> Self {
        Self { state }
    }

    /// Enrich and append one event, returning the stored record.
    pub fn append(&self, draft: AuditDraft) -> AuditEvent {
        let event = AuditEvent {
            id: Uuid::new_v4().to_string(),
            agent_id: draft.agent_id,
            timestamp: Utc::now(),
            actor: draft.actor,
            action: draft.action,
            severity: draft.severity,
            category: draft.category,
            case_id: draft.case_id,
            response_id: draft.response_id,
            pattern_key: draft.pattern_key,
            details: draft.details,
        };
        debug!(action = %event.action, agent = %event.agent_id, "audit event appended");
        self.state.append_audit(event.clone());
        event
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.state.audit_events()
    }

    pub fn events_for(&self, agent_id: &AgentId) -> Vec<AuditEvent> {
        self.state
            .audit_events()
            .into_iter()
            .filter(|e| e.agent_id == *agent_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::AuditAction;
    use crate::infrastructure::store::InMemoryStore;

    #[test]
    fn append_assigns_identity_and_preserves_order() {
        let state = GovernanceState::bootstrap(Arc::new(InMemoryStore::new()));
        let log = AuditLog::new(state);

        let first = log.append(
            AuditDraft::new(
                AgentId::from("customer-support-bot"),
                AuditAction::MonitorSafe,
                "Safe response monitored. Category: Policy",
            )
            .actor("System"),
        );
        let second = log.append(AuditDraft::new(
            AgentId::from("customer-support-bot"),
            AuditAction::MonitorFlagged,
            "Flagged response detected. Severity: high_risk, Category: Security",
        ));

        assert_ne!(first.id, second.id);
        assert!(first.timestamp <= second.timestamp);

        let events = log.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, AuditAction::MonitorSafe);
        assert_eq!(events[1].action, AuditAction::MonitorFlagged);
    }
}
