// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Approved-Pattern Registry
//!
//! Tracks approved text blocks keyed by (agent, pattern key): their reuse
//! counter and a bounded usage history. Lookups are exact-match on the key
//! pair; a reuse against an unknown pattern is dropped silently (logged) —
//! it must never take down the stream that reported it.

use crate::application::audit::AuditLog;
use crate::application::state::GovernanceState;
use crate::domain::agent::AgentId;
use crate::domain::approval::{ApprovedPattern, ApprovedPatternUpsert, PatternUsage};
use crate::domain::audit::{AuditAction, AuditDraft};
use crate::domain::monitoring::{MonitoredResponse, ResponseId};
use crate::domain::pattern::PatternKey;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct PatternRegistry {
    state: Arc<GovernanceState>,
    audit: AuditLog,
}

impl PatternRegistry {
    pub fn new(state: Arc<GovernanceState>, audit: AuditLog) -> Self {
        Self { state, audit }
    }

    pub fn upsert(&self, upsert: ApprovedPatternUpsert) -> ApprovedPattern {
        self.state.upsert_approved_pattern(upsert)
    }

    pub fn patterns_for(&self, agent_id: &AgentId) -> Vec<ApprovedPattern> {
        self.state.patterns_for(agent_id)
    }

    /// Record one reuse of an approved pattern against a monitored response.
    ///
    /// On success this increments the pattern's true counter, appends to its
    /// bounded usage window, and emits exactly one `APPROVED_RESPONSE_REUSED`
    /// ledger event. The details string embeds the literal `pattern:<key>`
    /// token (wire contract for substring search); the same key also rides
    /// the event's structured `pattern_key` field.
    pub fn record_reuse(
        &self,
        agent_id: &AgentId,
        pattern_key: &PatternKey,
        response_id: &ResponseId,
        timestamp: DateTime<Utc>,
        snapshot: Option<&MonitoredResponse>,
    ) {
        let entry = PatternUsage {
            response_id: response_id.clone(),
            timestamp,
            user_query: snapshot.map(|s| s.user_query.clone()),
            ai_response: snapshot.map(|s| s.ai_response.clone()),
            severity: snapshot.map(|s| s.status),
            category: snapshot.and_then(|s| s.primary_category().map(str::to_string)),
        };

        let Some(total) = self.state.record_pattern_reuse(agent_id, pattern_key, entry) else {
            debug!(agent = %agent_id, key = %pattern_key, "reuse against unknown pattern ignored");
            return;
        };

        self.audit.append(
            AuditDraft::new(
                agent_id.clone(),
                AuditAction::ApprovedResponseReused,
                format!("Approved pattern \"{pattern_key}\" reused. Total reuses: {total}"),
            )
            .actor("System")
            .response(response_id.clone())
            .pattern(pattern_key.clone()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pattern::pattern_key;
    use crate::infrastructure::seed;
    use crate::infrastructure::store::InMemoryStore;

    fn registry() -> PatternRegistry {
        let state = GovernanceState::bootstrap(Arc::new(InMemoryStore::new()));
        let audit = AuditLog::new(state.clone());
        PatternRegistry::new(state, audit)
    }

    fn upsert_for(agent: &AgentId, text: &str) -> ApprovedPatternUpsert {
        ApprovedPatternUpsert {
            agent_id: agent.clone(),
            pattern_key: pattern_key(text),
            approved_text: text.to_string(),
            approved_by: "Anna".to_string(),
            approved_at: Utc::now(),
            reuse_count: None,
            usage: None,
        }
    }

    #[test]
    fn reuse_increments_counter_and_emits_one_event() {
        let registry = registry();
        let agent = AgentId::from("customer-support-bot");
        let key = pattern_key("Thanks for reaching out");
        registry.upsert(upsert_for(&agent, "Thanks for reaching out"));

        let snapshot = seed::sample_responses()[0].clone();
        registry.record_reuse(
            &agent,
            &key,
            &ResponseId::from("resp-1"),
            Utc::now(),
            Some(&snapshot),
        );

        let patterns = registry.patterns_for(&agent);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].reuse_count, 1);
        assert_eq!(patterns[0].usage.len(), 1);
        assert_eq!(
            patterns[0].usage[0].category.as_deref(),
            snapshot.primary_category()
        );

        let events = registry.audit.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, AuditAction::ApprovedResponseReused);
        assert!(events[0].details.contains(key.as_str()));
        assert!(events[0].details.contains("Total reuses: 1"));
        assert_eq!(events[0].pattern_key.as_ref(), Some(&key));
    }

    #[test]
    fn reuse_against_unknown_pattern_is_silent() {
        let registry = registry();
        let agent = AgentId::from("customer-support-bot");
        registry.record_reuse(
            &agent,
            &pattern_key("never approved"),
            &ResponseId::from("resp-1"),
            Utc::now(),
            None,
        );
        assert!(registry.audit.events().is_empty());
        assert!(registry.patterns_for(&agent).is_empty());
    }

    #[test]
    fn lookups_are_exact_on_the_agent_key_pair() {
        let registry = registry();
        let owner = AgentId::from("customer-support-bot");
        let other = AgentId::from("hr-policy-assistant");
        let key = pattern_key("Thanks for reaching out");
        registry.upsert(upsert_for(&owner, "Thanks for reaching out"));

        // same key, different agent: no match, no event
        registry.record_reuse(&other, &key, &ResponseId::from("resp-9"), Utc::now(), None);
        assert_eq!(registry.patterns_for(&owner)[0].reuse_count, 0);
        assert!(registry.audit.events().is_empty());
    }
}
