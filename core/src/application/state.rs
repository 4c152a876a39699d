// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Governance state owner
//!
//! [`GovernanceState`] owns the in-memory working copies of every persisted
//! collection and reconciles them to the [`StateStore`] on each mutation
//! (write-through, no write-behind). It is constructed once per session and
//! injected into every service — there is no module-level shared instance.
//!
//! Store reads tolerate absent or corrupt payloads by substituting the
//! supplied default; store write failures are logged and never surfaced to
//! the review pipeline.

use crate::domain::agent::{Agent, AgentId};
use crate::domain::approval::{
    ApprovedPattern, ApprovedPatternUpsert, ApprovedResponse, PatternUsage,
};
use crate::domain::audit::AuditEvent;
use crate::domain::case::{CaseId, CaseStatus, FlaggedCase};
use crate::domain::monitoring::{MonitoredResponse, ResponseId};
use crate::domain::pattern::PatternKey;
use crate::infrastructure::seed;
use crate::infrastructure::store::{Collection, StateStore};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Most-recent monitored responses retained per agent in the store. The
/// persisted history is deliberately deeper than the live rolling window.
pub const MONITORED_HISTORY_CAP: usize = 100;

pub struct GovernanceState {
    store: Arc<dyn StateStore>,
    agents: RwLock<Vec<Agent>>,
    cases: RwLock<Vec<FlaggedCase>>,
    approved_responses: RwLock<Vec<ApprovedResponse>>,
    approved_patterns: RwLock<Vec<ApprovedPattern>>,
    audit_events: RwLock<Vec<AuditEvent>>,
    monitored: RwLock<HashMap<AgentId, Vec<MonitoredResponse>>>,
}

impl GovernanceState {
    /// Load every collection from the store, seeding the fleet and the
    /// review queue on first run (absent keys only — corrupt payloads fall
    /// back without being overwritten).
    pub fn bootstrap(store: Arc<dyn StateStore>) -> Arc<Self> {
        let agents = load_or_seed(store.as_ref(), Collection::Agents, seed::agents());
        let cases = load_or_seed(store.as_ref(), Collection::Cases, seed::cases());
        let approved_responses = load_or(store.as_ref(), Collection::ApprovedResponses, Vec::new());
        let approved_patterns = load_or(store.as_ref(), Collection::ApprovedPatterns, Vec::new());
        let audit_events = load_or(store.as_ref(), Collection::AuditEvents, Vec::new());
        let monitored = load_or(store.as_ref(), Collection::MonitoredResponses, HashMap::new());

        Arc::new(Self {
            store,
            agents: RwLock::new(agents),
            cases: RwLock::new(cases),
            approved_responses: RwLock::new(approved_responses),
            approved_patterns: RwLock::new(approved_patterns),
            audit_events: RwLock::new(audit_events),
            monitored: RwLock::new(monitored),
        })
    }

    // ── agents ──────────────────────────────────────────────────────────

    pub fn agents(&self) -> Vec<Agent> {
        self.agents.read().clone()
    }

    pub fn find_agent(&self, id: &AgentId) -> Option<Agent> {
        self.agents.read().iter().find(|a| a.id == *id).cloned()
    }

    // ── flagged cases ───────────────────────────────────────────────────

    pub fn cases(&self) -> Vec<FlaggedCase> {
        self.cases.read().clone()
    }

    pub fn find_case(&self, id: &CaseId) -> Option<FlaggedCase> {
        self.cases.read().iter().find(|c| c.id == *id).cloned()
    }

    pub fn approved_case_count(&self) -> usize {
        self.cases
            .read()
            .iter()
            .filter(|c| c.status == CaseStatus::Approved)
            .count()
    }

    pub fn insert_case(&self, case: FlaggedCase) {
        let mut cases = self.cases.write();
        cases.push(case);
        self.persist(Collection::Cases, &*cases);
    }

    /// Apply a guarded lifecycle transition. Returns the updated case, or
    /// `None` when the case is missing or already terminal (no-op).
    pub fn transition_case(&self, id: &CaseId, next: CaseStatus) -> Option<FlaggedCase> {
        let mut cases = self.cases.write();
        let case = cases.iter_mut().find(|c| c.id == *id)?;
        if !case.transition(next) {
            return None;
        }
        let updated = case.clone();
        self.persist(Collection::Cases, &*cases);
        Some(updated)
    }

    // ── approved responses ──────────────────────────────────────────────

    pub fn approved_responses(&self) -> Vec<ApprovedResponse> {
        self.approved_responses.read().clone()
    }

    pub fn approved_response_count(&self) -> usize {
        self.approved_responses.read().len()
    }

    /// One record per (agent, pattern key): an existing record takes the new
    /// text/approver/time but keeps its usage counters; otherwise a fresh
    /// record starts unused.
    pub fn upsert_approved_response(
        &self,
        agent_id: &AgentId,
        pattern_key: &PatternKey,
        approved_text: &str,
        approver_id: &str,
        approved_at: DateTime<Utc>,
    ) -> ApprovedResponse {
        let mut responses = self.approved_responses.write();
        let record = match responses
            .iter_mut()
            .find(|r| r.agent_id == *agent_id && r.pattern_key == *pattern_key)
        {
            Some(existing) => {
                existing.approved_text = approved_text.to_string();
                existing.approved_by_user_id = approver_id.to_string();
                existing.approved_at = approved_at;
                existing.clone()
            }
            None => {
                let fresh = ApprovedResponse {
                    id: Uuid::new_v4().to_string(),
                    agent_id: agent_id.clone(),
                    pattern_key: pattern_key.clone(),
                    approved_text: approved_text.to_string(),
                    approved_by_user_id: approver_id.to_string(),
                    approved_at,
                    usage_count: 0,
                    last_used_at: None,
                };
                responses.push(fresh.clone());
                fresh
            }
        };
        self.persist(Collection::ApprovedResponses, &*responses);
        record
    }

    /// Count one reuse of a previously approved response. `None` when no
    /// record exists for the pair.
    pub fn bump_approved_response_usage(
        &self,
        agent_id: &AgentId,
        pattern_key: &PatternKey,
        used_at: DateTime<Utc>,
    ) -> Option<ApprovedResponse> {
        let mut responses = self.approved_responses.write();
        let record = responses
            .iter_mut()
            .find(|r| r.agent_id == *agent_id && r.pattern_key == *pattern_key)?;
        record.usage_count += 1;
        record.last_used_at = Some(used_at);
        let updated = record.clone();
        self.persist(Collection::ApprovedResponses, &*responses);
        Some(updated)
    }

    // ── approved patterns ───────────────────────────────────────────────

    pub fn approved_patterns(&self) -> Vec<ApprovedPattern> {
        self.approved_patterns.read().clone()
    }

    pub fn patterns_for(&self, agent_id: &AgentId) -> Vec<ApprovedPattern> {
        self.approved_patterns
            .read()
            .iter()
            .filter(|p| p.agent_id == *agent_id)
            .cloned()
            .collect()
    }

    pub fn upsert_approved_pattern(&self, upsert: ApprovedPatternUpsert) -> ApprovedPattern {
        let mut patterns = self.approved_patterns.write();
        let record = match patterns
            .iter_mut()
            .find(|p| p.agent_id == upsert.agent_id && p.pattern_key == upsert.pattern_key)
        {
            Some(existing) => {
                existing.approved_text = upsert.approved_text;
                existing.approved_by = upsert.approved_by;
                existing.approved_at = upsert.approved_at;
                if let Some(count) = upsert.reuse_count {
                    existing.reuse_count = count;
                }
                if let Some(usage) = upsert.usage {
                    existing.usage = usage;
                }
                existing.clone()
            }
            None => {
                let fresh = ApprovedPattern {
                    pattern_key: upsert.pattern_key,
                    agent_id: upsert.agent_id,
                    approved_text: upsert.approved_text,
                    approved_by: upsert.approved_by,
                    approved_at: upsert.approved_at,
                    reuse_count: upsert.reuse_count.unwrap_or(0),
                    last_used_at: None,
                    usage: upsert.usage.unwrap_or_default(),
                };
                patterns.push(fresh.clone());
                fresh
            }
        };
        self.persist(Collection::ApprovedPatterns, &*patterns);
        record
    }

    /// Record one pattern reuse. Returns the post-increment reuse total, or
    /// `None` when no record matches the pair.
    pub fn record_pattern_reuse(
        &self,
        agent_id: &AgentId,
        pattern_key: &PatternKey,
        entry: PatternUsage,
    ) -> Option<u32> {
        let mut patterns = self.approved_patterns.write();
        let pattern = patterns
            .iter_mut()
            .find(|p| p.agent_id == *agent_id && p.pattern_key == *pattern_key)?;
        pattern.record_usage(entry);
        let total = pattern.reuse_count;
        self.persist(Collection::ApprovedPatterns, &*patterns);
        Some(total)
    }

    // ── audit ledger ────────────────────────────────────────────────────

    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.audit_events.read().clone()
    }

    pub fn append_audit(&self, event: AuditEvent) {
        let mut events = self.audit_events.write();
        events.push(event);
        self.persist(Collection::AuditEvents, &*events);
    }

    // ── monitored-response history ──────────────────────────────────────

    pub fn monitored_for(&self, agent_id: &AgentId) -> Vec<MonitoredResponse> {
        self.monitored
            .read()
            .get(agent_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_monitored(
        &self,
        agent_id: &AgentId,
        response_id: &ResponseId,
    ) -> Option<MonitoredResponse> {
        self.monitored
            .read()
            .get(agent_id)?
            .iter()
            .find(|r| r.id == *response_id)
            .cloned()
    }

    /// Write-through upsert into the per-agent history: a redelivered id
    /// replaces in place; new entries append, evicting past the cap.
    pub fn upsert_monitored(&self, agent_id: &AgentId, response: MonitoredResponse) {
        let mut monitored = self.monitored.write();
        let history = monitored.entry(agent_id.clone()).or_default();
        match history.iter_mut().find(|r| r.id == response.id) {
            Some(existing) => *existing = response,
            None => {
                history.push(response);
                if history.len() > MONITORED_HISTORY_CAP {
                    let excess = history.len() - MONITORED_HISTORY_CAP;
                    history.drain(..excess);
                }
            }
        }
        self.persist(Collection::MonitoredResponses, &*monitored);
    }

    // ── persistence ─────────────────────────────────────────────────────

    fn persist<T: Serialize>(&self, collection: Collection, value: &T) {
        persist_to(self.store.as_ref(), collection, value);
    }
}

fn persist_to<T: Serialize>(store: &dyn StateStore, collection: Collection, value: &T) {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(collection = collection.key(), %err, "failed to serialize collection");
            return;
        }
    };
    if let Err(err) = store.set(collection, bytes) {
        warn!(collection = collection.key(), %err, "failed to persist collection");
    }
}

fn load_or<T: DeserializeOwned>(store: &dyn StateStore, collection: Collection, fallback: T) -> T {
    match store.get(collection) {
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(err) => {
                warn!(collection = collection.key(), %err, "corrupt payload, using default");
                fallback
            }
        },
        Ok(None) => fallback,
        Err(err) => {
            warn!(collection = collection.key(), %err, "store read failed, using default");
            fallback
        }
    }
}

/// Like [`load_or`], but an absent key persists the seed so later sessions
/// observe the same starting data.
fn load_or_seed<T: Serialize + DeserializeOwned>(
    store: &dyn StateStore,
    collection: Collection,
    seed: T,
) -> T {
    match store.get(collection) {
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(err) => {
                warn!(collection = collection.key(), %err, "corrupt payload, using seed");
                seed
            }
        },
        Ok(None) => {
            persist_to(store, collection, &seed);
            seed
        }
        Err(err) => {
            warn!(collection = collection.key(), %err, "store read failed, using seed");
            seed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::InMemoryStore;

    fn state() -> Arc<GovernanceState> {
        GovernanceState::bootstrap(Arc::new(InMemoryStore::new()))
    }

    #[test]
    fn bootstrap_seeds_fleet_and_queue_on_first_run() {
        let store = Arc::new(InMemoryStore::new());
        let state = GovernanceState::bootstrap(store.clone());
        assert_eq!(state.agents().len(), 3);
        assert!(!state.cases().is_empty());

        // seeds were written through, so a second session sees them
        assert!(store.get(Collection::Agents).unwrap().is_some());
        assert!(store.get(Collection::Cases).unwrap().is_some());
    }

    #[test]
    fn corrupt_payload_falls_back_without_raising() {
        let store = Arc::new(InMemoryStore::new());
        store
            .set(Collection::Agents, b"{not json".to_vec())
            .unwrap();
        store
            .set(Collection::AuditEvents, b"\xff\xfe".to_vec())
            .unwrap();
        let state = GovernanceState::bootstrap(store);
        // agents fall back to the seed, the ledger to empty
        assert_eq!(state.agents().len(), 3);
        assert!(state.audit_events().is_empty());
    }

    #[test]
    fn transition_case_guards_terminal_states() {
        let state = state();
        let id = state.cases()[0].id.clone();
        assert!(state.transition_case(&id, CaseStatus::Rejected).is_some());
        assert!(state.transition_case(&id, CaseStatus::Approved).is_none());
        assert_eq!(
            state.find_case(&id).unwrap().status,
            CaseStatus::Rejected
        );
        assert!(state
            .transition_case(&CaseId::from("nope"), CaseStatus::Approved)
            .is_none());
    }

    #[test]
    fn monitored_history_replaces_duplicates_and_caps_depth() {
        let state = state();
        let agent = AgentId::from("customer-support-bot");
        let template = seed::sample_responses()[0].clone();

        for n in 0..MONITORED_HISTORY_CAP + 5 {
            let mut item = template.clone();
            item.id = ResponseId::new(format!("resp-{n}"));
            state.upsert_monitored(&agent, item);
        }
        let history = state.monitored_for(&agent);
        assert_eq!(history.len(), MONITORED_HISTORY_CAP);
        assert_eq!(history[0].id.as_str(), "resp-5");

        // redelivery replaces in place instead of duplicating
        let mut replayed = template.clone();
        replayed.id = ResponseId::new("resp-50");
        replayed.trust_score = 1;
        state.upsert_monitored(&agent, replayed);
        let history = state.monitored_for(&agent);
        assert_eq!(history.len(), MONITORED_HISTORY_CAP);
        assert_eq!(
            state
                .get_monitored(&agent, &ResponseId::from("resp-50"))
                .unwrap()
                .trust_score,
            1
        );
    }

    #[test]
    fn pattern_upsert_preserves_counters_unless_supplied() {
        let state = state();
        let agent = AgentId::from("customer-support-bot");
        let key = crate::domain::pattern::pattern_key("Thanks for reaching out");

        let upsert = |count: Option<u32>| ApprovedPatternUpsert {
            agent_id: agent.clone(),
            pattern_key: key.clone(),
            approved_text: "Thanks for reaching out".to_string(),
            approved_by: "Anna".to_string(),
            approved_at: Utc::now(),
            reuse_count: count,
            usage: None,
        };

        assert_eq!(state.upsert_approved_pattern(upsert(None)).reuse_count, 0);
        let entry = PatternUsage {
            response_id: ResponseId::from("resp-1"),
            timestamp: Utc::now(),
            user_query: None,
            ai_response: None,
            severity: None,
            category: None,
        };
        assert_eq!(state.record_pattern_reuse(&agent, &key, entry), Some(1));

        // re-approval without counters keeps the accumulated total
        assert_eq!(state.upsert_approved_pattern(upsert(None)).reuse_count, 1);
        // explicit counters overwrite
        assert_eq!(state.upsert_approved_pattern(upsert(Some(9))).reuse_count, 9);
    }
}
