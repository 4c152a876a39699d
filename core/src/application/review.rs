// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Case Lifecycle Manager
//!
//! Drives the `open -> {approved, rejected, escalated}` state machine for
//! flagged cases and the separate approval path for live monitored
//! responses. Expected misses (unknown id, already-terminal case) are
//! silent no-ops: the triggering actions are stale-view double-submits, not
//! faults.

use crate::application::audit::AuditLog;
use crate::application::monitor::MonitorHandle;
use crate::application::registry::PatternRegistry;
use crate::application::state::GovernanceState;
use crate::domain::agent::AgentId;
use crate::domain::approval::{ApprovedPatternUpsert, REVIEWER_POOL};
use crate::domain::audit::{AuditAction, AuditDraft};
use crate::domain::case::{CaseId, CaseStatus, FlaggedCase};
use crate::domain::monitoring::{ResponseId, Severity};
use crate::domain::pattern::{pattern_key, PatternKey};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct ReviewService {
    state: Arc<GovernanceState>,
    registry: PatternRegistry,
    audit: AuditLog,
    /// Acting session reviewer, attributed on reject/escalate. Approvals
    /// rotate through the fixed pool instead (see [`approve_case`]).
    ///
    /// [`approve_case`]: ReviewService::approve_case
    actor: String,
}

impl ReviewService {
    pub fn new(
        state: Arc<GovernanceState>,
        registry: PatternRegistry,
        audit: AuditLog,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            state,
            registry,
            audit,
            actor: actor.into(),
        }
    }

    /// Approve an open case with the reviewed text.
    ///
    /// The approver identity rotates deterministically through the reviewer
    /// pool by total prior approval count, decoupling attribution from the
    /// acting session. Writes the ApprovedResponse under the case's original
    /// pattern key and an ApprovedPattern under a key derived from the
    /// approved text itself, then appends one `CASE_APPROVED` event.
    pub fn approve_case(&self, case_id: &CaseId, approved_text: &str) {
        let Some(case) = self.state.find_case(case_id) else {
            debug!(case = %case_id, "approve ignored: unknown case");
            return;
        };
        if !case.is_open() {
            debug!(case = %case_id, status = case.status.as_str(), "approve ignored: case not open");
            return;
        }

        let approvals = self.state.approved_response_count() + self.state.approved_case_count();
        let reviewer = &REVIEWER_POOL[approvals % REVIEWER_POOL.len()];

        let Some(case) = self.state.transition_case(case_id, CaseStatus::Approved) else {
            return;
        };
        let now = Utc::now();

        self.state.upsert_approved_response(
            &case.agent_id,
            &case.pattern_key,
            approved_text,
            reviewer.id,
            now,
        );

        let derived_key = pattern_key(approved_text);
        self.registry.upsert(ApprovedPatternUpsert {
            agent_id: case.agent_id.clone(),
            pattern_key: derived_key,
            approved_text: approved_text.to_string(),
            approved_by: reviewer.name.to_string(),
            approved_at: now,
            reuse_count: None,
            usage: None,
        });

        info!(case = %case_id, reviewer = reviewer.name, "case approved");
        self.audit.append(
            AuditDraft::new(
                case.agent_id.clone(),
                AuditAction::CaseApproved,
                format!(
                    "Approved response for case {case_id}. Category: {}",
                    case.category
                ),
            )
            .actor(reviewer.name)
            .severity(case.severity)
            .category(Some(case.category.clone()))
            .case(case_id.clone()),
        );
    }

    pub fn reject_case(&self, case_id: &CaseId, notes: Option<&str>) {
        let Some(case) = self.state.transition_case(case_id, CaseStatus::Rejected) else {
            debug!(case = %case_id, "reject ignored: unknown or non-open case");
            return;
        };
        let details = notes.map(str::to_string).unwrap_or_else(|| {
            format!(
                "Rejected response for case {case_id}. Category: {}",
                case.category
            )
        });
        self.audit.append(
            AuditDraft::new(case.agent_id.clone(), AuditAction::CaseRejected, details)
                .actor(self.actor.as_str())
                .severity(case.severity)
                .category(Some(case.category.clone()))
                .case(case_id.clone()),
        );
    }

    pub fn escalate_case(&self, case_id: &CaseId, notes: Option<&str>) {
        let Some(case) = self.state.transition_case(case_id, CaseStatus::Escalated) else {
            debug!(case = %case_id, "escalate ignored: unknown or non-open case");
            return;
        };
        let details = notes.map(str::to_string).unwrap_or_else(|| {
            format!(
                "Escalated case {case_id} due to {} severity. Category: {}",
                case.severity, case.category
            )
        });
        self.audit.append(
            AuditDraft::new(case.agent_id.clone(), AuditAction::CaseEscalated, details)
                .actor(self.actor.as_str())
                .severity(case.severity)
                .category(Some(case.category.clone()))
                .case(case_id.clone()),
        );
    }

    /// Approve a response straight off the live monitor window.
    ///
    /// Distinct path from case approval: the lookup is against the current
    /// rolling window only, and the entry is promoted to `safe` in place.
    /// Already-safe entries are a no-op so repeated approvals stay
    /// idempotent and cannot duplicate `MONITORED_APPROVED` events.
    pub fn approve_monitored(
        &self,
        monitor: &MonitorHandle,
        response_id: &ResponseId,
        approved_text: &str,
        actor: &str,
    ) {
        let Some(response) = monitor.find_response(response_id) else {
            debug!(response = %response_id, "monitored approval ignored: not in window");
            return;
        };
        if response.status == Severity::Safe {
            debug!(response = %response_id, "monitored approval ignored: already safe");
            return;
        }

        let now = Utc::now();
        self.registry.upsert(ApprovedPatternUpsert {
            agent_id: response.agent_id.clone(),
            pattern_key: pattern_key(approved_text),
            approved_text: approved_text.to_string(),
            approved_by: actor.to_string(),
            approved_at: now,
            reuse_count: None,
            usage: None,
        });

        let category = response.primary_category().unwrap_or("General");
        self.audit.append(
            AuditDraft::new(
                response.agent_id.clone(),
                AuditAction::MonitoredApproved,
                format!("Approved monitored response {response_id}. Category: {category}"),
            )
            .actor(actor)
            .severity(response.status)
            .category(response.primary_category().map(str::to_string))
            .response(response_id.clone()),
        );

        monitor.mark_safe(response_id);
    }

    /// Register one incoming request matching `pattern_key`: reuse the
    /// approved response when one exists, otherwise open a fresh case for
    /// review.
    pub fn register_request(&self, agent_id: &AgentId, pattern_key: &PatternKey) {
        if self
            .state
            .bump_approved_response_usage(agent_id, pattern_key, Utc::now())
            .is_some()
        {
            debug!(agent = %agent_id, key = %pattern_key, "request served from approved response");
            return;
        }
        if self.state.find_agent(agent_id).is_none() {
            debug!(agent = %agent_id, "request ignored: unknown agent");
            return;
        }
        self.state.insert_case(FlaggedCase {
            id: CaseId::new(format!("case-{}", Uuid::new_v4())),
            agent_id: agent_id.clone(),
            pattern_key: pattern_key.clone(),
            severity: Severity::NeedsReview,
            category: "General".to_string(),
            question: format!("Sample question for pattern: {pattern_key}"),
            draft_answer: format!("Draft answer for pattern: {pattern_key}"),
            confidence: 80,
            citations_count: 1,
            status: CaseStatus::Open,
            created_at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::InMemoryStore;

    fn service() -> ReviewService {
        let state = GovernanceState::bootstrap(Arc::new(InMemoryStore::new()));
        let audit = AuditLog::new(state.clone());
        let registry = PatternRegistry::new(state.clone(), audit.clone());
        ReviewService::new(state, registry, audit, "Anna")
    }

    fn state_of(service: &ReviewService) -> &Arc<GovernanceState> {
        &service.state
    }

    #[test]
    fn approve_writes_both_approval_records() {
        let service = service();
        let case = state_of(&service).cases()[0].clone();

        service.approve_case(&case.id, "Thanks for reaching out");

        let state = state_of(&service);
        assert_eq!(
            state.find_case(&case.id).unwrap().status,
            CaseStatus::Approved
        );

        // legacy record keyed by the case's original pattern key
        let responses = state.approved_responses();
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].pattern_key, case.pattern_key);
        assert_eq!(responses[0].usage_count, 0);

        // pattern record keyed by the fingerprint of the approved text
        let patterns = state.patterns_for(&case.agent_id);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].pattern_key, pattern_key("Thanks for reaching out"));
        assert_eq!(patterns[0].reuse_count, 0);

        let events = service.audit.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, AuditAction::CaseApproved);
        assert_eq!(events[0].severity, Some(case.severity));
    }

    #[test]
    fn terminal_cases_ignore_further_actions_without_audit() {
        let service = service();
        let case_id = state_of(&service).cases()[0].id.clone();

        service.approve_case(&case_id, "Approved wording");
        let after_first = service.audit.events().len();

        service.approve_case(&case_id, "Second attempt");
        service.reject_case(&case_id, None);
        service.escalate_case(&case_id, Some("bump"));

        assert_eq!(
            state_of(&service).find_case(&case_id).unwrap().status,
            CaseStatus::Approved
        );
        assert_eq!(service.audit.events().len(), after_first);
    }

    #[test]
    fn approver_rotates_with_total_approval_count() {
        let service = service();
        let cases = state_of(&service).cases();

        service.approve_case(&cases[0].id, "First approval");
        service.approve_case(&cases[1].id, "Second approval");
        service.approve_case(&cases[2].id, "Third approval");

        let actors: Vec<Option<String>> = service
            .audit
            .events()
            .into_iter()
            .map(|e| e.actor)
            .collect();
        // each approval counts the prior ApprovedResponse + approved cases,
        // so the pool advances two steps per approval
        assert_eq!(actors[0].as_deref(), Some("Anna"));
        assert_eq!(actors[1].as_deref(), Some("Mina"));
        assert_eq!(actors[2].as_deref(), Some("Erik"));
    }

    #[test]
    fn reject_uses_supplied_notes_or_a_default() {
        let service = service();
        let cases = state_of(&service).cases();

        service.reject_case(&cases[0].id, Some("Cited the wrong policy"));
        service.reject_case(&cases[1].id, None);

        let events = service.audit.events();
        assert_eq!(events[0].details, "Cited the wrong policy");
        assert!(events[1]
            .details
            .starts_with(&format!("Rejected response for case {}", cases[1].id)));
        assert_eq!(events[0].actor.as_deref(), Some("Anna"));
    }

    #[test]
    fn escalation_default_mentions_severity() {
        let service = service();
        let case = state_of(&service).cases()[1].clone();
        service.escalate_case(&case.id, None);
        let events = service.audit.events();
        assert!(events[0].details.contains("high_risk severity"));
        assert_eq!(events[0].action, AuditAction::CaseEscalated);
    }

    #[test]
    fn register_request_reuses_or_opens_a_case() {
        let service = service();
        let state = state_of(&service).clone();
        let agent = AgentId::from("customer-support-bot");
        let case_count = state.cases().len();

        // no approved response yet: a new case opens
        let key = pattern_key("unseen request");
        service.register_request(&agent, &key);
        assert_eq!(state.cases().len(), case_count + 1);

        // once approved, the same request bumps usage instead
        let approved = state.upsert_approved_response(
            &agent,
            &key,
            "Approved wording",
            "anna",
            Utc::now(),
        );
        service.register_request(&agent, &key);
        assert_eq!(state.cases().len(), case_count + 1);
        let responses = state.approved_responses();
        let record = responses.iter().find(|r| r.id == approved.id).unwrap();
        assert_eq!(record.usage_count, 1);
        assert!(record.last_used_at.is_some());
    }
}
