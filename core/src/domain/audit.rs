// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Append-only audit ledger records.
//!
//! Every lifecycle transition in the review pipeline emits exactly one
//! [`AuditEvent`]; events are never mutated or deleted after creation, and
//! ledger order is creation order.

use crate::domain::agent::AgentId;
use crate::domain::case::CaseId;
use crate::domain::monitoring::{ResponseId, Severity};
use crate::domain::pattern::PatternKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed action taxonomy consumed at the export boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    CaseApproved,
    CaseRejected,
    CaseEscalated,
    MonitorFlagged,
    MonitorSafe,
    MonitoredApproved,
    ApprovedResponseReused,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::CaseApproved => "CASE_APPROVED",
            AuditAction::CaseRejected => "CASE_REJECTED",
            AuditAction::CaseEscalated => "CASE_ESCALATED",
            AuditAction::MonitorFlagged => "MONITOR_FLAGGED",
            AuditAction::MonitorSafe => "MONITOR_SAFE",
            AuditAction::MonitoredApproved => "MONITORED_APPROVED",
            AuditAction::ApprovedResponseReused => "APPROVED_RESPONSE_REUSED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable ledger entry.
///
/// `pattern_key` is populated for `APPROVED_RESPONSE_REUSED` so consumers
/// can read the key structurally; the same key is still embedded in
/// `details` as the literal `pattern:<key>` token for substring search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: String,
    pub agent_id: AgentId,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub action: AuditAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<CaseId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<ResponseId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_key: Option<PatternKey>,
    pub details: String,
}

/// Event payload as supplied by callers; id and timestamp are assigned by
/// the audit log at append time.
#[derive(Debug, Clone)]
pub struct AuditDraft {
    pub agent_id: AgentId,
    pub actor: Option<String>,
    pub action: AuditAction,
    pub severity: Option<Severity>,
    pub category: Option<String>,
    pub case_id: Option<CaseId>,
    pub response_id: Option<ResponseId>,
    pub pattern_key: Option<PatternKey>,
    pub details: String,
}

impl AuditDraft {
    pub fn new(agent_id: AgentId, action: AuditAction, details: impl Into<String>) -> Self {
        Self {
            agent_id,
            actor: None,
            action,
            severity: None,
            category: None,
            case_id: None,
            response_id: None,
            pattern_key: None,
            details: details.into(),
        }
    }

    pub fn actor(mut self, name: impl Into<String>) -> Self {
        self.actor = Some(name.into());
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn case(mut self, case_id: CaseId) -> Self {
        self.case_id = Some(case_id);
        self
    }

    pub fn response(mut self, response_id: ResponseId) -> Self {
        self.response_id = Some(response_id);
        self
    }

    pub fn pattern(mut self, key: PatternKey) -> Self {
        self.pattern_key = Some(key);
        self
    }
}
