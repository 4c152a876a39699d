// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Streamed monitoring types: one [`MonitoredResponse`] per AI answer
//! evaluated by the external guardrail classifier. These are transient units
//! with their own lifecycle — they arrive over the feed and may be promoted
//! to `safe` by a reviewer, but never enter the case state machine.

use crate::domain::agent::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResponseId(pub String);

impl ResponseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResponseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResponseId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Severity scale shared by findings, flagged cases, and response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Safe,
    NeedsReview,
    HighRisk,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Safe => "safe",
            Severity::NeedsReview => "needs_review",
            Severity::HighRisk => "high_risk",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classifier verdict attached to a monitored response. Findings arrive
/// pre-computed from the guardrail service; Warden never re-scores them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailFinding {
    pub category: String,
    pub severity: Severity,
    pub explanation: String,
    pub confidence: u32,
    pub citations_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredResponse {
    pub id: ResponseId,
    pub agent_id: AgentId,
    pub timestamp: DateTime<Utc>,
    pub user_query: String,
    pub ai_response: String,
    pub trust_score: u32,
    pub status: Severity,
    pub findings: Vec<GuardrailFinding>,
}

impl MonitoredResponse {
    /// Category of the leading finding, if the classifier attached any.
    pub fn primary_category(&self) -> Option<&str> {
        self.findings.first().map(|f| f.category.as_str())
    }
}
