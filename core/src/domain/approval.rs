// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Approval units: the legacy per-case [`ApprovedResponse`] record and the
//! richer [`ApprovedPattern`] used for reuse tracking. Both are keyed by
//! (agent, pattern key) with upsert semantics — exactly one record per pair.

use crate::domain::agent::AgentId;
use crate::domain::monitoring::{ResponseId, Severity};
use crate::domain::pattern::PatternKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reuse snapshots retained per pattern. `reuse_count` keeps the true total;
/// `usage` is only a window of the most recent entries.
pub const USAGE_WINDOW: usize = 50;

/// Reviewer identity used for deterministic approver rotation. The pool is
/// fixed so approvals remain attributable without a live session context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewerIdentity {
    pub id: &'static str,
    pub name: &'static str,
    pub role: &'static str,
}

pub const REVIEWER_POOL: &[ReviewerIdentity] = &[
    ReviewerIdentity {
        id: "anna",
        name: "Anna",
        role: "Compliance Manager",
    },
    ReviewerIdentity {
        id: "erik",
        name: "Erik",
        role: "HR Ops",
    },
    ReviewerIdentity {
        id: "mina",
        name: "Mina",
        role: "AI Governance Lead",
    },
];

/// Simple approval record written when a flagged case is approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedResponse {
    pub id: String,
    pub agent_id: AgentId,
    pub pattern_key: PatternKey,
    pub approved_text: String,
    pub approved_by_user_id: String,
    pub approved_at: DateTime<Utc>,
    pub usage_count: u32,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// One recorded reuse of an approved pattern. Optional fields are copied
/// from the monitored response that triggered the reuse, when available.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternUsage {
    pub response_id: ResponseId,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Approved text block tracked for reuse across an agent's traffic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedPattern {
    pub pattern_key: PatternKey,
    pub agent_id: AgentId,
    pub approved_text: String,
    pub approved_by: String,
    pub approved_at: DateTime<Utc>,
    pub reuse_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
    pub usage: Vec<PatternUsage>,
}

/// Input to the registry upsert. When `reuse_count`/`usage` are `None`, an
/// existing record keeps its accumulated counters; a fresh record starts at
/// zero either way.
#[derive(Debug, Clone)]
pub struct ApprovedPatternUpsert {
    pub agent_id: AgentId,
    pub pattern_key: PatternKey,
    pub approved_text: String,
    pub approved_by: String,
    pub approved_at: DateTime<Utc>,
    pub reuse_count: Option<u32>,
    pub usage: Option<Vec<PatternUsage>>,
}

impl ApprovedPattern {
    /// Record one reuse event: bump the true counter, stamp last-used, and
    /// append to the usage window, evicting the oldest entry past the cap.
    pub fn record_usage(&mut self, entry: PatternUsage) {
        self.reuse_count += 1;
        self.last_used_at = Some(entry.timestamp);
        self.usage.push(entry);
        if self.usage.len() > USAGE_WINDOW {
            let excess = self.usage.len() - USAGE_WINDOW;
            self.usage.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pattern::pattern_key;

    fn pattern() -> ApprovedPattern {
        ApprovedPattern {
            pattern_key: pattern_key("Thanks for reaching out"),
            agent_id: AgentId::from("customer-support-bot"),
            approved_text: "Thanks for reaching out".to_string(),
            approved_by: "Anna".to_string(),
            approved_at: Utc::now(),
            reuse_count: 0,
            last_used_at: None,
            usage: Vec::new(),
        }
    }

    fn usage(n: usize) -> PatternUsage {
        PatternUsage {
            response_id: ResponseId::new(format!("resp-{n}")),
            timestamp: Utc::now(),
            user_query: None,
            ai_response: None,
            severity: None,
            category: None,
        }
    }

    #[test]
    fn reuse_counter_outlives_the_usage_window() {
        let mut pat = pattern();
        for n in 0..USAGE_WINDOW + 7 {
            pat.record_usage(usage(n));
        }
        assert_eq!(pat.reuse_count as usize, USAGE_WINDOW + 7);
        assert_eq!(pat.usage.len(), USAGE_WINDOW);
        // oldest entries were evicted first
        assert_eq!(pat.usage[0].response_id.as_str(), "resp-7");
        assert_eq!(
            pat.usage.last().unwrap().response_id.as_str(),
            format!("resp-{}", USAGE_WINDOW + 6)
        );
        assert!(pat.last_used_at.is_some());
    }
}
