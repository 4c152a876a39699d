// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Seed fleet, seed review queue, and the sample traffic that drives the
//! simulated response feed. Loaded into the store on first run only.

use crate::domain::agent::{Agent, AgentId, AgentStatus, MonitoringState};
use crate::domain::case::{CaseId, CaseStatus, FlaggedCase};
use crate::domain::monitoring::{GuardrailFinding, MonitoredResponse, ResponseId, Severity};
use crate::domain::pattern::pattern_key;
use chrono::Utc;

pub fn agents() -> Vec<Agent> {
    vec![
        Agent {
            id: AgentId::from("customer-support-bot"),
            name: "Customer Support Bot".to_string(),
            status: AgentStatus::Green,
            trust_score: 92,
            monitoring: MonitoringState::Monitoring,
        },
        Agent {
            id: AgentId::from("hr-policy-assistant"),
            name: "HR Policy Assistant".to_string(),
            status: AgentStatus::Yellow,
            trust_score: 78,
            monitoring: MonitoringState::Monitoring,
        },
        Agent {
            id: AgentId::from("internal-dev-copilot"),
            name: "Internal Dev Copilot".to_string(),
            status: AgentStatus::Red,
            trust_score: 61,
            monitoring: MonitoringState::Paused,
        },
    ]
}

pub fn cases() -> Vec<FlaggedCase> {
    let now = Utc::now();
    let mut cases = Vec::new();

    let mut case = |id: &str,
                    agent: &str,
                    severity: Severity,
                    category: &str,
                    question: &str,
                    draft: &str,
                    confidence: u32,
                    citations: u32| {
        cases.push(FlaggedCase {
            id: CaseId::from(id),
            agent_id: AgentId::from(agent),
            pattern_key: pattern_key(draft),
            severity,
            category: category.to_string(),
            question: question.to_string(),
            draft_answer: draft.to_string(),
            confidence,
            citations_count: citations,
            status: CaseStatus::Open,
            created_at: now,
        });
    };

    case(
        "case-001",
        "customer-support-bot",
        Severity::NeedsReview,
        "Policy",
        "Can I return an opened product?",
        "Opened products can be returned within 14 days if the seal is intact.",
        74,
        1,
    );
    case(
        "case-002",
        "hr-policy-assistant",
        Severity::HighRisk,
        "Compensation",
        "What does my manager earn?",
        "I can't share individual salaries, but pay bands are published on the intranet.",
        68,
        0,
    );
    case(
        "case-003",
        "internal-dev-copilot",
        Severity::HighRisk,
        "Security",
        "Where are the staging credentials?",
        "Credentials live in the secrets manager; request access through the on-call lead.",
        71,
        0,
    );
    case(
        "case-004",
        "customer-support-bot",
        Severity::NeedsReview,
        "General",
        "Do you price match competitors?",
        "We match advertised prices from authorized retailers at the time of purchase.",
        77,
        2,
    );

    cases
}

/// Sample responses cycled by the simulated feed, one template set per
/// agent. Ids and timestamps are stamped fresh at delivery time.
pub fn sample_responses() -> Vec<MonitoredResponse> {
    let now = Utc::now();
    let mut samples = Vec::new();

    let mut sample = |agent: &str,
                      query: &str,
                      answer: &str,
                      trust: u32,
                      status: Severity,
                      category: &str,
                      explanation: &str,
                      confidence: u32,
                      citations: u32| {
        let index = samples.len();
        samples.push(MonitoredResponse {
            id: ResponseId::new(format!("sample-{index}")),
            agent_id: AgentId::from(agent),
            timestamp: now,
            user_query: query.to_string(),
            ai_response: answer.to_string(),
            trust_score: trust,
            status,
            findings: vec![GuardrailFinding {
                category: category.to_string(),
                severity: status,
                explanation: explanation.to_string(),
                confidence,
                citations_count: citations,
            }],
        });
    };

    sample(
        "customer-support-bot",
        "What is your refund policy?",
        "Our refund policy allows returns within 30 days of purchase. Please contact support with your order number.",
        92,
        Severity::Safe,
        "Policy",
        "Standard policy information",
        95,
        2,
    );
    sample(
        "customer-support-bot",
        "Can you help me reset my password?",
        "Sure! I can help you reset your password. Please provide your email address: user@example.com and I'll send you a reset link.",
        45,
        Severity::HighRisk,
        "PII Disclosure",
        "AI generated example email address that could be mistaken for real user data",
        88,
        0,
    );
    sample(
        "hr-policy-assistant",
        "What is the salary range for senior engineers?",
        "Senior engineers typically earn between $120,000 and $180,000 annually, depending on experience and location.",
        35,
        Severity::HighRisk,
        "Compensation",
        "Salary information disclosure without proper authorization",
        92,
        0,
    );
    sample(
        "hr-policy-assistant",
        "How many vacation days do I have?",
        "You have 25 vacation days per year. You can check your current balance in the HR portal.",
        78,
        Severity::NeedsReview,
        "HR Policy",
        "Personal data access - verify user authorization",
        75,
        1,
    );
    sample(
        "internal-dev-copilot",
        "How do I connect to the production database?",
        "To connect to production, use the connection string: postgresql://prod-db.internal:5432/app. Credentials are in the secrets manager.",
        25,
        Severity::HighRisk,
        "Security",
        "Database connection details exposed",
        95,
        0,
    );
    sample(
        "customer-support-bot",
        "What are your business hours?",
        "Our customer support is available Monday through Friday, 9 AM to 5 PM EST.",
        88,
        Severity::Safe,
        "General",
        "Public business information",
        98,
        1,
    );
    sample(
        "hr-policy-assistant",
        "What is the company's code of conduct?",
        "Our code of conduct emphasizes respect, integrity, and professionalism. Full details are available in the employee handbook.",
        85,
        Severity::Safe,
        "Policy",
        "General policy reference",
        90,
        1,
    );
    sample(
        "internal-dev-copilot",
        "What is the API rate limit?",
        "The API rate limit is 1000 requests per minute per API key. Rate limit headers are included in all responses.",
        82,
        Severity::Safe,
        "Technical",
        "Public API documentation",
        92,
        2,
    );

    samples
}
