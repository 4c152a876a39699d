// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Flat CSV rendering of the audit ledger for downstream tooling. Every
//! field is individually emptyable; embedded delimiters, quotes, and line
//! breaks are escaped.

use crate::domain::audit::AuditEvent;

const HEADER: &str = "timestamp,actorName,action,severity,category,details,caseId,responseId";

pub fn audit_csv(events: &[AuditEvent]) -> String {
    let mut out = String::with_capacity(HEADER.len() + events.len() * 96);
    out.push_str(HEADER);
    out.push('\n');
    for event in events {
        let columns = [
            escape(&event.timestamp.to_rfc3339()),
            escape(event.actor.as_deref().unwrap_or("System")),
            escape(event.action.as_str()),
            escape(event.severity.map(|s| s.as_str()).unwrap_or("")),
            escape(event.category.as_deref().unwrap_or("")),
            escape(&event.details),
            escape(event.case_id.as_ref().map(|c| c.as_str()).unwrap_or("")),
            escape(
                event
                    .response_id
                    .as_ref()
                    .map(|r| r.as_str())
                    .unwrap_or(""),
            ),
        ];
        out.push_str(&columns.join(","));
        out.push('\n');
    }
    out
}

fn escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
