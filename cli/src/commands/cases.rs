// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use super::paint_severity;
use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use warden_core::application::Governance;
use warden_core::domain::case::{CaseId, CaseStatus};

#[derive(Subcommand)]
pub enum CasesCommand {
    /// List flagged cases
    List {
        /// Filter by agent id
        #[arg(long)]
        agent: Option<String>,

        /// Only cases still awaiting disposition
        #[arg(long)]
        open: bool,
    },

    /// Approve an open case with the reviewed response text
    Approve {
        case_id: String,

        /// The approved response text
        #[arg(long)]
        text: String,
    },

    /// Reject an open case
    Reject {
        case_id: String,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Escalate an open case
    Escalate {
        case_id: String,

        #[arg(long)]
        notes: Option<String>,
    },
}

pub fn execute(governance: &Governance, command: CasesCommand) -> Result<()> {
    match command {
        CasesCommand::List { agent, open } => {
            let mut cases = governance.state.cases();
            if let Some(agent) = agent {
                cases.retain(|c| c.agent_id.as_str() == agent);
            }
            if open {
                cases.retain(|c| c.is_open());
            }
            if cases.is_empty() {
                println!("no matching cases");
                return Ok(());
            }
            for case in cases {
                println!(
                    "{:<12} {:<24} {} {} {}",
                    case.id,
                    case.agent_id,
                    paint_status(case.status),
                    paint_severity(case.severity),
                    case.question
                );
            }
        }
        CasesCommand::Approve { case_id, text } => {
            let case_id = CaseId::new(case_id);
            governance.review.approve_case(&case_id, &text);
            report(governance, &case_id);
        }
        CasesCommand::Reject { case_id, notes } => {
            let case_id = CaseId::new(case_id);
            governance.review.reject_case(&case_id, notes.as_deref());
            report(governance, &case_id);
        }
        CasesCommand::Escalate { case_id, notes } => {
            let case_id = CaseId::new(case_id);
            governance.review.escalate_case(&case_id, notes.as_deref());
            report(governance, &case_id);
        }
    }
    Ok(())
}

/// Actions on missing or terminal cases are deliberate no-ops in the core;
/// reflect the resulting status back so the operator can tell.
fn report(governance: &Governance, case_id: &CaseId) {
    match governance.state.find_case(case_id) {
        Some(case) => println!("{} is now {}", case.id, paint_status(case.status)),
        None => println!("{case_id}: no such case"),
    }
}

fn paint_status(status: CaseStatus) -> colored::ColoredString {
    match status {
        CaseStatus::Open => status.as_str().yellow(),
        CaseStatus::Approved => status.as_str().green(),
        CaseStatus::Rejected => status.as_str().red(),
        CaseStatus::Escalated => status.as_str().magenta(),
    }
}
