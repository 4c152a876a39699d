// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;
use warden_core::application::export::audit_csv;
use warden_core::application::Governance;
use warden_core::domain::agent::AgentId;
use warden_core::domain::audit::AuditEvent;

#[derive(Subcommand)]
pub enum AuditCommand {
    /// List ledger entries, oldest first
    List {
        /// Filter by agent id
        #[arg(long)]
        agent: Option<String>,
    },

    /// Export the ledger as CSV
    Export {
        /// Filter by agent id
        #[arg(long)]
        agent: Option<String>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn execute(governance: &Governance, command: AuditCommand) -> Result<()> {
    match command {
        AuditCommand::List { agent } => {
            let events = events_for(governance, agent.as_deref());
            if events.is_empty() {
                println!("audit ledger is empty");
                return Ok(());
            }
            for event in events {
                println!(
                    "{} {:<26} {:<20} {}",
                    event.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    event.action.as_str().bold(),
                    event.actor.as_deref().unwrap_or("System"),
                    event.details
                );
            }
        }
        AuditCommand::Export { agent, output } => {
            let events = events_for(governance, agent.as_deref());
            let csv = audit_csv(&events);
            match output {
                Some(path) => {
                    std::fs::write(&path, csv)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("exported {} events to {}", events.len(), path.display());
                }
                None => print!("{csv}"),
            }
        }
    }
    Ok(())
}

fn events_for(governance: &Governance, agent: Option<&str>) -> Vec<AuditEvent> {
    match agent {
        Some(agent) => governance.audit.events_for(&AgentId::from(agent)),
        None => governance.audit.events(),
    }
}
