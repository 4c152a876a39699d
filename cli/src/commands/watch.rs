// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use super::paint_severity;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use warden_core::application::Governance;
use warden_core::domain::agent::AgentId;
use warden_core::domain::monitoring::ResponseId;

#[derive(Args)]
pub struct WatchArgs {
    /// Agent identifier to monitor
    pub agent_id: String,

    /// Stop after this many seconds (runs until Ctrl-C when omitted)
    #[arg(long, value_name = "SECONDS")]
    pub duration: Option<u64>,
}

pub async fn execute(governance: &Governance, args: WatchArgs) -> Result<()> {
    let agent_id = AgentId::from(args.agent_id.as_str());
    let handle = governance.monitor.watch(&agent_id)?;
    println!("watching {} - Ctrl-C to stop", agent_id.to_string().bold());

    let started = Instant::now();
    let deadline = args.duration.map(Duration::from_secs);
    let mut printed: HashSet<ResponseId> = HashSet::new();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(Duration::from_millis(500)) => {
                let mut fresh = false;
                for response in handle.responses() {
                    if !printed.insert(response.id.clone()) {
                        continue;
                    }
                    fresh = true;
                    println!(
                        "{} {} trust {:<4} {}",
                        response.timestamp.format("%H:%M:%S"),
                        paint_severity(response.status),
                        response.trust_score,
                        response.user_query
                    );
                }
                if fresh {
                    let connectivity = if handle.is_connected() {
                        "connected".green()
                    } else {
                        "disconnected".red()
                    };
                    println!(
                        "  {connectivity} | window {} | needs_review {} | high_risk {} | trust {}",
                        handle.responses().len(),
                        handle.needs_review_count(),
                        handle.high_risk_count(),
                        handle.current_trust_score(),
                    );
                }
            }
        }
        if deadline.is_some_and(|limit| started.elapsed() >= limit) {
            break;
        }
    }

    governance.monitor.detach();
    Ok(())
}
