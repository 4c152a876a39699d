// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::Result;
use colored::Colorize;
use warden_core::application::Governance;
use warden_core::domain::agent::{AgentStatus, MonitoringState};

pub fn execute(governance: &Governance) -> Result<()> {
    let agents = governance.state.agents();
    if agents.is_empty() {
        println!("no agents configured");
        return Ok(());
    }

    for agent in agents {
        let status = match agent.status {
            AgentStatus::Green => "green".green(),
            AgentStatus::Yellow => "yellow".yellow(),
            AgentStatus::Red => "red".red(),
        };
        let monitoring = match agent.monitoring {
            MonitoringState::Monitoring => "monitoring",
            MonitoringState::Paused => "paused",
            MonitoringState::Error => "error",
        };
        println!(
            "{:<24} {:<28} {status:<8} trust {:<4} {monitoring}",
            agent.id,
            agent.name.bold(),
            agent.trust_score,
        );
    }
    Ok(())
}
