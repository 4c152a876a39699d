// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod audit;
pub mod export;
pub mod monitor;
pub mod registry;
pub mod review;
pub mod state;

use crate::infrastructure::feed::ResponseFeed;
use crate::infrastructure::store::StateStore;
use std::sync::Arc;

/// One wired governance session: the injectable state owner plus every
/// service built on it. Constructed explicitly at session start; nothing
/// here is a process-wide singleton.
pub struct Governance {
    pub state: Arc<state::GovernanceState>,
    pub audit: audit::AuditLog,
    pub registry: registry::PatternRegistry,
    pub review: review::ReviewService,
    pub monitor: monitor::MonitorService,
}

impl Governance {
    pub fn new(
        store: Arc<dyn StateStore>,
        feed: Arc<dyn ResponseFeed>,
        actor: impl Into<String>,
    ) -> Self {
        let state = state::GovernanceState::bootstrap(store);
        let audit = audit::AuditLog::new(state.clone());
        let registry = registry::PatternRegistry::new(state.clone(), audit.clone());
        let review =
            review::ReviewService::new(state.clone(), registry.clone(), audit.clone(), actor);
        let monitor =
            monitor::MonitorService::new(feed, state.clone(), registry.clone(), audit.clone());
        Self {
            state,
            audit,
            registry,
            review,
            monitor,
        }
    }
}
