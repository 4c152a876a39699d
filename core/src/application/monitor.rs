// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Monitor Stream Consumer
//!
//! Maintains the live view of one agent's monitored traffic: a bounded
//! rolling window, redelivery dedup, derived review metrics, and the
//! deterministic reuse cycle. [`MonitorService`] enforces a single live
//! subscription per identifier and owns subscription teardown;
//! [`MonitorHandle`] is the per-agent consumer, driven by the feed task
//! through [`MonitorHandle::ingest`].

use crate::application::audit::AuditLog;
use crate::application::registry::PatternRegistry;
use crate::application::state::GovernanceState;
use crate::domain::agent::AgentId;
use crate::domain::audit::{AuditAction, AuditDraft};
use crate::domain::monitoring::{MonitoredResponse, ResponseId, Severity};
use crate::infrastructure::feed::{FeedError, FeedEvent, ResponseFeed};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Rolling window of most-recent responses held in memory per subscription.
pub const WINDOW_CAP: usize = 50;

/// Trailing responses averaged into the rolling trust score.
pub const TRUST_WINDOW: usize = 10;

struct WindowState {
    window: VecDeque<MonitoredResponse>,
    /// Ids already audited this session. The feed is at-least-once, so a
    /// redelivered id must not double-count in the ledger.
    seen: HashSet<ResponseId>,
    /// Responses observed this session; drives the reuse cycle only.
    counter: u64,
}

/// Live consumer for one agent's stream.
pub struct MonitorHandle {
    agent_id: AgentId,
    state: Arc<GovernanceState>,
    registry: PatternRegistry,
    audit: AuditLog,
    inner: RwLock<WindowState>,
    connected: AtomicBool,
    cancel: CancellationToken,
}

impl MonitorHandle {
    pub fn new(
        agent_id: AgentId,
        state: Arc<GovernanceState>,
        registry: PatternRegistry,
        audit: AuditLog,
    ) -> Arc<Self> {
        Arc::new(Self {
            agent_id,
            state,
            registry,
            audit,
            inner: RwLock::new(WindowState {
                window: VecDeque::new(),
                seen: HashSet::new(),
                counter: 0,
            }),
            connected: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        })
    }

    pub fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// Consume one delivered response. Transport-agnostic: the feed task
    /// calls this per arrival, in arrival order.
    pub fn ingest(&self, response: MonitoredResponse) {
        // window append, oldest evicted past the cap
        {
            let mut inner = self.inner.write();
            inner.window.push_back(response.clone());
            while inner.window.len() > WINDOW_CAP {
                inner.window.pop_front();
            }
        }

        // write-through into the persisted per-agent history
        if response.agent_id == self.agent_id {
            self.state.upsert_monitored(&self.agent_id, response.clone());
        }

        // deterministic reuse cycle: safe traffic rotates through the
        // agent's approved patterns by arrival count, not at random
        if response.status == Severity::Safe {
            let patterns = self.registry.patterns_for(&self.agent_id);
            if !patterns.is_empty() {
                let counter = self.inner.read().counter;
                let pattern = &patterns[(counter as usize) % patterns.len()];
                self.registry.record_reuse(
                    &self.agent_id,
                    &pattern.pattern_key,
                    &response.id,
                    response.timestamp,
                    Some(&response),
                );
            }
        }

        self.inner.write().counter += 1;

        // redelivery guard: exactly one ledger entry per response id
        let first_seen = self.inner.write().seen.insert(response.id.clone());
        if first_seen {
            let category = response.primary_category().unwrap_or("General");
            let draft = if response.status == Severity::Safe {
                AuditDraft::new(
                    response.agent_id.clone(),
                    AuditAction::MonitorSafe,
                    format!("Safe response monitored. Category: {category}"),
                )
                .severity(Severity::Safe)
            } else {
                AuditDraft::new(
                    response.agent_id.clone(),
                    AuditAction::MonitorFlagged,
                    format!(
                        "Flagged response detected. Severity: {}, Category: {category}",
                        response.status
                    ),
                )
                .severity(response.status)
            };
            self.audit.append(
                draft
                    .actor("System")
                    .category(response.primary_category().map(str::to_string))
                    .response(response.id.clone()),
            );
        }
    }

    pub fn responses(&self) -> Vec<MonitoredResponse> {
        self.inner.read().window.iter().cloned().collect()
    }

    pub fn find_response(&self, id: &ResponseId) -> Option<MonitoredResponse> {
        self.inner.read().window.iter().find(|r| r.id == *id).cloned()
    }

    /// Promote a window entry to `safe` in place. The persisted history is
    /// deliberately untouched — approval applies to the live view.
    pub(crate) fn mark_safe(&self, id: &ResponseId) {
        let mut inner = self.inner.write();
        if let Some(response) = inner.window.iter_mut().find(|r| r.id == *id) {
            response.status = Severity::Safe;
        }
    }

    pub fn needs_review_count(&self) -> usize {
        self.inner
            .read()
            .window
            .iter()
            .filter(|r| r.status == Severity::NeedsReview)
            .count()
    }

    pub fn high_risk_count(&self) -> usize {
        self.inner
            .read()
            .window
            .iter()
            .filter(|r| r.status == Severity::HighRisk)
            .count()
    }

    /// Mean trust score over the trailing `min(TRUST_WINDOW, len)` items,
    /// rounded to the nearest integer; 0 while the window is empty.
    pub fn current_trust_score(&self) -> u32 {
        let inner = self.inner.read();
        if inner.window.is_empty() {
            return 0;
        }
        let take = inner.window.len().min(TRUST_WINDOW);
        let sum: u64 = inner
            .window
            .iter()
            .rev()
            .take(take)
            .map(|r| u64::from(r.trust_score))
            .sum();
        (sum as f64 / take as f64).round() as u32
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    pub(crate) fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
    }

    /// Stop the subscription task and release the feed. Idempotent.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Owns the session's single live subscription.
pub struct MonitorService {
    feed: Arc<dyn ResponseFeed>,
    state: Arc<GovernanceState>,
    registry: PatternRegistry,
    audit: AuditLog,
    active: Mutex<Option<Arc<MonitorHandle>>>,
}

impl MonitorService {
    pub fn new(
        feed: Arc<dyn ResponseFeed>,
        state: Arc<GovernanceState>,
        registry: PatternRegistry,
        audit: AuditLog,
    ) -> Self {
        Self {
            feed,
            state,
            registry,
            audit,
            active: Mutex::new(None),
        }
    }

    /// Attach the live monitor to `agent_id`.
    ///
    /// While a subscription is live for the same identifier this returns the
    /// existing handle rather than opening a second one. A different
    /// identifier tears the old subscription down; accumulated window state
    /// belongs to the handle and resets with it. An empty identifier clears
    /// any live subscription and is rejected.
    pub fn watch(&self, agent_id: &AgentId) -> Result<Arc<MonitorHandle>, FeedError> {
        if agent_id.is_empty() {
            self.detach();
            return Err(FeedError::MissingAgentId);
        }

        let mut active = self.active.lock();
        if let Some(handle) = active.as_ref() {
            if handle.agent_id() == agent_id && !handle.is_closed() {
                return Ok(handle.clone());
            }
            handle.shutdown();
        }

        let mut subscription = self.feed.subscribe(agent_id)?;
        info!(agent = %agent_id, "monitor subscription opened");

        let handle = MonitorHandle::new(
            agent_id.clone(),
            self.state.clone(),
            self.registry.clone(),
            self.audit.clone(),
        );
        let worker = handle.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = worker.cancel.cancelled() => break,
                    event = subscription.recv() => match event {
                        Some(FeedEvent::Opened) => worker.set_connected(true),
                        Some(FeedEvent::Response(item)) => {
                            worker.set_connected(true);
                            worker.ingest(*item);
                        }
                        // transport loss: flag only, window state survives
                        Some(FeedEvent::Interrupted) => worker.set_connected(false),
                        None => {
                            worker.set_connected(false);
                            break;
                        }
                    }
                }
            }
            subscription.close();
            debug!(agent = %worker.agent_id, "monitor subscription released");
        });

        *active = Some(handle.clone());
        Ok(handle)
    }

    /// Tear down the live subscription, if any. Safe to call repeatedly.
    pub fn detach(&self) {
        if let Some(handle) = self.active.lock().take() {
            handle.shutdown();
        }
    }

    pub fn active(&self) -> Option<Arc<MonitorHandle>> {
        self.active.lock().clone()
    }
}
