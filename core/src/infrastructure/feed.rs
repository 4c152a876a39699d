// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Response feed
//!
//! Inbound stream of monitored responses, scoped per agent. The wire
//! mechanism is deliberately out of scope — the trait only fixes the stream
//! contract: subscribe with a non-empty agent identifier, receive
//! [`FeedEvent`]s in arrival order, drop (or `close`) to release the feed.
//!
//! Two implementations ship:
//! - [`SimulatedFeed`] cycles seeded sample traffic at a jittered 2–4 s
//!   cadence, like the dashboard's development stream endpoint.
//! - [`ChannelFeed`] is push-driven, for external transports and tests.

use crate::domain::agent::AgentId;
use crate::domain::monitoring::{MonitoredResponse, ResponseId};
use chrono::Utc;
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::ops::Range;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Delivery interval of the simulated feed, in milliseconds.
const FEED_INTERVAL_MS: Range<u64> = 2000..4000;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum FeedError {
    /// Missing-parameter class: the caller must be told synchronously.
    #[error("agent identifier is required")]
    MissingAgentId,

    /// Not-found class, distinct from a transport failure.
    #[error("no monitored traffic available for agent '{0}'")]
    UnknownAgent(AgentId),
}

#[derive(Debug)]
pub enum FeedEvent {
    /// Transport established; the consumer flips its connected flag.
    Opened,
    Response(Box<MonitoredResponse>),
    /// Transport hiccup. Reconnection is the transport's responsibility;
    /// consumers must not discard accumulated state on this.
    Interrupted,
}

/// Live handle onto a feed. Dropping it (or calling [`close`]) releases the
/// underlying producer; both are idempotent.
///
/// [`close`]: FeedSubscription::close
pub struct FeedSubscription {
    events: mpsc::Receiver<FeedEvent>,
    cancel: CancellationToken,
}

impl FeedSubscription {
    pub async fn recv(&mut self) -> Option<FeedEvent> {
        self.events.recv().await
    }

    pub fn close(&mut self) {
        self.cancel.cancel();
        self.events.close();
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

pub trait ResponseFeed: Send + Sync {
    fn subscribe(&self, agent_id: &AgentId) -> Result<FeedSubscription, FeedError>;
}

/// Feed that replays seeded sample traffic for an agent on a loop,
/// stamping fresh ids and timestamps per delivery. Requires a tokio
/// runtime; the producer task stops when the subscription is released.
pub struct SimulatedFeed {
    samples: Vec<MonitoredResponse>,
}

impl SimulatedFeed {
    pub fn new() -> Self {
        Self {
            samples: super::seed::sample_responses(),
        }
    }

    pub fn with_samples(samples: Vec<MonitoredResponse>) -> Self {
        Self { samples }
    }
}

impl Default for SimulatedFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseFeed for SimulatedFeed {
    fn subscribe(&self, agent_id: &AgentId) -> Result<FeedSubscription, FeedError> {
        if agent_id.is_empty() {
            return Err(FeedError::MissingAgentId);
        }
        let samples: Vec<MonitoredResponse> = self
            .samples
            .iter()
            .filter(|s| s.agent_id == *agent_id)
            .cloned()
            .collect();
        if samples.is_empty() {
            return Err(FeedError::UnknownAgent(agent_id.clone()));
        }

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            if tx.send(FeedEvent::Opened).await.is_err() {
                return;
            }
            let mut seq: u64 = 0;
            loop {
                let template = &samples[(seq as usize) % samples.len()];
                let item = stamp(template, seq);
                tokio::select! {
                    _ = token.cancelled() => break,
                    sent = tx.send(FeedEvent::Response(Box::new(item))) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
                seq += 1;
                let jitter = rand::rng().random_range(FEED_INTERVAL_MS);
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(Duration::from_millis(jitter)) => {}
                }
            }
        });

        Ok(FeedSubscription { events: rx, cancel })
    }
}

/// Fresh identity per delivery; the template's id is never re-sent.
fn stamp(template: &MonitoredResponse, seq: u64) -> MonitoredResponse {
    let now = Utc::now();
    let mut item = template.clone();
    item.id = ResponseId::new(format!("resp-{}-{seq}", now.timestamp_millis()));
    item.timestamp = now;
    item
}

/// Push-driven feed: external transports (or tests) deliver responses with
/// [`push`], routed to the subscriber by the response's agent id. Accepts
/// any non-empty identifier, since traffic may start after subscription.
///
/// [`push`]: ChannelFeed::push
#[derive(Default)]
pub struct ChannelFeed {
    subscribers: Mutex<HashMap<AgentId, mpsc::Sender<FeedEvent>>>,
}

impl ChannelFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a response to the agent's subscriber. Returns `false` when
    /// nobody is listening.
    pub fn push(&self, response: MonitoredResponse) -> bool {
        let subscribers = self.subscribers.lock();
        match subscribers.get(&response.agent_id) {
            Some(tx) => tx
                .try_send(FeedEvent::Response(Box::new(response)))
                .is_ok(),
            None => false,
        }
    }

    /// Signal a transport interruption to the agent's subscriber.
    pub fn interrupt(&self, agent_id: &AgentId) -> bool {
        let subscribers = self.subscribers.lock();
        match subscribers.get(agent_id) {
            Some(tx) => tx.try_send(FeedEvent::Interrupted).is_ok(),
            None => false,
        }
    }
}

impl ResponseFeed for ChannelFeed {
    fn subscribe(&self, agent_id: &AgentId) -> Result<FeedSubscription, FeedError> {
        if agent_id.is_empty() {
            return Err(FeedError::MissingAgentId);
        }
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let _ = tx.try_send(FeedEvent::Opened);
        self.subscribers.lock().insert(agent_id.clone(), tx);
        Ok(FeedSubscription {
            events: rx,
            cancel: CancellationToken::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn simulated_feed_rejects_missing_agent_id() {
        let feed = SimulatedFeed::new();
        assert!(matches!(
            feed.subscribe(&AgentId::from("  ")),
            Err(FeedError::MissingAgentId)
        ));
    }

    #[tokio::test]
    async fn simulated_feed_distinguishes_unknown_agents() {
        let feed = SimulatedFeed::new();
        assert!(matches!(
            feed.subscribe(&AgentId::from("no-such-agent")),
            Err(FeedError::UnknownAgent(_))
        ));
    }

    #[tokio::test]
    async fn simulated_feed_opens_and_delivers_immediately() {
        let feed = SimulatedFeed::new();
        let mut sub = feed.subscribe(&AgentId::from("customer-support-bot")).unwrap();

        assert!(matches!(sub.recv().await, Some(FeedEvent::Opened)));
        match sub.recv().await {
            Some(FeedEvent::Response(item)) => {
                assert_eq!(item.agent_id.as_str(), "customer-support-bot");
                assert!(item.id.as_str().starts_with("resp-"));
            }
            other => panic!("expected a response, got {other:?}"),
        }

        // double close must not panic or double-release
        sub.close();
        sub.close();
    }

    #[tokio::test]
    async fn channel_feed_routes_by_agent_id() {
        let feed = ChannelFeed::new();
        let agent = AgentId::from("customer-support-bot");
        let mut sub = feed.subscribe(&agent).unwrap();
        assert!(matches!(sub.recv().await, Some(FeedEvent::Opened)));

        let mut item = crate::infrastructure::seed::sample_responses()[0].clone();
        item.agent_id = agent.clone();
        assert!(feed.push(item));
        assert!(matches!(sub.recv().await, Some(FeedEvent::Response(_))));

        assert!(feed.interrupt(&agent));
        assert!(matches!(sub.recv().await, Some(FeedEvent::Interrupted)));

        // nobody subscribed for this agent
        let mut stray = crate::infrastructure::seed::sample_responses()[2].clone();
        stray.agent_id = AgentId::from("somebody-else");
        assert!(!feed.push(stray));
    }
}
