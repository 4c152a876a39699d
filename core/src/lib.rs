// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Warden Core
//!
//! Review and governance core for the Warden AI-response monitoring
//! dashboard: stream ingestion, case lifecycle, approved-pattern reuse
//! tracking, and an append-only audit ledger.
//!
//! # Architecture
//!
//! - `domain` — entities, value objects, and the pattern-key fingerprint
//! - `application` — services: state owner, audit log, pattern registry,
//!   case review, monitor stream consumer, audit export
//! - `infrastructure` — persistent store and response-feed implementations,
//!   seed data

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use domain::*;
