// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod agent;
pub mod approval;
pub mod audit;
pub mod case;
pub mod monitoring;
pub mod pattern;
