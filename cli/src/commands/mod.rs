// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod agents;
pub mod audit;
pub mod cases;
pub mod watch;

pub use audit::AuditCommand;
pub use cases::CasesCommand;
pub use watch::WatchArgs;

use colored::Colorize;
use warden_core::domain::monitoring::Severity;

/// Shared severity rendering for queue and ledger listings.
pub(crate) fn paint_severity(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Safe => severity.as_str().green(),
        Severity::NeedsReview => severity.as_str().yellow(),
        Severity::HighRisk => severity.as_str().red(),
    }
}
