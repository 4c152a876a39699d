// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Warden CLI
//!
//! Terminal front end for the Warden governance core: inspect the fleet,
//! work the flagged-case review queue, read and export the audit ledger,
//! and attach a live monitor to an agent's response stream.
//!
//! All business rules live in `warden-core`; this binary only wires a
//! [`Governance`] session to a store and a feed and renders the results.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use warden_core::application::Governance;
use warden_core::infrastructure::feed::SimulatedFeed;
use warden_core::infrastructure::store::{SledStore, StateStore};

mod commands;

use commands::{AuditCommand, CasesCommand, WatchArgs};

/// Warden - AI-response governance dashboard
#[derive(Parser)]
#[command(name = "warden")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Data directory for the embedded state store
    #[arg(
        long,
        global = true,
        env = "WARDEN_DATA_DIR",
        default_value = ".warden",
        value_name = "DIR"
    )]
    data_dir: PathBuf,

    /// Use an ephemeral store (nothing persisted across runs)
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Acting reviewer attributed on reject/escalate actions
    #[arg(long, global = true, env = "WARDEN_ACTOR", default_value = "Anna")]
    actor: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "WARDEN_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fleet overview
    Agents,

    /// Flagged-case review queue
    Cases {
        #[command(subcommand)]
        command: CasesCommand,
    },

    /// Audit ledger
    Audit {
        #[command(subcommand)]
        command: AuditCommand,
    },

    /// Attach the live monitor to an agent's response stream
    Watch(WatchArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let store: Arc<dyn StateStore> = if cli.ephemeral {
        Arc::new(SledStore::temporary()?)
    } else {
        let path = cli.data_dir.join("state");
        tracing::info!(path = %path.display(), "opening state store");
        Arc::new(SledStore::open(path)?)
    };
    let governance = Governance::new(store, Arc::new(SimulatedFeed::new()), &cli.actor);

    match cli.command {
        Commands::Agents => commands::agents::execute(&governance),
        Commands::Cases { command } => commands::cases::execute(&governance, command),
        Commands::Audit { command } => commands::audit::execute(&governance, command),
        Commands::Watch(args) => commands::watch::execute(&governance, args).await,
    }
}
