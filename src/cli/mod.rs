use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::{EntityService, ServiceConfig};
use crate::domain::{Account, Card, Record};
use crate::storage::MemoryStore;

/// Librum - Entity Ledger
#[derive(Parser)]
#[command(name = "librum")]
#[command(about = "An entity ledger over an append-only versioned key-value store")]
#[command(version)]
pub struct Cli {
    /// Ledger snapshot file path
    #[arg(short, long, default_value = "librum.json")]
    pub ledger: PathBuf,

    /// Scan the whole store in `list`, including foreign record types
    #[arg(long, global = true)]
    pub unscoped: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Account record operations
    #[command(subcommand)]
    Account(EntityCommands),

    /// Card record operations
    #[command(subcommand)]
    Card(EntityCommands),
}

#[derive(Subcommand)]
pub enum EntityCommands {
    /// Seed the ledger with five starter records
    Init,

    /// Create a new record
    Create {
        /// Record id (positive decimal)
        id: String,

        /// Opening balance
        balance: String,

        /// Owner name
        owner: String,
    },

    /// Print the stored record document
    Get {
        /// Record id
        id: String,
    },

    /// List all live records
    List,

    /// Query records by owner name
    QueryOwner {
        /// Owner name
        owner: String,
    },

    /// Overwrite a record with a full JSON document
    Update {
        /// Complete record document, e.g. '{"docType":"Account",...}'
        record: String,
    },

    /// Delete a record
    Delete {
        /// Record id
        id: String,
    },

    /// Print the audit trail for a record
    History {
        /// Record id
        id: String,
    },

    /// Move funds between two records
    Transfer {
        /// Source record id
        from: String,

        /// Destination record id
        to: String,

        /// Amount to move
        amount: String,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let store = MemoryStore::load_or_default(&self.ledger)?;
        let config = ServiceConfig {
            scoped_scan: !self.unscoped,
        };

        let store = match &self.command {
            Commands::Account(cmd) => run_entity::<Account>(store, config, cmd)?,
            Commands::Card(cmd) => run_entity::<Card>(store, config, cmd)?,
        };

        store.save(&self.ledger)?;
        Ok(())
    }
}

fn run_entity<R: Record>(
    store: MemoryStore,
    config: ServiceConfig,
    cmd: &EntityCommands,
) -> Result<MemoryStore> {
    let mut service = EntityService::<R, _>::with_config(store, config);

    let (function, args) = invocation(cmd);
    let payload = service
        .invoke(function, &args)
        .with_context(|| format!("{function} failed"))?;

    if !payload.is_empty() {
        println!("{}", pretty_payload(&payload));
    }

    Ok(service.into_store())
}

/// Map a subcommand onto the service's name-plus-string-args surface.
fn invocation(cmd: &EntityCommands) -> (&'static str, Vec<String>) {
    match cmd {
        EntityCommands::Init => ("Init", vec![]),
        EntityCommands::Create { id, balance, owner } => {
            ("Create", vec![id.clone(), balance.clone(), owner.clone()])
        }
        EntityCommands::Get { id } => ("Read", vec![id.clone()]),
        EntityCommands::List => ("GetAll", vec![]),
        EntityCommands::QueryOwner { owner } => ("QueryByOwner", vec![owner.clone()]),
        EntityCommands::Update { record } => ("Update", vec![record.clone()]),
        EntityCommands::Delete { id } => ("Delete", vec![id.clone()]),
        EntityCommands::History { id } => ("GetHistory", vec![id.clone()]),
        EntityCommands::Transfer { from, to, amount } => {
            ("Transfer", vec![from.clone(), to.clone(), amount.clone()])
        }
    }
}

fn pretty_payload(payload: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(payload) {
        Ok(value) => serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| String::from_utf8_lossy(payload).into_owned()),
        Err(_) => String::from_utf8_lossy(payload).into_owned(),
    }
}
