// Path: crates/cli/src/main.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Civic CLI
//!
//! Operates a local civic bounty ledger kept in a snapshot file: write a
//! config, build the genesis state, submit registry and bank calls, and
//! inspect the result.

use anyhow::Result;
use clap::{Parser, Subcommand};
use civic_telemetry::LogFormat;
use std::path::PathBuf;

mod commands;
mod util;

use commands::*;

#[derive(Parser, Debug)]
#[clap(
    name = "civic",
    version,
    about = "Operate a local civic problem/solution/bounty ledger."
)]
struct Cli {
    /// Path of the TOML configuration file.
    #[clap(long, global = true, default_value = "civic.toml")]
    config: PathBuf,

    /// Path of the ledger snapshot file.
    #[clap(long, global = true, default_value = "civic-state.bin")]
    state: PathBuf,

    /// Emit logs as JSON lines on stderr.
    #[clap(long, global = true)]
    json_logs: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file.
    Init(init::InitArgs),

    /// Create a fresh ledger snapshot from the configuration's genesis section.
    Genesis(genesis::GenesisArgs),

    /// Submit a call against the ledger.
    Tx(tx::TxArgs),

    /// Read registry records and balances.
    Query(query::QueryArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Plain
    };
    civic_telemetry::init_tracing(format)?;

    let paths = util::Paths {
        config: cli.config,
        state: cli.state,
    };
    match cli.command {
        Commands::Init(args) => init::run(&paths, args),
        Commands::Genesis(args) => genesis::run(&paths, args),
        Commands::Tx(args) => tx::run(&paths, args),
        Commands::Query(args) => query::run(&paths, args),
    }
}
