// Path: crates/cli/src/commands/query.rs

use crate::util::{self, Paths};
use anyhow::{anyhow, Result};
use civic_types::app::{AccountId, ProblemId, ProblemRef};
use clap::{Parser, Subcommand};
use serde_json::json;

#[derive(Parser, Debug)]
pub struct QueryArgs {
    #[clap(subcommand)]
    pub command: QueryCommands,
}

#[derive(Subcommand, Debug)]
pub enum QueryCommands {
    /// Print an owner's whole registry.
    Registry {
        #[clap(long)]
        owner: AccountId,
    },
    /// Print one problem with its solutions.
    Problem {
        #[clap(long)]
        owner: AccountId,
        #[clap(long)]
        id: ProblemId,
    },
    /// Print an account balance.
    Balance {
        #[clap(long)]
        account: AccountId,
    },
    /// List every identity that holds a registry.
    Owners,
}

pub fn run(paths: &Paths, args: QueryArgs) -> Result<()> {
    let machine = util::open_ledger(paths)?;
    match args.command {
        QueryCommands::Registry { owner } => {
            let registry = machine
                .registry(&owner)?
                .ok_or_else(|| anyhow!("No registry for {}", owner))?;
            util::print_json(&registry)
        }
        QueryCommands::Problem { owner, id } => {
            let at = ProblemRef::new(owner, id);
            let problem = machine
                .problem(&at)?
                .ok_or_else(|| anyhow!("Problem {} not found", at))?;
            util::print_json(&problem)
        }
        QueryCommands::Balance { account } => util::print_json(&json!({
            "account": account,
            "balance": machine.balance_of(&account)?,
        })),
        QueryCommands::Owners => util::print_json(&machine.owners()?),
    }
}
