// Path: crates/cli/src/commands/genesis.rs

use crate::util::{self, Paths};
use anyhow::{anyhow, Result};
use civic_execution::ExecutionMachine;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct GenesisArgs {
    /// Replace an existing ledger snapshot.
    #[clap(long)]
    pub force: bool,
}

pub fn run(paths: &Paths, args: GenesisArgs) -> Result<()> {
    if paths.state.exists() && !args.force {
        return Err(anyhow!(
            "Ledger '{}' already exists (use --force to replace it)",
            paths.state.display()
        ));
    }
    let config = util::load_config(paths)?;
    let machine = ExecutionMachine::from_genesis(&config)?;
    let funded = config.genesis.accounts.len();
    util::save_ledger(paths, machine)?;
    log::info!(
        "Created ledger {} with {} funded account(s).",
        paths.state.display(),
        funded
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{init, tx};
    use civic_types::app::{AccountId, ProblemRef};
    use civic_types::config::GenesisAccount;

    const A: AccountId = AccountId([0xa1; 32]);

    #[test]
    fn test_init_genesis_and_tx_share_one_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths {
            config: dir.path().join("civic.toml"),
            state: dir.path().join("ledger.bin"),
        };

        init::run(
            &paths,
            init::InitArgs {
                funding: vec![GenesisAccount {
                    account: A,
                    balance: 10_000_000,
                }],
                force: false,
            },
        )
        .unwrap();
        run(&paths, GenesisArgs { force: false }).unwrap();
        assert!(run(&paths, GenesisArgs { force: false }).is_err());

        tx::run(
            &paths,
            tx::TxArgs {
                signer: A,
                dry_run: false,
                command: tx::TxCommands::CreateProblem {
                    content_ref: "Qm111".into(),
                    lat: "40.7".into(),
                    lng: "-74.0".into(),
                    bounty: 10_000_000,
                },
            },
        )
        .unwrap();

        let ledger = util::open_ledger(&paths).unwrap();
        assert_eq!(ledger.balance_of(&A).unwrap(), 10_000_000);
        let problem = ledger.problem(&ProblemRef::new(A, 1)).unwrap().unwrap();
        assert_eq!(problem.bounty_amount, 10_000_000);
    }
}
