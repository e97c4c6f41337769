// Path: crates/cli/src/commands/init.rs

use crate::util::Paths;
use anyhow::{anyhow, Result};
use civic_types::app::{AccountId, Amount};
use civic_types::config::{CivicConfig, GenesisAccount};
use clap::Parser;
use std::fs;

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Fund an account at genesis, as `<hex account>=<amount>`. Repeatable.
    #[clap(long = "fund", value_parser = parse_funding)]
    pub funding: Vec<GenesisAccount>,

    /// Overwrite an existing config file.
    #[clap(long)]
    pub force: bool,
}

fn parse_funding(s: &str) -> Result<GenesisAccount, String> {
    let (account, balance) = s
        .split_once('=')
        .ok_or_else(|| format!("expected <account>=<amount>, got '{}'", s))?;
    let account: AccountId = account.parse().map_err(|e| format!("{}", e))?;
    let balance: Amount = balance
        .parse()
        .map_err(|e| format!("invalid amount '{}': {}", balance, e))?;
    Ok(GenesisAccount { account, balance })
}

/// Renders the config file `init` writes.
pub fn render(args: &InitArgs) -> Result<String> {
    let mut config = CivicConfig::default();
    config.genesis.accounts = args.funding.clone();
    Ok(toml::to_string_pretty(&config)?)
}

pub fn run(paths: &Paths, args: InitArgs) -> Result<()> {
    if paths.config.exists() && !args.force {
        return Err(anyhow!(
            "Config '{}' already exists (use --force to overwrite)",
            paths.config.display()
        ));
    }
    fs::write(&paths.config, render(&args)?)?;
    log::info!(
        "Wrote config {} with {} funded account(s).",
        paths.config.display(),
        args.funding.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_funding_flag_parses_account_and_amount() {
        let hex = "b2".repeat(32);
        let entry = parse_funding(&format!("0x{}=42", hex)).unwrap();
        assert_eq!(entry.account, AccountId([0xb2; 32]));
        assert_eq!(entry.balance, 42);

        assert!(parse_funding("missing-separator").is_err());
        assert!(parse_funding(&format!("{}=-1", hex)).is_err());
    }

    #[test]
    fn test_rendered_config_reads_back() {
        let args = InitArgs {
            funding: vec![GenesisAccount {
                account: AccountId([0xa1; 32]),
                balance: 10_000_000,
            }],
            force: false,
        };
        let text = render(&args).unwrap();
        assert!(text.contains("routing = \"problem_owner\""));
        let config: CivicConfig = toml::from_str(&text).unwrap();
        assert_eq!(config.genesis.accounts, args.funding);
    }
}
