// Path: crates/cli/src/util.rs

use anyhow::{Context, Result};
use civic_execution::ExecutionMachine;
use civic_state::MemoryStore;
use civic_types::config::CivicConfig;
use civic_types::error::CoreError;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// File locations shared by every command.
#[derive(Debug, Clone)]
pub struct Paths {
    pub config: PathBuf,
    pub state: PathBuf,
}

/// Reads the configuration, falling back to defaults when the file is absent.
pub fn load_config(paths: &Paths) -> Result<CivicConfig> {
    if !paths.config.exists() {
        log::info!(
            "No config at {}; using defaults.",
            paths.config.display()
        );
        return Ok(CivicConfig::default());
    }
    let text = fs::read_to_string(&paths.config)
        .with_context(|| format!("Failed to read {}", paths.config.display()))?;
    parse_config(&text).with_context(|| format!("Invalid config {}", paths.config.display()))
}

/// Parses a TOML configuration document.
pub fn parse_config(text: &str) -> Result<CivicConfig, CoreError> {
    toml::from_str(text).map_err(|e| CoreError::Config(e.to_string()))
}

/// Opens the ledger at `paths.state` with the configured registry parameters.
pub fn open_ledger(paths: &Paths) -> Result<ExecutionMachine> {
    let config = load_config(paths)?;
    let store = MemoryStore::load(&paths.state)
        .with_context(|| format!("Failed to load ledger {}", paths.state.display()))?;
    Ok(ExecutionMachine::new(store, config.registry))
}

/// Writes the ledger's committed state back to `paths.state`.
pub fn save_ledger(paths: &Paths, machine: ExecutionMachine) -> Result<()> {
    machine
        .into_store()
        .persist(&paths.state)
        .with_context(|| format!("Failed to write ledger {}", paths.state.display()))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
