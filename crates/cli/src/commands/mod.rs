// Path: crates/cli/src/commands/mod.rs

pub mod genesis;
pub mod init;
pub mod query;
pub mod tx;
