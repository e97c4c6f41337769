// Path: crates/cli/src/commands/tx.rs

use crate::util::{self, Paths};
use anyhow::{Context, Result};
use civic_execution::{ServiceCall, TxReceipt};
use civic_services::bank::{TransferParams, BANK_SERVICE_ID};
use civic_services::registry::{
    AddSolutionParams, CreateProblemParams, ReleaseRewardParams, VoteSolutionParams,
    REGISTRY_SERVICE_ID,
};
use civic_types::app::{AccountId, Amount, ProblemId, ProblemRef, SolutionId};
use civic_types::codec;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser, Debug)]
pub struct TxArgs {
    /// Hex account id the call is submitted as.
    #[clap(long)]
    pub signer: AccountId,

    /// Run the call and print its receipt without writing the ledger.
    #[clap(long)]
    pub dry_run: bool,

    #[clap(subcommand)]
    pub command: TxCommands,
}

#[derive(Subcommand, Debug)]
pub enum TxCommands {
    /// Record a new problem in the signer's registry.
    CreateProblem {
        #[clap(long)]
        content_ref: String,
        #[clap(long, allow_hyphen_values = true)]
        lat: String,
        #[clap(long, allow_hyphen_values = true)]
        lng: String,
        #[clap(long)]
        bounty: Amount,
    },
    /// Propose a solution to an open problem, credited to the signer.
    AddSolution {
        #[clap(long)]
        owner: AccountId,
        #[clap(long)]
        problem_id: ProblemId,
        #[clap(long)]
        content_ref: String,
    },
    /// Vote for a solution.
    Vote {
        #[clap(long)]
        owner: AccountId,
        #[clap(long)]
        problem_id: ProblemId,
        #[clap(long)]
        solution_id: SolutionId,
    },
    /// Pay the bounty to a solution's solver and close the problem.
    Release {
        #[clap(long)]
        owner: AccountId,
        #[clap(long)]
        problem_id: ProblemId,
        #[clap(long)]
        solution_id: SolutionId,
    },
    /// Move funds from the signer to another account.
    Transfer {
        #[clap(long)]
        to: AccountId,
        #[clap(long)]
        amount: Amount,
    },
}

/// How a method's SCALE output is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    ProblemId,
    Count,
    Nothing,
}

fn build_call(signer: AccountId, command: TxCommands) -> Result<(ServiceCall, Output)> {
    let built = match command {
        TxCommands::CreateProblem {
            content_ref,
            lat,
            lng,
            bounty,
        } => (
            ServiceCall::new(
                signer,
                REGISTRY_SERVICE_ID,
                "create_problem@v1",
                &CreateProblemParams {
                    content_ref: content_ref.as_str().into(),
                    lat: lat.as_str().into(),
                    lng: lng.as_str().into(),
                    bounty_amount: bounty,
                },
            )?,
            Output::ProblemId,
        ),
        TxCommands::AddSolution {
            owner,
            problem_id,
            content_ref,
        } => (
            ServiceCall::new(
                signer,
                REGISTRY_SERVICE_ID,
                "add_solution@v1",
                &AddSolutionParams {
                    problem: ProblemRef::new(owner, problem_id),
                    solver: signer,
                    content_ref: content_ref.as_str().into(),
                },
            )?,
            Output::Count,
        ),
        TxCommands::Vote {
            owner,
            problem_id,
            solution_id,
        } => (
            ServiceCall::new(
                signer,
                REGISTRY_SERVICE_ID,
                "vote_solution@v1",
                &VoteSolutionParams {
                    problem: ProblemRef::new(owner, problem_id),
                    solution_id,
                },
            )?,
            Output::Count,
        ),
        TxCommands::Release {
            owner,
            problem_id,
            solution_id,
        } => (
            ServiceCall::new(
                signer,
                REGISTRY_SERVICE_ID,
                "release_reward@v1",
                &ReleaseRewardParams {
                    problem: ProblemRef::new(owner, problem_id),
                    solution_id,
                },
            )?,
            Output::Nothing,
        ),
        TxCommands::Transfer { to, amount } => (
            ServiceCall::new(
                signer,
                BANK_SERVICE_ID,
                "transfer@v1",
                &TransferParams { to, amount },
            )?,
            Output::Nothing,
        ),
    };
    Ok(built)
}

fn render_receipt(call: &ServiceCall, receipt: &TxReceipt, output: Output) -> Result<Value> {
    let output = match output {
        Output::ProblemId => {
            let id: ProblemId =
                codec::from_bytes_canonical(&receipt.output).map_err(anyhow::Error::msg)?;
            json!(ProblemRef::new(call.signer, id))
        }
        Output::Count => {
            let n: u64 =
                codec::from_bytes_canonical(&receipt.output).map_err(anyhow::Error::msg)?;
            json!(n)
        }
        Output::Nothing => Value::Null,
    };
    Ok(json!({
        "service": call.service_id,
        "method": call.method,
        "sequence": receipt.sequence,
        "committed": receipt.committed,
        "output": output,
        "events": receipt.events,
    }))
}

pub fn run(paths: &Paths, args: TxArgs) -> Result<()> {
    let machine = util::open_ledger(paths)?;
    let (call, output) = build_call(args.signer, args.command)?;

    let receipt = if args.dry_run {
        machine.simulate(&call)
    } else {
        machine.apply(&call)
    }
    .with_context(|| format!("{} rejected", call.method))?;

    util::print_json(&render_receipt(&call, &receipt, output)?)?;
    if receipt.committed {
        util::save_ledger(paths, machine)?;
    }
    Ok(())
}
