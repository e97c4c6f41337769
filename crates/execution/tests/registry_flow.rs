// Path: crates/execution/tests/registry_flow.rs
use anyhow::Result;
use civic_execution::{ExecutionMachine, ServiceCall};
use civic_services::bank::TransferParams;
use civic_services::registry::{
    AddSolutionParams, CreateProblemParams, ReleaseRewardParams, VoteSolutionParams,
};
use civic_types::app::{AccountId, Amount, ProblemRef, RegistryEvent, SolutionId};
use civic_types::config::{
    CivicConfig, GenesisAccount, GenesisConfig, RegistryParams, RegistryRouting,
};
use civic_types::error::{ErrorCode, FailureKind, TransactionError};

const A: AccountId = AccountId([0xA1; 32]);
const B: AccountId = AccountId([0xB2; 32]);
const C: AccountId = AccountId([0xC3; 32]);
const BOUNTY: Amount = 10_000_000;

fn funded(routing: RegistryRouting, accounts: &[(AccountId, Amount)]) -> Result<ExecutionMachine> {
    let config = CivicConfig {
        registry: RegistryParams { routing },
        genesis: GenesisConfig {
            accounts: accounts
                .iter()
                .map(|(account, balance)| GenesisAccount {
                    account: *account,
                    balance: *balance,
                })
                .collect(),
        },
    };
    Ok(ExecutionMachine::from_genesis(&config)?)
}

fn problem_params(content: &str, bounty: Amount) -> CreateProblemParams {
    CreateProblemParams {
        content_ref: content.into(),
        lat: "40.7128".into(),
        lng: "-74.0060".into(),
        bounty_amount: bounty,
    }
}

fn propose(
    machine: &ExecutionMachine,
    problem: ProblemRef,
    solver: AccountId,
    content: &str,
) -> Result<SolutionId, TransactionError> {
    machine
        .add_solution(
            solver,
            AddSolutionParams {
                problem,
                solver,
                content_ref: content.into(),
            },
        )
        .map(|(id, _)| id)
}

fn release(
    machine: &ExecutionMachine,
    caller: AccountId,
    problem: ProblemRef,
    solution_id: SolutionId,
) -> Result<(), TransactionError> {
    machine
        .release_reward(
            caller,
            ReleaseRewardParams {
                problem,
                solution_id,
            },
        )
        .map(|_| ())
}

#[test]
fn bounty_lifecycle_pays_once() -> Result<()> {
    let machine = funded(RegistryRouting::ProblemOwner, &[(A, BOUNTY)])?;

    let (problem, receipt) = machine.create_problem(A, problem_params("Qm111", BOUNTY))?;
    assert_eq!(problem, ProblemRef::new(A, 1));
    assert_eq!(
        receipt.events,
        vec![RegistryEvent::ProblemCreated {
            problem,
            bounty_amount: BOUNTY
        }]
    );

    let solution = propose(&machine, problem, B, "Qm222")?;
    assert_eq!(solution, 1);

    let (votes, _) = machine.vote_solution(
        C,
        VoteSolutionParams {
            problem,
            solution_id: solution,
        },
    )?;
    assert_eq!(votes, 1);

    let receipt = machine.release_reward(
        A,
        ReleaseRewardParams {
            problem,
            solution_id: solution,
        },
    )?;
    assert_eq!(
        receipt.events,
        vec![
            RegistryEvent::Transfer {
                from: A,
                to: B,
                amount: BOUNTY
            },
            RegistryEvent::RewardReleased {
                problem,
                solution_id: solution,
                solver: B,
                amount: BOUNTY
            },
        ]
    );
    assert_eq!(machine.balance_of(&A)?, 0);
    assert_eq!(machine.balance_of(&B)?, BOUNTY);

    let closed = machine.problem(&problem)?.expect("problem exists");
    assert!(!closed.is_open());
    assert_eq!(closed.chosen(), Some(solution));
    assert_eq!(closed.solutions[0].votes, 1);

    let again = release(&machine, A, problem, solution).unwrap_err();
    assert_eq!(again.kind(), FailureKind::StateConflict);
    assert_eq!(again.code(), "REGISTRY_PROBLEM_CLOSED");
    assert_eq!(machine.balance_of(&B)?, BOUNTY);
    Ok(())
}

#[test]
fn rejected_calls_commit_nothing() -> Result<()> {
    let machine = funded(RegistryRouting::ProblemOwner, &[(A, BOUNTY - 1)])?;
    let (problem, _) = machine.create_problem(A, problem_params("Qm111", BOUNTY))?;
    let solution = propose(&machine, problem, B, "Qm222")?;
    let before = machine.snapshot();

    let err = release(&machine, A, problem, solution).unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transfer);

    let err = machine
        .vote_solution(
            C,
            VoteSolutionParams {
                problem,
                solution_id: 42,
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Validation);

    let err = machine
        .add_solution(
            B,
            AddSolutionParams {
                problem,
                solver: C,
                content_ref: "Qm333".into(),
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Authorization);

    assert_eq!(machine.snapshot(), before);
    assert!(machine.problem(&problem)?.expect("problem exists").is_open());
    Ok(())
}

#[test]
fn solutions_on_closed_problem_are_refused() -> Result<()> {
    let machine = funded(RegistryRouting::ProblemOwner, &[(A, 1)])?;
    let (problem, _) = machine.create_problem(A, problem_params("Qm111", 1))?;
    let solution = propose(&machine, problem, B, "Qm222")?;
    release(&machine, A, problem, solution)?;

    let err = propose(&machine, problem, C, "Qm333").unwrap_err();
    assert_eq!(err.kind(), FailureKind::StateConflict);
    assert_eq!(machine.problem(&problem)?.expect("problem exists").solutions.len(), 1);
    Ok(())
}

#[test]
fn problem_ids_are_dense_per_owner() -> Result<()> {
    let machine = funded(RegistryRouting::ProblemOwner, &[])?;
    for expected in 1..=3 {
        let (problem, _) = machine.create_problem(A, problem_params("a", 0))?;
        assert_eq!(problem.id, expected);
    }
    let (first_of_b, _) = machine.create_problem(B, problem_params("b", 0))?;
    assert_eq!(first_of_b.id, 1);

    assert_eq!(machine.registry(&A)?.expect("registry").next_problem_id, 4);
    assert_eq!(machine.owners()?, vec![A, B]);
    assert!(machine.registry(&C)?.is_none());
    Ok(())
}

#[test]
fn caller_registry_routing_blocks_outside_voters() -> Result<()> {
    let machine = funded(RegistryRouting::CallerRegistry, &[(A, 5)])?;
    let (problem, _) = machine.create_problem(A, problem_params("Qm111", 5))?;
    let solution = propose(&machine, problem, B, "Qm222")?;

    let err = machine
        .vote_solution(
            C,
            VoteSolutionParams {
                problem,
                solution_id: solution,
            },
        )
        .unwrap_err();
    assert_eq!(err.code(), "REGISTRY_PROBLEM_NOT_FOUND");

    // The owner routes to its own registry under both modes.
    release(&machine, A, problem, solution)?;
    assert_eq!(machine.balance_of(&B)?, 5);
    Ok(())
}

#[test]
fn simulate_reports_outcome_without_writing() -> Result<()> {
    let machine = funded(RegistryRouting::ProblemOwner, &[(A, 10)])?;
    let before = machine.snapshot();
    let call = ServiceCall::new(A, "bank", "transfer@v1", &TransferParams { to: B, amount: 4 })?;

    let receipt = machine.simulate(&call)?;
    assert!(!receipt.committed);
    assert_eq!(receipt.events.len(), 1);
    assert_eq!(machine.snapshot(), before);

    let receipt = machine.apply(&call)?;
    assert!(receipt.committed);
    assert_eq!(machine.balance_of(&A)?, 6);
    assert_eq!(machine.balance_of(&B)?, 4);
    Ok(())
}

#[test]
fn unknown_service_and_method_are_unsupported() -> Result<()> {
    let machine = funded(RegistryRouting::ProblemOwner, &[])?;
    let call = ServiceCall::new(A, "governance", "vote@v1", &())?;
    assert!(matches!(
        machine.apply(&call),
        Err(TransactionError::Unsupported(_))
    ));
    let call = ServiceCall::new(A, "bank", "mint@v1", &())?;
    assert!(matches!(
        machine.apply(&call),
        Err(TransactionError::Unsupported(_))
    ));
    Ok(())
}

#[test]
fn concurrent_calls_keep_every_update() -> Result<()> {
    let owners: Vec<AccountId> = (1..=4u8).map(|i| AccountId([i; 32])).collect();
    let solver = AccountId([0xEE; 32]);
    let genesis: Vec<_> = owners.iter().map(|o| (*o, 1_000)).collect();
    let machine = funded(RegistryRouting::ProblemOwner, &genesis)?;

    let shared = {
        let (problem, _) = machine.create_problem(owners[0], problem_params("shared", 0))?;
        let solution = propose(&machine, problem, solver, "fix")?;
        (problem, solution)
    };

    std::thread::scope(|s| {
        for owner in &owners {
            let machine = &machine;
            s.spawn(move || {
                for i in 0..10 {
                    let (problem, _) = machine
                        .create_problem(*owner, problem_params(&format!("p{i}"), 10))
                        .unwrap();
                    let solution = propose(machine, problem, solver, "fix").unwrap();
                    machine
                        .vote_solution(
                            *owner,
                            VoteSolutionParams {
                                problem: shared.0,
                                solution_id: shared.1,
                            },
                        )
                        .unwrap();
                    release(machine, *owner, problem, solution).unwrap();
                }
            });
        }
    });

    for owner in &owners {
        let registry = machine.registry(owner)?.expect("registry");
        let created = if *owner == owners[0] { 11 } else { 10 };
        assert_eq!(registry.problems.len(), created);
        assert_eq!(registry.next_problem_id, created as u64 + 1);
        assert_eq!(machine.balance_of(owner)?, 900);
    }
    assert_eq!(machine.balance_of(&solver)?, 400);
    let shared_problem = machine.problem(&shared.0)?.expect("shared problem");
    assert_eq!(shared_problem.solutions[0].votes, 40);
    Ok(())
}
