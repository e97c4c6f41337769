// Path: crates/services/src/bank/mod.rs
//! The host value system: account balances and transfers between them.

use crate::records;
use civic_api::services::{AccessScope, BlockchainService};
use civic_api::state::StateAccess;
use civic_api::transaction::context::TxContext;
use civic_types::app::{AccountId, Amount, RegistryEvent};
use civic_types::error::{BankError, TransactionError};
use civic_types::keys::balance_key;
use parity_scale_codec::{Decode, Encode};
use std::any::Any;

/// Service id of the bank.
pub const BANK_SERVICE_ID: &str = "bank";

/// Parameters of `transfer@v1`. The signer is the debited account.
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct TransferParams {
    pub to: AccountId,
    pub amount: Amount,
}

/// Balances live under `balance::{account}`; a missing key is a zero balance.
#[derive(Debug, Clone, Default)]
pub struct BankService;

impl BankService {
    pub fn balance_of<S: StateAccess + ?Sized>(
        state: &S,
        account: &AccountId,
    ) -> Result<Amount, TransactionError> {
        Ok(records::read(state, &balance_key(account))?.unwrap_or(0))
    }

    /// Credits newly minted value to `account`. Host-only: used for genesis
    /// funding, never reachable through `handle_service_call`.
    pub fn deposit<S: StateAccess + ?Sized>(
        state: &mut S,
        account: &AccountId,
        amount: Amount,
    ) -> Result<Amount, TransactionError> {
        let balance = Self::balance_of(state, account)?
            .checked_add(amount)
            .ok_or(BankError::BalanceOverflow(*account))?;
        records::write(state, &balance_key(account), &balance)?;
        Ok(balance)
    }

    /// Moves `amount` from `from` to `to`.
    ///
    /// All checks happen before the first write, so a failed transfer leaves
    /// both balances untouched even without an enclosing overlay.
    pub fn transfer<S: StateAccess + ?Sized>(
        state: &mut S,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
        ctx: &mut TxContext,
    ) -> Result<(), TransactionError> {
        let available = Self::balance_of(state, from)?;
        if available < amount {
            return Err(BankError::InsufficientFunds {
                account: *from,
                required: amount,
                available,
            }
            .into());
        }

        if from != to {
            let credited = Self::balance_of(state, to)?
                .checked_add(amount)
                .ok_or(BankError::BalanceOverflow(*to))?;
            records::write(state, &balance_key(from), &(available - amount))?;
            records::write(state, &balance_key(to), &credited)?;
        }

        log::debug!("[Bank] transferred {} from {} to {}", amount, from, to);
        ctx.emit(RegistryEvent::Transfer {
            from: *from,
            to: *to,
            amount,
        });
        Ok(())
    }
}

impl BlockchainService for BankService {
    fn id(&self) -> &str {
        BANK_SERVICE_ID
    }

    fn abi_version(&self) -> u32 {
        1
    }

    fn state_schema(&self) -> &str {
        "v1"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn access_scope(
        &self,
        method: &str,
        _params: &[u8],
        _signer: &AccountId,
    ) -> Result<AccessScope, TransactionError> {
        match method {
            "transfer@v1" => Ok(AccessScope::Keys {
                registries: Vec::new(),
                balances: true,
            }),
            _ => Ok(AccessScope::Exclusive),
        }
    }

    fn handle_service_call(
        &self,
        state: &mut dyn StateAccess,
        method: &str,
        params: &[u8],
        ctx: &mut TxContext,
    ) -> Result<Vec<u8>, TransactionError> {
        match method {
            "transfer@v1" => {
                let p: TransferParams = records::decode_params(params)?;
                let from = ctx.signer_account_id;
                Self::transfer(state, &from, &p.to, p.amount, ctx)?;
                Ok(Vec::new())
            }
            _ => Err(TransactionError::Unsupported(format!(
                "Bank does not support method '{}'",
                method
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_state::MemoryStore;
    use civic_types::codec;

    const ALICE: AccountId = AccountId([1u8; 32]);
    const BOB: AccountId = AccountId([2u8; 32]);

    #[test]
    fn test_transfer_moves_exact_amount() {
        let mut state = MemoryStore::new();
        BankService::deposit(&mut state, &ALICE, 100).unwrap();
        let mut ctx = TxContext::new(1, ALICE);

        BankService::transfer(&mut state, &ALICE, &BOB, 60, &mut ctx).unwrap();

        assert_eq!(BankService::balance_of(&state, &ALICE).unwrap(), 40);
        assert_eq!(BankService::balance_of(&state, &BOB).unwrap(), 60);
        assert_eq!(
            ctx.events(),
            &[RegistryEvent::Transfer {
                from: ALICE,
                to: BOB,
                amount: 60
            }]
        );
    }

    #[test]
    fn test_insufficient_funds_writes_nothing() {
        let mut state = MemoryStore::new();
        BankService::deposit(&mut state, &ALICE, 10).unwrap();
        let before = state.clone();
        let mut ctx = TxContext::new(1, ALICE);

        let err = BankService::transfer(&mut state, &ALICE, &BOB, 11, &mut ctx).unwrap_err();
        assert!(matches!(
            err,
            TransactionError::Bank(BankError::InsufficientFunds {
                required: 11,
                available: 10,
                ..
            })
        ));
        assert_eq!(state, before);
        assert!(ctx.events().is_empty());
    }

    #[test]
    fn test_self_transfer_requires_funds_but_keeps_balance() {
        let mut state = MemoryStore::new();
        BankService::deposit(&mut state, &ALICE, 5).unwrap();
        let mut ctx = TxContext::new(1, ALICE);

        BankService::transfer(&mut state, &ALICE, &ALICE, 5, &mut ctx).unwrap();
        assert_eq!(BankService::balance_of(&state, &ALICE).unwrap(), 5);
        assert!(BankService::transfer(&mut state, &ALICE, &ALICE, 6, &mut ctx).is_err());
    }

    #[test]
    fn test_credit_overflow_is_rejected() {
        let mut state = MemoryStore::new();
        BankService::deposit(&mut state, &ALICE, 1).unwrap();
        BankService::deposit(&mut state, &BOB, Amount::MAX).unwrap();
        let mut ctx = TxContext::new(1, ALICE);

        let err = BankService::transfer(&mut state, &ALICE, &BOB, 1, &mut ctx).unwrap_err();
        assert!(matches!(err, TransactionError::Bank(BankError::BalanceOverflow(who)) if who == BOB));
        assert_eq!(BankService::balance_of(&state, &ALICE).unwrap(), 1);
    }

    #[test]
    fn test_dispatch_debits_signer() {
        let mut state = MemoryStore::new();
        BankService::deposit(&mut state, &ALICE, 30).unwrap();
        let params = codec::to_bytes_canonical(&TransferParams { to: BOB, amount: 30 }).unwrap();
        let mut ctx = TxContext::new(1, ALICE);

        BankService
            .handle_service_call(&mut state, "transfer@v1", &params, &mut ctx)
            .unwrap();
        assert_eq!(BankService::balance_of(&state, &BOB).unwrap(), 30);

        let err = BankService
            .handle_service_call(&mut state, "mint@v1", &params, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, TransactionError::Unsupported(_)));
    }
}
