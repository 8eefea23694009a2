//! Token collaborator: the ledger that moves stakes in and out of escrow.
//!
//! The settlement engine only needs three operations — pull approved tokens
//! from a holder into escrow, push escrowed tokens back out, and read a
//! balance. They are modeled as the [`TokenLedger`] trait so markets can be
//! settled against any conforming ledger; [`TokenVault`] is the in-memory
//! implementation with an allowance model used by the factory, the CLI and
//! the tests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors reported by the token collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The holder's balance does not cover the requested amount
    #[error("account {account} has insufficient balance: {available} available, {required} required")]
    InsufficientBalance {
        account: String,
        available: u64,
        required: u64,
    },

    /// The holder's authorization for the spender does not cover the amount
    #[error("insufficient allowance from {owner} to {spender}: {available} approved, {required} required")]
    InsufficientAllowance {
        owner: String,
        spender: String,
        available: u64,
        required: u64,
    },
}

/// The transfer primitive a market settles against.
///
/// A conforming implementation fails a transfer only for insufficient
/// balance or authorization, never applies one partially, and reports
/// balances that reflect every completed transfer.
pub trait TokenLedger {
    /// Move `amount` from `owner` into `recipient`, on the recipient's
    /// authority. The recipient acts as the approved spender, so `owner`
    /// must have granted it an allowance covering `amount`.
    fn transfer_from(&mut self, owner: &str, recipient: &str, amount: u64)
        -> Result<(), TokenError>;

    /// Move `amount` from `from` to `to` on the holder's own authority.
    fn transfer(&mut self, from: &str, to: &str, amount: u64) -> Result<(), TokenError>;

    /// Current balance of an account.
    fn balance_of(&self, account: &str) -> u64;
}

/// In-memory token ledger with ERC20-style balances and allowances.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct TokenVault {
    balances: BTreeMap<String, u64>,
    /// owner -> spender -> approved amount
    allowances: BTreeMap<String, BTreeMap<String, u64>>,
}

impl TokenVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint tokens to an account.
    pub fn issue(&mut self, account: &str, amount: u64) {
        *self.balances.entry(account.to_string()).or_insert(0) += amount;
    }

    /// Burn tokens from an account.
    pub fn destroy(&mut self, account: &str, amount: u64) -> Result<(), TokenError> {
        let balance = self.balances.entry(account.to_string()).or_insert(0);
        if *balance < amount {
            return Err(TokenError::InsufficientBalance {
                account: account.to_string(),
                available: *balance,
                required: amount,
            });
        }
        *balance -= amount;
        Ok(())
    }

    /// Authorize `spender` to pull up to `amount` from `owner`.
    ///
    /// Overwrites any previous approval; reset to zero before granting a
    /// fresh allowance.
    pub fn approve(&mut self, owner: &str, spender: &str, amount: u64) {
        self.allowances
            .entry(owner.to_string())
            .or_default()
            .insert(spender.to_string(), amount);
    }

    /// Remaining approval from `owner` to `spender`.
    pub fn allowance(&self, owner: &str, spender: &str) -> u64 {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    fn debit(&mut self, account: &str, amount: u64) -> Result<(), TokenError> {
        let balance = self.balances.entry(account.to_string()).or_insert(0);
        if *balance < amount {
            return Err(TokenError::InsufficientBalance {
                account: account.to_string(),
                available: *balance,
                required: amount,
            });
        }
        *balance -= amount;
        Ok(())
    }

    fn credit(&mut self, account: &str, amount: u64) {
        *self.balances.entry(account.to_string()).or_insert(0) += amount;
    }
}

impl TokenLedger for TokenVault {
    fn transfer_from(
        &mut self,
        owner: &str,
        recipient: &str,
        amount: u64,
    ) -> Result<(), TokenError> {
        let approved = self.allowance(owner, recipient);
        if approved < amount {
            return Err(TokenError::InsufficientAllowance {
                owner: owner.to_string(),
                spender: recipient.to_string(),
                available: approved,
                required: amount,
            });
        }

        // Balance is checked before any mutation so a failure leaves the
        // vault untouched.
        self.debit(owner, amount)?;
        self.credit(recipient, amount);
        self.allowances
            .entry(owner.to_string())
            .or_default()
            .insert(recipient.to_string(), approved - amount);
        Ok(())
    }

    fn transfer(&mut self, from: &str, to: &str, amount: u64) -> Result<(), TokenError> {
        self.debit(from, amount)?;
        self.credit(to, amount);
        Ok(())
    }

    fn balance_of(&self, account: &str) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }
}
