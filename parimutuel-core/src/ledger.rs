//! Stake records and the per-market stake ledger.
//!
//! Every stake-placing call appends one immutable record. The only field
//! that ever changes afterwards is the `paid` flag, flipped exactly once by
//! [`StakeLedger::mark_paid`] — the single point of truth preventing double
//! payment across every payout and refund path.

use crate::{error::Result, outcome::Outcome, AccountId, MarketError};
use serde::{Deserialize, Serialize};

/// A single wager: one owner, one outcome, one token amount.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Stake {
    /// Sequential id, assigned from 1 in placement order
    pub id: u64,

    /// Outcome the tokens were placed on
    pub outcome: Outcome,

    /// Token amount escrowed by this stake
    pub amount: u64,

    /// Set once the stake has been paid out or refunded
    pub paid: bool,

    /// Account that placed the stake
    pub owner: AccountId,
}

/// Append-only ledger of every stake placed on one market.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct StakeLedger {
    stakes: Vec<Stake>,
}

impl StakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new stake and return its assigned id.
    ///
    /// Preconditions (status, deadline, amount, outcome validity) are the
    /// market's responsibility; the ledger records unconditionally.
    pub fn record(&mut self, owner: &str, outcome: Outcome, amount: u64) -> u64 {
        let id = self.stakes.len() as u64 + 1;
        self.stakes.push(Stake {
            id,
            outcome,
            amount,
            paid: false,
            owner: owner.to_string(),
        });
        id
    }

    /// Look up a stake by id.
    pub fn get(&self, id: u64) -> Option<&Stake> {
        let index = id.checked_sub(1)? as usize;
        self.stakes.get(index)
    }

    /// Stakes belonging to `owner`, in placement order.
    pub fn stakes_of<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a Stake> {
        self.stakes.iter().filter(move |stake| stake.owner == owner)
    }

    /// Flip the paid flag of a stake.
    ///
    /// Fails with `AlreadyPaid` if the flag is already set. Every payout and
    /// refund path calls this before funds move, so a stake can be paid at
    /// most once regardless of how sweeps are partitioned.
    pub fn mark_paid(&mut self, id: u64) -> Result<()> {
        let index = id
            .checked_sub(1)
            .ok_or(MarketError::UnknownStake(id))? as usize;
        let stake = self
            .stakes
            .get_mut(index)
            .ok_or(MarketError::UnknownStake(id))?;

        if stake.paid {
            return Err(MarketError::AlreadyPaid(id));
        }
        stake.paid = true;
        Ok(())
    }

    /// All stakes in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &Stake> {
        self.stakes.iter()
    }

    /// A bounded window of the ledger for chunked sweeps.
    ///
    /// Windows past the end clip to empty, so a sweep can be resumed with
    /// the next offset without first querying the ledger size.
    pub fn range(&self, start: u64, count: u64) -> &[Stake] {
        let len = self.stakes.len() as u64;
        let from = start.min(len);
        let to = start.saturating_add(count).min(len);
        &self.stakes[from as usize..to as usize]
    }

    pub fn len(&self) -> usize {
        self.stakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stakes.is_empty()
    }

    /// Sum of all amounts not yet paid out or refunded.
    ///
    /// Audit helper: while no payout has occurred this equals the market's
    /// token pool and the escrow balance reported by the token ledger.
    pub fn unpaid_total(&self) -> u64 {
        self.stakes
            .iter()
            .filter(|stake| !stake.paid)
            .map(|stake| stake.amount)
            .sum()
    }
}
