//! Aggregate pool accounting and the prize formulas.
//!
//! Tracks the tokens a market holds in escrow and the totals staked per
//! outcome, and computes per-stake prizes once a winning outcome is known.
//! Entitlements are pure functions of recorded state so they can be
//! re-derived for auditing.

use crate::outcome::Outcome;
use serde::{Deserialize, Serialize};

/// How the pool is distributed among stakes after resolution.
///
/// Selected at market creation and immutable thereafter.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrizeMethod {
    /// Every stake is returned at face value, regardless of the winning
    /// outcome. Principal comes back; nothing is redistributed.
    BreakEven = 0,

    /// Pari-mutuel: the whole pool at resolution time is split among the
    /// stakes on the winning outcome, proportionally to their size.
    Relative = 1,
}

/// Aggregate token accounting for one market.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PoolAccounting {
    /// Tokens currently escrowed by the market
    token_pool: u64,

    /// Total staked per outcome, accumulated at stake time and never
    /// decremented — the relative formula needs the as-placed totals
    outcome_totals: Vec<(Outcome, u64)>,

    /// Pool total captured at resolution; the distribution base for the
    /// relative formula no matter how much has been paid out since
    distribution_base: Option<u64>,
}

impl PoolAccounting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an incoming stake.
    pub fn on_stake(&mut self, outcome: Outcome, amount: u64) {
        self.token_pool += amount;
        match self
            .outcome_totals
            .iter_mut()
            .find(|(existing, _)| *existing == outcome)
        {
            Some((_, total)) => *total += amount,
            None => self.outcome_totals.push((outcome, amount)),
        }
    }

    /// Record tokens leaving escrow as a prize payment.
    pub fn on_payout(&mut self, amount: u64) {
        self.token_pool = self.token_pool.saturating_sub(amount);
    }

    /// Record tokens leaving escrow as a refund.
    pub fn on_refund(&mut self, amount: u64) {
        self.token_pool = self.token_pool.saturating_sub(amount);
    }

    /// Capture the current pool as the distribution base at resolution.
    pub fn freeze_distribution_base(&mut self) {
        self.distribution_base = Some(self.token_pool);
    }

    /// Tokens currently escrowed by the market.
    pub fn token_pool(&self) -> u64 {
        self.token_pool
    }

    /// Total amount staked on one outcome.
    pub fn total_on(&self, outcome: Outcome) -> u64 {
        self.outcome_totals
            .iter()
            .find(|(existing, _)| *existing == outcome)
            .map(|(_, total)| *total)
            .unwrap_or(0)
    }

    /// The pool total frozen at resolution, or the live pool before it.
    pub fn distribution_base(&self) -> u64 {
        self.distribution_base.unwrap_or(self.token_pool)
    }

    /// Prize owed to a single stake under the given method and winner.
    ///
    /// Relative mode pays `amount * base / total_on_winning` (floored) to
    /// stakes on the winning outcome and 0 to the rest; a winning outcome
    /// nobody staked on yields 0 for every stake. Break-even mode pays the
    /// stake's face value unconditionally.
    pub fn stake_prize(
        &self,
        staked_on: Outcome,
        amount: u64,
        winning: Outcome,
        method: PrizeMethod,
    ) -> u64 {
        match method {
            PrizeMethod::BreakEven => amount,
            PrizeMethod::Relative => {
                if staked_on != winning {
                    return 0;
                }
                let winning_total = self.total_on(winning);
                if winning_total == 0 {
                    return 0;
                }
                let prize =
                    (amount as u128 * self.distribution_base() as u128) / winning_total as u128;
                prize as u64
            }
        }
    }
}
