//! Settlement: resolution, prize distribution and cancellation refunds.
//!
//! Every operation here follows the same shape: validate all preconditions,
//! build the full payment plan, check the escrow covers it, then flip paid
//! flags before moving funds. A failing call returns before the first
//! mutation, so ledger, pool and token state stay exactly as they were.

use crate::{
    error::Result,
    event::MarketEvent,
    market::{Market, MarketKind, MarketStatus},
    oracle::MarketOracle,
    outcome::Outcome,
    token::{TokenError, TokenLedger},
    utils::unix_now,
    MarketError,
};

impl Market {
    /// Resolve the market from its bound oracle's report.
    pub fn resolve(&mut self, caller: &str, oracle: &dyn MarketOracle) -> Result<MarketEvent> {
        self.resolve_at(caller, oracle, unix_now())
    }

    /// Resolve at an explicit instant.
    ///
    /// Preconditions, in order: the market is Published; the oracle knows
    /// the market and has reported an outcome; the buying deadline has
    /// passed; the reported value names a valid outcome for the market
    /// kind. On success the winning outcome is fixed and the pool total is
    /// frozen as the distribution base.
    pub fn resolve_at(
        &mut self,
        caller: &str,
        oracle: &dyn MarketOracle,
        now: u64,
    ) -> Result<MarketEvent> {
        self.require_operator(caller)?;
        if self.status != MarketStatus::Published {
            return Err(MarketError::InvalidState(self.status.to_string()));
        }
        if !oracle.is_registered(&self.id) {
            return Err(MarketError::OracleNotReady);
        }
        let reported = oracle
            .outcome_for(&self.id)
            .ok_or(MarketError::OracleNotReady)?;
        if now < self.stake_buying_end_time {
            return Err(MarketError::StakingStillOpen);
        }
        let winning = self.winning_outcome_from_report(reported)?;

        self.status = MarketStatus::Resolved;
        self.winning_outcome = Some(winning);
        self.pool.freeze_distribution_base();

        Ok(MarketEvent::Resolved {
            market_id: self.id.clone(),
            winning_outcome: winning,
        })
    }

    /// Map the oracle's raw report onto the market's outcome space.
    fn winning_outcome_from_report(&self, reported: i64) -> Result<Outcome> {
        match self.kind {
            MarketKind::Scalar => Ok(Outcome::Value(reported)),
            MarketKind::Discrete => u32::try_from(reported)
                .ok()
                .filter(|id| self.outcomes.contains(*id))
                .map(Outcome::Id)
                .ok_or_else(|| MarketError::UnknownOutcome(reported.to_string())),
        }
    }

    /// Total prize currently owed to an owner's unpaid stakes.
    ///
    /// A pure function of ledger and accounting state: owners with no
    /// eligible stakes (or a zero-staked winning outcome) compute to 0.
    pub fn entitlement_of(&self, owner: &str) -> Result<u64> {
        if self.status != MarketStatus::Resolved {
            return Err(MarketError::InvalidState(self.status.to_string()));
        }
        let winning = self.fixed_winning_outcome()?;

        Ok(self
            .ledger
            .stakes_of(owner)
            .filter(|stake| !stake.paid)
            .map(|stake| {
                self.pool
                    .stake_prize(stake.outcome, stake.amount, winning, self.method)
            })
            .sum())
    }

    /// Withdraw the caller's full prize.
    ///
    /// Marks every contributing stake paid, then transfers the summed
    /// amount out of escrow. `NothingToWithdraw` when the caller holds no
    /// stake carrying a prize; `AlreadyWithdrawn` when every such stake was
    /// already paid.
    pub fn withdraw_prize(
        &mut self,
        token: &mut dyn TokenLedger,
        caller: &str,
    ) -> Result<MarketEvent> {
        if self.status != MarketStatus::Resolved {
            return Err(MarketError::InvalidState(self.status.to_string()));
        }
        let winning = self.fixed_winning_outcome()?;

        let mut payable: Vec<(u64, u64)> = Vec::new();
        let mut had_prize_bearing_stake = false;
        for stake in self.ledger.stakes_of(caller) {
            let prize = self
                .pool
                .stake_prize(stake.outcome, stake.amount, winning, self.method);
            if prize == 0 {
                continue;
            }
            had_prize_bearing_stake = true;
            if !stake.paid {
                payable.push((stake.id, prize));
            }
        }

        if payable.is_empty() {
            return Err(if had_prize_bearing_stake {
                MarketError::AlreadyWithdrawn
            } else {
                MarketError::NothingToWithdraw
            });
        }

        let total: u64 = payable.iter().map(|(_, prize)| *prize).sum();
        self.ensure_escrow_covers(&*token, total)?;

        for (id, _) in &payable {
            self.ledger.mark_paid(*id)?;
        }
        self.pool.on_payout(total);
        token.transfer(&self.id, caller, total)?;

        Ok(MarketEvent::PrizeWithdrawn {
            market_id: self.id.clone(),
            owner: caller.to_string(),
            amount: total,
        })
    }

    /// Operator sweep paying every outstanding prize in one pass.
    pub fn pay_all_prizes(
        &mut self,
        token: &mut dyn TokenLedger,
        caller: &str,
    ) -> Result<Vec<MarketEvent>> {
        let len = self.ledger.len() as u64;
        self.pay_all_prizes_bulk(token, caller, 0, len)
    }

    /// Operator sweep over the stake window `[start, start + count)`.
    ///
    /// Partial sweeps are resumable with the next offset; however the sweep
    /// is partitioned, each stake is paid at most once and unpaid stakes
    /// outside the window are untouched.
    pub fn pay_all_prizes_bulk(
        &mut self,
        token: &mut dyn TokenLedger,
        caller: &str,
        start: u64,
        count: u64,
    ) -> Result<Vec<MarketEvent>> {
        self.require_operator(caller)?;
        if self.status != MarketStatus::Resolved {
            return Err(MarketError::InvalidState(self.status.to_string()));
        }
        let winning = self.fixed_winning_outcome()?;

        let payable: Vec<(u64, String, u64)> = self
            .ledger
            .range(start, count)
            .iter()
            .filter(|stake| !stake.paid)
            .filter_map(|stake| {
                let prize = self
                    .pool
                    .stake_prize(stake.outcome, stake.amount, winning, self.method);
                (prize > 0).then(|| (stake.id, stake.owner.clone(), prize))
            })
            .collect();

        let total: u64 = payable.iter().map(|(_, _, prize)| *prize).sum();
        self.ensure_escrow_covers(&*token, total)?;

        let mut events = Vec::with_capacity(payable.len());
        for (id, owner, prize) in payable {
            self.ledger.mark_paid(id)?;
            self.pool.on_payout(prize);
            token.transfer(&self.id, &owner, prize)?;
            events.push(MarketEvent::PrizeWithdrawn {
                market_id: self.id.clone(),
                owner,
                amount: prize,
            });
        }
        Ok(events)
    }

    /// Operator-driven refund of one owner's unpaid stakes on one outcome.
    pub fn refund_user(
        &mut self,
        token: &mut dyn TokenLedger,
        caller: &str,
        owner: &str,
        outcome: Outcome,
    ) -> Result<MarketEvent> {
        self.require_operator(caller)?;
        self.refund_matching(token, owner, outcome)
    }

    /// Self-service refund of the caller's unpaid stakes on one outcome.
    pub fn get_refund(
        &mut self,
        token: &mut dyn TokenLedger,
        caller: &str,
        outcome: Outcome,
    ) -> Result<MarketEvent> {
        self.refund_matching(token, caller, outcome)
    }

    fn refund_matching(
        &mut self,
        token: &mut dyn TokenLedger,
        owner: &str,
        outcome: Outcome,
    ) -> Result<MarketEvent> {
        if self.status != MarketStatus::Canceled {
            return Err(MarketError::InvalidState(self.status.to_string()));
        }

        let matching: Vec<(u64, u64)> = self
            .ledger
            .stakes_of(owner)
            .filter(|stake| !stake.paid && stake.outcome == outcome)
            .map(|stake| (stake.id, stake.amount))
            .collect();
        if matching.is_empty() {
            return Err(MarketError::NothingToRefund);
        }

        let total: u64 = matching.iter().map(|(_, amount)| *amount).sum();
        self.ensure_escrow_covers(&*token, total)?;

        for (id, _) in &matching {
            self.ledger.mark_paid(*id)?;
        }
        self.pool.on_refund(total);
        token.transfer(&self.id, owner, total)?;

        Ok(MarketEvent::UserRefunded {
            market_id: self.id.clone(),
            owner: owner.to_string(),
            amount: total,
            outcome,
        })
    }

    /// Operator sweep refunding every unpaid stake at face value.
    pub fn refund_all_users(
        &mut self,
        token: &mut dyn TokenLedger,
        caller: &str,
    ) -> Result<Vec<MarketEvent>> {
        let len = self.ledger.len() as u64;
        self.refund_all_users_bulk(token, caller, 0, len)
    }

    /// Refund sweep over the stake window `[start, start + count)`.
    pub fn refund_all_users_bulk(
        &mut self,
        token: &mut dyn TokenLedger,
        caller: &str,
        start: u64,
        count: u64,
    ) -> Result<Vec<MarketEvent>> {
        self.require_operator(caller)?;
        if self.status != MarketStatus::Canceled {
            return Err(MarketError::InvalidState(self.status.to_string()));
        }

        let matching: Vec<(u64, String, u64, Outcome)> = self
            .ledger
            .range(start, count)
            .iter()
            .filter(|stake| !stake.paid)
            .map(|stake| (stake.id, stake.owner.clone(), stake.amount, stake.outcome))
            .collect();

        let total: u64 = matching.iter().map(|(_, _, amount, _)| *amount).sum();
        self.ensure_escrow_covers(&*token, total)?;

        let mut events = Vec::with_capacity(matching.len());
        for (id, owner, amount, outcome) in matching {
            self.ledger.mark_paid(id)?;
            self.pool.on_refund(amount);
            token.transfer(&self.id, &owner, amount)?;
            events.push(MarketEvent::UserRefunded {
                market_id: self.id.clone(),
                owner,
                amount,
                outcome,
            });
        }
        Ok(events)
    }

    fn fixed_winning_outcome(&self) -> Result<Outcome> {
        // Set exactly once when the status moved to Resolved.
        self.winning_outcome
            .ok_or_else(|| MarketError::InvalidState(self.status.to_string()))
    }

    fn ensure_escrow_covers(&self, token: &dyn TokenLedger, amount: u64) -> Result<()> {
        let escrow = token.balance_of(&self.id);
        if escrow < amount {
            return Err(TokenError::InsufficientBalance {
                account: self.id.clone(),
                available: escrow,
                required: amount,
            }
            .into());
        }
        Ok(())
    }
}
