//! # Market Aggregate
//!
//! One `Market` per created prediction: the lifecycle state machine, the
//! operator-gated configuration surface, and the staking entry point. Each
//! market owns its stake ledger and pool accounting outright; settlement
//! operations live in the `settlement` module as a second `impl` block.

use crate::{
    accounting::{PoolAccounting, PrizeMethod},
    error::Result,
    event::MarketEvent,
    ledger::{Stake, StakeLedger},
    outcome::{Outcome, OutcomeTable},
    token::TokenLedger,
    utils::{generate_id, unix_now},
    AccountId, MarketError, MIN_OUTCOMES,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a market.
///
/// The numeric codes are part of the reporting surface; status queries
/// expose them unchanged.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarketStatus {
    /// Created, being configured by the operator
    Initializing = 0,

    /// Open: stakes are accepted until the buying deadline
    Published = 1,

    /// Winning outcome fixed; prizes withdrawable. Terminal.
    Resolved = 2,

    /// Temporarily closed for reconfiguration
    Paused = 3,

    /// Aborted; stakes refundable at face value. Terminal.
    Canceled = 4,
}

impl MarketStatus {
    /// Numeric status code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Whether the market can still change state.
    pub fn is_terminal(self) -> bool {
        matches!(self, MarketStatus::Resolved | MarketStatus::Canceled)
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MarketStatus::Initializing => "Initializing",
            MarketStatus::Published => "Published",
            MarketStatus::Resolved => "Resolved",
            MarketStatus::Paused => "Paused",
            MarketStatus::Canceled => "Canceled",
        };
        write!(f, "{name}")
    }
}

/// How a market's outcome set is defined.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarketKind {
    /// Outcomes declared up front and staked on by sequential id
    Discrete,

    /// Any integer value is a stakeable outcome; nothing is predeclared
    Scalar,
}

/// A pari-mutuel prediction market bound to one oracle and one token ledger.
///
/// The market escrows stakes under its own id in the token ledger, so
/// `token.balance_of(&market.id)` is the externally verifiable counterpart
/// of [`Market::token_pool`].
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Market {
    /// Unique market identifier; also the escrow account key
    pub id: String,

    /// Account allowed to configure, publish, resolve and sweep
    pub operator: AccountId,

    /// Identifier of the bound oracle
    pub(crate) oracle_id: String,

    /// Human-readable market name
    pub(crate) name: String,

    /// Discrete (predeclared outcomes) or scalar (open integer outcomes)
    pub kind: MarketKind,

    /// Prize calculation method, fixed at creation
    pub method: PrizeMethod,

    pub(crate) status: MarketStatus,

    /// Stakes are rejected from this instant on (unix seconds)
    pub(crate) stake_buying_end_time: u64,

    /// Scheduled end of the predicted event; never precedes the buying
    /// deadline
    pub(crate) market_end_time: u64,

    /// Declared outcomes (discrete markets only)
    pub(crate) outcomes: OutcomeTable,

    pub(crate) ledger: StakeLedger,

    pub(crate) pool: PoolAccounting,

    /// Set exactly once, at resolution
    pub(crate) winning_outcome: Option<Outcome>,
}

impl Market {
    /// Create a market in `Initializing` state.
    ///
    /// Validates the construction contract: a bound oracle, positive end
    /// times with `market_end_time >= stake_buying_end_time`, and a
    /// non-empty name. The market id is generated.
    pub fn new(
        operator: &str,
        oracle_id: &str,
        market_end_time: u64,
        stake_buying_end_time: u64,
        name: &str,
        kind: MarketKind,
        method: PrizeMethod,
    ) -> Result<Self> {
        if oracle_id.is_empty() {
            return Err(MarketError::InvalidOracle(
                "a market must be bound to an oracle".to_string(),
            ));
        }
        if market_end_time == 0 || stake_buying_end_time == 0 {
            return Err(MarketError::InvalidTiming(
                "end times must be positive timestamps".to_string(),
            ));
        }
        if market_end_time < stake_buying_end_time {
            return Err(MarketError::InvalidTiming(
                "market end time must not precede the stake buying deadline".to_string(),
            ));
        }
        if name.is_empty() {
            return Err(MarketError::InvalidName);
        }

        Ok(Self {
            id: generate_id(),
            operator: operator.to_string(),
            oracle_id: oracle_id.to_string(),
            name: name.to_string(),
            kind,
            method,
            status: MarketStatus::Initializing,
            stake_buying_end_time,
            market_end_time,
            outcomes: OutcomeTable::new(),
            ledger: StakeLedger::new(),
            pool: PoolAccounting::new(),
            winning_outcome: None,
        })
    }

    pub(crate) fn require_operator(&self, caller: &str) -> Result<()> {
        if caller != self.operator {
            return Err(MarketError::Unauthorized);
        }
        Ok(())
    }

    /// Configuration is only allowed while Initializing or Paused.
    fn require_configurable(&self) -> Result<()> {
        match self.status {
            MarketStatus::Initializing | MarketStatus::Paused => Ok(()),
            status => Err(MarketError::InvalidState(status.to_string())),
        }
    }

    /// Declare a new outcome on a discrete market.
    ///
    /// Only permitted while Initializing; ids are assigned sequentially
    /// from 1 in declaration order.
    pub fn add_outcome(&mut self, caller: &str, label: &str) -> Result<MarketEvent> {
        self.require_operator(caller)?;
        if self.status != MarketStatus::Initializing {
            return Err(MarketError::InvalidState(self.status.to_string()));
        }
        if self.kind != MarketKind::Discrete {
            return Err(MarketError::InvalidOutcome(
                "scalar markets do not declare outcomes".to_string(),
            ));
        }

        let outcome_id = self.outcomes.add(label)?;
        Ok(MarketEvent::OutcomeAdded {
            market_id: self.id.clone(),
            outcome_id,
            label: label.to_string(),
        })
    }

    /// Open the market for staking.
    pub fn publish(&mut self, caller: &str) -> Result<MarketEvent> {
        self.require_operator(caller)?;
        self.require_configurable()?;
        if self.kind == MarketKind::Discrete && self.outcomes.len() < MIN_OUTCOMES {
            return Err(MarketError::NoOutcomes);
        }

        self.status = MarketStatus::Published;
        Ok(MarketEvent::Published {
            market_id: self.id.clone(),
        })
    }

    /// Pause a published market for reconfiguration.
    pub fn pause(&mut self, caller: &str) -> Result<MarketEvent> {
        self.require_operator(caller)?;
        if self.status != MarketStatus::Published {
            return Err(MarketError::InvalidState(self.status.to_string()));
        }

        self.status = MarketStatus::Paused;
        Ok(MarketEvent::Paused {
            market_id: self.id.clone(),
        })
    }

    /// Cancel the market. Terminal; only refunds remain afterwards.
    pub fn cancel(&mut self, caller: &str) -> Result<MarketEvent> {
        self.require_operator(caller)?;
        if self.status.is_terminal() {
            return Err(MarketError::InvalidState(self.status.to_string()));
        }

        self.status = MarketStatus::Canceled;
        Ok(MarketEvent::Canceled {
            market_id: self.id.clone(),
        })
    }

    /// Move the stake buying deadline.
    pub fn set_stake_buying_end_time(&mut self, caller: &str, time: u64) -> Result<()> {
        self.require_operator(caller)?;
        self.require_configurable()?;
        if time == 0 {
            return Err(MarketError::InvalidTiming(
                "the stake buying deadline must be a positive timestamp".to_string(),
            ));
        }
        if time > self.market_end_time {
            return Err(MarketError::InvalidTiming(
                "the stake buying deadline must not exceed the market end time".to_string(),
            ));
        }

        self.stake_buying_end_time = time;
        Ok(())
    }

    /// Move the market end time.
    pub fn set_market_end_time(&mut self, caller: &str, time: u64) -> Result<()> {
        self.require_operator(caller)?;
        self.require_configurable()?;
        if time == 0 {
            return Err(MarketError::InvalidTiming(
                "the market end time must be a positive timestamp".to_string(),
            ));
        }
        if time < self.stake_buying_end_time {
            return Err(MarketError::InvalidTiming(
                "market end time must not precede the stake buying deadline".to_string(),
            ));
        }

        self.market_end_time = time;
        Ok(())
    }

    /// Rename the market.
    pub fn set_name(&mut self, caller: &str, name: &str) -> Result<()> {
        self.require_operator(caller)?;
        self.require_configurable()?;
        if name.is_empty() {
            return Err(MarketError::InvalidName);
        }

        self.name = name.to_string();
        Ok(())
    }

    /// Rebind the market to a different oracle.
    ///
    /// The registry validates that the oracle actually exists; the market
    /// itself only guards the binding and the state gate.
    pub fn set_oracle(&mut self, caller: &str, oracle_id: &str) -> Result<()> {
        self.require_operator(caller)?;
        self.require_configurable()?;
        if oracle_id.is_empty() {
            return Err(MarketError::InvalidOracle(
                "a market must be bound to an oracle".to_string(),
            ));
        }

        self.oracle_id = oracle_id.to_string();
        Ok(())
    }

    /// Place a stake, pulling `amount` approved tokens into escrow.
    pub fn stake(
        &mut self,
        token: &mut dyn TokenLedger,
        owner: &str,
        amount: u64,
        outcome: Outcome,
    ) -> Result<MarketEvent> {
        self.stake_at(token, owner, amount, outcome, unix_now())
    }

    /// Place a stake at an explicit instant.
    ///
    /// Stakes are accepted strictly before the buying deadline: a stake at
    /// exactly `stake_buying_end_time` is already closed.
    pub fn stake_at(
        &mut self,
        token: &mut dyn TokenLedger,
        owner: &str,
        amount: u64,
        outcome: Outcome,
        now: u64,
    ) -> Result<MarketEvent> {
        if amount == 0 {
            return Err(MarketError::InvalidAmount);
        }
        self.require_outcome_for_kind(outcome)?;
        if self.status != MarketStatus::Published {
            return Err(MarketError::InvalidState(self.status.to_string()));
        }
        if now >= self.stake_buying_end_time {
            return Err(MarketError::StakingClosed);
        }

        // The escrow pull is the last fallible step, so a rejected debit
        // leaves ledger and pool untouched.
        token.transfer_from(owner, &self.id, amount)?;
        self.ledger.record(owner, outcome, amount);
        self.pool.on_stake(outcome, amount);

        Ok(MarketEvent::TokensPlaced {
            market_id: self.id.clone(),
            owner: owner.to_string(),
            amount,
            outcome,
        })
    }

    /// Validate an outcome identifier against the market kind.
    pub(crate) fn require_outcome_for_kind(&self, outcome: Outcome) -> Result<()> {
        match (self.kind, outcome) {
            (MarketKind::Discrete, Outcome::Id(id)) if self.outcomes.contains(id) => Ok(()),
            (MarketKind::Scalar, Outcome::Value(_)) => Ok(()),
            _ => Err(MarketError::UnknownOutcome(outcome.to_string())),
        }
    }

    // Read-only queries

    pub fn status(&self) -> MarketStatus {
        self.status
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn oracle_id(&self) -> &str {
        &self.oracle_id
    }

    pub fn stake_buying_end_time(&self) -> u64 {
        self.stake_buying_end_time
    }

    pub fn market_end_time(&self) -> u64 {
        self.market_end_time
    }

    /// Tokens currently escrowed by the market.
    pub fn token_pool(&self) -> u64 {
        self.pool.token_pool()
    }

    /// The winning outcome, once resolved.
    pub fn winning_outcome(&self) -> Option<Outcome> {
        self.winning_outcome
    }

    /// Number of stakes placed so far.
    pub fn stake_count(&self) -> usize {
        self.ledger.len()
    }

    /// Per-stake detail by id.
    pub fn stake_by_id(&self, id: u64) -> Option<&Stake> {
        self.ledger.get(id)
    }

    /// Ids of an owner's stakes, in placement order.
    pub fn stakes_of(&self, owner: &str) -> Vec<u64> {
        self.ledger.stakes_of(owner).map(|stake| stake.id).collect()
    }

    /// Read access to the stake ledger.
    pub fn ledger(&self) -> &StakeLedger {
        &self.ledger
    }

    /// Label of a declared outcome (discrete markets).
    pub fn outcome_label(&self, id: u32) -> Option<&str> {
        self.outcomes.label(id)
    }

    /// Number of declared outcomes (discrete markets).
    pub fn outcome_count(&self) -> usize {
        self.outcomes.len()
    }

    /// Total staked on one outcome.
    pub fn total_on(&self, outcome: Outcome) -> u64 {
        self.pool.total_on(outcome)
    }

    /// Whether the tracked pool matches the escrow balance the token
    /// ledger reports for this market.
    pub fn escrow_consistent(&self, token: &dyn TokenLedger) -> bool {
        token.balance_of(&self.id) == self.pool.token_pool()
    }
}
