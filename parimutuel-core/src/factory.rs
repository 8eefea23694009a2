//! Market construction and the registry that owns every market and oracle.
//!
//! `PredictionFactory` is the only gate on malformed market creation: it
//! validates the construction contract, binds each market to one oracle and
//! the shared token vault, and owns the results in registries keyed by id.
//! Routed operations borrow a market and its collaborators together behind
//! `&mut self`, which serializes every call touching one market's ledger
//! and pool (single-writer discipline). Calls against distinct factories —
//! and therefore distinct markets — are independent.

use crate::{
    accounting::PrizeMethod,
    error::Result,
    event::MarketEvent,
    market::{Market, MarketKind},
    oracle::CentralizedOracle,
    outcome::Outcome,
    token::TokenVault,
    utils::{generate_id, unix_now},
    MarketError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Registry of markets and oracles sharing one token vault.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PredictionFactory {
    /// The token ledger every market escrows against
    pub token: TokenVault,

    oracles: BTreeMap<String, CentralizedOracle>,
    markets: BTreeMap<String, Market>,
}

impl PredictionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a named oracle controlled by `operator`; returns its id.
    pub fn create_oracle(&mut self, operator: &str, name: &str) -> Result<String> {
        let id = generate_id();
        let oracle = CentralizedOracle::new(&id, name, operator)?;
        self.oracles.insert(id.clone(), oracle);
        Ok(id)
    }

    /// Create a discrete-outcome market; returns its id.
    pub fn create_discrete_market(
        &mut self,
        operator: &str,
        oracle_id: &str,
        market_end_time: u64,
        stake_buying_end_time: u64,
        name: &str,
        method: PrizeMethod,
    ) -> Result<String> {
        self.create_market(
            operator,
            oracle_id,
            market_end_time,
            stake_buying_end_time,
            name,
            MarketKind::Discrete,
            method,
        )
    }

    /// Create a scalar market; returns its id.
    pub fn create_scalar_market(
        &mut self,
        operator: &str,
        oracle_id: &str,
        market_end_time: u64,
        stake_buying_end_time: u64,
        name: &str,
        method: PrizeMethod,
    ) -> Result<String> {
        self.create_market(
            operator,
            oracle_id,
            market_end_time,
            stake_buying_end_time,
            name,
            MarketKind::Scalar,
            method,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn create_market(
        &mut self,
        operator: &str,
        oracle_id: &str,
        market_end_time: u64,
        stake_buying_end_time: u64,
        name: &str,
        kind: MarketKind,
        method: PrizeMethod,
    ) -> Result<String> {
        if !self.oracles.contains_key(oracle_id) {
            return Err(MarketError::InvalidOracle(format!(
                "oracle {oracle_id} does not exist"
            )));
        }

        let market = Market::new(
            operator,
            oracle_id,
            market_end_time,
            stake_buying_end_time,
            name,
            kind,
            method,
        )?;
        let id = market.id.clone();
        self.markets.insert(id.clone(), market);
        Ok(id)
    }

    /// Look up a market.
    pub fn market(&self, market_id: &str) -> Result<&Market> {
        self.markets
            .get(market_id)
            .ok_or_else(|| MarketError::UnknownMarket(market_id.to_string()))
    }

    /// Look up a market for direct lifecycle calls (publish, pause, ...).
    pub fn market_mut(&mut self, market_id: &str) -> Result<&mut Market> {
        self.markets
            .get_mut(market_id)
            .ok_or_else(|| MarketError::UnknownMarket(market_id.to_string()))
    }

    /// Look up an oracle.
    pub fn oracle(&self, oracle_id: &str) -> Result<&CentralizedOracle> {
        self.oracles
            .get(oracle_id)
            .ok_or_else(|| MarketError::InvalidOracle(format!("oracle {oracle_id} does not exist")))
    }

    /// Look up an oracle for registration and outcome reporting.
    pub fn oracle_mut(&mut self, oracle_id: &str) -> Result<&mut CentralizedOracle> {
        self.oracles
            .get_mut(oracle_id)
            .ok_or_else(|| MarketError::InvalidOracle(format!("oracle {oracle_id} does not exist")))
    }

    /// All markets, in id order.
    pub fn markets(&self) -> impl Iterator<Item = &Market> {
        self.markets.values()
    }

    /// All oracles, in id order.
    pub fn oracles(&self) -> impl Iterator<Item = &CentralizedOracle> {
        self.oracles.values()
    }

    /// Rebind a market to another registered oracle.
    pub fn set_oracle(&mut self, market_id: &str, caller: &str, oracle_id: &str) -> Result<()> {
        if !self.oracles.contains_key(oracle_id) {
            return Err(MarketError::InvalidOracle(format!(
                "oracle {oracle_id} does not exist"
            )));
        }
        self.market_mut(market_id)?.set_oracle(caller, oracle_id)
    }

    /// Place a stake, escrowing tokens in the shared vault.
    pub fn stake(
        &mut self,
        market_id: &str,
        owner: &str,
        amount: u64,
        outcome: Outcome,
    ) -> Result<MarketEvent> {
        self.stake_at(market_id, owner, amount, outcome, unix_now())
    }

    /// Place a stake at an explicit instant.
    pub fn stake_at(
        &mut self,
        market_id: &str,
        owner: &str,
        amount: u64,
        outcome: Outcome,
        now: u64,
    ) -> Result<MarketEvent> {
        let market = self
            .markets
            .get_mut(market_id)
            .ok_or_else(|| MarketError::UnknownMarket(market_id.to_string()))?;
        market.stake_at(&mut self.token, owner, amount, outcome, now)
    }

    /// Resolve a market from its bound oracle.
    pub fn resolve(&mut self, market_id: &str, caller: &str) -> Result<MarketEvent> {
        self.resolve_at(market_id, caller, unix_now())
    }

    /// Resolve a market at an explicit instant.
    pub fn resolve_at(&mut self, market_id: &str, caller: &str, now: u64) -> Result<MarketEvent> {
        let market = self
            .markets
            .get_mut(market_id)
            .ok_or_else(|| MarketError::UnknownMarket(market_id.to_string()))?;
        let oracle = self
            .oracles
            .get(market.oracle_id())
            .ok_or_else(|| MarketError::InvalidOracle(market.oracle_id().to_string()))?;
        market.resolve_at(caller, oracle, now)
    }

    /// Withdraw the caller's prize from a resolved market.
    pub fn withdraw_prize(&mut self, market_id: &str, caller: &str) -> Result<MarketEvent> {
        let market = self
            .markets
            .get_mut(market_id)
            .ok_or_else(|| MarketError::UnknownMarket(market_id.to_string()))?;
        market.withdraw_prize(&mut self.token, caller)
    }

    /// Operator sweep paying every outstanding prize.
    pub fn pay_all_prizes(&mut self, market_id: &str, caller: &str) -> Result<Vec<MarketEvent>> {
        let market = self
            .markets
            .get_mut(market_id)
            .ok_or_else(|| MarketError::UnknownMarket(market_id.to_string()))?;
        market.pay_all_prizes(&mut self.token, caller)
    }

    /// Operator sweep over a bounded stake window.
    pub fn pay_all_prizes_bulk(
        &mut self,
        market_id: &str,
        caller: &str,
        start: u64,
        count: u64,
    ) -> Result<Vec<MarketEvent>> {
        let market = self
            .markets
            .get_mut(market_id)
            .ok_or_else(|| MarketError::UnknownMarket(market_id.to_string()))?;
        market.pay_all_prizes_bulk(&mut self.token, caller, start, count)
    }

    /// Operator-driven refund of one owner's stakes on one outcome.
    pub fn refund_user(
        &mut self,
        market_id: &str,
        caller: &str,
        owner: &str,
        outcome: Outcome,
    ) -> Result<MarketEvent> {
        let market = self
            .markets
            .get_mut(market_id)
            .ok_or_else(|| MarketError::UnknownMarket(market_id.to_string()))?;
        market.refund_user(&mut self.token, caller, owner, outcome)
    }

    /// Self-service refund of the caller's stakes on one outcome.
    pub fn get_refund(
        &mut self,
        market_id: &str,
        caller: &str,
        outcome: Outcome,
    ) -> Result<MarketEvent> {
        let market = self
            .markets
            .get_mut(market_id)
            .ok_or_else(|| MarketError::UnknownMarket(market_id.to_string()))?;
        market.get_refund(&mut self.token, caller, outcome)
    }

    /// Operator sweep refunding every unpaid stake.
    pub fn refund_all_users(&mut self, market_id: &str, caller: &str) -> Result<Vec<MarketEvent>> {
        let market = self
            .markets
            .get_mut(market_id)
            .ok_or_else(|| MarketError::UnknownMarket(market_id.to_string()))?;
        market.refund_all_users(&mut self.token, caller)
    }

    /// Refund sweep over a bounded stake window.
    pub fn refund_all_users_bulk(
        &mut self,
        market_id: &str,
        caller: &str,
        start: u64,
        count: u64,
    ) -> Result<Vec<MarketEvent>> {
        let market = self
            .markets
            .get_mut(market_id)
            .ok_or_else(|| MarketError::UnknownMarket(market_id.to_string()))?;
        market.refund_all_users_bulk(&mut self.token, caller, start, count)
    }
}
