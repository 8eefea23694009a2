//! Oracle collaborator: the external authority reporting winning outcomes.
//!
//! The market core only consumes the query side, modeled as the
//! [`MarketOracle`] trait. [`CentralizedOracle`] is the bundled
//! implementation: a named, operator-controlled registry that accepts market
//! registrations and later reports exactly one integer outcome per market.

use crate::{error::Result, AccountId, MarketError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Query interface the settlement engine consumes at resolution time.
pub trait MarketOracle {
    /// Whether the market has been registered with this oracle.
    fn is_registered(&self, market_id: &str) -> bool;

    /// The reported outcome value for a market, if any.
    fn outcome_for(&self, market_id: &str) -> Option<i64>;

    /// Whether the oracle has reported an outcome for the market.
    fn is_resolved(&self, market_id: &str) -> bool {
        self.outcome_for(market_id).is_some()
    }
}

/// Operator-controlled oracle holding one outcome report per market.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CentralizedOracle {
    /// Unique oracle identifier
    pub id: String,

    /// Human-readable oracle name
    pub name: String,

    /// Account allowed to register markets and report outcomes
    pub operator: AccountId,

    registered: BTreeSet<String>,
    outcomes: BTreeMap<String, i64>,
}

impl CentralizedOracle {
    pub fn new(id: &str, name: &str, operator: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(MarketError::InvalidName);
        }

        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            operator: operator.to_string(),
            registered: BTreeSet::new(),
            outcomes: BTreeMap::new(),
        })
    }

    fn require_operator(&self, caller: &str) -> Result<()> {
        if caller != self.operator {
            return Err(MarketError::Unauthorized);
        }
        Ok(())
    }

    /// Register a market so an outcome can later be reported for it.
    pub fn register_market(&mut self, caller: &str, market_id: &str) -> Result<()> {
        self.require_operator(caller)?;
        self.registered.insert(market_id.to_string());
        Ok(())
    }

    /// Drop a market's registration and any outcome reported for it.
    pub fn unregister_market(&mut self, caller: &str, market_id: &str) -> Result<()> {
        self.require_operator(caller)?;
        self.registered.remove(market_id);
        self.outcomes.remove(market_id);
        Ok(())
    }

    /// Report the winning outcome value for a registered market.
    ///
    /// Exactly one report per market: repeat calls fail, so a recorded
    /// outcome can never change underneath a resolution.
    pub fn set_outcome(&mut self, caller: &str, market_id: &str, value: i64) -> Result<()> {
        self.require_operator(caller)?;
        if !self.registered.contains(market_id) {
            return Err(MarketError::InvalidOracle(format!(
                "market {market_id} is not registered with this oracle"
            )));
        }
        if self.outcomes.contains_key(market_id) {
            return Err(MarketError::InvalidState(format!(
                "an outcome was already reported for market {market_id}"
            )));
        }

        self.outcomes.insert(market_id.to_string(), value);
        Ok(())
    }
}

impl MarketOracle for CentralizedOracle {
    fn is_registered(&self, market_id: &str) -> bool {
        self.registered.contains(market_id)
    }

    fn outcome_for(&self, market_id: &str) -> Option<i64> {
        self.outcomes.get(market_id).copied()
    }
}
