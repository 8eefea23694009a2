//! Typed notifications emitted by mutating market operations.
//!
//! Events are the externally observable side channel of the engine: every
//! state-changing call returns the notification describing what it did
//! (sweeps return one per stake touched), and consumers assert on the
//! event's fields rather than on ledger internals.

use crate::{outcome::Outcome, AccountId};
use serde::{Deserialize, Serialize};

/// Notification describing one completed market mutation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum MarketEvent {
    /// A discrete outcome was declared, with its assigned sequential id
    OutcomeAdded {
        market_id: String,
        outcome_id: u32,
        label: String,
    },

    /// The market opened for staking
    Published { market_id: String },

    /// The market was paused by its operator
    Paused { market_id: String },

    /// The market was canceled; only refunds remain
    Canceled { market_id: String },

    /// Tokens were placed on an outcome
    TokensPlaced {
        market_id: String,
        owner: AccountId,
        amount: u64,
        outcome: Outcome,
    },

    /// The oracle's outcome was accepted and the market resolved
    Resolved {
        market_id: String,
        winning_outcome: Outcome,
    },

    /// A prize left escrow toward a stake owner
    PrizeWithdrawn {
        market_id: String,
        owner: AccountId,
        amount: u64,
    },

    /// A canceled market refunded a stake owner at face value
    UserRefunded {
        market_id: String,
        owner: AccountId,
        amount: u64,
        outcome: Outcome,
    },
}
