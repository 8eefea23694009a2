//! Error types for parimutuel-core

use crate::token::TokenError;
use thiserror::Error;

/// Result type alias for market operations
pub type Result<T> = std::result::Result<T, MarketError>;

/// Error types for market operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// Caller is not the designated operator
    #[error("caller is not authorized to perform this operation")]
    Unauthorized,

    /// Operation not permitted in the market's current status
    #[error("operation not allowed in the current state: {0}")]
    InvalidState(String),

    /// Timing field validation errors
    #[error("invalid timing: {0}")]
    InvalidTiming(String),

    /// Stake amount validation errors
    #[error("token amount must be greater than zero")]
    InvalidAmount,

    /// Name validation errors
    #[error("name must not be empty")]
    InvalidName,

    /// Oracle binding errors
    #[error("invalid oracle: {0}")]
    InvalidOracle(String),

    /// Outcome declaration errors
    #[error("invalid outcome: {0}")]
    InvalidOutcome(String),

    /// The referenced outcome is not part of the market's outcome set
    #[error("unknown outcome: {0}")]
    UnknownOutcome(String),

    /// A discrete market cannot be published with fewer than two outcomes
    #[error("a market needs at least two declared outcomes before publishing")]
    NoOutcomes,

    /// The stake buying window has closed
    #[error("the stake buying period has ended")]
    StakingClosed,

    /// Resolution attempted while stakes can still be bought
    #[error("the stake buying period has not ended yet")]
    StakingStillOpen,

    /// The bound oracle has not reported an outcome for this market
    #[error("the oracle has not resolved this market")]
    OracleNotReady,

    /// The stake was already paid out or refunded
    #[error("stake {0} has already been paid")]
    AlreadyPaid(u64),

    /// Every eligible stake of the caller was already paid out
    #[error("all eligible stakes have already been withdrawn")]
    AlreadyWithdrawn,

    /// The caller holds no stake entitled to a payout
    #[error("nothing to withdraw for this account")]
    NothingToWithdraw,

    /// The caller holds no unpaid stake matching the refund request
    #[error("nothing to refund for this account")]
    NothingToRefund,

    /// Registry lookup miss
    #[error("market {0} does not exist")]
    UnknownMarket(String),

    /// Stake lookup miss
    #[error("stake {0} does not exist")]
    UnknownStake(u64),

    /// Token collaborator errors
    #[error(transparent)]
    Token(#[from] TokenError),
}
