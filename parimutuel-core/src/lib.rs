//! # Parimutuel Core
//!
//! Core Rust library for token-settled pari-mutuel prediction markets with
//! oracle-based resolution.
//!
//! This library provides the building blocks for running prediction markets
//! where:
//! - An operator creates a market with discrete or scalar outcomes
//! - Participants escrow token stakes during a buying window
//! - An external oracle reports the single winning outcome
//! - Payouts (or refunds after cancellation) are computed and distributed
//!   deterministically, in exact integer arithmetic, with every stake paid
//!   at most once
//!
//! ## Features
//!
//! - **Market Lifecycle**: Initializing, Published, Paused, Resolved and
//!   Canceled states with operator-gated transitions
//! - **Stake Ledger**: append-only stake records with a single-flip paid
//!   flag guarding against double payment
//! - **Prize Calculation**: pari-mutuel (relative) and break-even methods
//! - **Oracle Integration**: markets resolve from a bound oracle's report
//! - **Bulk Settlement**: chunked, resumable payout and refund sweeps
//!
//! ## Examples
//!
//! ```rust
//! use parimutuel_core::{Market, MarketKind, Outcome, PrizeMethod, TokenVault};
//!
//! let mut market = Market::new(
//!     "operator",
//!     "ORACLE01",
//!     1735776000, // market end time
//!     1735689600, // stake buying deadline
//!     "Who will win the match?",
//!     MarketKind::Discrete,
//!     PrizeMethod::Relative,
//! )?;
//!
//! market.add_outcome("operator", "Team A wins")?;
//! market.add_outcome("operator", "Team B wins")?;
//! market.publish("operator")?;
//!
//! let mut vault = TokenVault::new();
//! vault.issue("alice", 1000);
//! vault.approve("alice", &market.id, 1000);
//! market.stake_at(&mut vault, "alice", 1000, Outcome::Id(1), 1735689599)?;
//! # Ok::<(), parimutuel_core::MarketError>(())
//! ```

pub mod accounting;
pub mod error;
pub mod event;
pub mod factory;
pub mod ledger;
pub mod market;
pub mod oracle;
pub mod outcome;
pub mod settlement;
pub mod test_utils;
pub mod token;
pub mod utils;

pub use accounting::{PoolAccounting, PrizeMethod};
pub use error::{MarketError, Result};
pub use event::MarketEvent;
pub use factory::PredictionFactory;
pub use ledger::{Stake, StakeLedger};
pub use market::{Market, MarketKind, MarketStatus};
pub use oracle::{CentralizedOracle, MarketOracle};
pub use outcome::{Outcome, OutcomeTable};
pub use token::{TokenError, TokenLedger, TokenVault};
pub use utils::*;

/// Account identifier within the token ledger and market registry
pub type AccountId = String;

/// Minimum declared outcomes before a discrete market can publish
pub const MIN_OUTCOMES: usize = 2;
