//! Common test utilities for parimutuel-core tests.
//!
//! Shared fixtures for unit and integration tests: a funded token vault,
//! markets in the standard lifecycle states, and oracles in the standard
//! reporting states. Balances and stake layouts mirror the canonical
//! three-player scenario used throughout the test suites.

use crate::{
    accounting::PrizeMethod,
    market::{Market, MarketKind},
    oracle::CentralizedOracle,
    token::TokenVault,
};

/// Market operator account used in tests
pub const OPERATOR: &str = "prediction-operator";

/// Oracle operator account used in tests
pub const ORACLE_OPERATOR: &str = "oracle-operator";

pub const PLAYER1: &str = "player1";
pub const PLAYER2: &str = "player2";
pub const PLAYER3: &str = "player3";

/// Oracle id every test market is bound to
pub const ORACLE_ID: &str = "ORACLE01";

/// Standard stake buying deadline (Jan 1, 2025)
pub const BUYING_END: u64 = 1_735_689_600;

/// Standard market end time (one day after the buying deadline)
pub const MARKET_END: u64 = BUYING_END + 86_400;

/// A discrete market in Initializing state with no outcomes declared.
pub fn discrete_market(method: PrizeMethod) -> Market {
    Market::new(
        OPERATOR,
        ORACLE_ID,
        MARKET_END,
        BUYING_END,
        "Test Prediction",
        MarketKind::Discrete,
        method,
    )
    .unwrap()
}

/// A discrete market in Initializing state with outcomes o1, o2, o3.
pub fn discrete_market_with_outcomes(method: PrizeMethod) -> Market {
    let mut market = discrete_market(method);
    market.add_outcome(OPERATOR, "o1").unwrap();
    market.add_outcome(OPERATOR, "o2").unwrap();
    market.add_outcome(OPERATOR, "o3").unwrap();
    market
}

/// A published discrete market with outcomes o1, o2, o3.
pub fn published_market(method: PrizeMethod) -> Market {
    let mut market = discrete_market_with_outcomes(method);
    market.publish(OPERATOR).unwrap();
    market
}

/// A scalar market in Initializing state.
pub fn scalar_market(method: PrizeMethod) -> Market {
    Market::new(
        OPERATOR,
        ORACLE_ID,
        MARKET_END,
        BUYING_END,
        "Test Prediction",
        MarketKind::Scalar,
        method,
    )
    .unwrap()
}

/// A vault holding 1000/2000/3000 tokens for the three players, each fully
/// approved toward the given market's escrow.
pub fn funded_vault(market_id: &str) -> TokenVault {
    let mut vault = TokenVault::new();
    for (player, tokens) in [(PLAYER1, 1000), (PLAYER2, 2000), (PLAYER3, 3000)] {
        vault.issue(player, tokens);
        vault.approve(player, market_id, tokens);
    }
    vault
}

/// An oracle that knows the market but has not reported yet.
pub fn registered_oracle(market_id: &str) -> CentralizedOracle {
    let mut oracle = CentralizedOracle::new(ORACLE_ID, "Test Oracle", ORACLE_OPERATOR).unwrap();
    oracle.register_market(ORACLE_OPERATOR, market_id).unwrap();
    oracle
}

/// An oracle that has reported `value` as the market's outcome.
pub fn reporting_oracle(market_id: &str, value: i64) -> CentralizedOracle {
    let mut oracle = registered_oracle(market_id);
    oracle
        .set_outcome(ORACLE_OPERATOR, market_id, value)
        .unwrap();
    oracle
}

/// The canonical settled scenario: a published discrete market with stakes
/// player1: 1000 on outcome 1, player2: 2000 on outcome 2, player3: 3000 on
/// outcome 1, resolved to `winning_id`. Returns the market and its vault.
pub fn resolved_market(method: PrizeMethod, winning_id: i64) -> (Market, TokenVault) {
    let mut market = published_market(method);
    let mut vault = funded_vault(&market.id);

    market
        .stake_at(
            &mut vault,
            PLAYER1,
            1000,
            crate::outcome::Outcome::Id(1),
            BUYING_END - 1000,
        )
        .unwrap();
    market
        .stake_at(
            &mut vault,
            PLAYER2,
            2000,
            crate::outcome::Outcome::Id(2),
            BUYING_END - 1000,
        )
        .unwrap();
    market
        .stake_at(
            &mut vault,
            PLAYER3,
            3000,
            crate::outcome::Outcome::Id(1),
            BUYING_END - 1000,
        )
        .unwrap();

    let oracle = reporting_oracle(&market.id, winning_id);
    market.resolve_at(OPERATOR, &oracle, BUYING_END).unwrap();

    (market, vault)
}
