//! End-to-end settlement scenarios: pari-mutuel and break-even payouts,
//! bulk sweeps, cancellation refunds, and the conservation properties tying
//! the tracked pool to the token ledger's escrow balance.

use parimutuel_core::test_utils::*;
use parimutuel_core::{
    MarketError, MarketEvent, Outcome, PredictionFactory, PrizeMethod, TokenLedger,
};

fn fund_players(factory: &mut PredictionFactory, market_id: &str) {
    for (player, tokens) in [(PLAYER1, 1000), (PLAYER2, 2000), (PLAYER3, 3000)] {
        factory.token.issue(player, tokens);
        factory.token.approve(player, market_id, tokens);
    }
}

/// A published three-outcome market inside a factory, with funded players.
fn published_factory_market(method: PrizeMethod) -> (PredictionFactory, String, String) {
    let mut factory = PredictionFactory::new();
    let oracle_id = factory
        .create_oracle(ORACLE_OPERATOR, "Test Oracle")
        .unwrap();
    let market_id = factory
        .create_discrete_market(
            OPERATOR,
            &oracle_id,
            MARKET_END,
            BUYING_END,
            "Test Prediction",
            method,
        )
        .unwrap();

    let market = factory.market_mut(&market_id).unwrap();
    for label in ["o1", "o2", "o3"] {
        market.add_outcome(OPERATOR, label).unwrap();
    }
    market.publish(OPERATOR).unwrap();

    fund_players(&mut factory, &market_id);
    (factory, market_id, oracle_id)
}

fn place_standard_stakes(factory: &mut PredictionFactory, market_id: &str) {
    factory
        .stake_at(market_id, PLAYER1, 1000, Outcome::Id(1), BUYING_END - 1000)
        .unwrap();
    factory
        .stake_at(market_id, PLAYER2, 2000, Outcome::Id(2), BUYING_END - 1000)
        .unwrap();
    factory
        .stake_at(market_id, PLAYER3, 3000, Outcome::Id(1), BUYING_END - 1000)
        .unwrap();
}

fn report_and_resolve(factory: &mut PredictionFactory, oracle_id: &str, market_id: &str, value: i64) {
    let oracle = factory.oracle_mut(oracle_id).unwrap();
    oracle.register_market(ORACLE_OPERATOR, market_id).unwrap();
    oracle
        .set_outcome(ORACLE_OPERATOR, market_id, value)
        .unwrap();
    factory.resolve_at(market_id, OPERATOR, BUYING_END).unwrap();
}

#[test]
fn conservation_through_the_staking_phase() {
    let (mut factory, market_id, _) = published_factory_market(PrizeMethod::Relative);
    place_standard_stakes(&mut factory, &market_id);

    let market = factory.market(&market_id).unwrap();
    assert_eq!(market.token_pool(), 6000);
    assert_eq!(market.ledger().unpaid_total(), 6000);
    assert_eq!(factory.token.balance_of(&market_id), 6000);
    assert!(market.escrow_consistent(&factory.token));
}

#[test]
fn relative_resolution_computes_entitlements() {
    let (mut factory, market_id, oracle_id) = published_factory_market(PrizeMethod::Relative);
    place_standard_stakes(&mut factory, &market_id);
    report_and_resolve(&mut factory, &oracle_id, &market_id, 1);

    let market = factory.market(&market_id).unwrap();
    assert_eq!(market.status().code(), 2);
    assert_eq!(market.winning_outcome(), Some(Outcome::Id(1)));

    // 1000 * 6000 / 4000 and 3000 * 6000 / 4000; the losing side gets 0.
    assert_eq!(market.entitlement_of(PLAYER1), Ok(1500));
    assert_eq!(market.entitlement_of(PLAYER2), Ok(0));
    assert_eq!(market.entitlement_of(PLAYER3), Ok(4500));
}

#[test]
fn winner_withdraws_prize() {
    let (mut factory, market_id, oracle_id) = published_factory_market(PrizeMethod::Relative);
    place_standard_stakes(&mut factory, &market_id);
    report_and_resolve(&mut factory, &oracle_id, &market_id, 1);

    let event = factory.withdraw_prize(&market_id, PLAYER1).unwrap();
    assert_eq!(
        event,
        MarketEvent::PrizeWithdrawn {
            market_id: market_id.clone(),
            owner: PLAYER1.to_string(),
            amount: 1500,
        }
    );

    assert_eq!(factory.token.balance_of(PLAYER1), 1500);
    assert_eq!(factory.token.balance_of(&market_id), 4500);
    assert_eq!(factory.market(&market_id).unwrap().token_pool(), 4500);
}

#[test]
fn withdrawal_aggregates_multiple_stakes() {
    let (mut factory, market_id, oracle_id) = published_factory_market(PrizeMethod::Relative);
    factory
        .stake_at(&market_id, PLAYER1, 1000, Outcome::Id(1), BUYING_END - 1000)
        .unwrap();
    factory
        .stake_at(&market_id, PLAYER2, 2000, Outcome::Id(2), BUYING_END - 1000)
        .unwrap();
    factory
        .stake_at(&market_id, PLAYER3, 2000, Outcome::Id(1), BUYING_END - 1000)
        .unwrap();
    factory
        .stake_at(&market_id, PLAYER3, 1000, Outcome::Id(1), BUYING_END - 1000)
        .unwrap();
    report_and_resolve(&mut factory, &oracle_id, &market_id, 1);

    factory.withdraw_prize(&market_id, PLAYER3).unwrap();
    assert_eq!(factory.token.balance_of(PLAYER3), 4500);
    assert_eq!(factory.token.balance_of(&market_id), 1500);

    // Both of player3's stakes are now consumed.
    assert_eq!(
        factory.withdraw_prize(&market_id, PLAYER3),
        Err(MarketError::AlreadyWithdrawn)
    );
}

#[test]
fn break_even_returns_principal_regardless_of_winner() {
    let (mut factory, market_id, oracle_id) = published_factory_market(PrizeMethod::BreakEven);
    place_standard_stakes(&mut factory, &market_id);
    report_and_resolve(&mut factory, &oracle_id, &market_id, 1);

    let market = factory.market(&market_id).unwrap();
    assert_eq!(market.entitlement_of(PLAYER1), Ok(1000));
    assert_eq!(market.entitlement_of(PLAYER2), Ok(2000));
    assert_eq!(market.entitlement_of(PLAYER3), Ok(3000));

    factory.withdraw_prize(&market_id, PLAYER1).unwrap();
    assert_eq!(factory.token.balance_of(PLAYER1), 1000);
    assert_eq!(factory.token.balance_of(&market_id), 5000);
}

#[test]
fn operator_pays_all_prizes() {
    let (mut factory, market_id, oracle_id) = published_factory_market(PrizeMethod::Relative);
    place_standard_stakes(&mut factory, &market_id);
    report_and_resolve(&mut factory, &oracle_id, &market_id, 1);

    assert_eq!(
        factory.pay_all_prizes(&market_id, PLAYER1),
        Err(MarketError::Unauthorized)
    );

    let events = factory.pay_all_prizes(&market_id, OPERATOR).unwrap();
    assert_eq!(events.len(), 2);

    assert_eq!(factory.token.balance_of(PLAYER1), 1500);
    assert_eq!(factory.token.balance_of(PLAYER2), 0);
    assert_eq!(factory.token.balance_of(PLAYER3), 4500);
    assert_eq!(factory.token.balance_of(&market_id), 0);
    assert_eq!(factory.market(&market_id).unwrap().token_pool(), 0);
}

#[test]
fn bulk_sweep_is_resumable() {
    let (mut factory, market_id, oracle_id) = published_factory_market(PrizeMethod::Relative);
    factory
        .stake_at(&market_id, PLAYER1, 1000, Outcome::Id(1), BUYING_END - 1000)
        .unwrap();
    factory
        .stake_at(&market_id, PLAYER2, 2000, Outcome::Id(2), BUYING_END - 1000)
        .unwrap();
    factory
        .stake_at(&market_id, PLAYER3, 2000, Outcome::Id(1), BUYING_END - 1000)
        .unwrap();
    factory
        .stake_at(&market_id, PLAYER3, 1000, Outcome::Id(1), BUYING_END - 1000)
        .unwrap();
    report_and_resolve(&mut factory, &oracle_id, &market_id, 1);

    // First window covers three stakes; player3's last stake stays unpaid.
    factory
        .pay_all_prizes_bulk(&market_id, OPERATOR, 0, 3)
        .unwrap();
    assert_eq!(factory.token.balance_of(PLAYER1), 1500);
    assert_eq!(factory.token.balance_of(PLAYER3), 3000);
    assert_eq!(factory.token.balance_of(&market_id), 1500);

    // Resuming with the next offset pays exactly the remainder.
    factory
        .pay_all_prizes_bulk(&market_id, OPERATOR, 3, 1)
        .unwrap();
    assert_eq!(factory.token.balance_of(PLAYER1), 1500);
    assert_eq!(factory.token.balance_of(PLAYER3), 4500);
    assert_eq!(factory.token.balance_of(&market_id), 0);
}

#[test]
fn overlapping_sweeps_never_double_pay() {
    let (mut factory, market_id, oracle_id) = published_factory_market(PrizeMethod::Relative);
    place_standard_stakes(&mut factory, &market_id);
    report_and_resolve(&mut factory, &oracle_id, &market_id, 1);

    factory
        .pay_all_prizes_bulk(&market_id, OPERATOR, 0, 3)
        .unwrap();
    let repeat = factory
        .pay_all_prizes_bulk(&market_id, OPERATOR, 0, 3)
        .unwrap();
    assert!(repeat.is_empty());

    // A self-service withdrawal after the sweep finds nothing either.
    assert_eq!(
        factory.withdraw_prize(&market_id, PLAYER1),
        Err(MarketError::AlreadyWithdrawn)
    );

    assert_eq!(factory.token.balance_of(PLAYER1), 1500);
    assert_eq!(factory.token.balance_of(PLAYER3), 4500);
}

#[test]
fn bulk_sweep_matches_single_sweep() {
    let run = |chunks: &[(u64, u64)]| -> (u64, u64, u64) {
        let (mut factory, market_id, oracle_id) = published_factory_market(PrizeMethod::Relative);
        place_standard_stakes(&mut factory, &market_id);
        report_and_resolve(&mut factory, &oracle_id, &market_id, 1);
        for (start, count) in chunks {
            factory
                .pay_all_prizes_bulk(&market_id, OPERATOR, *start, *count)
                .unwrap();
        }
        (
            factory.token.balance_of(PLAYER1),
            factory.token.balance_of(PLAYER2),
            factory.token.balance_of(PLAYER3),
        )
    };

    let single = run(&[(0, u64::MAX)]);
    let chunked = run(&[(0, 1), (1, 1), (2, 1)]);
    assert_eq!(single, chunked);
    assert_eq!(single, (1500, 0, 4500));
}

#[test]
fn canceled_market_refunds_via_operator() {
    let (mut factory, market_id, _) = published_factory_market(PrizeMethod::Relative);
    place_standard_stakes(&mut factory, &market_id);

    factory.market_mut(&market_id).unwrap().cancel(OPERATOR).unwrap();

    let event = factory
        .refund_user(&market_id, OPERATOR, PLAYER1, Outcome::Id(1))
        .unwrap();
    assert_eq!(
        event,
        MarketEvent::UserRefunded {
            market_id: market_id.clone(),
            owner: PLAYER1.to_string(),
            amount: 1000,
            outcome: Outcome::Id(1),
        }
    );

    assert_eq!(factory.token.balance_of(PLAYER1), 1000);
    assert_eq!(factory.market(&market_id).unwrap().token_pool(), 5000);
    assert_eq!(factory.token.balance_of(&market_id), 5000);
}

#[test]
fn canceled_market_refunds_self_service() {
    let (mut factory, market_id, _) = published_factory_market(PrizeMethod::Relative);
    place_standard_stakes(&mut factory, &market_id);

    factory.market_mut(&market_id).unwrap().cancel(OPERATOR).unwrap();

    factory
        .get_refund(&market_id, PLAYER1, Outcome::Id(1))
        .unwrap();
    assert_eq!(factory.token.balance_of(PLAYER1), 1000);
    assert_eq!(factory.token.balance_of(&market_id), 5000);

    // The stake is consumed: a second claim has nothing left.
    assert_eq!(
        factory.get_refund(&market_id, PLAYER1, Outcome::Id(1)),
        Err(MarketError::NothingToRefund)
    );
    // And an outcome the player never staked on refunds nothing.
    assert_eq!(
        factory.get_refund(&market_id, PLAYER1, Outcome::Id(3)),
        Err(MarketError::NothingToRefund)
    );
}

#[test]
fn refund_all_users_empties_the_pool() {
    let (mut factory, market_id, _) = published_factory_market(PrizeMethod::Relative);
    place_standard_stakes(&mut factory, &market_id);

    factory.market_mut(&market_id).unwrap().cancel(OPERATOR).unwrap();
    let events = factory.refund_all_users(&market_id, OPERATOR).unwrap();
    assert_eq!(events.len(), 3);

    assert_eq!(factory.token.balance_of(PLAYER1), 1000);
    assert_eq!(factory.token.balance_of(PLAYER2), 2000);
    assert_eq!(factory.token.balance_of(PLAYER3), 3000);
    assert_eq!(factory.market(&market_id).unwrap().token_pool(), 0);
    assert_eq!(factory.token.balance_of(&market_id), 0);
}

#[test]
fn refund_sweep_is_resumable() {
    let (mut factory, market_id, _) = published_factory_market(PrizeMethod::Relative);
    place_standard_stakes(&mut factory, &market_id);

    factory.market_mut(&market_id).unwrap().cancel(OPERATOR).unwrap();

    factory
        .refund_all_users_bulk(&market_id, OPERATOR, 0, 2)
        .unwrap();
    assert_eq!(factory.token.balance_of(PLAYER1), 1000);
    assert_eq!(factory.token.balance_of(PLAYER2), 2000);
    assert_eq!(factory.token.balance_of(PLAYER3), 0);

    factory
        .refund_all_users_bulk(&market_id, OPERATOR, 2, 10)
        .unwrap();
    assert_eq!(factory.token.balance_of(PLAYER3), 3000);
    assert_eq!(factory.token.balance_of(&market_id), 0);

    // A repeated full sweep finds every stake already consumed.
    let repeat = factory.refund_all_users(&market_id, OPERATOR).unwrap();
    assert!(repeat.is_empty());
}

#[test]
fn scalar_break_even_market_with_negative_outcome() {
    let mut factory = PredictionFactory::new();
    let oracle_id = factory
        .create_oracle(ORACLE_OPERATOR, "Temperature Oracle")
        .unwrap();
    let market_id = factory
        .create_scalar_market(
            OPERATOR,
            &oracle_id,
            MARKET_END,
            BUYING_END,
            "Lowest temperature in January?",
            PrizeMethod::BreakEven,
        )
        .unwrap();
    factory.market_mut(&market_id).unwrap().publish(OPERATOR).unwrap();
    fund_players(&mut factory, &market_id);

    factory
        .stake_at(&market_id, PLAYER1, 1000, Outcome::Value(-40), BUYING_END - 1000)
        .unwrap();
    factory
        .stake_at(&market_id, PLAYER2, 2000, Outcome::Value(5), BUYING_END - 1000)
        .unwrap();
    factory
        .stake_at(&market_id, PLAYER3, 3000, Outcome::Value(-40), BUYING_END - 1000)
        .unwrap();

    report_and_resolve(&mut factory, &oracle_id, &market_id, -40);
    assert_eq!(
        factory.market(&market_id).unwrap().winning_outcome(),
        Some(Outcome::Value(-40))
    );

    // Break-even: everyone recovers exactly their principal.
    factory.withdraw_prize(&market_id, PLAYER1).unwrap();
    factory.withdraw_prize(&market_id, PLAYER2).unwrap();
    factory.withdraw_prize(&market_id, PLAYER3).unwrap();
    assert_eq!(factory.token.balance_of(PLAYER1), 1000);
    assert_eq!(factory.token.balance_of(PLAYER2), 2000);
    assert_eq!(factory.token.balance_of(PLAYER3), 3000);
    assert_eq!(factory.token.balance_of(&market_id), 0);
}

#[test]
fn scalar_relative_market_splits_pool() {
    let mut factory = PredictionFactory::new();
    let oracle_id = factory
        .create_oracle(ORACLE_OPERATOR, "Score Oracle")
        .unwrap();
    let market_id = factory
        .create_scalar_market(
            OPERATOR,
            &oracle_id,
            MARKET_END,
            BUYING_END,
            "Final score?",
            PrizeMethod::Relative,
        )
        .unwrap();
    factory.market_mut(&market_id).unwrap().publish(OPERATOR).unwrap();
    fund_players(&mut factory, &market_id);

    factory
        .stake_at(&market_id, PLAYER1, 1000, Outcome::Value(100), BUYING_END - 1000)
        .unwrap();
    factory
        .stake_at(&market_id, PLAYER2, 2000, Outcome::Value(200), BUYING_END - 1000)
        .unwrap();
    factory
        .stake_at(&market_id, PLAYER3, 3000, Outcome::Value(100), BUYING_END - 1000)
        .unwrap();

    report_and_resolve(&mut factory, &oracle_id, &market_id, 100);

    let market = factory.market(&market_id).unwrap();
    assert_eq!(market.entitlement_of(PLAYER1), Ok(1500));
    assert_eq!(market.entitlement_of(PLAYER2), Ok(0));
    assert_eq!(market.entitlement_of(PLAYER3), Ok(4500));
}

#[test]
fn stake_events_carry_owner_amount_and_outcome() {
    let (mut factory, market_id, _) = published_factory_market(PrizeMethod::Relative);

    let event = factory
        .stake_at(&market_id, PLAYER1, 1000, Outcome::Id(1), BUYING_END - 1000)
        .unwrap();
    assert_eq!(
        event,
        MarketEvent::TokensPlaced {
            market_id: market_id.clone(),
            owner: PLAYER1.to_string(),
            amount: 1000,
            outcome: Outcome::Id(1),
        }
    );
}

#[test]
fn failed_settlement_calls_leave_state_untouched() {
    let (mut factory, market_id, oracle_id) = published_factory_market(PrizeMethod::Relative);
    place_standard_stakes(&mut factory, &market_id);

    // Premature resolution attempt changes nothing.
    assert_eq!(
        factory.resolve_at(&market_id, OPERATOR, BUYING_END - 1),
        Err(MarketError::StakingStillOpen)
    );
    assert_eq!(factory.market(&market_id).unwrap().status().code(), 1);

    report_and_resolve(&mut factory, &oracle_id, &market_id, 1);

    // A loser's withdrawal attempt changes nothing.
    let pool_before = factory.market(&market_id).unwrap().token_pool();
    assert_eq!(
        factory.withdraw_prize(&market_id, PLAYER2),
        Err(MarketError::NothingToWithdraw)
    );
    assert_eq!(factory.market(&market_id).unwrap().token_pool(), pool_before);
    assert_eq!(factory.token.balance_of(PLAYER2), 0);
    assert!(factory
        .market(&market_id)
        .unwrap()
        .escrow_consistent(&factory.token));
}
