//! Simple prediction market example
//!
//! This example walks through the whole market lifecycle: creating a
//! market, staking, resolving through an oracle, and distributing prizes.

use anyhow::Result;
use parimutuel_core::utils::format_timestamp;
use parimutuel_core::{
    CentralizedOracle, Market, MarketKind, Outcome, PrizeMethod, TokenLedger, TokenVault,
};

fn main() -> Result<()> {
    println!("Simple Prediction Market Example");
    println!("════════════════════════════════\n");

    let buying_end = 1_735_689_600; // January 1, 2025
    let market_end = buying_end + 86_400;

    // 1. Create a new prediction market
    println!("1. Creating a new prediction market...");

    let mut market = Market::new(
        "operator",
        "ORACLE01",
        market_end,
        buying_end,
        "Will it rain tomorrow in San Francisco?",
        MarketKind::Discrete,
        PrizeMethod::Relative,
    )?;

    market.add_outcome("operator", "Yes, it will rain")?;
    market.add_outcome("operator", "No, it will not rain")?;
    market.publish("operator")?;

    println!("   Market ID: {}", market.id);
    println!("   Name: {}", market.name());
    println!("   Outcome 1: {}", market.outcome_label(1).unwrap_or(""));
    println!("   Outcome 2: {}", market.outcome_label(2).unwrap_or(""));
    println!("   Buying deadline: {}", format_timestamp(buying_end));
    println!();

    // 2. Fund the players and approve the market's escrow
    println!("2. Funding players...");
    let mut vault = TokenVault::new();
    for (player, tokens) in [("alice", 100_000), ("bob", 200_000), ("charlie", 50_000)] {
        vault.issue(player, tokens);
        vault.approve(player, &market.id, tokens);
        println!("   {player} holds {tokens} tokens");
    }
    println!();

    // 3. Place stakes while the buying window is open
    println!("3. Placing stakes...");
    let now = buying_end - 3_600;
    market.stake_at(&mut vault, "alice", 100_000, Outcome::Id(1), now)?;
    market.stake_at(&mut vault, "bob", 200_000, Outcome::Id(2), now)?;
    market.stake_at(&mut vault, "charlie", 50_000, Outcome::Id(1), now)?;

    println!("   alice placed 100,000 on 'Yes'");
    println!("   bob placed 200,000 on 'No'");
    println!("   charlie placed 50,000 on 'Yes'");
    println!();

    // 4. Market statistics
    println!("4. Current market statistics...");
    println!("   Total on 'Yes': {}", market.total_on(Outcome::Id(1)));
    println!("   Total on 'No': {}", market.total_on(Outcome::Id(2)));
    println!("   Token pool: {}", market.token_pool());
    println!("   Escrow consistent: {}", market.escrow_consistent(&vault));
    println!();

    // 5. The oracle reports 'Yes' after the window closes
    println!("5. Oracle reports the outcome...");
    let mut oracle = CentralizedOracle::new("ORACLE01", "Weather Oracle", "oracle-operator")?;
    oracle.register_market("oracle-operator", &market.id)?;
    oracle.set_outcome("oracle-operator", &market.id, 1)?;

    market.resolve_at("operator", &oracle, buying_end)?;
    println!("   Status: {}", market.status());
    println!(
        "   Winning outcome: {}",
        market.winning_outcome().map(|o| o.to_string()).unwrap_or_default()
    );
    println!();

    // 6. Entitlements: winners split the whole pool proportionally
    println!("6. Entitlements...");
    println!("   alice: {}", market.entitlement_of("alice")?);
    println!("   bob: {}", market.entitlement_of("bob")?);
    println!("   charlie: {}", market.entitlement_of("charlie")?);
    println!();

    // 7. Winners withdraw
    println!("7. Withdrawing prizes...");
    market.withdraw_prize(&mut vault, "alice")?;
    market.withdraw_prize(&mut vault, "charlie")?;

    println!("   alice now holds {}", vault.balance_of("alice"));
    println!("   charlie now holds {}", vault.balance_of("charlie"));
    println!("   remaining pool: {}", market.token_pool());
    println!();

    println!("Example completed successfully!");
    Ok(())
}
