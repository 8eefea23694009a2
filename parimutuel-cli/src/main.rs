//! # Parimutuel CLI
//!
//! Command-line interface for creating, running and settling pari-mutuel
//! prediction markets. The whole engine — token vault, oracles and markets —
//! is persisted as a JSON state file between invocations.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use parimutuel_core::utils::format_timestamp;
use parimutuel_core::{
    Market, MarketEvent, MarketKind, Outcome, PredictionFactory, PrizeMethod, TokenLedger,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "parimutuel")]
#[command(about = "Token-settled pari-mutuel prediction markets with oracle-based resolution")]
#[command(version)]
struct Cli {
    /// JSON state file holding the token vault, oracles and markets
    #[arg(short, long, default_value = "parimutuel.json", global = true)]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    /// Outcomes declared up front, staked on by id
    Discrete,
    /// Any integer value is a stakeable outcome
    Scalar,
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    /// Winners split the whole pool proportionally
    Relative,
    /// Every stake is returned at face value
    BreakEven,
}

impl From<MethodArg> for PrizeMethod {
    fn from(method: MethodArg) -> Self {
        match method {
            MethodArg::Relative => PrizeMethod::Relative,
            MethodArg::BreakEven => PrizeMethod::BreakEven,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh empty state file
    Init,
    /// Mint tokens to an account
    Issue {
        account: String,
        amount: u64,
    },
    /// Approve a market to escrow tokens from an account
    Approve {
        owner: String,
        market: String,
        amount: u64,
    },
    /// Show an account's token balance
    Balance {
        account: String,
    },
    /// Create a named oracle
    CreateOracle {
        /// Oracle name
        #[arg(short, long)]
        name: String,
        /// Account controlling the oracle
        #[arg(short, long)]
        operator: String,
    },
    /// Register a market with its oracle
    RegisterMarket {
        oracle: String,
        market: String,
        /// Calling account (must be the oracle operator)
        #[arg(short, long)]
        from: String,
    },
    /// Report the winning outcome value for a market
    SetOutcome {
        oracle: String,
        market: String,
        value: i64,
        /// Calling account (must be the oracle operator)
        #[arg(short, long)]
        from: String,
    },
    /// Create a new prediction market
    CreateMarket {
        /// Market name
        #[arg(short, long)]
        name: String,
        /// Oracle to bind the market to
        #[arg(short, long)]
        oracle: String,
        /// Market end time (unix seconds)
        #[arg(short, long)]
        end: u64,
        /// Stake buying deadline (unix seconds)
        #[arg(short, long)]
        buying_end: u64,
        /// Discrete or scalar outcome space
        #[arg(short, long, value_enum, default_value = "discrete")]
        kind: KindArg,
        /// Prize calculation method
        #[arg(short, long, value_enum, default_value = "relative")]
        method: MethodArg,
        /// Account operating the market
        #[arg(long)]
        operator: String,
    },
    /// Declare an outcome on a discrete market
    AddOutcome {
        market: String,
        label: String,
        #[arg(short, long)]
        from: String,
    },
    /// Open a market for staking
    Publish {
        market: String,
        #[arg(short, long)]
        from: String,
    },
    /// Pause a published market
    Pause {
        market: String,
        #[arg(short, long)]
        from: String,
    },
    /// Cancel a market; stakes become refundable
    Cancel {
        market: String,
        #[arg(short, long)]
        from: String,
    },
    /// Place a stake on an outcome
    Stake {
        market: String,
        amount: u64,
        /// Outcome id (discrete markets) or value (scalar markets)
        outcome: i64,
        #[arg(short, long)]
        from: String,
    },
    /// Resolve a market from its oracle's report
    Resolve {
        market: String,
        #[arg(short, long)]
        from: String,
    },
    /// Withdraw the caller's prize from a resolved market
    Withdraw {
        market: String,
        #[arg(short, long)]
        from: String,
    },
    /// Pay every outstanding prize (optionally a bounded window)
    PayAll {
        market: String,
        #[arg(short, long)]
        from: String,
        /// First stake index of the window
        #[arg(long)]
        start: Option<u64>,
        /// Number of stakes in the window
        #[arg(long)]
        count: Option<u64>,
    },
    /// Claim a refund on a canceled market
    Refund {
        market: String,
        /// Outcome id (discrete markets) or value (scalar markets)
        outcome: i64,
        #[arg(short, long)]
        from: String,
    },
    /// Refund every unpaid stake on a canceled market
    RefundAll {
        market: String,
        #[arg(short, long)]
        from: String,
    },
    /// Show market details
    Info {
        market: String,
    },
    /// List all markets and oracles
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Init) {
        let factory = PredictionFactory::new();
        save_factory(&cli.state, &factory)?;
        println!(
            "{} {}",
            "Created state file".green().bold(),
            cli.state.display().to_string().cyan()
        );
        return Ok(());
    }

    let mut factory = load_factory(&cli.state)?;

    match cli.command {
        Commands::Init => unreachable!("handled above"),

        Commands::Issue { account, amount } => {
            factory.token.issue(&account, amount);
            println!(
                "{}: {} now holds {}",
                "Issued".green().bold(),
                account.cyan(),
                factory.token.balance_of(&account).to_string().yellow()
            );
        }

        Commands::Approve {
            owner,
            market,
            amount,
        } => {
            factory.token.approve(&owner, &market, amount);
            println!(
                "{}: {} approved {} for market {}",
                "Approved".green().bold(),
                owner.cyan(),
                amount.to_string().yellow(),
                market.cyan()
            );
        }

        Commands::Balance { account } => {
            println!(
                "{}: {} holds {}",
                "Balance".green().bold(),
                account.cyan(),
                factory.token.balance_of(&account).to_string().yellow()
            );
        }

        Commands::CreateOracle { name, operator } => {
            let id = factory.create_oracle(&operator, &name)?;
            println!("{}: {}", "Oracle ID".green().bold(), id.cyan());
        }

        Commands::RegisterMarket {
            oracle,
            market,
            from,
        } => {
            factory
                .oracle_mut(&oracle)?
                .register_market(&from, &market)?;
            println!(
                "{}: market {} registered with oracle {}",
                "Registered".green().bold(),
                market.cyan(),
                oracle.cyan()
            );
        }

        Commands::SetOutcome {
            oracle,
            market,
            value,
            from,
        } => {
            factory
                .oracle_mut(&oracle)?
                .set_outcome(&from, &market, value)?;
            println!(
                "{}: oracle {} reported {} for market {}",
                "Outcome Reported".green().bold(),
                oracle.cyan(),
                value.to_string().yellow(),
                market.cyan()
            );
        }

        Commands::CreateMarket {
            name,
            oracle,
            end,
            buying_end,
            kind,
            method,
            operator,
        } => {
            let method = PrizeMethod::from(method);
            let id = match kind {
                KindArg::Discrete => factory
                    .create_discrete_market(&operator, &oracle, end, buying_end, &name, method)?,
                KindArg::Scalar => factory
                    .create_scalar_market(&operator, &oracle, end, buying_end, &name, method)?,
            };

            println!("{}", "Market Created Successfully!".green().bold());
            print_market(factory.market(&id)?);
        }

        Commands::AddOutcome {
            market,
            label,
            from,
        } => {
            let event = factory.market_mut(&market)?.add_outcome(&from, &label)?;
            print_event(&event);
        }

        Commands::Publish { market, from } => {
            let event = factory.market_mut(&market)?.publish(&from)?;
            print_event(&event);
        }

        Commands::Pause { market, from } => {
            let event = factory.market_mut(&market)?.pause(&from)?;
            print_event(&event);
        }

        Commands::Cancel { market, from } => {
            let event = factory.market_mut(&market)?.cancel(&from)?;
            print_event(&event);
        }

        Commands::Stake {
            market,
            amount,
            outcome,
            from,
        } => {
            let outcome = parse_outcome(&factory, &market, outcome)?;
            let event = factory.stake(&market, &from, amount, outcome)?;
            print_event(&event);
        }

        Commands::Resolve { market, from } => {
            let event = factory.resolve(&market, &from)?;
            print_event(&event);
        }

        Commands::Withdraw { market, from } => {
            let event = factory.withdraw_prize(&market, &from)?;
            print_event(&event);
        }

        Commands::PayAll {
            market,
            from,
            start,
            count,
        } => {
            let events = match (start, count) {
                (Some(start), Some(count)) => {
                    factory.pay_all_prizes_bulk(&market, &from, start, count)?
                }
                _ => factory.pay_all_prizes(&market, &from)?,
            };
            println!(
                "{}: {} prizes paid",
                "Sweep Complete".green().bold(),
                events.len().to_string().yellow()
            );
            for event in &events {
                print_event(event);
            }
        }

        Commands::Refund {
            market,
            outcome,
            from,
        } => {
            let outcome = parse_outcome(&factory, &market, outcome)?;
            let event = factory.get_refund(&market, &from, outcome)?;
            print_event(&event);
        }

        Commands::RefundAll { market, from } => {
            let events = factory.refund_all_users(&market, &from)?;
            println!(
                "{}: {} stakes refunded",
                "Refund Complete".green().bold(),
                events.len().to_string().yellow()
            );
            for event in &events {
                print_event(event);
            }
        }

        Commands::Info { market } => {
            print_market(factory.market(&market)?);
        }

        Commands::List => {
            println!("{}", "Oracles".green().bold());
            for oracle in factory.oracles() {
                println!(
                    "  {} {} (operator: {})",
                    oracle.id.cyan(),
                    oracle.name,
                    oracle.operator.yellow()
                );
            }
            println!("{}", "Markets".green().bold());
            for market in factory.markets() {
                println!(
                    "  {} {} [{}]",
                    market.id.cyan(),
                    market.name(),
                    market.status().to_string().yellow()
                );
            }
        }
    }

    save_factory(&cli.state, &factory)?;
    Ok(())
}

fn load_factory(path: &Path) -> Result<PredictionFactory> {
    let data = fs::read_to_string(path).with_context(|| {
        format!(
            "failed to read state file {} (run `parimutuel init` first)",
            path.display()
        )
    })?;
    serde_json::from_str(&data)
        .with_context(|| format!("failed to parse state file {}", path.display()))
}

fn save_factory(path: &Path, factory: &PredictionFactory) -> Result<()> {
    let data = serde_json::to_string_pretty(factory)?;
    fs::write(path, data)
        .with_context(|| format!("failed to write state file {}", path.display()))
}

/// Interpret a raw outcome argument against the market's kind.
fn parse_outcome(factory: &PredictionFactory, market_id: &str, value: i64) -> Result<Outcome> {
    let market = factory.market(market_id)?;
    match market.kind {
        MarketKind::Discrete => {
            let id = u32::try_from(value)
                .context("discrete outcome ids are positive integers")?;
            Ok(Outcome::Id(id))
        }
        MarketKind::Scalar => Ok(Outcome::Value(value)),
    }
}

fn print_market(market: &Market) {
    println!("{}", "═".repeat(50).bright_black());
    println!("{}: {}", "Market ID".yellow().bold(), market.id.cyan());
    println!("{}: {}", "Name".yellow().bold(), market.name());
    println!("{}: {:?}", "Kind".yellow().bold(), market.kind);
    println!("{}: {:?}", "Prize Method".yellow().bold(), market.method);
    println!("{}: {}", "Status".yellow().bold(), market.status());
    println!("{}: {}", "Oracle".yellow().bold(), market.oracle_id());
    println!(
        "{}: {}",
        "Buying Deadline".yellow().bold(),
        format_timestamp(market.stake_buying_end_time())
    );
    println!(
        "{}: {}",
        "Market End".yellow().bold(),
        format_timestamp(market.market_end_time())
    );
    println!(
        "{}: {}",
        "Token Pool".yellow().bold(),
        market.token_pool().to_string().yellow()
    );
    println!(
        "{}: {}",
        "Stakes".yellow().bold(),
        market.stake_count().to_string().yellow()
    );
    if let Some(winning) = market.winning_outcome() {
        println!(
            "{}: {}",
            "Winning Outcome".yellow().bold(),
            winning.to_string().green()
        );
    }
    println!("{}", "═".repeat(50).bright_black());
}

fn print_event(event: &MarketEvent) {
    match event {
        MarketEvent::OutcomeAdded {
            outcome_id, label, ..
        } => {
            println!(
                "{}: {} assigned id {}",
                "Outcome Added".green().bold(),
                label.cyan(),
                outcome_id.to_string().yellow()
            );
        }
        MarketEvent::Published { market_id } => {
            println!(
                "{}: market {} is open for staking",
                "Published".green().bold(),
                market_id.cyan()
            );
        }
        MarketEvent::Paused { market_id } => {
            println!("{}: market {}", "Paused".yellow().bold(), market_id.cyan());
        }
        MarketEvent::Canceled { market_id } => {
            println!("{}: market {}", "Canceled".red().bold(), market_id.cyan());
        }
        MarketEvent::TokensPlaced {
            owner,
            amount,
            outcome,
            ..
        } => {
            println!(
                "{}: {} placed {} on {}",
                "Tokens Placed".green().bold(),
                owner.cyan(),
                amount.to_string().yellow(),
                outcome.to_string().cyan()
            );
        }
        MarketEvent::Resolved {
            winning_outcome, ..
        } => {
            println!(
                "{}: winning outcome {}",
                "Resolved".green().bold(),
                winning_outcome.to_string().green()
            );
        }
        MarketEvent::PrizeWithdrawn { owner, amount, .. } => {
            println!(
                "{}: {} received {}",
                "Prize Withdrawn".green().bold(),
                owner.cyan(),
                amount.to_string().yellow()
            );
        }
        MarketEvent::UserRefunded {
            owner,
            amount,
            outcome,
            ..
        } => {
            println!(
                "{}: {} recovered {} from {}",
                "Refunded".green().bold(),
                owner.cyan(),
                amount.to_string().yellow(),
                outcome.to_string().cyan()
            );
        }
    }
}
